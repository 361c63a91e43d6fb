//! Hazard spawning and lifecycle
//!
//! Hazards drop from the top of the world, bounce elastically off the ground
//! and platform tops, and despawn once they have bounced as many times as the
//! player has extra lives. Pure spawn/destroy, no pooling.

use rand::Rng;
use smallvec::SmallVec;

use crate::config::{HazardConfig, WorldConfig};
use crate::game::state::{Hazard, HazardId, Platform};
use crate::util::rect::Rect;
use crate::util::vec2::Vec2;

/// Why a hazard was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnReason {
    /// Reached its bounce budget
    Bounced,
    /// Fell below or drifted out of the world
    LeftWorld,
    /// Touched the player
    HitPlayer,
}

/// Hazard removed during an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Despawn {
    pub id: HazardId,
    pub reason: DespawnReason,
    pub bounces: u32,
}

/// Spawn one hazard at the top of the world
pub fn spawn<R: Rng + ?Sized>(
    config: &HazardConfig,
    world_width: f32,
    fall_speed_factor: f32,
    id: HazardId,
    rng: &mut R,
) -> Hazard {
    let x = rng.gen_range(0.0..=world_width);
    let scale = rng.gen_range(config.scale_min..=config.scale_max);
    let fall = rng.gen_range(config.fall_min..=config.fall_max) * fall_speed_factor;
    let drift = if config.drift > 0.0 {
        rng.gen_range(-config.drift..=config.drift)
    } else {
        0.0
    };

    Hazard::new(id, Vec2::new(x, 0.0), Vec2::new(drift, fall), scale, config.size)
}

/// Advance hazards by `dt`: gravity, scroll, bounces, and despawns.
///
/// `lives` is the player's current extra-life count and is the bounce budget.
pub fn update(
    hazards: &mut Vec<Hazard>,
    platforms: &[Platform],
    world: &WorldConfig,
    scroll_dx: f32,
    lives: u32,
    dt: f32,
) -> SmallVec<[Despawn; 4]> {
    let mut despawned = SmallVec::new();

    for hazard in hazards.iter_mut().filter(|h| h.active) {
        let extent = hazard.extent();
        let previous_bottom = hazard.position.y + extent;

        hazard.velocity.y += world.gravity * dt;
        hazard.position += hazard.velocity * dt;
        hazard.position.x -= scroll_dx;

        if hazard.velocity.y > 0.0 && bounce_surface(hazard, previous_bottom, platforms, world).is_some() {
            hazard.velocity.y = -hazard.velocity.y;
            hazard.bounce_count += 1;

            if hazard.bounce_count >= lives {
                hazard.active = false;
                despawned.push(Despawn {
                    id: hazard.id,
                    reason: DespawnReason::Bounced,
                    bounces: hazard.bounce_count,
                });
                continue;
            }
        }

        let outside = hazard.position.y > world.height
            || hazard.position.x + extent < 0.0
            || hazard.position.x > world.width;
        if outside {
            hazard.active = false;
            despawned.push(Despawn {
                id: hazard.id,
                reason: DespawnReason::LeftWorld,
                bounces: hazard.bounce_count,
            });
        }
    }

    hazards.retain(|h| h.active);
    despawned
}

/// Snap the hazard onto the surface it fell through this step, if any
fn bounce_surface(
    hazard: &mut Hazard,
    previous_bottom: f32,
    platforms: &[Platform],
    world: &WorldConfig,
) -> Option<f32> {
    let extent = hazard.extent();
    let bounds = hazard.bounds();

    let platform_top = platforms
        .iter()
        .filter(|p| p.active && p.bounds().overlaps_horizontally(&bounds))
        .map(|p| p.y)
        .filter(|top| previous_bottom <= *top && bounds.bottom() >= *top)
        .fold(None, |best: Option<f32>, top| Some(best.map_or(top, |b| b.min(top))));

    let ground_top = world
        .ground_top
        .filter(|top| bounds.bottom() >= *top);

    let surface = match (platform_top, ground_top) {
        (Some(p), Some(g)) => Some(p.min(g)),
        (p, g) => p.or(g),
    }?;

    hazard.position.y = surface - extent;
    Some(surface)
}

/// Remove every hazard touching the player. Returns how many hit.
pub fn hit_player(hazards: &mut Vec<Hazard>, player: &Rect) -> SmallVec<[Despawn; 2]> {
    let mut hits = SmallVec::new();
    for hazard in hazards.iter_mut() {
        if hazard.active && hazard.bounds().overlaps(player) {
            hazard.active = false;
            hits.push(Despawn {
                id: hazard.id,
                reason: DespawnReason::HitPlayer,
                bounces: hazard.bounce_count,
            });
        }
    }
    hazards.retain(|h| h.active);
    hits
}
