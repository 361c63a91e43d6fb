//! Arcade kinematics for the player
//!
//! Gravity, position integration, and one-way landing on the ground strip and
//! platform tops.

use crate::config::WorldConfig;
use crate::game::state::{Platform, Player};

/// Integrate the player over `dt` and resolve landings
pub fn step_player(
    player: &mut Player,
    platforms: &[Platform],
    world: &WorldConfig,
    landing_tolerance: f32,
    dt: f32,
) {
    let previous_bottom = player.position.y + player.height;

    player.velocity.y += world.gravity * dt;
    player.position += player.velocity * dt;
    player.on_surface = false;

    // Only land while moving down
    if player.velocity.y < 0.0 {
        return;
    }

    let bounds = player.bounds();
    let reach = previous_bottom - landing_tolerance;

    let platform_top = platforms
        .iter()
        .filter(|p| p.active && p.bounds().overlaps_horizontally(&bounds))
        .map(|p| p.y)
        .filter(|top| reach <= *top && bounds.bottom() >= *top)
        .fold(None, |best: Option<f32>, top| Some(best.map_or(top, |b| b.min(top))));

    let ground_top = world
        .ground_top
        .filter(|top| reach <= *top && bounds.bottom() >= *top);

    let surface = match (platform_top, ground_top) {
        (Some(p), Some(g)) => Some(p.min(g)),
        (p, g) => p.or(g),
    };

    if let Some(top) = surface {
        player.position.y = top - player.height;
        player.velocity.y = 0.0;
        player.on_surface = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    fn player_at(x: f32, y: f32) -> Player {
        let mut player = Player::spawn(&PlayerConfig::default());
        player.position.x = x;
        player.position.y = y;
        player
    }

    #[test]
    fn test_lands_on_ground() {
        let world = WorldConfig::default();
        let mut player = player_at(100.0, 450.0);
        for _ in 0..60 {
            step_player(&mut player, &[], &world, 10.0, 1.0 / 60.0);
        }
        assert!(player.on_surface);
        assert_eq!(player.position.y + player.height, 536.0);
        assert_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn test_lands_on_platform_from_above() {
        let world = WorldConfig::default();
        let platform = Platform::new(50.0, 400.0, 200.0, 16.0);
        let mut player = player_at(100.0, 340.0);
        for _ in 0..60 {
            step_player(&mut player, std::slice::from_ref(&platform), &world, 10.0, 1.0 / 60.0);
        }
        assert!(player.on_surface);
        assert_eq!(player.position.y + player.height, 400.0);
    }

    #[test]
    fn test_passes_up_through_platform() {
        let world = WorldConfig::default();
        let platform = Platform::new(50.0, 400.0, 200.0, 16.0);
        let mut player = player_at(100.0, 410.0);
        player.velocity.y = -330.0;
        step_player(&mut player, std::slice::from_ref(&platform), &world, 10.0, 1.0 / 60.0);
        assert!(!player.on_surface);
        assert!(player.position.y < 410.0);
    }

    #[test]
    fn test_bottomless_world_keeps_falling() {
        let world = WorldConfig {
            ground_top: None,
            ..WorldConfig::default()
        };
        let mut player = player_at(100.0, 450.0);
        for _ in 0..120 {
            step_player(&mut player, &[], &world, 10.0, 1.0 / 60.0);
        }
        assert!(!player.on_surface);
        assert!(player.position.y > world.height);
    }

    #[test]
    fn test_horizontal_integration() {
        let world = WorldConfig::default();
        let mut player = player_at(100.0, 488.0);
        player.velocity.x = -100.0;
        step_player(&mut player, &[], &world, 10.0, 0.25);
        assert_eq!(player.position.x, 75.0);
    }
}
