//! Star placement, scrolling and collection

use rand::Rng;
use smallvec::SmallVec;

use crate::config::{StarConfig, StarPlacement};
use crate::game::state::{Platform, Star};
use crate::game::systems::platforms::PlatformPool;
use crate::util::rect::Rect;

/// Build the star set for a freshly populated platform pool.
///
/// Bound stars get their platform's back-reference and the platform gets the
/// star index.
pub fn populate<R: Rng + ?Sized>(
    config: &StarConfig,
    platforms: &mut PlatformPool,
    world_width: f32,
    rng: &mut R,
) -> Vec<Star> {
    if !config.enabled {
        return Vec::new();
    }

    match config.placement {
        StarPlacement::OnPlatforms { offset } => {
            let mut stars = Vec::with_capacity(platforms.len());
            for (index, platform) in platforms.iter_mut().enumerate() {
                let (x, y) = seat_on(platform, config.size, offset);
                stars.push(Star::new(x, y, config.size, Some(index)));
                platform.star = Some(index);
            }
            stars
        }
        StarPlacement::Scrolling {
            capacity,
            spacing,
            y_min,
            y_max,
        } => (0..capacity)
            .map(|i| {
                let x = world_width + i as f32 * spacing;
                Star::new(x, rng.gen_range(y_min..=y_max), config.size, None)
            })
            .collect(),
    }
}

/// Star position centred above a platform
fn seat_on(platform: &Platform, size: f32, offset: f32) -> (f32, f32) {
    (platform.x + (platform.width - size) / 2.0, platform.y - offset)
}

/// Keep bound stars on their platforms; reactivate the ones whose platform was recycled
pub fn follow_platforms(config: &StarConfig, stars: &mut [Star], platforms: &PlatformPool, recycled: &[usize]) {
    let StarPlacement::OnPlatforms { offset } = config.placement else {
        return;
    };

    for star in stars.iter_mut() {
        let Some(index) = star.platform else {
            continue;
        };
        let Some(platform) = platforms.get(index) else {
            continue;
        };

        let (x, y) = seat_on(platform, star.size, offset);
        star.x = x;
        star.y = y;
        if recycled.contains(&index) {
            star.active = true;
        }
    }
}

/// Scroll the independent star pool and recycle stars that left the world
pub fn scroll_independent<R: Rng + ?Sized>(
    config: &StarConfig,
    stars: &mut [Star],
    dx: f32,
    world_width: f32,
    rng: &mut R,
) -> usize {
    let StarPlacement::Scrolling {
        spacing,
        y_min,
        y_max,
        ..
    } = config.placement
    else {
        return 0;
    };

    for star in stars.iter_mut() {
        star.x -= dx;
    }

    let mut recycled = 0;
    for i in 0..stars.len() {
        if stars[i].x >= -stars[i].size {
            continue;
        }

        let rightmost = stars
            .iter()
            .map(|s| s.x)
            .fold(f32::NEG_INFINITY, f32::max);
        let star = &mut stars[i];
        star.x = (rightmost + spacing).max(world_width);
        star.y = rng.gen_range(y_min..=y_max);
        star.active = true;
        recycled += 1;
    }
    recycled
}

/// Deactivate every active star the player overlaps. Returns their indices.
pub fn collect(stars: &mut [Star], player: &Rect) -> SmallVec<[usize; 2]> {
    let mut collected = SmallVec::new();
    for (index, star) in stars.iter_mut().enumerate() {
        if star.active && star.bounds().overlaps(player) {
            star.active = false;
            collected.push(index);
        }
    }
    collected
}
