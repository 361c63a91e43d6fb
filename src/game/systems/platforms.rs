//! Platform spawner and recycler
//!
//! A fixed-size pool of platforms scrolls left; a platform whose right edge
//! passes the left edge of the world is teleported ahead with a new height.

use rand::Rng;
use smallvec::SmallVec;

use crate::config::{PlatformConfig, RecycleX, YRule};
use crate::game::state::Platform;

/// Redraws before the random walk falls back to a one-unit nudge
const MAX_WALK_ATTEMPTS: u32 = 16;

/// Fixed-capacity platform pool. Length never changes after construction.
#[derive(Debug, Clone)]
pub struct PlatformPool {
    platforms: Box<[Platform]>,
}

impl PlatformPool {
    /// Lay out `config.capacity` platforms starting at `config.first_x`
    pub fn populate<R: Rng + ?Sized>(config: &PlatformConfig, rng: &mut R) -> Self {
        let mut platforms = Vec::with_capacity(config.capacity);
        let mut x = config.first_x;
        let mut previous_y: Option<f32> = None;

        for i in 0..config.capacity {
            let y = match (i, config.first_y) {
                (0, Some(first_y)) => first_y,
                _ => next_y(&config.y_rule, previous_y, rng),
            };

            platforms.push(Platform::new(x, y, config.width, config.height));
            previous_y = Some(y);
            x += spacing(config, rng);
        }

        tracing::debug!("Populated platform pool: {} platforms", platforms.len());

        Self {
            platforms: platforms.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn get(&self, index: usize) -> Option<&Platform> {
        self.platforms.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Platform> {
        self.platforms.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Platform> {
        self.platforms.iter_mut()
    }

    pub fn as_slice(&self) -> &[Platform] {
        &self.platforms
    }

    /// Move every active platform left by `dx`
    pub fn scroll(&mut self, dx: f32) {
        for platform in self.platforms.iter_mut().filter(|p| p.active) {
            platform.x -= dx;
        }
    }

    /// Recycle platforms that left the world. Returns the recycled indices.
    pub fn recycle<R: Rng + ?Sized>(
        &mut self,
        config: &PlatformConfig,
        player_x: f32,
        rng: &mut R,
    ) -> SmallVec<[usize; 4]> {
        let mut recycled = SmallVec::new();

        for (index, platform) in self.platforms.iter_mut().enumerate() {
            if !platform.active || !platform.is_off_world() {
                continue;
            }

            platform.x = recycle_x(&config.recycle_x, player_x);
            platform.y = next_y(&config.y_rule, Some(platform.y), rng);
            recycled.push(index);
        }

        recycled
    }
}

/// Horizontal gap to the next platform
fn spacing<R: Rng + ?Sized>(config: &PlatformConfig, rng: &mut R) -> f32 {
    if config.spacing_range > 0.0 {
        rng.gen_range(config.spacing_min..=config.spacing_min + config.spacing_range)
    } else {
        config.spacing_min
    }
}

/// X a recycled platform reappears at; never left of the world
pub fn recycle_x(rule: &RecycleX, player_x: f32) -> f32 {
    let x = match *rule {
        RecycleX::Fixed(x) => x,
        RecycleX::AheadOfPlayer(lookahead) => player_x + lookahead,
    };
    x.max(0.0)
}

/// Draw the next platform height.
///
/// With no previous height the random walk degrades to a uniform draw.
pub fn next_y<R: Rng + ?Sized>(rule: &YRule, previous: Option<f32>, rng: &mut R) -> f32 {
    match (*rule, previous) {
        (YRule::Uniform { y_min, y_max }, _) => rng.gen_range(y_min..=y_max),
        (YRule::RandomWalk { y_min, y_max, .. }, None) => rng.gen_range(y_min..=y_max),
        (
            YRule::RandomWalk {
                y_min,
                y_max,
                max_step,
            },
            Some(previous),
        ) => walk_step(previous, y_min, y_max, max_step, rng),
    }
}

/// Clamped random walk that never repeats the previous height
fn walk_step<R: Rng + ?Sized>(previous: f32, y_min: f32, y_max: f32, max_step: u32, rng: &mut R) -> f32 {
    let step = i64::from(max_step);

    for _ in 0..MAX_WALK_ATTEMPTS {
        let delta = rng.gen_range(-step..=step) as f32;

        let y = (previous + delta).clamp(y_min, y_max);
        if y != previous {
            return y;
        }

        // Clamped onto the previous height: try the other direction
        let flipped = (previous - delta).clamp(y_min, y_max);
        if flipped != previous {
            return flipped;
        }
    }

    // Band holds at least two integer heights (checked by config validation)
    if previous + 1.0 <= y_max {
        previous + 1.0
    } else {
        (previous - 1.0).max(y_min)
    }
}
