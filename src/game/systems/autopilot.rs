//! Scripted input for the headless driver
//!
//! Holds right, hops onto platforms coming up ahead, and retries after a
//! game over so an unattended session keeps cycling through runs.

use crate::game::input::{InputSnapshot, Key};
use crate::game::state::{Phase, Player, RunState};
use crate::game::systems::platforms::PlatformPool;

/// Horizontal look-ahead for a platform worth jumping onto
const JUMP_WINDOW: f32 = 60.0;

/// Jump regardless of platforms when this close to the left edge
const EDGE_MARGIN: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct Autopilot {
    jump_window: f32,
    edge_margin: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            jump_window: JUMP_WINDOW,
            edge_margin: EDGE_MARGIN,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick this tick's held keys
    pub fn decide(&self, run: &RunState, player: &Player, platforms: &PlatformPool) -> InputSnapshot {
        match run.phase {
            Phase::NotStarted => InputSnapshot::holding(&[Key::Right]),
            Phase::GameOver => InputSnapshot::holding(&[Key::Space]),
            Phase::Running => {
                let mut input = InputSnapshot::holding(&[Key::Right]);
                input.up = player.on_surface && self.should_jump(player, platforms);
                input
            }
        }
    }

    fn should_jump(&self, player: &Player, platforms: &PlatformPool) -> bool {
        if player.position.x < self.edge_margin {
            return true;
        }

        let bounds = player.bounds();
        platforms.iter().any(|p| {
            p.active
                && p.y < bounds.bottom()
                && p.x >= bounds.right()
                && p.x <= bounds.right() + self.jump_window
        })
    }
}
