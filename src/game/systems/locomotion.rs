//! Player locomotion: velocity intent, jump, fast-fall and facing

use crate::config::{LocomotionMode, PlayerConfig};
use crate::game::input::InputSnapshot;
use crate::game::state::{Facing, Player, RunState};

/// Set the player's velocity intent for this tick from input
pub fn apply_input(player: &mut Player, input: &InputSnapshot, config: &PlayerConfig, run: &RunState) {
    let input_vx = match (input.left, input.right) {
        (true, false) => -config.run_speed,
        (false, true) => config.run_speed,
        _ => 0.0,
    };

    match config.mode {
        LocomotionMode::Autorun => {
            player.velocity.x = config.autorun_velocity;
        }
        LocomotionMode::Treadmill => {
            player.velocity.x = -run.speed + input_vx;
            if input.down {
                player.velocity.y = config.fast_fall_velocity;
            }
        }
    }

    if player.on_surface && input.up {
        player.velocity.y = -config.jump_velocity * run.fall_speed_factor;
        player.on_surface = false;
    }

    player.facing = facing(player, input, config, run);
}

/// Pick the pose; treadmill velocity is measured against the scrolling world
fn facing(player: &Player, input: &InputSnapshot, config: &PlayerConfig, run: &RunState) -> Facing {
    let relative_vx = match config.mode {
        // Walk cycle plays continuously
        LocomotionMode::Autorun => return Facing::Right,
        LocomotionMode::Treadmill => player.velocity.x + run.speed,
    };

    if input.right || relative_vx > config.facing_deadzone {
        Facing::Right
    } else if input.left {
        Facing::Left
    } else {
        Facing::Turn
    }
}
