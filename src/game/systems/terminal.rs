//! Terminal condition detection

use crate::config::{LeftEdgeRule, TerminalConfig, WorldConfig};
use crate::game::state::Player;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Pushed past the left edge
    LeftEdge,
    /// Dropped below the world
    FellThrough,
    /// Left a bounded arena through the top or right
    OutOfArena,
    /// Hit by a hazard with no extra lives
    Hazard,
}

/// Evaluate the configured death rules against the player's position
pub fn check(player: &Player, terminal: &TerminalConfig, world: &WorldConfig) -> Option<DeathCause> {
    let x = player.position.x;
    let y = player.position.y;

    let past_left = match terminal.left_rule {
        LeftEdgeRule::LeftEdge => x <= terminal.left_limit,
        LeftEdgeRule::FullyOffscreen => x + player.width < terminal.left_limit,
    };
    if past_left {
        return Some(DeathCause::LeftEdge);
    }

    if terminal.fall_through && y > world.height {
        return Some(DeathCause::FellThrough);
    }

    if terminal.bounded_arena && (x > world.width || y < 0.0) {
        return Some(DeathCause::OutOfArena);
    }

    None
}
