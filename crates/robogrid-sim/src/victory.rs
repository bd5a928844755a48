//! End-of-run victory evaluation.

use crate::state::RunState;
use robogrid_core::LevelConfig;

/// Outcome of evaluating a finished run against the level's conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VictoryOutcome {
    /// The robot is not on the target cell; the run simply ends.
    NotAtTarget,
    /// On target but short of the coin requirement.
    MissedCoins { collected: u32, required: u32 },
    /// On target with enough coins but over the move budget.
    TooManyMoves { used: u32, max: u32 },
    Success,
}

/// Evaluate victory for a run that finished without faulting.
///
/// Check order matters: target first, then coins, then the move budget.
pub fn evaluate(level: &LevelConfig, state: &RunState) -> VictoryOutcome {
    if state.pose.coord() != level.target_pos {
        return VictoryOutcome::NotAtTarget;
    }

    let required = level.required_coins();
    let collected = state.collected.len() as u32;
    if collected < required {
        return VictoryOutcome::MissedCoins {
            collected,
            required,
        };
    }

    if let Some(max) = level.max_moves() {
        if state.move_count > max {
            return VictoryOutcome::TooManyMoves {
                used: state.move_count,
                max,
            };
        }
    }

    VictoryOutcome::Success
}
