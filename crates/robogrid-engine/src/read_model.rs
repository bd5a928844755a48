//! Published view of the run state.

use robogrid_core::Facing;
use robogrid_sim::RunState;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a run, published on every observable change.
///
/// Mirrors `RunState` field for field; collected coin keys are sorted so
/// consumers see a deterministic order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadModel {
    pub run_id: u64,
    pub x: i32,
    pub y: i32,
    pub dir: Facing,
    pub rotation: i32,
    pub move_count: u32,
    pub speed_ms: u64,
    pub collected: Vec<String>,
    pub logs: Vec<String>,
    pub error: Option<String>,
    pub is_success: bool,
    pub is_running: bool,
    pub is_paused: bool,
}

impl From<&RunState> for ReadModel {
    fn from(state: &RunState) -> Self {
        let mut collected: Vec<String> = state.collected.iter().cloned().collect();
        collected.sort();
        Self {
            run_id: state.run_id,
            x: state.pose.x,
            y: state.pose.y,
            dir: state.pose.dir,
            rotation: state.rotation,
            move_count: state.move_count,
            speed_ms: state.speed_ms,
            collected,
            logs: state.logs.clone(),
            error: state.error.clone(),
            is_success: state.is_success,
            is_running: state.is_running,
            is_paused: state.is_paused,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robogrid_core::{Coord, LevelConfig, LocalizedText, Pose};

    #[test]
    fn test_snapshot_mirrors_state() {
        let level = LevelConfig {
            id: "rm".to_string(),
            name: LocalizedText::new("RM", "快照"),
            grid_size: 4,
            start_pos: Pose::new(1, 2, Facing::S),
            target_pos: Coord::new(3, 3),
            walls: vec![],
            coins: vec![],
            available_commands: vec![],
            default_code: String::new(),
            victory_conditions: None,
            difficulty: 1,
        };
        let mut state = RunState::fresh(&level, 7, 400);
        state.collected.insert("2,1".to_string());
        state.collected.insert("0,3".to_string());
        state.push_log("moveForward()");

        let model = ReadModel::from(&state);
        assert_eq!(model.run_id, 7);
        assert_eq!((model.x, model.y), (1, 2));
        assert_eq!(model.dir, Facing::S);
        assert_eq!(model.rotation, 180);
        assert_eq!(model.collected, vec!["0,3", "2,1"]);
        assert_eq!(model.logs, vec!["moveForward()"]);
    }
}
