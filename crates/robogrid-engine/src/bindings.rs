//! Value construction for the synchronous host commands.

use robogrid_core::{Coord, LevelConfig, Pose};
use robogrid_runtime::Value;
use robogrid_sim::RunState;

fn coord_value(c: &Coord) -> Value {
    Value::Object(vec![
        ("x".to_string(), Value::Num(c.x as f64)),
        ("y".to_string(), Value::Num(c.y as f64)),
    ])
}

fn pose_value(p: &Pose) -> Value {
    Value::Object(vec![
        ("x".to_string(), Value::Num(p.x as f64)),
        ("y".to_string(), Value::Num(p.y as f64)),
        ("dir".to_string(), Value::Str(p.dir.as_str().to_string())),
    ])
}

/// `getGrid()` payload: the level's static geometry.
pub(crate) fn get_grid(level: &LevelConfig) -> Value {
    Value::Object(vec![
        ("size".to_string(), Value::Num(level.grid_size as f64)),
        (
            "walls".to_string(),
            Value::Array(level.walls.iter().map(coord_value).collect()),
        ),
        (
            "coins".to_string(),
            Value::Array(level.coins.iter().map(coord_value).collect()),
        ),
        ("targetPos".to_string(), coord_value(&level.target_pos)),
        ("startPos".to_string(), pose_value(&level.start_pos)),
    ])
}

/// `getRobotState()` payload: current position and facing.
pub(crate) fn get_robot_state(state: &RunState) -> Value {
    pose_value(&state.pose)
}

/// `getObjectives()` payload. `maxMoves` is -1 when unbounded.
pub(crate) fn get_objectives(level: &LevelConfig) -> Value {
    let max_moves = level.max_moves().map(|m| m as f64).unwrap_or(-1.0);
    Value::Object(vec![
        (
            "requiredCoins".to_string(),
            Value::Num(level.required_coins() as f64),
        ),
        ("maxMoves".to_string(), Value::Num(max_moves)),
    ])
}

/// `getCurrentState()` payload: run progress counters.
pub(crate) fn get_current_state(state: &RunState) -> Value {
    Value::Object(vec![
        (
            "collectedCoins".to_string(),
            Value::Num(state.collected.len() as f64),
        ),
        ("moves".to_string(), Value::Num(state.move_count as f64)),
    ])
}

/// `console.log(...)`: render each argument, join with single spaces.
pub(crate) fn render_log_line(args: &[Value]) -> String {
    args.iter()
        .map(Value::to_log_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `setSpeed(ms)`: store the new delay and append the canonical log line.
/// Takes effect from the next asynchronous command.
pub(crate) fn set_speed(state: &mut RunState, args: &[Value]) {
    if let Some(Value::Num(ms)) = args.first() {
        let ms = ms.max(0.0) as u64;
        state.speed_ms = ms;
        state.push_log(format!("setSpeed({})", ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robogrid_core::{Facing, LocalizedText, VictoryConditions};

    fn level() -> LevelConfig {
        LevelConfig {
            id: "bindings".to_string(),
            name: LocalizedText::new("Bindings", "绑定"),
            grid_size: 5,
            start_pos: Pose::new(0, 2, Facing::E),
            target_pos: Coord::new(4, 2),
            walls: vec![Coord::new(1, 1)],
            coins: vec![Coord::new(2, 2)],
            available_commands: vec![],
            default_code: String::new(),
            victory_conditions: None,
            difficulty: 1,
        }
    }

    #[test]
    fn test_grid_payload_shape() {
        let json = get_grid(&level()).to_json();
        assert_eq!(json["size"], 5);
        assert_eq!(json["walls"][0]["x"], 1);
        assert_eq!(json["coins"][0]["y"], 2);
        assert_eq!(json["targetPos"]["x"], 4);
        assert_eq!(json["startPos"]["dir"], "E");
    }

    #[test]
    fn test_objectives_unbounded_moves() {
        let json = get_objectives(&level()).to_json();
        assert_eq!(json["requiredCoins"], 1);
        assert_eq!(json["maxMoves"], -1);
    }

    #[test]
    fn test_objectives_with_bound() {
        let mut level = level();
        level.victory_conditions = Some(VictoryConditions {
            required_coins: Some(0),
            max_moves: Some(12),
        });
        let json = get_objectives(&level).to_json();
        assert_eq!(json["requiredCoins"], 0);
        assert_eq!(json["maxMoves"], 12);
    }

    #[test]
    fn test_log_line_rendering() {
        let line = render_log_line(&[
            Value::Str("robot at".to_string()),
            Value::Object(vec![
                ("x".to_string(), Value::Num(1.0)),
                ("y".to_string(), Value::Num(2.0)),
            ]),
            Value::Num(3.0),
        ]);
        assert_eq!(line, r#"robot at {"x":1,"y":2} 3"#);
    }

    #[test]
    fn test_set_speed_logs_and_stores() {
        let level = level();
        let mut state = RunState::fresh(&level, 1, 400);
        set_speed(&mut state, &[Value::Num(150.0)]);
        assert_eq!(state.speed_ms, 150);
        assert_eq!(state.logs, vec!["setSpeed(150)"]);

        // A non-numeric argument is ignored.
        set_speed(&mut state, &[Value::Str("fast".to_string())]);
        assert_eq!(state.speed_ms, 150);
    }
}
