//! Static catalog of sandbox commands.
//!
//! The registry is consulted by two independent consumers: the editor (to
//! advertise available calls and inject type declarations) and the host
//! binding installer (to decide which primitives to wire up). Both key off
//! the same string ids carried in `LevelConfig::available_commands`.

use crate::level::LocalizedText;
use serde::{Deserialize, Serialize};

/// Identifier for one host-provided sandbox command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandId {
    MoveForward,
    TurnLeft,
    TurnRight,
    CollectCoin,
    Log,
    GetGrid,
    GetRobotState,
    GetObjectives,
    GetCurrentState,
    SetSpeed,
    GetSpeed,
}

impl CommandId {
    /// All commands, in the canonical catalog order.
    pub fn all() -> [CommandId; 11] {
        [
            CommandId::MoveForward,
            CommandId::TurnLeft,
            CommandId::TurnRight,
            CommandId::CollectCoin,
            CommandId::Log,
            CommandId::GetGrid,
            CommandId::GetRobotState,
            CommandId::GetObjectives,
            CommandId::GetCurrentState,
            CommandId::SetSpeed,
            CommandId::GetSpeed,
        ]
    }

    /// The string id used in level data and player documentation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandId::MoveForward => "moveForward",
            CommandId::TurnLeft => "turnLeft",
            CommandId::TurnRight => "turnRight",
            CommandId::CollectCoin => "collectCoin",
            CommandId::Log => "log",
            CommandId::GetGrid => "getGrid",
            CommandId::GetRobotState => "getRobotState",
            CommandId::GetObjectives => "getObjectives",
            CommandId::GetCurrentState => "getCurrentState",
            CommandId::SetSpeed => "setSpeed",
            CommandId::GetSpeed => "getSpeed",
        }
    }

    pub fn parse(id: &str) -> Option<CommandId> {
        CommandId::all().into_iter().find(|c| c.as_str() == id)
    }

    /// The global name player code calls. `log` lives under `console`.
    pub fn callee_path(&self) -> &'static str {
        match self {
            CommandId::Log => "console.log",
            other => other.as_str(),
        }
    }

    /// True for primitives that suspend the interpreter on a timed delay.
    pub fn is_async(&self) -> bool {
        matches!(
            self,
            CommandId::MoveForward
                | CommandId::TurnLeft
                | CommandId::TurnRight
                | CommandId::CollectCoin
        )
    }
}

/// Human-facing metadata for one command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    pub id: &'static str,
    pub signature: &'static str,
    pub description: LocalizedText,
    /// Type-declaration snippet injected into the editor.
    pub type_declaration: &'static str,
}

/// Look up the catalog entry for a command.
pub fn spec(id: CommandId) -> CommandSpec {
    let (signature, en, zh, type_declaration) = match id {
        CommandId::MoveForward => (
            "moveForward()",
            "Moves the robot forward one step.",
            "向前移动一步。",
            "/** Moves the robot forward one step. / 向前移动一步 */\ndeclare function moveForward(): void;",
        ),
        CommandId::TurnLeft => (
            "turnLeft()",
            "Turns the robot 90 degrees to the left.",
            "向左转90度。",
            "/** Turns the robot 90 degrees to the left. / 向左转90度 */\ndeclare function turnLeft(): void;",
        ),
        CommandId::TurnRight => (
            "turnRight()",
            "Turns the robot 90 degrees to the right.",
            "向右转90度。",
            "/** Turns the robot 90 degrees to the right. / 向右转90度 */\ndeclare function turnRight(): void;",
        ),
        CommandId::CollectCoin => (
            "collectCoin()",
            "Collects a coin at the current position.",
            "收集当前位置的金币。",
            "/** Collects a coin at the current position. / 收集当前位置的金币 */\ndeclare function collectCoin(): void;",
        ),
        CommandId::Log => (
            "console.log(msg)",
            "Prints a message to the console.",
            "在控制台打印一条消息。",
            "declare namespace console {\n  /** Prints a message to the console. / 在控制台打印一条消息。 */\n  function log(msg: any): void;\n}",
        ),
        CommandId::GetGrid => (
            "getGrid()",
            "Returns grid size, walls, and coins.",
            "获取网格大小、墙壁和金币信息。",
            "/** Returns grid size, walls, and coins. / 获取网格大小、墙壁和金币信息。 */\ndeclare function getGrid(): { size: number, walls: {x: number, y: number}[], coins: {x: number, y: number}[] };",
        ),
        CommandId::GetRobotState => (
            "getRobotState()",
            "Returns robot coordinates and direction.",
            "获取机器人坐标和方向。",
            "/** Returns robot coordinates and direction. / 获取机器人坐标和方向。 */\ndeclare function getRobotState(): { x: number, y: number, dir: string };",
        ),
        CommandId::GetObjectives => (
            "getObjectives()",
            "Returns level objectives.",
            "获取关卡目标限制。",
            "/** Returns level objectives. / 获取关卡目标限制。 */\ndeclare function getObjectives(): { requiredCoins: number, maxMoves: number };",
        ),
        CommandId::GetCurrentState => (
            "getCurrentState()",
            "Returns current moves and collected coins.",
            "获取当前步数和已收集金币数。",
            "/** Returns current moves and collected coins. / 获取当前步数和已收集金币数。 */\ndeclare function getCurrentState(): { collectedCoins: number, moves: number };",
        ),
        CommandId::SetSpeed => (
            "setSpeed(ms)",
            "Sets the animation delay in milliseconds.",
            "设置动画延迟（毫秒）。",
            "/** Sets the animation delay in milliseconds. / 设置动画延迟（毫秒）。 */\ndeclare function setSpeed(ms: number): void;",
        ),
        CommandId::GetSpeed => (
            "getSpeed()",
            "Returns current animation delay.",
            "获取当前动画延迟。",
            "/** Returns current animation delay. / 获取当前动画延迟。 */\ndeclare function getSpeed(): number;",
        ),
    };

    CommandSpec {
        id: id.as_str(),
        signature,
        description: LocalizedText::new(en, zh),
        type_declaration,
    }
}

/// Type declarations for the given command ids, for editor injection.
///
/// Unknown ids are skipped; the installer applies the same policy.
pub fn type_declarations(available: &[String]) -> String {
    available
        .iter()
        .filter_map(|id| CommandId::parse(id))
        .map(|id| spec(id).type_declaration)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for id in CommandId::all() {
            assert_eq!(CommandId::parse(id.as_str()), Some(id));
        }
        assert_eq!(CommandId::parse("teleport"), None);
    }

    #[test]
    fn test_async_split() {
        assert!(CommandId::MoveForward.is_async());
        assert!(CommandId::CollectCoin.is_async());
        assert!(!CommandId::Log.is_async());
        assert!(!CommandId::SetSpeed.is_async());
    }

    #[test]
    fn test_log_callee_path() {
        assert_eq!(CommandId::Log.callee_path(), "console.log");
        assert_eq!(CommandId::MoveForward.callee_path(), "moveForward");
    }

    #[test]
    fn test_spec_lookup() {
        let s = spec(CommandId::MoveForward);
        assert_eq!(s.id, "moveForward");
        assert_eq!(s.signature, "moveForward()");
        assert!(!s.description.en.is_empty());
        assert!(!s.description.zh.is_empty());
    }

    #[test]
    fn test_type_declarations_skip_unknown() {
        let decls = type_declarations(&[
            "moveForward".to_string(),
            "bogus".to_string(),
            "getSpeed".to_string(),
        ]);
        assert!(decls.contains("declare function moveForward"));
        assert!(decls.contains("declare function getSpeed"));
        assert!(!decls.contains("bogus"));
    }
}
