//! Host command table scoped to one level.

use robogrid_core::CommandId;
use std::collections::HashMap;
use tracing::warn;

/// The set of host commands installed into the sandbox for one run.
///
/// Built from the level's `available_commands`; unknown ids are skipped
/// with a warning (a configuration problem, not a crash). Player code that
/// calls a command absent from the table fails as "not defined", exactly
/// like any other unknown identifier.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    by_path: HashMap<&'static str, CommandId>,
}

impl CommandTable {
    /// Install the commands a level enables.
    pub fn for_level(available: &[String]) -> Self {
        let mut by_path = HashMap::new();
        for id in available {
            match CommandId::parse(id) {
                Some(command) => {
                    by_path.insert(command.callee_path(), command);
                }
                None => {
                    warn!(command = %id, "Skipping unknown command id");
                }
            }
        }
        Self { by_path }
    }

    /// Install every command in the catalog (used by tests and tooling).
    pub fn full() -> Self {
        let mut by_path = HashMap::new();
        for command in CommandId::all() {
            by_path.insert(command.callee_path(), command);
        }
        Self { by_path }
    }

    /// Resolve a callee path (`moveForward`, `console.log`) to a command.
    pub fn resolve(&self, path: &str) -> Option<CommandId> {
        self.by_path.get(path).copied()
    }

    pub fn is_installed(&self, command: CommandId) -> bool {
        self.by_path.contains_key(command.callee_path())
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_subset() {
        let table = CommandTable::for_level(&[
            "moveForward".to_string(),
            "log".to_string(),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve("moveForward"), Some(CommandId::MoveForward));
        assert_eq!(table.resolve("console.log"), Some(CommandId::Log));
        assert_eq!(table.resolve("turnLeft"), None);
    }

    #[test]
    fn test_unknown_id_skipped() {
        let table = CommandTable::for_level(&[
            "moveForward".to_string(),
            "teleport".to_string(),
        ]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_full_table() {
        let table = CommandTable::full();
        assert_eq!(table.len(), CommandId::all().len());
        assert!(table.is_installed(CommandId::GetSpeed));
    }
}
