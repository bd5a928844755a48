//! Read-only grid queries over a level.

use robogrid_core::{Coord, LevelConfig};

/// Borrowed view of a level's static geometry.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    level: &'a LevelConfig,
}

impl<'a> GridView<'a> {
    pub fn new(level: &'a LevelConfig) -> Self {
        Self { level }
    }

    pub fn size(&self) -> i32 {
        self.level.grid_size
    }

    pub fn in_bounds(&self, cell: Coord) -> bool {
        cell.in_bounds(self.level.grid_size)
    }

    pub fn is_wall(&self, cell: Coord) -> bool {
        self.level.walls.contains(&cell)
    }

    /// True if a coin was placed on this cell at level start.
    pub fn has_coin(&self, cell: Coord) -> bool {
        self.level.coins.contains(&cell)
    }

    /// A cell the robot may enter: inside the grid and not a wall.
    pub fn passable(&self, cell: Coord) -> bool {
        self.in_bounds(cell) && !self.is_wall(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robogrid_core::{Facing, LocalizedText, Pose};

    fn level() -> LevelConfig {
        LevelConfig {
            id: "grid-test".to_string(),
            name: LocalizedText::new("Grid", "网格"),
            grid_size: 3,
            start_pos: Pose::new(0, 0, Facing::E),
            target_pos: Coord::new(2, 2),
            walls: vec![Coord::new(1, 1)],
            coins: vec![Coord::new(2, 0)],
            available_commands: vec![],
            default_code: String::new(),
            victory_conditions: None,
            difficulty: 1,
        }
    }

    #[test]
    fn test_passability() {
        let level = level();
        let grid = GridView::new(&level);
        assert!(grid.passable(Coord::new(0, 0)));
        assert!(!grid.passable(Coord::new(1, 1)));
        assert!(!grid.passable(Coord::new(3, 0)));
        assert!(!grid.passable(Coord::new(0, -1)));
    }

    #[test]
    fn test_coin_lookup() {
        let level = level();
        let grid = GridView::new(&level);
        assert!(grid.has_coin(Coord::new(2, 0)));
        assert!(!grid.has_coin(Coord::new(0, 0)));
    }
}
