//! Core type definitions for the robot simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D cell coordinate on the level grid.
///
/// Origin is the top-left corner; x increases east, y increases south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Coordinate key used to identify coins (`"x,y"`).
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// True if the coordinate lies within an N×N grid.
    pub fn in_bounds(&self, grid_size: i32) -> bool {
        self.x >= 0 && self.x < grid_size && self.y >= 0 && self.y < grid_size
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Robot facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    N,
    E,
    S,
    W,
}

impl Facing {
    /// Unit step delta for moving forward in this facing.
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Facing::N => (0, -1),
            Facing::E => (1, 0),
            Facing::S => (0, 1),
            Facing::W => (-1, 0),
        }
    }

    /// Facing after a 90° left turn (N→W→S→E→N).
    pub fn turned_left(&self) -> Facing {
        match self {
            Facing::N => Facing::W,
            Facing::W => Facing::S,
            Facing::S => Facing::E,
            Facing::E => Facing::N,
        }
    }

    /// Facing after a 90° right turn (N→E→S→W→N).
    pub fn turned_right(&self) -> Facing {
        match self {
            Facing::N => Facing::E,
            Facing::E => Facing::S,
            Facing::S => Facing::W,
            Facing::W => Facing::N,
        }
    }

    /// Initial animation rotation in degrees for this facing.
    pub fn initial_rotation(&self) -> i32 {
        match self {
            Facing::N => 0,
            Facing::E => 90,
            Facing::S => 180,
            Facing::W => 270,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::N => "N",
            Facing::E => "E",
            Facing::S => "S",
            Facing::W => "W",
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Robot pose: position plus facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pose {
    pub x: i32,
    pub y: i32,
    pub dir: Facing,
}

impl Pose {
    pub fn new(x: i32, y: i32, dir: Facing) -> Self {
        Self { x, y, dir }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    /// The cell one step ahead in the current facing.
    pub fn cell_ahead(&self) -> Coord {
        let (dx, dy) = self.dir.to_delta();
        Coord::new(self.x + dx, self.y + dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_key() {
        assert_eq!(Coord::new(2, 3).key(), "2,3");
        assert_eq!(Coord::new(0, 0).key(), "0,0");
    }

    #[test]
    fn test_coord_bounds() {
        assert!(Coord::new(0, 0).in_bounds(5));
        assert!(Coord::new(4, 4).in_bounds(5));
        assert!(!Coord::new(5, 0).in_bounds(5));
        assert!(!Coord::new(-1, 2).in_bounds(5));
    }

    #[test]
    fn test_facing_delta() {
        assert_eq!(Facing::N.to_delta(), (0, -1));
        assert_eq!(Facing::S.to_delta(), (0, 1));
        assert_eq!(Facing::E.to_delta(), (1, 0));
        assert_eq!(Facing::W.to_delta(), (-1, 0));
    }

    #[test]
    fn test_turn_cycles() {
        let mut dir = Facing::N;
        for _ in 0..4 {
            dir = dir.turned_left();
        }
        assert_eq!(dir, Facing::N);

        assert_eq!(Facing::N.turned_left(), Facing::W);
        assert_eq!(Facing::N.turned_right(), Facing::E);
        assert_eq!(Facing::W.turned_right(), Facing::N);
    }

    #[test]
    fn test_cell_ahead() {
        let pose = Pose::new(2, 2, Facing::E);
        assert_eq!(pose.cell_ahead(), Coord::new(3, 2));

        let pose = Pose::new(2, 2, Facing::N);
        assert_eq!(pose.cell_ahead(), Coord::new(2, 1));
    }
}
