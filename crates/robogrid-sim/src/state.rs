//! Per-run mutable state and its pure transitions.

use crate::grid::GridView;
use robogrid_core::{Facing, LevelConfig, Pose};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Direction of a 90° turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDir {
    Left,
    Right,
}

/// Result of a forward-move transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The robot advanced one cell.
    Moved,
    /// The next cell is a wall or outside the grid; the position is
    /// unchanged but the attempt is still counted.
    Blocked,
}

/// Result of a coin-collect transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    Collected,
    /// No uncollected coin on the current cell.
    NoCoin,
}

/// The complete mutable state of one run.
///
/// Superseded wholesale by the next run or reset; a new `RunState` always
/// starts from the level's initial geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub pose: Pose,
    /// Accumulated rotation in degrees (±90 per turn, never normalized),
    /// so a renderer can animate the shorter arc.
    pub rotation: i32,
    pub move_count: u32,
    pub speed_ms: u64,
    /// Keys (`"x,y"`) of the coins collected so far.
    pub collected: HashSet<String>,
    pub logs: Vec<String>,
    /// Terminal fault message, if the run failed.
    pub error: Option<String>,
    pub is_success: bool,
    pub is_running: bool,
    pub is_paused: bool,
    pub run_id: u64,
}

impl RunState {
    /// State at the start of a run.
    pub fn fresh(level: &LevelConfig, run_id: u64, speed_ms: u64) -> Self {
        Self {
            pose: level.start_pos,
            rotation: level.start_pos.dir.initial_rotation(),
            move_count: 0,
            speed_ms,
            collected: HashSet::new(),
            logs: Vec::new(),
            error: None,
            is_success: false,
            is_running: false,
            is_paused: false,
            run_id,
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    /// Record a terminal fault and stop the run.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.is_running = false;
        self.is_paused = false;
    }

    /// Advance one cell along the current facing.
    ///
    /// The attempt counts as a move whether or not it lands: a blocked
    /// move still increments `move_count`, it just leaves the position
    /// untouched.
    pub fn apply_move(&mut self, grid: &GridView<'_>) -> MoveOutcome {
        self.move_count += 1;
        let next = self.pose.cell_ahead();
        if !grid.passable(next) {
            return MoveOutcome::Blocked;
        }
        self.pose.x = next.x;
        self.pose.y = next.y;
        MoveOutcome::Moved
    }

    /// Rotate 90° in place.
    pub fn apply_turn(&mut self, dir: TurnDir) {
        match dir {
            TurnDir::Left => {
                self.pose.dir = self.pose.dir.turned_left();
                self.rotation -= 90;
            }
            TurnDir::Right => {
                self.pose.dir = self.pose.dir.turned_right();
                self.rotation += 90;
            }
        }
    }

    /// Pick up the coin on the current cell, if one is still there.
    pub fn collect_coin(&mut self, grid: &GridView<'_>) -> CollectOutcome {
        let here = self.pose.coord();
        if grid.has_coin(here) && !self.collected.contains(&here.key()) {
            self.collected.insert(here.key());
            CollectOutcome::Collected
        } else {
            CollectOutcome::NoCoin
        }
    }

    pub fn facing(&self) -> Facing {
        self.pose.dir
    }
}
