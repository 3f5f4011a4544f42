use serde::{Deserialize, Serialize};

use crate::PlayerId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub value: u32,
    pub owner: Option<PlayerId>,
}

impl Cell {
    pub const EMPTY: Cell = Cell { value: 0, owner: None };

    pub fn owned(value: u32, owner: PlayerId) -> Self {
        Self { value, owner: Some(owner) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// What a successful move did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub explosions: u32,
    pub winner: Option<PlayerId>,
}
