use serde::{Deserialize, Serialize};

use super::types::{Cell, Position};
use crate::PlayerId;

pub const GRID_SIZE: usize = 6;

/// Explosion threshold of a cell: the number of orthogonal neighbours it has.
pub fn critical_mass(pos: Position) -> u32 {
    neighbors(pos).count() as u32
}

pub fn neighbors(pos: Position) -> impl Iterator<Item = Position> {
    const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

    DIRECTIONS.into_iter().filter_map(move |(dr, dc)| {
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(Position::new(row, col))
        } else {
            None
        }
    })
}

/// Row-major 6x6 grid. Serializes as a nested array of `{value, owner}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; GRID_SIZE]; GRID_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::EMPTY; GRID_SIZE]; GRID_SIZE],
        }
    }

    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.row][pos.col]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.row][pos.col] = cell;
    }

    pub fn rows(&self) -> &[[Cell; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    pub fn positions() -> impl Iterator<Item = Position> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Position::new(row, col)))
    }

    pub fn is_critical(&self, pos: Position) -> bool {
        self.get(pos).value >= critical_mass(pos)
    }

    pub fn critical_cells(&self) -> impl Iterator<Item = Position> + '_ {
        Self::positions().filter(|&pos| self.is_critical(pos))
    }

    pub fn count_owned_by(&self, player: PlayerId) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.owner == Some(player))
            .count()
    }

    pub fn total_value(&self) -> u32 {
        self.cells.iter().flatten().map(|cell| cell.value).sum()
    }

    /// Adds one piece for `player`, capturing the cell whatever its previous owner.
    pub(super) fn add_piece(&mut self, pos: Position, player: PlayerId) -> Cell {
        let cell = &mut self.cells[pos.row][pos.col];
        cell.value += 1;
        cell.owner = Some(player);
        *cell
    }

    pub(super) fn clear(&mut self, pos: Position) {
        self.cells[pos.row][pos.col] = Cell::EMPTY;
    }
}
