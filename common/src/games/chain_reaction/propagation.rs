use std::collections::VecDeque;

use super::board::{Board, GRID_SIZE, neighbors};

/// Explodes critical cells breadth-first until the board is stable.
///
/// Every cell at or above its critical mass is queued, in row-major order,
/// before processing starts. An exploding cell empties and gives one piece to
/// each orthogonal neighbour, which changes owner to the exploding player and
/// is queued if it became critical. A cell is never queued twice while it is
/// pending, and a dequeued cell that is no longer critical is skipped.
///
/// `should_halt` is consulted after every explosion; returning `true` stops
/// the cascade with the remaining queue discarded. Returns the number of
/// explosions performed.
pub fn propagate<F>(board: &mut Board, mut should_halt: F) -> u32
where
    F: FnMut(&Board) -> bool,
{
    let mut pending = [[false; GRID_SIZE]; GRID_SIZE];
    let mut queue = VecDeque::new();

    for pos in board.critical_cells().collect::<Vec<_>>() {
        pending[pos.row][pos.col] = true;
        queue.push_back(pos);
    }

    let mut explosions = 0;

    while let Some(pos) = queue.pop_front() {
        pending[pos.row][pos.col] = false;

        if !board.is_critical(pos) {
            continue;
        }
        let Some(player) = board.get(pos).owner else {
            continue;
        };

        board.clear(pos);
        explosions += 1;

        for neighbor in neighbors(pos) {
            board.add_piece(neighbor, player);
            if board.is_critical(neighbor) && !pending[neighbor.row][neighbor.col] {
                pending[neighbor.row][neighbor.col] = true;
                queue.push_back(neighbor);
            }
        }

        if should_halt(board) {
            break;
        }
    }

    explosions
}
