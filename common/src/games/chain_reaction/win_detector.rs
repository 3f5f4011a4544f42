use super::board::Board;
use crate::PlayerId;

pub fn is_eliminated(board: &Board, player: PlayerId) -> bool {
    board.count_owned_by(player) == 0
}

/// The mover wins once every other seat holds no cells.
pub fn find_winner(board: &Board, mover: PlayerId, seats: &[PlayerId]) -> Option<PlayerId> {
    let opponents_eliminated = seats
        .iter()
        .filter(|&&seat| seat != mover)
        .all(|&seat| is_eliminated(board, seat));

    if opponents_eliminated && !is_eliminated(board, mover) {
        Some(mover)
    } else {
        None
    }
}
