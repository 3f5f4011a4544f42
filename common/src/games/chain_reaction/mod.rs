mod board;
mod error;
mod game_state;
mod propagation;
mod types;
mod win_detector;

pub use board::{Board, GRID_SIZE, critical_mass, neighbors};
pub use error::GameError;
pub use game_state::{GameState, MAX_PLAYERS};
pub use propagation::propagate;
pub use types::{Cell, MoveOutcome, Position};
pub use win_detector::{find_winner, is_eliminated};
