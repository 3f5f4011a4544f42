/// Reasons a game operation is refused. All of them leave the game untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    NotFound,
    GameFull,
    GameOver,
    WrongTurn,
    InvalidCell,
    OpponentOwned,
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotFound => "NOT_FOUND",
            GameError::GameFull => "GAME_FULL",
            GameError::GameOver => "GAME_OVER",
            GameError::WrongTurn => "WRONG_TURN",
            GameError::InvalidCell => "INVALID_CELL",
            GameError::OpponentOwned => "OPPONENT_OWNED",
        }
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::NotFound => write!(f, "Game not found"),
            GameError::GameFull => write!(f, "Game is full"),
            GameError::GameOver => write!(f, "Game is already over"),
            GameError::WrongTurn => write!(f, "Not your turn"),
            GameError::InvalidCell => write!(f, "Position out of bounds"),
            GameError::OpponentOwned => write!(f, "Cell is owned by another player"),
        }
    }
}

impl std::error::Error for GameError {}
