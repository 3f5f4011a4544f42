use chrono::Utc;
use serde::Serialize;

use super::board::{Board, GRID_SIZE};
use super::error::GameError;
use super::propagation::propagate;
use super::types::{MoveOutcome, Position};
use super::win_detector::{find_winner, is_eliminated};
use crate::{GameId, PlayerId};

pub const MAX_PLAYERS: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: GameId,
    pub(crate) grid: Board,
    pub players: Vec<PlayerId>,
    pub current_player: PlayerId,
    pub game_over: bool,
    pub winner: Option<PlayerId>,
    /// Unix milliseconds, strictly increasing across mutations.
    pub last_updated: i64,
    #[serde(skip)]
    moves_played: u32,
}

impl GameState {
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            grid: Board::new(),
            players: Vec::new(),
            current_player: PlayerId::FIRST,
            game_over: false,
            winner: None,
            last_updated: Utc::now().timestamp_millis(),
            moves_played: 0,
        }
    }

    pub fn grid(&self) -> &Board {
        &self.grid
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS as usize
    }

    pub fn join(&mut self) -> Result<PlayerId, GameError> {
        if self.is_full() {
            return Err(GameError::GameFull);
        }

        let player_id = PlayerId::new(self.players.len() as u8 + 1);
        self.players.push(player_id);
        self.touch();
        Ok(player_id)
    }

    /// Places one piece for `player` at (`row`, `col`), then resolves the
    /// resulting cascade, checks for a winner and passes the turn.
    ///
    /// The move is validated against the current state before anything is
    /// changed, so an error leaves the game exactly as it was.
    ///
    /// A winning move stops the cascade as soon as every opponent is gone, so
    /// the final board of a won game may still hold critical cells.
    pub fn apply_move(&mut self, row: i64, col: i64, player: PlayerId) -> Result<MoveOutcome, GameError> {
        if self.game_over {
            return Err(GameError::GameOver);
        }

        if player != self.current_player {
            return Err(GameError::WrongTurn);
        }

        let pos = Self::to_position(row, col).ok_or(GameError::InvalidCell)?;

        if let Some(owner) = self.grid.get(pos).owner
            && owner != player
        {
            return Err(GameError::OpponentOwned);
        }

        let turn_order = self.turn_order();
        self.moves_played += 1;
        // Everyone starts with zero cells, so elimination only counts once
        // each seat has had a turn.
        let win_armed = self.moves_played as usize >= turn_order.len();

        self.grid.add_piece(pos, player);
        let explosions = propagate(&mut self.grid, |board| {
            win_armed
                && turn_order
                    .iter()
                    .filter(|&&seat| seat != player)
                    .all(|&seat| is_eliminated(board, seat))
        });

        let winner = if win_armed {
            find_winner(&self.grid, player, &turn_order)
        } else {
            None
        };

        match winner {
            Some(winner) => {
                self.game_over = true;
                self.winner = Some(winner);
            }
            None => self.current_player = Self::next_in_rotation(&turn_order, player),
        }

        self.touch();
        Ok(MoveOutcome { explosions, winner })
    }

    pub fn reset(&mut self) {
        self.grid = Board::new();
        self.current_player = self.players.first().copied().unwrap_or(PlayerId::FIRST);
        self.game_over = false;
        self.winner = None;
        self.moves_played = 0;
        self.touch();
    }

    /// Seats in play order: the registered players once the roster is full,
    /// otherwise every seat, which is the same sequence.
    pub fn turn_order(&self) -> Vec<PlayerId> {
        if self.is_full() {
            self.players.clone()
        } else {
            (1..=MAX_PLAYERS).map(PlayerId::new).collect()
        }
    }

    pub fn moves_played(&self) -> u32 {
        self.moves_played
    }

    fn next_in_rotation(turn_order: &[PlayerId], player: PlayerId) -> PlayerId {
        match turn_order.iter().position(|&seat| seat == player) {
            Some(index) => turn_order[(index + 1) % turn_order.len()],
            None => player,
        }
    }

    fn to_position(row: i64, col: i64) -> Option<Position> {
        let row = usize::try_from(row).ok().filter(|&r| r < GRID_SIZE)?;
        let col = usize::try_from(col).ok().filter(|&c| c < GRID_SIZE)?;
        Some(Position::new(row, col))
    }

    fn touch(&mut self) {
        let now = Utc::now().timestamp_millis();
        self.last_updated = now.max(self.last_updated + 1);
    }
}
