use rand::Rng;

use crate::GameId;

const GAME_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
pub const GAME_ID_LENGTH: usize = 6;

pub fn generate_game_id() -> GameId {
    let mut rng = rand::rng();
    let id: String = (0..GAME_ID_LENGTH)
        .map(|_| GAME_ID_ALPHABET[rng.random_range(0..GAME_ID_ALPHABET.len())] as char)
        .collect();
    GameId::new(id)
}
