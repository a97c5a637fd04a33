use crate::history::{GameHistory, WinReason};
use crate::Player;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use recon_core::{Board, Color, Move, Piece, Square};

/// Baseline player: senses and moves uniformly at random. Passing counts as
/// one of the move choices.
pub struct RandomAgent {
    name: String,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            name: "Random".to_string(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomAgent {
            name: "Random".to_string(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for RandomAgent {
    fn handle_game_start(&mut self, _color: Color, _board: Board) {}

    fn handle_opponent_move_result(&mut self, _captured: bool, _square: Option<Square>) {}

    fn choose_sense(
        &mut self,
        sense_actions: &[Square],
        _move_actions: &[Move],
        _seconds_left: f64,
    ) -> Option<Square> {
        sense_actions.choose(&mut self.rng).copied()
    }

    fn handle_sense_result(&mut self, _sense_result: &[(Square, Option<Piece>)]) {}

    fn choose_move(&mut self, move_actions: &[Move], _seconds_left: f64) -> Option<Move> {
        random_move(move_actions, &mut self.rng)
    }

    fn handle_move_result(
        &mut self,
        _requested_move: Option<Move>,
        _taken_move: Option<Move>,
        _captured: bool,
        _square: Option<Square>,
    ) {
    }

    fn handle_game_end(
        &mut self,
        _winner_color: Option<Color>,
        _win_reason: Option<WinReason>,
        _game_history: &GameHistory,
    ) {
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Uniform choice among every move plus passing. None for an empty list.
pub fn random_move<R: Rng + ?Sized>(moves: &[Move], rng: &mut R) -> Option<Move> {
    if moves.is_empty() {
        return None;
    }

    let mut choices: Vec<Option<Move>> = moves.iter().copied().map(Some).collect();
    choices.push(None);
    choices.choose(rng).copied().flatten()
}
