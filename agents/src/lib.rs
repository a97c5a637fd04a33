pub mod agent;
pub mod config;
pub mod evaluation;
pub mod history;
pub mod opening;
pub mod random;
pub mod search;
pub mod sense;

use recon_core::{Board, Color, Move, Piece, Square};

/// Core trait for Reconnaissance Chess players.
///
/// The game framework owns the rules and the real position. It drives the
/// player through one callback per event, in this order each turn:
/// opponent move result, choose sense, sense result, choose move, move result.
pub trait Player {
    /// Called once before the first turn with our color and the initial board.
    fn handle_game_start(&mut self, color: Color, board: Board);

    /// Whether the opponent's last move captured one of our pieces, and where.
    fn handle_opponent_move_result(
        &mut self,
        captured_my_piece: bool,
        capture_square: Option<Square>,
    );

    /// Picks the center of the 3x3 region to reveal.
    fn choose_sense(
        &mut self,
        sense_actions: &[Square],
        move_actions: &[Move],
        seconds_left: f64,
    ) -> Option<Square>;

    /// Contents of every square revealed by the sense.
    fn handle_sense_result(&mut self, sense_result: &[(Square, Option<Piece>)]);

    /// Picks a move, or None to pass.
    fn choose_move(&mut self, move_actions: &[Move], seconds_left: f64) -> Option<Move>;

    /// The move the framework actually applied, which may differ from the
    /// requested one when the real position blocked it.
    fn handle_move_result(
        &mut self,
        requested_move: Option<Move>,
        taken_move: Option<Move>,
        captured_opponent_piece: bool,
        capture_square: Option<Square>,
    );

    fn handle_game_end(
        &mut self,
        winner_color: Option<Color>,
        win_reason: Option<WinReason>,
        game_history: &GameHistory,
    );

    /// Get the player's name
    fn name(&self) -> &str;
}

pub use agent::ReconAgent;
pub use config::{
    AgentConfig, ConfigError, KingProximity, PieceWeights, SearchStrategy, SensePolicy,
};
pub use evaluation::Evaluator;
pub use history::{GameHistory, Turn, WinReason};
pub use opening::OpeningBook;
pub use random::RandomAgent;
pub use search::*;
pub use sense::{SenseContext, SenseSelector};
