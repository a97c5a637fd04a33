//! Scripted games: a JSON transcript of what the game framework would tell
//! one player, replayed through the `Player` callbacks.
//!
//! ```json
//! {
//!   "color": "white",
//!   "turns": [
//!     {
//!       "truth": "rnbqkbnr/pppp1ppp/8/4p3/8/8/PPPPPPPP/RNBQKBNR",
//!       "sense_actions": ["e7", "d6"],
//!       "move_actions": ["b1c3", "g1f3"]
//!     },
//!     { "opponent_capture": "c3", "move_actions": ["a2a3"], "rejected": true }
//!   ],
//!   "result": { "winner": "black", "reason": "king_capture" }
//! }
//! ```
//!
//! The driver does not know the rules. Moves are taken as requested unless
//! the turn overrides them, and sense results are cut from the optional
//! `truth` placement around whatever square the player chose.

use anyhow::{Context, Result};
use recon_agents::{GameHistory, Player, Turn, WinReason};
use recon_core::{Board, Color, Move, Piece, Square};
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct GameScript {
    pub color: Color,
    /// Starting position; the standard one when absent.
    #[serde(default)]
    pub fen: Option<String>,
    /// Initial game clock in seconds.
    #[serde(default = "default_clock")]
    pub clock: f64,
    pub turns: Vec<ScriptTurn>,
    #[serde(default)]
    pub result: Option<ScriptResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptTurn {
    /// Square where the opponent's last move took one of our pieces.
    pub opponent_capture: Option<Square>,
    /// Real position after the opponent's move, used to answer the sense.
    pub truth: Option<String>,
    pub sense_actions: Vec<Square>,
    pub move_actions: Vec<Move>,
    /// Move actually applied when it differs from the requested one.
    pub taken: Option<Move>,
    /// The requested move could not be played at all.
    pub rejected: bool,
    /// Square where our move captured an opponent piece.
    pub capture: Option<Square>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptResult {
    pub winner: Option<Color>,
    pub reason: Option<WinReason>,
}

fn default_clock() -> f64 {
    900.0
}

impl GameScript {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse script {}", path.display()))
    }

    pub fn starting_board(&self) -> Result<Board> {
        match &self.fen {
            Some(fen) => {
                Board::from_fen(fen).with_context(|| format!("bad starting FEN {fen:?}"))
            }
            None => Ok(Board::starting_position()),
        }
    }
}

/// Squares revealed by sensing `center`: the 3x3 block around it, clipped
/// to the board.
pub fn sense_window(center: Square) -> impl Iterator<Item = Square> {
    (-1i8..=1).flat_map(move |dr| {
        (-1i8..=1).filter_map(move |df| {
            let file = center.file().offset(df)?;
            let rank = center.rank().offset(dr)?;
            Some(Square::new(file, rank))
        })
    })
}

fn sense_result(truth: Option<&Board>, center: Option<Square>) -> Vec<(Square, Option<Piece>)> {
    match (truth, center) {
        (Some(truth), Some(center)) => sense_window(center)
            .map(|square| (square, truth.piece_at(square)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Feeds every turn of `script` to `player`, calling `after_turn` once each
/// turn's move result has been delivered.
pub fn replay<P, F>(player: &mut P, script: &GameScript, mut after_turn: F) -> Result<GameHistory>
where
    P: Player + ?Sized,
    F: FnMut(&P, usize, &Turn),
{
    let mut history = GameHistory::new();
    let mut clock = script.clock;

    player.handle_game_start(script.color, script.starting_board()?);

    for (index, turn) in script.turns.iter().enumerate() {
        let truth = turn
            .truth
            .as_deref()
            .map(Board::from_fen)
            .transpose()
            .with_context(|| format!("bad truth placement on turn {}", index + 1))?;

        let started = Instant::now();

        let captured = turn.opponent_capture.is_some();
        player.handle_opponent_move_result(captured, turn.opponent_capture);

        let sense = player.choose_sense(&turn.sense_actions, &turn.move_actions, clock);
        player.handle_sense_result(&sense_result(truth.as_ref(), sense));

        let requested = player.choose_move(&turn.move_actions, clock);
        let taken = if turn.rejected {
            None
        } else {
            turn.taken.or(requested)
        };
        player.handle_move_result(requested, taken, turn.capture.is_some(), turn.capture);

        clock = (clock - started.elapsed().as_secs_f64()).max(0.0);
        debug!(turn = index + 1, clock, "turn replayed");

        let record = Turn {
            color: script.color,
            sense,
            requested_move: requested,
            taken_move: taken,
            capture_square: turn.capture,
        };
        after_turn(player, index + 1, &record);
        history.push(record);
    }

    let (winner, reason) = script
        .result
        .as_ref()
        .map_or((None, None), |result| (result.winner, result.reason));
    player.handle_game_end(winner, reason, &history);

    Ok(history)
}
