use recon_core::{Color, Move, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    KingCapture,
    Timeout,
    Resignation,
    TurnLimit,
    MoveLimit,
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WinReason::KingCapture => "king capture",
            WinReason::Timeout => "timeout",
            WinReason::Resignation => "resignation",
            WinReason::TurnLimit => "turn limit",
            WinReason::MoveLimit => "move limit",
        };
        f.write_str(text)
    }
}

/// One player's turn as recorded by the game framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub color: Color,
    pub sense: Option<Square>,
    pub requested_move: Option<Move>,
    pub taken_move: Option<Move>,
    pub capture_square: Option<Square>,
}

/// Ordered record of every turn in a finished game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistory {
    turns: Vec<Turn>,
}

impl GameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of moves `color` actually got onto the board.
    pub fn moves_taken(&self, color: Color) -> usize {
        self.turns
            .iter()
            .filter(|turn| turn.color == color && turn.taken_move.is_some())
            .count()
    }
}
