use recon_core::{Color, Move};
use std::collections::VecDeque;
use tracing::debug;

/// A fixed sequence of pre-planned moves played before any search.
///
/// Moves are written from White's side and mirrored across the rank axis
/// when the book is built for Black. The book is all-or-nothing: the first
/// time its next move is not legal, the rest of the line is thrown away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpeningBook {
    moves: VecDeque<Move>,
}

impl OpeningBook {
    pub fn new(moves: &[Move], color: Color) -> Self {
        let moves = match color {
            Color::White => moves.iter().copied().collect(),
            Color::Black => moves.iter().map(|mv| mv.flipped()).collect(),
        };
        Self { moves }
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Pops the next planned move if it is among `legal_moves`. Otherwise
    /// discards the whole book and returns None.
    pub fn next_move(&mut self, legal_moves: &[Move]) -> Option<Move> {
        let head = *self.moves.front()?;

        if legal_moves.contains(&head) {
            self.moves.pop_front();
            debug!(%head, remaining = self.moves.len(), "opening book move");
            Some(head)
        } else {
            debug!(%head, dropped = self.moves.len(), "opening book invalidated");
            self.moves.clear();
            None
        }
    }
}
