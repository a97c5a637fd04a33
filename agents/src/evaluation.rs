use crate::config::{AgentConfig, KingProximity, PieceWeights};
use recon_core::{Board, Color};

/// Scores belief positions from one side's point of view.
///
/// Higher is better for `color`. Opponent material counts against us, so
/// a position where we have captured more is worth more. The optional king
/// proximity term adds a further penalty for every own piece standing far
/// from our king.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    weights: PieceWeights,
    king_proximity: Option<KingProximity>,
}

impl Evaluator {
    pub const fn new(weights: PieceWeights, king_proximity: Option<KingProximity>) -> Self {
        Self {
            weights,
            king_proximity,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.weights, config.king_proximity)
    }

    /// Evaluates `board` for `color`.
    pub fn evaluate(&self, board: &Board, color: Color) -> i32 {
        -(self.opponent_material(board, color) + self.king_proximity_term(board, color))
    }

    /// Sum of the weights of every piece not belonging to `color`.
    pub fn opponent_material(&self, board: &Board, color: Color) -> i32 {
        board
            .pieces()
            .filter(|(_, piece)| piece.color != color)
            .map(|(_, piece)| self.weights.get(piece.piece_type))
            .sum()
    }

    /// Penalty for own pieces far from the own king. Zero when the term is
    /// disabled or the king is missing from the belief board.
    pub fn king_proximity_term(&self, board: &Board, color: Color) -> i32 {
        let Some(proximity) = self.king_proximity else {
            return 0;
        };
        let Some(king) = board.king(color) else {
            return 0;
        };

        let limit = u16::from(king.index()) + u16::from(proximity.offset);
        let far = board
            .squares_of(color)
            .filter(|square| u16::from(square.index()) > limit)
            .count() as i32;

        far * proximity.penalty
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}
