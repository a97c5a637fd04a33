use crate::config::SensePolicy;
use rand::seq::SliceRandom;
use rand::Rng;
use recon_core::{Board, Color, Square};
use tracing::debug;

/// What the sense selector knows about the game when it is asked.
#[derive(Debug, Clone, Copy)]
pub struct SenseContext<'a> {
    pub board: &'a Board,
    pub color: Color,
    /// Square where one of our pieces was taken on the opponent's last move.
    pub captured_square: Option<Square>,
    pub turn_number: u32,
}

/// Picks the square to reveal each turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct SenseSelector {
    policy: SensePolicy,
}

impl SenseSelector {
    pub fn new(policy: SensePolicy) -> Self {
        Self { policy }
    }

    /// Chooses a sense square in priority order:
    ///
    /// 1. the square where we just lost a piece, even if it is not a candidate;
    /// 2. on cadence turns, the candidate nearest our king that does not hold
    ///    one of our pieces (when enabled);
    /// 3. a random candidate not believed to hold one of our pieces;
    /// 4. the first candidate, when every candidate holds one of our pieces.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        candidates: &[Square],
        ctx: &SenseContext<'_>,
        rng: &mut R,
    ) -> Option<Square> {
        if let Some(square) = ctx.captured_square {
            debug!(%square, "sensing capture square");
            return Some(square);
        }

        let unknown: Vec<Square> = candidates
            .iter()
            .copied()
            .filter(|&square| !ctx.board.is_color(square, ctx.color))
            .collect();

        if let Some(square) = self.king_cadence_square(&unknown, ctx) {
            debug!(%square, turn = ctx.turn_number, "sensing near own king");
            return Some(square);
        }

        match unknown.choose(rng) {
            Some(&square) => Some(square),
            None => candidates.first().copied(),
        }
    }

    fn king_cadence_square(&self, unknown: &[Square], ctx: &SenseContext<'_>) -> Option<Square> {
        let period = self.policy.king_cadence_period;
        if !self.policy.enable_king_cadence_sense
            || period == 0
            || ctx.turn_number == 0
            || ctx.turn_number % period != 0
        {
            return None;
        }

        let king = ctx.board.king(ctx.color)?;
        // min_by_key keeps the first of equal keys
        unknown
            .iter()
            .copied()
            .min_by_key(|square| square.distance(king))
    }
}
