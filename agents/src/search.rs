use crate::evaluation::Evaluator;
use recon_core::{Board, Color, Move};
use std::time::{Duration, Instant};
use tracing::trace;

const TIME_CHECK_INTERVAL: u64 = 1000; // Check time every 1000 nodes

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// Score of `best_move`, None when no move was evaluated.
    pub score: Option<i32>,
    pub nodes: u64,
    pub stopped: bool,
}

/// Cooperative budget for one move decision.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    pub nodes: Option<u64>,
    pub move_time: Option<Duration>,
}

impl SearchLimits {
    /// No limit besides the search depth.
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn nodes(nodes: u64) -> Self {
        Self {
            nodes: Some(nodes),
            move_time: None,
        }
    }

    pub fn move_time(millis: u64) -> Self {
        Self {
            nodes: None,
            move_time: Some(Duration::from_millis(millis)),
        }
    }

    /// Budget for one move given the remaining game clock.
    ///
    /// An infinite clock leaves the time unlimited. A spent or NaN clock gives
    /// a zero budget, so the search stops before its first node.
    pub fn from_clock(seconds_left: f64, time_fraction: f64, nodes: Option<u64>) -> Self {
        let move_time = if seconds_left == f64::INFINITY {
            None
        } else if seconds_left > 0.0 {
            let fraction = if time_fraction.is_nan() {
                0.0
            } else {
                time_fraction.clamp(0.0, 1.0)
            };
            Some(Duration::try_from_secs_f64(seconds_left * fraction).unwrap_or(Duration::MAX))
        } else {
            Some(Duration::ZERO)
        };
        Self { nodes, move_time }
    }
}

struct SearchInfo {
    start_time: Instant,
    limits: SearchLimits,
    nodes: u64,
    stopped: bool,
}

impl SearchInfo {
    fn new(limits: SearchLimits) -> Self {
        Self {
            start_time: Instant::now(),
            limits,
            nodes: 0,
            stopped: false,
        }
    }

    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }

        // Check node limit
        if let Some(max_nodes) = self.limits.nodes {
            if self.nodes >= max_nodes {
                self.stopped = true;
                return true;
            }
        }

        // Check time limit periodically
        if self.nodes % TIME_CHECK_INTERVAL == 0 {
            if let Some(move_time) = self.limits.move_time {
                if self.start_time.elapsed() >= move_time {
                    self.stopped = true;
                    return true;
                }
            }
        }

        false
    }

    fn finish(&self, best_move: Option<Move>, score: Option<i32>) -> SearchResult {
        SearchResult {
            best_move,
            score,
            nodes: self.nodes,
            stopped: self.stopped,
        }
    }
}

/// One-ply search: try every move on the belief board, keep the one whose
/// resulting position scores strictly highest. Ties keep the earlier move.
pub fn greedy(
    board: &mut Board,
    color: Color,
    moves: &[Move],
    evaluator: &Evaluator,
    limits: SearchLimits,
) -> SearchResult {
    let mut info = SearchInfo::new(limits);
    let mut best_move = None;
    let mut best_score = None;

    for &mv in moves {
        if info.should_stop() {
            break;
        }
        info.nodes += 1;

        let score = evaluator.evaluate(&board.probe(mv), color);
        trace!(%mv, score, "greedy");

        if best_score.map_or(true, |best| score > best) {
            best_score = Some(score);
            best_move = Some(mv);
        }
    }

    info.finish(best_move, best_score)
}

/// Depth-limited minimax with alpha-beta pruning.
///
/// The opponent's legal moves are unknown, so the same move list stands in
/// for both sides at every level. Leaves are scored by the evaluator from
/// the searching side's point of view.
pub struct Minimax<'a> {
    evaluator: &'a Evaluator,
    color: Color,
    moves: &'a [Move],
    examine_all_siblings: bool,
    info: SearchInfo,
}

impl<'a> Minimax<'a> {
    pub fn new(
        evaluator: &'a Evaluator,
        color: Color,
        moves: &'a [Move],
        limits: SearchLimits,
    ) -> Self {
        Self {
            evaluator,
            color,
            moves,
            examine_all_siblings: true,
            info: SearchInfo::new(limits),
        }
    }

    /// When false, every node stops after its first child unless that child
    /// already caused a cutoff.
    pub fn examine_all_siblings(mut self, examine: bool) -> Self {
        self.examine_all_siblings = examine;
        self
    }

    /// Searches `depth` plies (at least one) and returns the best root move.
    /// The board is left exactly as it was found.
    pub fn search(mut self, board: &mut Board, depth: u8) -> SearchResult {
        let depth = depth.max(1);
        let moves = self.moves;
        let mut alpha = i32::MIN;
        let beta = i32::MAX;
        let mut best_move = None;
        let mut best_score = None;

        for &mv in moves {
            if self.info.should_stop() {
                break;
            }

            let value = {
                let mut probe = board.probe(mv);
                self.minimax(&mut probe, depth - 1, false, alpha, beta)
            };

            // A subtree cut short by the budget has no trustworthy value
            if self.info.stopped {
                break;
            }
            trace!(%mv, value, "root");

            if best_score.map_or(true, |best| value > best) {
                best_score = Some(value);
                best_move = Some(mv);
            }
            alpha = alpha.max(value);

            if !self.examine_all_siblings {
                break;
            }
        }

        self.info.finish(best_move, best_score)
    }

    fn minimax(
        &mut self,
        board: &mut Board,
        depth: u8,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.info.nodes += 1;

        if depth == 0 || self.moves.is_empty() {
            return self.evaluator.evaluate(board, self.color);
        }

        let moves = self.moves;
        let mut best_value = None;

        for &mv in moves {
            if self.info.should_stop() {
                break;
            }

            let value = {
                let mut probe = board.probe(mv);
                self.minimax(&mut probe, depth - 1, !maximizing, alpha, beta)
            };

            let best = if maximizing {
                let best = best_value.map_or(value, |best: i32| best.max(value));
                alpha = alpha.max(best);
                trace!(%mv, value, depth, "as max");
                best
            } else {
                let best = best_value.map_or(value, |best: i32| best.min(value));
                beta = beta.min(best);
                trace!(%mv, value, depth, "as min");
                best
            };
            best_value = Some(best);

            if beta <= alpha || !self.examine_all_siblings {
                break;
            }
        }

        // Budget ran out before any child was searched
        best_value.unwrap_or_else(|| self.evaluator.evaluate(board, self.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KingProximity, PieceWeights};

    const KNIGHT_FORK: &str = "4k3/8/8/1p1q4/8/2N5/8/4K3 w - - 0 1";

    fn mv(uci: &str) -> Move {
        uci.parse().unwrap()
    }

    fn moves(list: &[&str]) -> Vec<Move> {
        list.iter().map(|m| mv(m)).collect()
    }

    fn material() -> Evaluator {
        Evaluator::new(PieceWeights::GREEDY, None)
    }

    fn run_greedy(board: &mut Board, candidates: &[Move]) -> SearchResult {
        greedy(board, Color::White, candidates, &material(), SearchLimits::unlimited())
    }

    fn run_minimax(board: &mut Board, candidates: &[Move], depth: u8) -> SearchResult {
        let evaluator = material();
        Minimax::new(&evaluator, Color::White, candidates, SearchLimits::unlimited())
            .search(board, depth)
    }

    #[test]
    fn test_greedy_single_candidate() {
        let mut board = Board::starting_position();
        let result = run_greedy(&mut board, &moves(&["a2a3"]));
        assert_eq!(result.best_move, Some(mv("a2a3")));
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn test_greedy_prefers_capture() {
        // White knight on c3 can take the queen on d5 or the pawn on b5
        let mut board = Board::from_fen(KNIGHT_FORK).unwrap();
        let before = board.clone();

        let result = run_greedy(&mut board, &moves(&["c3b5", "c3e4", "c3d5"]));
        assert_eq!(result.best_move, Some(mv("c3d5")));
        assert_eq!(result.score, Some(-(100 + 1)));
        assert_eq!(result.nodes, 3);
        assert_eq!(board, before);
    }

    #[test]
    fn test_greedy_ties_keep_first() {
        let mut board = Board::starting_position();
        let result = run_greedy(&mut board, &moves(&["g1f3", "b1c3", "e2e4"]));
        assert_eq!(result.best_move, Some(mv("g1f3")));
    }

    #[test]
    fn test_greedy_empty_list() {
        let mut board = Board::starting_position();
        let result = run_greedy(&mut board, &[]);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, None);
    }

    #[test]
    fn test_minimax_restores_board_at_every_depth() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/5N2/PPP2PPP/RNBQKB1R b - - 0 3";
        let candidates = moves(&["e5d4", "c6d4", "d8h4", "g8f6", "f8b4"]);
        let evaluator = Evaluator::new(PieceWeights::MINIMAX, Some(KingProximity::default()));

        for depth in 1..=4 {
            for examine_all in [true, false] {
                let mut board = Board::from_fen(fen).unwrap();
                let before = board.clone();
                let limits = SearchLimits::unlimited();
                let result = Minimax::new(&evaluator, Color::Black, &candidates, limits)
                    .examine_all_siblings(examine_all)
                    .search(&mut board, depth);
                assert!(result.best_move.is_some());
                assert_eq!(board, before, "depth {depth}, examine_all {examine_all}");
            }
        }
    }

    #[test]
    fn test_minimax_depth_one_matches_greedy() {
        let candidates = moves(&["c3b5", "c3e4", "c3d5"]);
        let mut board = Board::from_fen(KNIGHT_FORK).unwrap();

        let one_ply = run_greedy(&mut board, &candidates);
        let minimax = run_minimax(&mut board, &candidates, 1);

        assert_eq!(minimax.best_move, one_ply.best_move);
        assert_eq!(minimax.score, one_ply.score);
    }

    #[test]
    fn test_minimax_finds_capture_that_survives_reply() {
        // The reused move list gives the minimizing side nothing that
        // recaptures on d5.
        let mut board = Board::from_fen(KNIGHT_FORK).unwrap();
        let result = run_minimax(&mut board, &moves(&["c3b5", "c3e4", "c3d5"]), 3);
        assert_eq!(result.best_move, Some(mv("c3d5")));
        assert_eq!(result.score, Some(-101));
    }

    #[test]
    fn test_limited_breadth_examines_first_root_move_only() {
        let mut board = Board::from_fen(KNIGHT_FORK).unwrap();
        let candidates = moves(&["c3b5", "c3e4", "c3d5"]);
        let evaluator = material();

        let result = Minimax::new(&evaluator, Color::White, &candidates, SearchLimits::unlimited())
            .examine_all_siblings(false)
            .search(&mut board, 2);
        assert_eq!(result.best_move, Some(mv("c3b5")));
        // root child + one grandchild
        assert_eq!(result.nodes, 2);
    }

    #[test]
    fn test_alpha_beta_prunes() {
        let mut board = Board::starting_position();
        let candidates = moves(&["a2a3", "b2b3", "c2c3", "d2d3", "e2e3", "f2f3", "g2g3", "h2h3"]);

        let result = run_minimax(&mut board, &candidates, 3);
        // Without pruning a depth-3 tree over 8 moves visits 8 + 64 + 512 nodes
        assert!(result.nodes < 8 + 64 + 512, "nodes: {}", result.nodes);
        assert!(!result.stopped);
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn test_node_budget_stops_search() {
        let mut board = Board::starting_position();
        let candidates = moves(&["a2a3", "b2b3", "c2c3", "d2d3"]);
        let evaluator = material();

        let result = Minimax::new(&evaluator, Color::White, &candidates, SearchLimits::nodes(5))
            .search(&mut board, 4);
        assert!(result.stopped);
        assert!(result.nodes <= 6);
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn test_expired_clock_stops_before_first_probe() {
        let mut board = Board::starting_position();
        let candidates = moves(&["a2a3"]);
        let limits = SearchLimits::move_time(0);

        let result = greedy(&mut board, Color::White, &candidates, &material(), limits);
        assert!(result.stopped);
        assert_eq!(result.best_move, None);
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn test_limits_from_clock() {
        let limits = SearchLimits::from_clock(100.0, 0.1, Some(50));
        assert_eq!(limits.move_time, Some(Duration::from_secs(10)));
        assert_eq!(limits.nodes, Some(50));
        assert_eq!(SearchLimits::from_clock(f64::INFINITY, 0.1, None).move_time, None);
    }

    #[test]
    fn test_limits_from_spent_clock() {
        for seconds_left in [0.0, -3.0, f64::NEG_INFINITY, f64::NAN] {
            let limits = SearchLimits::from_clock(seconds_left, 0.1, None);
            assert_eq!(limits.move_time, Some(Duration::ZERO), "clock {seconds_left}");
        }
    }

    #[test]
    fn test_limits_from_extreme_clock_and_fraction() {
        let huge = SearchLimits::from_clock(f64::MAX, 1.0, None);
        assert_eq!(huge.move_time, Some(Duration::MAX));

        let negative = SearchLimits::from_clock(60.0, -1.0, None);
        assert_eq!(negative.move_time, Some(Duration::ZERO));
        let nan = SearchLimits::from_clock(60.0, f64::NAN, None);
        assert_eq!(nan.move_time, Some(Duration::ZERO));
        let above_one = SearchLimits::from_clock(60.0, 5.0, None);
        assert_eq!(above_one.move_time, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_spent_clock_stops_before_first_node() {
        let mut board = Board::starting_position();
        let evaluator = Evaluator::default();
        let moves = ["a2a3".parse().unwrap(), "b2b3".parse().unwrap()];
        let limits = SearchLimits::from_clock(0.0, 0.1, None);

        let result = greedy(&mut board, Color::White, &moves, &evaluator, limits);
        assert_eq!(result.best_move, None);
        assert!(result.stopped);
    }
}
