use crate::config::{AgentConfig, ConfigError, SearchStrategy};
use crate::evaluation::Evaluator;
use crate::history::{GameHistory, WinReason};
use crate::opening::OpeningBook;
use crate::random::random_move;
use crate::search::{greedy, Minimax, SearchLimits};
use crate::sense::{SenseContext, SenseSelector};
use crate::Player;
use rand::rngs::StdRng;
use rand::SeedableRng;
use recon_core::{Board, Color, Move, Piece, Square};
use tracing::{debug, info, warn};

/// Everything the agent learns during one game. Rebuilt at game start.
#[derive(Debug, Clone)]
struct GameContext {
    board: Board,
    color: Color,
    captured_square: Option<Square>,
    turn_number: u32,
    book: OpeningBook,
}

/// Heuristic agent: opening book first, then greedy or minimax search over
/// a belief board it keeps in sync from move and sense results.
pub struct ReconAgent {
    config: AgentConfig,
    evaluator: Evaluator,
    sense: SenseSelector,
    rng: StdRng,
    game: Option<GameContext>,
}

impl ReconAgent {
    /// Builds an agent without checking the configuration. Out of range
    /// search budgets are clamped when a move is chosen.
    pub fn new(config: AgentConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        ReconAgent {
            evaluator: Evaluator::from_config(&config),
            sense: SenseSelector::new(config.sense),
            rng,
            game: None,
            config,
        }
    }

    /// Builds an agent after validating the configuration.
    pub fn try_new(config: AgentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Knight-raid opening followed by one-ply greedy search.
    pub fn greedy() -> Self {
        Self::new(AgentConfig::greedy())
    }

    /// Depth-3 alpha-beta search that keeps pieces near the king.
    pub fn minimax() -> Self {
        Self::new(AgentConfig::minimax())
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current belief board, None outside a game.
    pub fn board(&self) -> Option<&Board> {
        self.game.as_ref().map(|game| &game.board)
    }

    pub fn color(&self) -> Option<Color> {
        self.game.as_ref().map(|game| game.color)
    }
}

impl Player for ReconAgent {
    fn handle_game_start(&mut self, color: Color, board: Board) {
        info!(agent = %self.config.name, %color, "game start");

        self.game = Some(GameContext {
            board,
            color,
            captured_square: None,
            turn_number: 1,
            book: OpeningBook::new(&self.config.opening, color),
        });
    }

    fn handle_opponent_move_result(
        &mut self,
        captured_my_piece: bool,
        capture_square: Option<Square>,
    ) {
        let Some(game) = self.game.as_mut() else {
            not_started(&self.config.name, "opponent move result");
            return;
        };

        game.captured_square = capture_square.filter(|_| captured_my_piece);
        if let Some(square) = game.captured_square {
            let lost = game.board.remove_piece_at(square);
            debug!(%square, ?lost, "own piece captured");
        }
    }

    fn choose_sense(
        &mut self,
        sense_actions: &[Square],
        _move_actions: &[Move],
        _seconds_left: f64,
    ) -> Option<Square> {
        let Some(game) = self.game.as_ref() else {
            not_started(&self.config.name, "choose sense");
            return None;
        };
        let ctx = SenseContext {
            board: &game.board,
            color: game.color,
            captured_square: game.captured_square,
            turn_number: game.turn_number,
        };
        self.sense.choose(sense_actions, &ctx, &mut self.rng)
    }

    fn handle_sense_result(&mut self, sense_result: &[(Square, Option<Piece>)]) {
        let Some(game) = self.game.as_mut() else {
            not_started(&self.config.name, "sense result");
            return;
        };

        for &(square, piece) in sense_result {
            game.board.set_piece_at(square, piece);
        }
        debug!(squares = sense_result.len(), "sense result applied");
    }

    fn choose_move(&mut self, move_actions: &[Move], seconds_left: f64) -> Option<Move> {
        let Some(game) = self.game.as_mut() else {
            not_started(&self.config.name, "choose move");
            return None;
        };
        // Counts every move decision, book or search
        game.turn_number += 1;

        if let Some(mv) = game.book.next_move(move_actions) {
            return Some(mv);
        }

        let limits = SearchLimits::from_clock(
            seconds_left,
            self.config.time_fraction,
            self.config.max_nodes,
        );
        let result = match self.config.search {
            SearchStrategy::Greedy => greedy(
                &mut game.board,
                game.color,
                move_actions,
                &self.evaluator,
                limits,
            ),
            SearchStrategy::Minimax {
                depth,
                examine_all_siblings,
            } => Minimax::new(&self.evaluator, game.color, move_actions, limits)
                .examine_all_siblings(examine_all_siblings)
                .search(&mut game.board, depth),
        };

        debug!(
            best = ?result.best_move,
            score = ?result.score,
            nodes = result.nodes,
            stopped = result.stopped,
            "search finished"
        );

        result
            .best_move
            .or_else(|| random_move(move_actions, &mut self.rng))
    }

    fn handle_move_result(
        &mut self,
        requested_move: Option<Move>,
        taken_move: Option<Move>,
        captured_opponent_piece: bool,
        capture_square: Option<Square>,
    ) {
        let Some(game) = self.game.as_mut() else {
            not_started(&self.config.name, "move result");
            return;
        };

        if requested_move != taken_move {
            debug!(requested = ?requested_move, taken = ?taken_move, "move was altered");
        }
        if captured_opponent_piece {
            debug!(square = ?capture_square, "captured opponent piece");
        }
        if let Some(mv) = taken_move {
            game.board.push(mv);
        }
        debug!(fen = %game.board.to_fen(), "belief board");
    }

    fn handle_game_end(
        &mut self,
        winner_color: Option<Color>,
        win_reason: Option<WinReason>,
        game_history: &GameHistory,
    ) {
        let outcome = match (winner_color, self.color()) {
            (Some(winner), Some(own)) if winner == own => "won",
            (Some(_), Some(_)) => "lost",
            (None, _) => "draw",
            (Some(_), None) => "finished",
        };
        info!(
            agent = %self.config.name,
            outcome,
            reason = ?win_reason,
            turns = game_history.len(),
            "game end"
        );
        self.game = None;
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

fn not_started(agent: &str, event: &str) {
    warn!(agent, event, "callback before game start ignored");
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_core::PieceType;

    fn seeded(config: AgentConfig) -> ReconAgent {
        ReconAgent::new(AgentConfig {
            seed: Some(11),
            ..config
        })
    }

    fn mv(uci: &str) -> Move {
        uci.parse().unwrap()
    }

    #[test]
    fn test_callbacks_before_start_are_ignored() {
        let mut agent = seeded(AgentConfig::greedy());

        agent.handle_opponent_move_result(true, Some(Square::E2));
        agent.handle_sense_result(&[(Square::E4, None)]);
        agent.handle_move_result(Some(mv("e2e4")), Some(mv("e2e4")), false, None);

        assert_eq!(agent.choose_sense(&[Square::E7], &[], 10.0), None);
        assert_eq!(agent.choose_move(&[mv("e2e4")], 10.0), None);
        assert!(agent.board().is_none());
    }

    #[test]
    fn test_opponent_capture_updates_board_and_sense() {
        let mut agent = seeded(AgentConfig::greedy());
        agent.handle_game_start(Color::White, Board::starting_position());

        agent.handle_opponent_move_result(true, Some(Square::F2));
        assert_eq!(agent.board().unwrap().piece_at(Square::F2), None);
        assert_eq!(agent.choose_sense(&[Square::E7], &[], 10.0), Some(Square::F2));

        // The hint only lasts one turn
        agent.handle_opponent_move_result(false, None);
        assert_eq!(agent.choose_sense(&[Square::E7], &[], 10.0), Some(Square::E7));
    }

    #[test]
    fn test_sense_result_overlays_board() {
        let mut agent = seeded(AgentConfig::greedy());
        agent.handle_game_start(Color::White, Board::starting_position());

        let queen = Piece::new(PieceType::Queen, Color::Black);
        agent.handle_sense_result(&[(Square::D8, None), (Square::H4, Some(queen))]);

        let board = agent.board().unwrap();
        assert_eq!(board.piece_at(Square::D8), None);
        assert_eq!(board.piece_at(Square::H4), Some(queen));
    }

    #[test]
    fn test_greedy_agent_plays_book_then_searches() {
        let mut agent = seeded(AgentConfig::greedy());
        agent.handle_game_start(Color::White, Board::starting_position());

        let legal = [mv("a2a3"), mv("b1c3"), mv("g1f3")];
        assert_eq!(agent.choose_move(&legal, 60.0), Some(mv("b1c3")));
        agent.handle_move_result(Some(mv("b1c3")), Some(mv("b1c3")), false, None);
        assert!(agent.board().unwrap().piece_at(Square::C3).is_some());

        // c3b5 is not offered, so the book is abandoned and search takes over
        let legal = [mv("a2a3"), mv("c3d5")];
        assert_eq!(agent.choose_move(&legal, 60.0), Some(mv("a2a3")));
        assert_eq!(agent.board().unwrap().ply(), 1);
    }

    #[test]
    fn test_black_book_is_mirrored() {
        let mut agent = seeded(AgentConfig::greedy());
        agent.handle_game_start(Color::Black, Board::starting_position());

        let legal = [mv("b8c6"), mv("g8f6")];
        assert_eq!(agent.choose_move(&legal, 60.0), Some(mv("b8c6")));
    }

    #[test]
    fn test_minimax_agent_takes_free_queen() {
        let mut agent = seeded(AgentConfig::minimax());
        let board = Board::from_fen("4k3/8/8/3q4/8/2N5/8/4K3 w - - 0 1").unwrap();
        agent.handle_game_start(Color::White, board.clone());

        let legal = [mv("c3b5"), mv("c3d5"), mv("e1d1")];
        assert_eq!(agent.choose_move(&legal, 60.0), Some(mv("c3d5")));
        assert_eq!(agent.board(), Some(&board));
    }

    #[test]
    fn test_empty_move_list() {
        let mut agent = seeded(AgentConfig::minimax());
        agent.handle_game_start(Color::White, Board::starting_position());
        assert_eq!(agent.choose_move(&[], 60.0), None);
    }

    #[test]
    fn test_exhausted_budget_falls_back_to_random() {
        let mut agent = seeded(AgentConfig {
            max_nodes: Some(0),
            ..AgentConfig::minimax()
        });
        agent.handle_game_start(Color::White, Board::starting_position());

        let legal = [mv("a2a3"), mv("b2b3")];
        for _ in 0..20 {
            let chosen = agent.choose_move(&legal, 60.0);
            assert!(chosen.is_none() || legal.contains(&chosen.unwrap()));
        }
    }

    #[test]
    fn test_extreme_clocks_still_choose() {
        let legal = [mv("a2a3"), mv("b2b3")];
        for seconds_left in [f64::MAX, f64::INFINITY, 0.0, -1.0, f64::NAN] {
            let mut agent = seeded(AgentConfig::minimax());
            agent.handle_game_start(Color::White, Board::starting_position());
            let chosen = agent.choose_move(&legal, seconds_left);
            assert!(
                chosen.map_or(true, |chosen| legal.contains(&chosen)),
                "clock {seconds_left}"
            );
        }
    }

    #[test]
    fn test_out_of_range_time_fraction() {
        let legal = [mv("a2a3"), mv("b2b3")];
        for time_fraction in [-1.0, 0.0, 7.5, f64::NAN] {
            let config = AgentConfig {
                time_fraction,
                ..AgentConfig::minimax()
            };
            assert!(ReconAgent::try_new(config.clone()).is_err());

            let mut agent = seeded(config);
            agent.handle_game_start(Color::White, Board::starting_position());
            let chosen = agent.choose_move(&legal, f64::MAX);
            assert!(chosen.map_or(true, |chosen| legal.contains(&chosen)));
        }
        assert!(ReconAgent::try_new(AgentConfig::minimax()).is_ok());
    }

    #[test]
    fn test_turn_counter_counts_book_moves() {
        let mut agent = seeded(AgentConfig::greedy());
        agent.handle_game_start(Color::White, Board::starting_position());
        let turn = |agent: &ReconAgent| agent.game.as_ref().map(|game| game.turn_number);
        assert_eq!(turn(&agent), Some(1));

        assert_eq!(agent.choose_move(&[mv("b1c3")], 60.0), Some(mv("b1c3")));
        assert_eq!(turn(&agent), Some(2));

        // Off book: search decisions count the same way
        assert_eq!(agent.choose_move(&[mv("a2a3")], 60.0), Some(mv("a2a3")));
        assert_eq!(turn(&agent), Some(3));
    }

    #[test]
    fn test_game_end_clears_context() {
        let mut agent = seeded(AgentConfig::greedy());
        agent.handle_game_start(Color::White, Board::starting_position());
        let history = GameHistory::new();
        agent.handle_game_end(Some(Color::White), Some(WinReason::KingCapture), &history);

        assert!(agent.board().is_none());
        assert_eq!(agent.name(), "Greedy");
    }
}
