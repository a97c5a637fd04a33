//! Belief board: an array-based position plus a stack of undo records so that
//! hypothetical moves can be pushed and popped during search.
use crate::types::*;
use std::ops::{Deref, DerefMut};

/// Everything needed to take back one pushed move.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Undo {
    mv: Move,
    /// Squares overwritten by the move, with their previous contents.
    changes: Vec<(Square, Option<Piece>)>,
    turn: Color,
    en_passant: Option<Square>,
}

/// A position the agent believes in. It is not ground truth: sense results
/// and capture reports overwrite it, and search pushes moves onto it that
/// were never played.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    /// 64 squares, indexed by Square::index()
    squares: [Option<Piece>; 64],
    turn: Color,
    en_passant: Option<Square>,
    stack: Vec<Undo>,
}

impl Board {
    /// Creates an empty board with White to move.
    pub const fn empty() -> Self {
        Self {
            squares: [None; 64],
            turn: Color::White,
            en_passant: None,
            stack: Vec::new(),
        }
    }

    /// Creates the standard starting position.
    pub fn starting_position() -> Self {
        const BACK_RANK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        let mut board = Self::empty();
        for (i, &piece_type) in BACK_RANK.iter().enumerate() {
            let i = i as u8;
            board.squares[i as usize] = Some(Piece::new(piece_type, Color::White));
            board.squares[(i + 8) as usize] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[(i + 48) as usize] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[(i + 56) as usize] = Some(Piece::new(piece_type, Color::Black));
        }
        board
    }

    /// Gets the piece at the given square.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index() as usize]
    }

    /// Overwrites the given square. Used for sense observations.
    pub fn set_piece_at(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.index() as usize] = piece;
    }

    /// Clears the given square, returning whatever was believed to be there.
    pub fn remove_piece_at(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.index() as usize].take()
    }

    /// Side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    /// En passant target square left by the last double pawn push, if any.
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn set_en_passant(&mut self, square: Option<Square>) {
        self.en_passant = square;
    }

    /// Iterates over every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Iterates over the squares holding pieces of `color`.
    pub fn squares_of(&self, color: Color) -> impl Iterator<Item = Square> + '_ {
        self.pieces()
            .filter(move |(_, piece)| piece.color == color)
            .map(|(square, _)| square)
    }

    /// Returns true if the given square contains a piece of the given color.
    pub fn is_color(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|p| p.color == color)
    }

    /// Finds the king of the given color. The belief board can lose track of
    /// it, so this is an Option rather than a panic.
    pub fn king(&self, color: Color) -> Option<Square> {
        let king = Piece::new(PieceType::King, color);
        self.pieces()
            .find(|&(_, piece)| piece == king)
            .map(|(square, _)| square)
    }

    /// Number of moves currently pushed and not yet popped.
    pub fn ply(&self) -> usize {
        self.stack.len()
    }

    /// Applies a move without any legality check and records how to undo it.
    ///
    /// Castling (king moving two files), en passant, promotion and drops are
    /// handled. A move from an empty square only passes the turn, since the
    /// belief board may simply be wrong about where our pieces are.
    pub fn push(&mut self, mv: Move) {
        let mut undo = Undo {
            mv,
            changes: Vec::with_capacity(4),
            turn: self.turn,
            en_passant: self.en_passant,
        };

        let en_passant = self.en_passant.take();

        if let Some(drop) = mv.drop {
            self.write(&mut undo, mv.to, Some(Piece::new(drop, self.turn)));
        } else if let Some(piece) = self.piece_at(mv.from) {
            self.write(&mut undo, mv.from, None);

            let file_step = mv.from.file().index().abs_diff(mv.to.file().index());
            if piece.piece_type == PieceType::King && file_step == 2 {
                self.write(&mut undo, mv.to, Some(piece));
                self.castle_rook(&mut undo, mv);
            } else {
                // En passant: diagonal pawn move onto the target square
                if piece.piece_type == PieceType::Pawn
                    && Some(mv.to) == en_passant
                    && mv.from.file() != mv.to.file()
                    && self.piece_at(mv.to).is_none()
                {
                    let captured = Square::new(mv.to.file(), mv.from.rank());
                    self.write(&mut undo, captured, None);
                }

                let placed = match mv.promotion {
                    Some(promotion) => Piece::new(promotion, piece.color),
                    None => piece,
                };
                self.write(&mut undo, mv.to, Some(placed));

                if piece.piece_type == PieceType::Pawn
                    && mv.from.file() == mv.to.file()
                    && mv.from.rank().index().abs_diff(mv.to.rank().index()) == 2
                {
                    self.en_passant = mv
                        .from
                        .rank()
                        .offset(piece.color.pawn_direction())
                        .map(|rank| Square::new(mv.from.file(), rank));
                }
            }
        }

        self.turn = self.turn.opponent();
        self.stack.push(undo);
    }

    /// Takes back the most recently pushed move.
    pub fn pop(&mut self) -> Option<Move> {
        let undo = self.stack.pop()?;
        for &(square, previous) in undo.changes.iter().rev() {
            self.squares[square.index() as usize] = previous;
        }
        self.turn = undo.turn;
        self.en_passant = undo.en_passant;
        Some(undo.mv)
    }

    /// Pushes `mv` and returns a guard that pops it again when dropped, on
    /// every exit path.
    pub fn probe(&mut self, mv: Move) -> Probe<'_> {
        self.push(mv);
        Probe { board: self }
    }

    fn write(&mut self, undo: &mut Undo, square: Square, piece: Option<Piece>) {
        undo.changes.push((square, self.piece_at(square)));
        self.squares[square.index() as usize] = piece;
    }

    fn castle_rook(&mut self, undo: &mut Undo, mv: Move) {
        let rank = mv.from.rank();
        let (rook_file, target_file) = if mv.to.file() > mv.from.file() {
            (7, 5) // h-file to f-file
        } else {
            (0, 3) // a-file to d-file
        };
        let (Some(rook_file), Some(target_file)) = (File::new(rook_file), File::new(target_file))
        else {
            return;
        };
        let rook_from = Square::new(rook_file, rank);
        if let Some(rook) = self.piece_at(rook_from) {
            self.write(undo, rook_from, None);
            self.write(undo, Square::new(target_file, rank), Some(rook));
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
    }
}

/// Scoped push: the move is popped when the guard goes out of scope.
pub struct Probe<'a> {
    board: &'a mut Board,
}

impl Deref for Probe<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Probe<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Probe<'_> {
    fn drop(&mut self) {
        self.board.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn mv(uci: &str) -> Move {
        uci.parse().unwrap()
    }

    #[test]
    fn test_starting_position() {
        let board = Board::starting_position();

        assert_eq!(
            board.piece_at(sq("a1")),
            Some(Piece::new(PieceType::Rook, Color::White))
        );
        assert_eq!(board.king(Color::White), Some(sq("e1")));
        assert_eq!(board.king(Color::Black), Some(sq("e8")));
        assert!(board.piece_at(sq("d5")).is_none());
        assert_eq!(board.squares_of(Color::White).count(), 16);
        assert_eq!(board.pieces().count(), 32);
    }

    #[test]
    fn test_push_pop_restores_position() {
        let mut board = Board::starting_position();
        let original = board.clone();

        let line = ["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a2", "a1a2"];
        for m in line {
            board.push(mv(m));
        }
        assert_eq!(board.ply(), line.len());
        assert_eq!(board.piece_at(sq("a2")), Some(Piece::new(PieceType::Rook, Color::White)));

        for _ in line {
            board.pop();
        }
        assert_eq!(board, original);
        assert!(board.pop().is_none());
    }

    #[test]
    fn test_probe_pops_on_drop() {
        let mut board = Board::starting_position();
        let original = board.clone();
        {
            let mut probe = board.probe(mv("g1f3"));
            assert!(probe.piece_at(sq("f3")).is_some());
            let nested = probe.probe(mv("g8f6"));
            assert_eq!(nested.ply(), 2);
        }
        assert_eq!(board, original);
    }

    #[test]
    fn test_castling_moves_rook() {
        let mut board = Board::starting_position();
        board.remove_piece_at(sq("f1"));
        board.remove_piece_at(sq("g1"));
        board.push(mv("e1g1"));

        assert_eq!(board.king(Color::White), Some(sq("g1")));
        assert_eq!(board.piece_at(sq("f1")), Some(Piece::new(PieceType::Rook, Color::White)));
        assert!(board.piece_at(sq("h1")).is_none());

        board.pop();
        assert_eq!(board.king(Color::White), Some(sq("e1")));
        assert_eq!(board.piece_at(sq("h1")), Some(Piece::new(PieceType::Rook, Color::White)));
    }

    #[test]
    fn test_en_passant_capture() {
        let mut board = Board::starting_position();
        board.push(mv("e2e4"));
        assert_eq!(board.en_passant(), Some(sq("e3")));
        board.push(mv("a7a6"));
        board.push(mv("e4e5"));
        board.push(mv("d7d5"));
        assert_eq!(board.en_passant(), Some(sq("d6")));

        board.push(mv("e5d6"));
        assert!(board.piece_at(sq("d5")).is_none());
        assert_eq!(board.piece_at(sq("d6")), Some(Piece::new(PieceType::Pawn, Color::White)));

        board.pop();
        assert_eq!(board.piece_at(sq("d5")), Some(Piece::new(PieceType::Pawn, Color::Black)));
        assert_eq!(board.en_passant(), Some(sq("d6")));
    }

    #[test]
    fn test_promotion_and_drop() {
        let mut board = Board::empty();
        board.set_piece_at(sq("g7"), Some(Piece::new(PieceType::Pawn, Color::White)));

        board.push(mv("g7g8n"));
        assert_eq!(board.piece_at(sq("g8")), Some(Piece::new(PieceType::Knight, Color::White)));
        assert_eq!(board.turn(), Color::Black);

        board.push(mv("Q@d4"));
        assert_eq!(board.piece_at(sq("d4")), Some(Piece::new(PieceType::Queen, Color::Black)));

        board.pop();
        board.pop();
        assert_eq!(board.piece_at(sq("g7")), Some(Piece::new(PieceType::Pawn, Color::White)));
        assert!(board.piece_at(sq("g8")).is_none());
        assert!(board.piece_at(sq("d4")).is_none());
    }

    #[test]
    fn test_move_from_empty_square_only_passes_turn() {
        let mut board = Board::starting_position();
        let before = board.clone();
        board.push(mv("e4e5"));
        assert_eq!(board.turn(), Color::Black);
        board.pop();
        assert_eq!(board, before);
    }
}
