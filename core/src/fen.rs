use crate::board::Board;
use crate::types::{Color, File, Piece, Rank, Square};
use thiserror::Error;

/// FEN (Forsyth-Edwards Notation) parsing and serialization.
/// Only the fields a belief board tracks are kept: piece placement, side to
/// move and the en passant target. Castling rights and clocks are accepted
/// and ignored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FenError {
    #[error("Invalid FEN format: {0}")]
    InvalidFormat(String),
    #[error("Invalid piece character: '{0}'")]
    InvalidPiece(char),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid en passant square: {0}")]
    InvalidEnPassant(String),
}

impl Board {
    /// Parses a FEN string. A bare placement field is accepted and means
    /// White to move.
    /// Standard starting position: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.is_empty() || parts.len() > 6 {
            return Err(FenError::InvalidFormat(format!(
                "Expected 1 to 6 fields, got {}",
                parts.len()
            )));
        }

        let mut board = parse_placement(parts[0])?;

        if let Some(&turn) = parts.get(1) {
            board.set_turn(match turn {
                "w" => Color::White,
                "b" => Color::Black,
                _ => return Err(FenError::InvalidColor(turn.to_string())),
            });
        }

        if let Some(&ep) = parts.get(3) {
            if ep != "-" {
                let square = ep
                    .parse::<Square>()
                    .map_err(|_| FenError::InvalidEnPassant(ep.to_string()))?;
                board.set_en_passant(Some(square));
            }
        }

        Ok(board)
    }

    /// Converts the board to a FEN string. Castling rights are not tracked
    /// and always written as "-".
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} - {} 0 1",
            placement_to_fen(self),
            if self.turn() == Color::White { "w" } else { "b" },
            self.en_passant()
                .map_or_else(|| "-".to_string(), |square| square.to_string()),
        )
    }
}

/// Parses the placement portion of a FEN string.
fn parse_placement(placement: &str) -> Result<Board, FenError> {
    let mut board = Board::empty();
    let ranks: Vec<&str> = placement.split('/').collect();

    if ranks.len() != 8 {
        return Err(FenError::InvalidFormat(format!(
            "Expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        // FEN starts from rank 8 (index 7) down to rank 1 (index 0)
        let rank = Rank::new(7 - rank_idx as u8)
            .ok_or_else(|| FenError::InvalidFormat(placement.to_string()))?;
        let mut file_idx = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                file_idx = file_idx
                    .checked_add(empty_count as u8)
                    .filter(|&count| count <= 8)
                    .ok_or_else(|| {
                        FenError::InvalidFormat(format!(
                            "Too many squares in rank {}",
                            8 - rank_idx
                        ))
                    })?;
                continue;
            }

            let file = File::new(file_idx).ok_or_else(|| {
                FenError::InvalidFormat(format!("Too many squares in rank {}", 8 - rank_idx))
            })?;
            let piece = Piece::from_char(ch).map_err(|_| FenError::InvalidPiece(ch))?;
            board.set_piece_at(Square::new(file, rank), Some(piece));
            file_idx += 1;
        }

        if file_idx != 8 {
            return Err(FenError::InvalidFormat(format!(
                "Rank {} has {} squares, expected 8",
                8 - rank_idx,
                file_idx
            )));
        }
    }

    Ok(board)
}

/// Converts the piece placement to FEN notation.
fn placement_to_fen(board: &Board) -> String {
    let mut fen = String::new();

    for rank_idx in (0..8u8).rev() {
        let mut empty_count = 0;

        for file_idx in 0..8u8 {
            let square = Square::from_index(rank_idx * 8 + file_idx);
            match square.and_then(|square| board.piece_at(square)) {
                Some(piece) => {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece.to_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            fen.push_str(&empty_count.to_string());
        }

        if rank_idx > 0 {
            fen.push('/');
        }
    }

    fen
}
