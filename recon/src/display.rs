use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use recon_core::{Board, Color, File, PieceType, Rank, Square};
use std::io::{self, Write};

fn symbol(piece_type: PieceType, color: Color) -> char {
    match (piece_type, color) {
        (PieceType::King, Color::White) => '♔',
        (PieceType::Queen, Color::White) => '♕',
        (PieceType::Rook, Color::White) => '♖',
        (PieceType::Bishop, Color::White) => '♗',
        (PieceType::Knight, Color::White) => '♘',
        (PieceType::Pawn, Color::White) => '♙',
        (PieceType::King, Color::Black) => '♚',
        (PieceType::Queen, Color::Black) => '♛',
        (PieceType::Rook, Color::Black) => '♜',
        (PieceType::Bishop, Color::Black) => '♝',
        (PieceType::Knight, Color::Black) => '♞',
        (PieceType::Pawn, Color::Black) => '♟',
    }
}

/// Draws the belief board from `perspective`'s side, highlighting the last
/// sensed square.
pub fn draw_board(
    out: &mut impl Write,
    board: &Board,
    perspective: Color,
    sensed: Option<Square>,
) -> io::Result<()> {
    let ranks: Vec<u8> = match perspective {
        Color::White => (0..8).rev().collect(),
        Color::Black => (0..8).collect(),
    };
    let files: Vec<u8> = match perspective {
        Color::White => (0..8).collect(),
        Color::Black => (0..8).rev().collect(),
    };
    let labels: String = files
        .iter()
        .filter_map(|&file| File::new(file))
        .map(|file| format!("{} ", file.to_char()))
        .collect();

    out.queue(Print(format!("   {labels}\n")))?;
    out.queue(Print(" ┌─────────────────┐\n"))?;

    for &rank_idx in &ranks {
        let Some(rank) = Rank::new(rank_idx) else {
            continue;
        };
        out.queue(Print(format!("{}│ ", rank.to_char())))?;

        for &file_idx in &files {
            let Some(file) = File::new(file_idx) else {
                continue;
            };
            let square = Square::new(file, rank);

            let background = if sensed.is_some_and(|center| center.distance(square) <= 1) {
                TermColor::DarkBlue
            } else if (file_idx + rank_idx) % 2 == 0 {
                TermColor::DarkGrey
            } else {
                TermColor::Black
            };
            out.queue(SetBackgroundColor(background))?;

            match board.piece_at(square) {
                Some(piece) => {
                    let foreground = if piece.color == Color::White {
                        TermColor::White
                    } else {
                        TermColor::Magenta
                    };
                    out.queue(SetForegroundColor(foreground))?;
                    out.queue(Print(format!("{} ", symbol(piece.piece_type, piece.color))))?;
                }
                None => {
                    out.queue(Print("  "))?;
                }
            }
            out.queue(ResetColor)?;
        }

        out.queue(Print(format!("│{}\n", rank.to_char())))?;
    }

    out.queue(Print(" └─────────────────┘\n"))?;
    out.queue(Print(format!("   {labels}\n")))?;
    out.queue(Print(format!("{} to move\n\n", board.turn())))?;
    out.flush()
}
