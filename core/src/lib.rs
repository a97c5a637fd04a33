pub mod board;
pub mod fen;
pub mod types;

pub use board::*;
pub use fen::FenError;
pub use types::*;
