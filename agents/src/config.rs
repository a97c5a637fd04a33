//! Agent configuration, loadable from TOML.
//!
//! Every field has a default, so a file only needs the keys it changes:
//!
//! ```toml
//! name = "Zone"
//! seed = 7
//!
//! [search]
//! strategy = "minimax"
//! depth = 3
//!
//! [king_proximity]
//! offset = 7
//! penalty = 20
//! ```

use recon_core::{Move, PieceType, Square};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating an [`AgentConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the agent picks a move once the opening book is used up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Score every legal move one ply deep and keep the best.
    Greedy,
    /// Depth-limited minimax with alpha-beta pruning.
    Minimax {
        depth: u8,
        /// When false, a node stops after its first child unless that child
        /// already produced a cutoff.
        #[serde(default = "default_true")]
        examine_all_siblings: bool,
    },
}

/// Material weight per piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceWeights {
    pub pawn: i32,
    pub knight: i32,
    pub bishop: i32,
    pub rook: i32,
    pub queen: i32,
    pub king: i32,
}

impl PieceWeights {
    /// Weights used by the greedy opening-book bot.
    pub const GREEDY: PieceWeights = PieceWeights {
        pawn: 1,
        knight: 7,
        bishop: 5,
        rook: 3,
        queen: 10,
        king: 100,
    };

    /// Weights used by the minimax zone bot.
    pub const MINIMAX: PieceWeights = PieceWeights {
        pawn: 1,
        knight: 7,
        bishop: 4,
        rook: 2,
        queen: 40,
        king: 500,
    };

    pub const fn get(&self, piece_type: PieceType) -> i32 {
        match piece_type {
            PieceType::Pawn => self.pawn,
            PieceType::Knight => self.knight,
            PieceType::Bishop => self.bishop,
            PieceType::Rook => self.rook,
            PieceType::Queen => self.queen,
            PieceType::King => self.king,
        }
    }
}

impl Default for PieceWeights {
    fn default() -> Self {
        Self::GREEDY
    }
}

/// Penalty for own pieces standing "far" from the own king: any piece whose
/// square index exceeds the king's index by more than `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingProximity {
    pub offset: u8,
    pub penalty: i32,
}

impl Default for KingProximity {
    fn default() -> Self {
        Self {
            offset: 7,
            penalty: 20,
        }
    }
}

/// Sensing policy switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensePolicy {
    /// Periodically sense next to the own king.
    pub enable_king_cadence_sense: bool,
    /// Turn interval for the king sense; turns that are a multiple of it qualify.
    pub king_cadence_period: u32,
}

impl Default for SensePolicy {
    fn default() -> Self {
        Self {
            enable_king_cadence_sense: false,
            king_cadence_period: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    /// Opening moves written from White's side; mirrored when playing Black.
    pub opening: Vec<Move>,
    /// Seed for sensing and fallback move choices. Entropy when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Hard cap on search nodes per move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u64>,
    /// Share of the remaining clock one move search may use.
    pub time_fraction: f64,
    pub search: SearchStrategy,
    pub weights: PieceWeights,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub king_proximity: Option<KingProximity>,
    pub sense: SensePolicy,
}

impl AgentConfig {
    /// Greedy one-ply bot that opens with a knight raid towards e8.
    pub fn greedy() -> Self {
        Self {
            name: "Greedy".to_string(),
            opening: vec![
                Move::new(Square::B1, Square::C3),
                Move::new(Square::C3, Square::B5),
                Move::new(Square::B5, Square::D6),
                Move::new(Square::D6, Square::E8),
            ],
            seed: None,
            max_nodes: None,
            time_fraction: 0.1,
            search: SearchStrategy::Greedy,
            weights: PieceWeights::GREEDY,
            king_proximity: None,
            sense: SensePolicy::default(),
        }
    }

    /// Depth-3 minimax bot that keeps its pieces close to the king.
    pub fn minimax() -> Self {
        Self {
            name: "Minimax".to_string(),
            opening: Vec::new(),
            search: SearchStrategy::Minimax {
                depth: 3,
                examine_all_siblings: true,
            },
            weights: PieceWeights::MINIMAX,
            king_proximity: Some(KingProximity::default()),
            ..Self::greedy()
        }
    }

    /// Parses a TOML document and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let SearchStrategy::Minimax { depth: 0, .. } = self.search {
            return Err(ConfigError::Invalid("minimax depth must be at least 1".into()));
        }
        if !(self.time_fraction > 0.0 && self.time_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "time_fraction must be in (0, 1], got {}",
                self.time_fraction
            )));
        }
        if self.sense.king_cadence_period == 0 {
            return Err(ConfigError::Invalid("king_cadence_period must be positive".into()));
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::greedy()
    }
}

fn default_true() -> bool {
    true
}
