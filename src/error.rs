//! Error types for the puzzle engine.
//!
//! None of these are fatal: every operation that can fail hands back one of
//! these as an ordinary value and leaves the board untouched.

use crate::board::{PieceId, Placement};
use crate::solver::SolveStats;

/// A requested placement or relocation that would break the board invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMove {
    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),

    /// The drag started somewhere other than where the piece currently sits.
    #[error("piece {piece} is at {actual}, not {claimed}")]
    StaleOrigin {
        piece: PieceId,
        claimed: Placement,
        actual: Placement,
    },

    #[error("relocation from {from} to {to} is not along a single axis")]
    NotStraight { from: Placement, to: Placement },

    #[error("placement {at} leaves the board")]
    OutOfBounds { at: Placement },

    #[error("placement {at} overlaps piece {by}")]
    Blocked { at: Placement, by: PieceId },
}

/// Why a search ended without a solution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    /// Every reachable state was explored. The puzzle is unsolvable as defined.
    #[error("search exhausted without reaching the goal ({stats})")]
    Exhausted { stats: SolveStats },

    #[error("expansion budget of {budget} reached before the goal ({stats})")]
    BudgetExceeded { budget: usize, stats: SolveStats },

    #[error("search cancelled ({stats})")]
    Cancelled { stats: SolveStats },

    /// The background search thread ended without delivering a result.
    #[error("solver thread exited without reporting a result")]
    SolverLost,
}

impl SolveError {
    pub fn stats(&self) -> SolveStats {
        match self {
            SolveError::Exhausted { stats }
            | SolveError::BudgetExceeded { stats, .. }
            | SolveError::Cancelled { stats } => *stats,
            SolveError::SolverLost => SolveStats::default(),
        }
    }
}

/// A puzzle definition that cannot describe a playable board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("a puzzle needs at least one piece")]
    NoPieces,

    #[error("{count} pieces exceed the supported maximum of {max}")]
    TooManyPieces { count: usize, max: usize },

    #[error("goal piece {0} is not part of the puzzle")]
    UnknownGoal(PieceId),

    #[error("starting placement of piece {piece} is illegal: {reason}")]
    IllegalStart { piece: PieceId, reason: IllegalMove },

    #[error("target {target} does not fit the goal piece on the board")]
    TargetOutOfBounds { target: Placement },
}

/// Malformed configuration override.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}
