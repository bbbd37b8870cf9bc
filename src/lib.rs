//! Sliding-block puzzle engine: a 5×4 board of 1×1, 1×2, 2×1 and 2×2 pieces,
//! legality checks for discrete moves and drags, and an A* solver.

pub mod board;
pub mod config;
pub mod error;
pub mod moves;
pub mod puzzle;
pub mod session;
pub mod solver;

pub use board::{BoardState, CanonicalKey, Cell, Piece, PieceId, Placement, Shape, COLS, ROWS};
pub use config::{Dedupe, SolverConfig};
pub use error::{ConfigError, DefinitionError, IllegalMove, SolveError};
pub use moves::{
    apply_move, axis_lock, check_relocation, legal_single_step_moves, random_walk, try_move,
    validate_relocation, Direction, Move,
};
pub use puzzle::PuzzleDefinition;
pub use session::{Command, Replay, Session, SolverStatus};
pub use solver::{solve, CancelToken, SolveHandle, SolveStats, Solution, Solver};
