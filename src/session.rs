//! One live puzzle: the single mutable board a front end plays on, plus the
//! solver run that belongs to it.
//!
//! Front ends never touch the board directly. They turn pointer events into
//! [`Command`]s; a command that would break the board is rejected and the
//! board stays where it was.

use std::io;
use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};

use crate::board::{BoardState, PieceId, Placement};
use crate::config::SolverConfig;
use crate::error::{IllegalMove, SolveError};
use crate::moves::{apply_move, axis_lock, check_relocation, Move};
use crate::puzzle::PuzzleDefinition;
use crate::solver::{SolveHandle, Solution, Solver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drag `piece` so its top-left lands on the snapped cell `to`. Diagonal
    /// drags are locked to the dominant axis first.
    Drag { piece: PieceId, to: Placement },
    Step(Move),
    /// Back to the definition's starting layout.
    Reset,
}

/// Solver progress for one session. `Solved` and `Failed` are final.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SolverStatus {
    #[default]
    Idle,
    Solving,
    Solved(Vec<Move>),
    Failed(SolveError),
}

struct PendingSolve {
    results: Receiver<Result<Solution, SolveError>>,
    handle: SolveHandle,
}

pub struct Session {
    definition: Arc<PuzzleDefinition>,
    state: BoardState,
    status: SolverStatus,
    pending: Option<PendingSolve>,
}

impl Session {
    pub fn new(definition: Arc<PuzzleDefinition>) -> Self {
        let state = definition.initial_state();
        Self {
            definition,
            state,
            status: SolverStatus::Idle,
            pending: None,
        }
    }

    pub fn definition(&self) -> &PuzzleDefinition {
        &self.definition
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn is_solved(&self) -> bool {
        self.definition.is_solved(&self.state)
    }

    pub fn status(&self) -> &SolverStatus {
        &self.status
    }

    /// Applies `command` if it keeps the board legal. On error nothing changes.
    pub fn handle(&mut self, command: Command) -> Result<(), IllegalMove> {
        match command {
            Command::Drag { piece, to } => {
                let from = self
                    .state
                    .placement(piece)
                    .ok_or(IllegalMove::UnknownPiece(piece))?;
                let to = axis_lock(from, to);
                if let Err(reason) = check_relocation(&self.state, piece, from, to) {
                    log::trace!("drag of piece {piece} to {to} rejected: {reason}");
                    return Err(reason);
                }
                self.state = self.state.with_placement(piece, to);
            }
            Command::Step(mv) => {
                self.state = apply_move(&self.state, mv)?;
            }
            Command::Reset => {
                self.state = self.definition.initial_state();
            }
        }
        Ok(())
    }

    /// Starts solving the starting layout in the background. Only the first
    /// call per session does anything; later calls return `false`.
    pub fn begin_solve(&mut self, config: SolverConfig) -> io::Result<bool> {
        if self.status != SolverStatus::Idle {
            return Ok(false);
        }

        let (tx, results) = crossbeam_channel::bounded(1);
        let handle = Solver::new(Arc::clone(&self.definition), config).spawn(
            self.definition.initial_state(),
            move |outcome| {
                // receiver gone means the session was dropped
                let _ = tx.send(outcome);
            },
        )?;

        log::debug!("solver status: idle -> solving");
        self.status = SolverStatus::Solving;
        self.pending = Some(PendingSolve { results, handle });
        Ok(true)
    }

    /// Picks up the solver's result if it has arrived.
    pub fn poll_solver(&mut self) -> &SolverStatus {
        let received = match &self.pending {
            Some(pending) => pending.results.try_recv(),
            None => return &self.status,
        };
        match received {
            Ok(outcome) => self.finish(outcome),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.lost_solver(),
        }
        &self.status
    }

    /// Blocks until the solver reports.
    pub fn wait_for_solver(&mut self) -> &SolverStatus {
        let received = match &self.pending {
            Some(pending) => pending.results.recv(),
            None => return &self.status,
        };
        match received {
            Ok(outcome) => self.finish(outcome),
            Err(_) => self.lost_solver(),
        }
        &self.status
    }

    /// Abandons an in-flight search; the session ends up `Failed(Cancelled)`
    /// once the solver notices.
    pub fn cancel_solve(&self) {
        if let Some(pending) = &self.pending {
            pending.handle.cancel();
        }
    }

    /// Steps through the solution from the starting layout, once solved.
    pub fn replay(&self) -> Option<Replay> {
        match &self.status {
            SolverStatus::Solved(moves) => Some(Replay::new(self.definition.initial_state(), moves.clone())),
            _ => None,
        }
    }

    fn finish(&mut self, outcome: Result<Solution, SolveError>) {
        self.pending = None;
        self.status = match outcome {
            Ok(solution) => {
                log::debug!("solver status: solving -> solved ({} moves)", solution.len());
                SolverStatus::Solved(solution.moves)
            }
            Err(err) => {
                log::debug!("solver status: solving -> failed: {err}");
                SolverStatus::Failed(err)
            }
        };
    }

    fn lost_solver(&mut self) {
        log::error!("solver thread exited without reporting a result");
        self.pending = None;
        self.status = SolverStatus::Failed(SolveError::SolverLost);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel_solve();
    }
}

/// Applies a move list one move at a time, yielding the board after each.
///
/// A move that turns out illegal is yielded as an error and ends the replay.
pub struct Replay {
    state: BoardState,
    moves: std::vec::IntoIter<Move>,
}

impl Replay {
    pub fn new(initial: BoardState, moves: Vec<Move>) -> Self {
        Self {
            state: initial,
            moves: moves.into_iter(),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }
}

impl Iterator for Replay {
    type Item = Result<(Move, BoardState), IllegalMove>;

    fn next(&mut self) -> Option<Self::Item> {
        let mv = self.moves.next()?;
        match apply_move(&self.state, mv) {
            Ok(next) => {
                self.state = next;
                Some(Ok((mv, self.state.clone())))
            }
            Err(reason) => {
                self.moves = Vec::new().into_iter();
                Some(Err(reason))
            }
        }
    }
}
