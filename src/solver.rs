//! A* search over board states.
//!
//! Edges are single legal one-cell moves of cost 1; the heuristic is the
//! Manhattan distance of the goal piece to its target, which is consistent,
//! so the first goal state popped is reached in the fewest moves.
//!
//! Nodes with equal `g + h` are expanded in the order they were queued.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread;

use crate::board::{BoardState, CanonicalKey};
use crate::config::{Dedupe, SolverConfig};
use crate::error::SolveError;
use crate::moves::{legal_single_step_moves, Move};
use crate::puzzle::PuzzleDefinition;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// States popped from the frontier and expanded.
    pub expanded: usize,
    /// States queued, the initial one included.
    pub generated: usize,
}

impl fmt::Display for SolveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} expanded, {} generated", self.expanded, self.generated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Single-step moves from the initial state to the goal, in order.
    pub moves: Vec<Move>,
    pub stats: SolveStats,
}

impl Solution {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Shared flag for abandoning a search in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

struct SearchNode {
    state: BoardState,
    key: CanonicalKey,
    moves: Vec<Move>,
    g: u32,
}

struct Queued {
    priority: u32,
    seq: u64,
    node: SearchNode,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // BinaryHeap is a max-heap: reverse so the lowest priority, then the
    // earliest seq, comes out first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Runs searches for one puzzle definition.
#[derive(Debug, Clone)]
pub struct Solver {
    definition: Arc<PuzzleDefinition>,
    config: SolverConfig,
    cancel: CancelToken,
}

impl Solver {
    pub fn new(definition: Arc<PuzzleDefinition>, config: SolverConfig) -> Self {
        Self {
            definition,
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn key_of(&self, state: &BoardState) -> CanonicalKey {
        match self.config.dedupe {
            Dedupe::Exact => state.canonical_key(),
            Dedupe::Interchangeable => state.interchangeable_key(self.definition.goal()),
        }
    }

    /// Finds a shortest move sequence from `initial` to the goal.
    pub fn solve(&self, initial: &BoardState) -> Result<Solution, SolveError> {
        let definition = &self.definition;
        let mut stats = SolveStats::default();

        log::info!(
            "solving: goal piece {} to {}, budget {} expansions, {:?} dedupe",
            definition.goal(),
            definition.target(),
            self.config.max_expansions,
            self.config.dedupe
        );

        // best g seen for each key; a key is only queued again on a strictly shorter path
        let mut best_g: HashMap<CanonicalKey, u32> = HashMap::new();
        let mut frontier = BinaryHeap::new();
        let mut seq = 0u64;

        let key = self.key_of(initial);
        best_g.insert(key, 0);
        frontier.push(Queued {
            priority: definition.heuristic(initial),
            seq,
            node: SearchNode {
                state: initial.clone(),
                key,
                moves: Vec::new(),
                g: 0,
            },
        });
        seq += 1;
        stats.generated += 1;

        while let Some(Queued { node, .. }) = frontier.pop() {
            if best_g.get(&node.key).is_some_and(|&best| node.g > best) {
                continue;
            }
            if self.cancel.is_cancelled() {
                log::debug!("search cancelled after {} expansions", stats.expanded);
                return Err(SolveError::Cancelled { stats });
            }
            if definition.is_solved(&node.state) {
                log::info!("solved in {} moves ({stats})", node.moves.len());
                return Ok(Solution {
                    moves: node.moves,
                    stats,
                });
            }
            if stats.expanded >= self.config.max_expansions {
                log::warn!(
                    "expansion budget of {} exhausted with {} states still queued",
                    self.config.max_expansions,
                    frontier.len() + 1
                );
                return Err(SolveError::BudgetExceeded {
                    budget: self.config.max_expansions,
                    stats,
                });
            }
            stats.expanded += 1;

            let g = node.g + 1;
            for mv in legal_single_step_moves(&node.state) {
                let next = node.state.with_placement(mv.piece, mv.to);
                let key = self.key_of(&next);
                if best_g.get(&key).is_some_and(|&seen| seen <= g) {
                    continue;
                }
                best_g.insert(key, g);

                let mut moves = Vec::with_capacity(node.moves.len() + 1);
                moves.extend_from_slice(&node.moves);
                moves.push(mv);

                frontier.push(Queued {
                    priority: g + definition.heuristic(&next),
                    seq,
                    node: SearchNode {
                        state: next,
                        key,
                        moves,
                        g,
                    },
                });
                seq += 1;
                stats.generated += 1;
            }
        }

        log::error!(
            "no solution: all {} reachable states explored; the puzzle definition is unsolvable",
            stats.expanded
        );
        Err(SolveError::Exhausted { stats })
    }

    /// Runs [`solve`](Self::solve) on a background thread and hands the
    /// outcome to `on_done` from that thread.
    pub fn spawn<F>(self, initial: BoardState, on_done: F) -> io::Result<SolveHandle>
    where
        F: FnOnce(Result<Solution, SolveError>) + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let thread = thread::Builder::new()
            .name("klotski-solver".into())
            .spawn(move || on_done(self.solve(&initial)))?;
        Ok(SolveHandle { cancel, thread })
    }
}

/// Solves `initial` with the default configuration.
pub fn solve(definition: &PuzzleDefinition, initial: &BoardState) -> Result<Solution, SolveError> {
    Solver::new(Arc::new(definition.clone()), SolverConfig::default()).solve(initial)
}

/// A search running on its own thread.
#[derive(Debug)]
pub struct SolveHandle {
    cancel: CancelToken,
    thread: thread::JoinHandle<()>,
}

impl SolveHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the search and its callback to finish.
    pub fn join(self) -> thread::Result<()> {
        self.thread.join()
    }
}
