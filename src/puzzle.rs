use std::sync::Arc;

use crate::board::{BoardState, Piece, PieceId, Placement, Shape, COLS, MAX_PIECES, ROWS};
use crate::error::DefinitionError;

/// Immutable description of one puzzle: which pieces exist, where they
/// start, which piece must reach which cell.
///
/// The board itself is always [`ROWS`]×[`COLS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleDefinition {
    shapes: Arc<[Shape]>,
    start: Vec<Placement>,
    goal: PieceId,
    target: Placement,
}

impl PuzzleDefinition {
    /// Builds a definition from `(shape, starting placement)` pairs. Piece ids
    /// are assigned in order, starting at 0.
    pub fn new(
        pieces: &[(Shape, Placement)],
        goal: PieceId,
        target: Placement,
    ) -> Result<Self, DefinitionError> {
        if pieces.is_empty() {
            return Err(DefinitionError::NoPieces);
        }
        if pieces.len() > MAX_PIECES {
            return Err(DefinitionError::TooManyPieces {
                count: pieces.len(),
                max: MAX_PIECES,
            });
        }
        if goal.index() >= pieces.len() {
            return Err(DefinitionError::UnknownGoal(goal));
        }

        let shapes: Arc<[Shape]> = pieces.iter().map(|&(shape, _)| shape).collect();
        let start: Vec<Placement> = pieces.iter().map(|&(_, at)| at).collect();
        let initial = BoardState::from_parts(Arc::clone(&shapes), start.clone());

        for id in initial.piece_ids() {
            initial
                .check_placement(id, start[id.index()])
                .map_err(|reason| DefinitionError::IllegalStart { piece: id, reason })?;
        }

        let goal_shape = shapes[goal.index()];
        let fits = target.row >= 1
            && target.col >= 1
            && u16::from(target.row) + u16::from(goal_shape.rows()) - 1 <= u16::from(ROWS)
            && u16::from(target.col) + u16::from(goal_shape.cols()) - 1 <= u16::from(COLS);
        if !fits {
            return Err(DefinitionError::TargetOutOfBounds { target });
        }

        Ok(Self {
            shapes,
            start,
            goal,
            target,
        })
    }

    /// The classic ten-piece layout: the 2×2 piece starts top centre and has
    /// to reach the bottom centre.
    ///
    /// ```text
    ///  1  0  0  2
    ///  1  0  0  2
    ///  3  5  5  4
    ///  3  7  8  4
    ///  6  .  .  9
    /// ```
    pub fn classic() -> Self {
        use Shape::*;

        let pieces = [
            (Square, Placement::new(1, 2)),
            (Tall, Placement::new(1, 1)),
            (Tall, Placement::new(1, 4)),
            (Tall, Placement::new(3, 1)),
            (Tall, Placement::new(3, 4)),
            (Wide, Placement::new(3, 2)),
            (Single, Placement::new(5, 1)),
            (Single, Placement::new(4, 2)),
            (Single, Placement::new(4, 3)),
            (Single, Placement::new(5, 4)),
        ];
        let shapes: Arc<[Shape]> = pieces.iter().map(|&(shape, _)| shape).collect();

        Self {
            shapes,
            start: pieces.iter().map(|&(_, at)| at).collect(),
            goal: PieceId(0),
            target: Placement::new(4, 2),
        }
    }

    /// The same puzzle, starting from `state` instead.
    pub fn starting_from(&self, state: &BoardState) -> Result<Self, DefinitionError> {
        let pieces: Vec<(Shape, Placement)> = state
            .pieces()
            .filter_map(|piece| Some((piece.shape, state.placement(piece.id)?)))
            .collect();
        Self::new(&pieces, self.goal, self.target)
    }

    pub fn initial_state(&self) -> BoardState {
        BoardState::from_parts(Arc::clone(&self.shapes), self.start.clone())
    }

    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, &shape)| Piece { id: PieceId(i as u8), shape })
    }

    pub fn piece_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn goal(&self) -> PieceId {
        self.goal
    }

    pub fn target(&self) -> Placement {
        self.target
    }

    pub fn is_solved(&self, state: &BoardState) -> bool {
        state.placement(self.goal) == Some(self.target)
    }

    /// Lower bound on the moves left: every move shifts the goal piece by at
    /// most one cell.
    pub fn heuristic(&self, state: &BoardState) -> u32 {
        self.manhattan_distance(state)
    }

    fn manhattan_distance(&self, state: &BoardState) -> u32 {
        state
            .placement(self.goal)
            .map_or(0, |at| at.manhattan_distance(self.target))
    }
}
