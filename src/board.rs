use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use strum::VariantArray;

use crate::error::IllegalMove;

/// Board height in cells.
pub const ROWS: u8 = 5;
/// Board width in cells.
pub const COLS: u8 = 4;

/// Upper bound on the number of pieces a board can hold: one per cell.
pub const MAX_PIECES: usize = ROWS as usize * COLS as usize;

// bits needed for a cell index in 0..ROWS*COLS
const CELL_BITS: u32 = 5;

/// The four piece shapes. Sizes are fixed per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, VariantArray)]
pub enum Shape {
    /// 1×1
    Single,
    /// 1×2, one row high and two columns wide.
    Wide,
    /// 2×1, two rows high and one column wide.
    Tall,
    /// 2×2
    Square,
}

impl Shape {
    pub const fn rows(self) -> u8 {
        match self {
            Shape::Single | Shape::Wide => 1,
            Shape::Tall | Shape::Square => 2,
        }
    }

    pub const fn cols(self) -> u8 {
        match self {
            Shape::Single | Shape::Tall => 1,
            Shape::Wide | Shape::Square => 2,
        }
    }

    pub const fn area(self) -> u8 {
        self.rows() * self.cols()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows(), self.cols())
    }
}

/// Stable identity of a piece; also its index into a [`BoardState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u8);

impl PieceId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub id: PieceId,
    pub shape: Shape,
}

/// A board cell as `(row, col)`, 1-indexed from the top left.
pub type Cell = (u8, u8);

/// Top-left cell of a piece, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Placement {
    pub row: u8,
    pub col: u8,
}

impl Placement {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Shifts by `(rows, cols)`, or `None` if that would underflow the
    /// coordinate type. Bounds are the legality check's business, not this one's.
    pub fn offset_by(self, (rows, cols): (i8, i8)) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(rows)?,
            col: self.col.checked_add_signed(cols)?,
        })
    }

    pub fn manhattan_distance(self, other: Placement) -> u32 {
        u32::from(self.row.abs_diff(other.row)) + u32::from(self.col.abs_diff(other.col))
    }

    // row-major index of an in-bounds cell, 0..ROWS*COLS
    fn cell_index(self) -> u8 {
        self.row
            .saturating_sub(1)
            .saturating_mul(COLS)
            .saturating_add(self.col.saturating_sub(1))
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<Cell> for Placement {
    fn from((row, col): Cell) -> Self {
        Self { row, col }
    }
}

/// Inclusive cell rectangle covered by a shape at a placement.
#[derive(Debug, Clone, Copy)]
struct Footprint {
    top: u16,
    left: u16,
    bottom: u16,
    right: u16,
}

impl Footprint {
    fn of(shape: Shape, at: Placement) -> Self {
        let top = u16::from(at.row);
        let left = u16::from(at.col);
        Self {
            top,
            left,
            bottom: top + u16::from(shape.rows()) - 1,
            right: left + u16::from(shape.cols()) - 1,
        }
    }

    fn in_bounds(&self) -> bool {
        self.top >= 1 && self.left >= 1 && self.bottom <= u16::from(ROWS) && self.right <= u16::from(COLS)
    }

    fn overlaps(&self, other: &Footprint) -> bool {
        self.top <= other.bottom
            && other.top <= self.bottom
            && self.left <= other.right
            && other.left <= self.right
    }
}

/// Opaque, totally ordered encoding of a board configuration.
///
/// Keys are only comparable between states of the same puzzle definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(u128);

fn pack(cells: impl IntoIterator<Item = u8>) -> CanonicalKey {
    CanonicalKey(
        cells
            .into_iter()
            .fold(0u128, |acc, cell| (acc << CELL_BITS) | u128::from(cell)),
    )
}

/// Placements of every piece of one puzzle at one instant.
///
/// Shapes are shared with the definition the state came from and never change;
/// only placements vary between states.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardState {
    shapes: Arc<[Shape]>,
    placements: Vec<Placement>,
}

impl BoardState {
    pub(crate) fn from_parts(shapes: Arc<[Shape]>, placements: Vec<Placement>) -> Self {
        debug_assert_eq!(shapes.len(), placements.len());
        Self { shapes, placements }
    }

    /// Number of pieces on the board.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn piece_ids(&self) -> impl Iterator<Item = PieceId> {
        (0..self.placements.len() as u8).map(PieceId)
    }

    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, &shape)| Piece { id: PieceId(i as u8), shape })
    }

    pub fn shape(&self, id: PieceId) -> Option<Shape> {
        self.shapes.get(id.index()).copied()
    }

    pub fn placement(&self, id: PieceId) -> Option<Placement> {
        self.placements.get(id.index()).copied()
    }

    /// A copy of this state with `id` moved to `to`. Unchecked.
    pub(crate) fn with_placement(&self, id: PieceId, to: Placement) -> Self {
        let mut next = self.clone();
        next.placements[id.index()] = to;
        next
    }

    /// Cells covered by piece `id` at its current placement.
    pub fn occupied_cells(&self, id: PieceId) -> BTreeSet<Cell> {
        match (self.shape(id), self.placement(id)) {
            (Some(shape), Some(at)) => cells_of(shape, at).collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Whether `id` could sit at `candidate` with every other piece where it is now.
    pub fn is_legal(&self, id: PieceId, candidate: Placement) -> bool {
        self.check_placement(id, candidate).is_ok()
    }

    /// The one bounds and overlap test. Every legality decision in the crate,
    /// discrete or drag-driven, goes through here.
    pub fn check_placement(&self, id: PieceId, candidate: Placement) -> Result<(), IllegalMove> {
        let shape = self.shape(id).ok_or(IllegalMove::UnknownPiece(id))?;
        let footprint = Footprint::of(shape, candidate);
        if !footprint.in_bounds() {
            return Err(IllegalMove::OutOfBounds { at: candidate });
        }

        let blocker = self
            .shapes
            .iter()
            .zip(&self.placements)
            .enumerate()
            .filter(|&(other, _)| other != id.index())
            .find(|&(_, (&shape, &at))| Footprint::of(shape, at).overlaps(&footprint));

        match blocker {
            Some((other, _)) => Err(IllegalMove::Blocked {
                at: candidate,
                by: PieceId(other as u8),
            }),
            None => Ok(()),
        }
    }

    /// Placements of all pieces in id order. Equal keys mean equal states.
    pub fn canonical_key(&self) -> CanonicalKey {
        pack(self.placements.iter().map(|p| p.cell_index()))
    }

    /// Like [`canonical_key`](Self::canonical_key), but pieces other than
    /// `goal` are only told apart by shape: swapping two same-shape pieces
    /// yields the same key.
    pub fn interchangeable_key(&self, goal: PieceId) -> CanonicalKey {
        let mut rest: Vec<(Shape, u8)> = self
            .shapes
            .iter()
            .zip(&self.placements)
            .enumerate()
            .filter(|&(i, _)| i != goal.index())
            .map(|(_, (&shape, at))| (shape, at.cell_index()))
            .collect();
        rest.sort_unstable();

        let goal_cell = self.placement(goal).map(|p| p.cell_index()).unwrap_or(0);
        pack(std::iter::once(goal_cell).chain(rest.into_iter().map(|(_, cell)| cell)))
    }

    /// Row-major occupancy grid, indexed `[row - 1][col - 1]`.
    pub fn grid(&self) -> [[Option<PieceId>; COLS as usize]; ROWS as usize] {
        let mut grid = [[None; COLS as usize]; ROWS as usize];
        for piece in self.pieces() {
            for (row, col) in self.occupied_cells(piece.id) {
                if let Some(slot) = grid
                    .get_mut(usize::from(row).wrapping_sub(1))
                    .and_then(|r| r.get_mut(usize::from(col).wrapping_sub(1)))
                {
                    *slot = Some(piece.id);
                }
            }
        }
        grid
    }

    /// True when every footprint is on the board and no two overlap.
    pub fn is_consistent(&self) -> bool {
        self.piece_ids().all(|id| {
            self.placement(id)
                .is_some_and(|at| self.is_legal(id, at))
        })
    }
}

fn cells_of(shape: Shape, at: Placement) -> impl Iterator<Item = Cell> {
    (0..shape.rows()).flat_map(move |dr| {
        (0..shape.cols()).map(move |dc| (at.row.saturating_add(dr), at.col.saturating_add(dc)))
    })
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.grid() {
            for cell in row {
                match cell {
                    Some(id) => write!(f, "{:2} ", id.0)?,
                    None => write!(f, " . ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(pieces: &[(Shape, (u8, u8))]) -> BoardState {
        let shapes: Arc<[Shape]> = pieces.iter().map(|&(s, _)| s).collect();
        let placements = pieces.iter().map(|&(_, p)| Placement::from(p)).collect();
        BoardState::from_parts(shapes, placements)
    }

    #[test]
    fn shape_sizes() {
        let sizes: Vec<(u8, u8)> = Shape::VARIANTS.iter().map(|s| (s.rows(), s.cols())).collect();
        assert_eq!(sizes, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
        assert_eq!(Shape::Square.area(), 4);
        assert_eq!(Shape::Tall.to_string(), "2x1");
    }

    #[test]
    fn tall_piece_footprint() {
        let s = state(&[(Shape::Tall, (1, 1))]);
        assert_eq!(s.occupied_cells(PieceId(0)), BTreeSet::from([(1, 1), (2, 1)]));
    }

    #[test]
    fn candidate_checks_its_own_cells_only() {
        // tall piece at (1,1); single at (3,2) is below the candidate's cells
        let s = state(&[(Shape::Tall, (1, 1)), (Shape::Single, (3, 2))]);
        assert!(s.is_legal(PieceId(0), Placement::new(1, 2)));

        let s = state(&[(Shape::Tall, (1, 1)), (Shape::Single, (2, 2))]);
        assert_eq!(
            s.check_placement(PieceId(0), Placement::new(1, 2)),
            Err(IllegalMove::Blocked { at: Placement::new(1, 2), by: PieceId(1) })
        );
    }

    #[test]
    fn piece_does_not_block_itself() {
        let s = state(&[(Shape::Square, (1, 1))]);
        assert!(s.is_legal(PieceId(0), Placement::new(2, 2)));
    }

    #[test]
    fn bounds() {
        let s = state(&[(Shape::Square, (1, 1))]);
        assert!(s.is_legal(PieceId(0), Placement::new(4, 3)));
        for bad in [(5, 1), (1, 4), (0, 1), (1, 0)] {
            assert_eq!(
                s.check_placement(PieceId(0), Placement::from(bad)),
                Err(IllegalMove::OutOfBounds { at: Placement::from(bad) })
            );
        }
    }

    #[test]
    fn unknown_piece() {
        let s = state(&[(Shape::Single, (1, 1))]);
        assert_eq!(
            s.check_placement(PieceId(3), Placement::new(1, 1)),
            Err(IllegalMove::UnknownPiece(PieceId(3)))
        );
    }

    #[test]
    fn offset_underflow() {
        assert_eq!(Placement::new(1, 1).offset_by((-1, 0)), Some(Placement::new(0, 1)));
        assert_eq!(Placement::new(0, 1).offset_by((-1, 0)), None);
    }

    #[test]
    fn canonical_key_tracks_every_placement() {
        let a = state(&[(Shape::Single, (1, 1)), (Shape::Single, (1, 2))]);
        let b = state(&[(Shape::Single, (1, 1)), (Shape::Single, (1, 2))]);
        let swapped = state(&[(Shape::Single, (1, 2)), (Shape::Single, (1, 1))]);
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_ne!(a.canonical_key(), swapped.canonical_key());
        assert_ne!(
            a.canonical_key(),
            a.with_placement(PieceId(1), Placement::new(5, 4)).canonical_key()
        );
    }

    #[test]
    fn interchangeable_key_ignores_same_shape_swaps() {
        let goal = PieceId(0);
        let a = state(&[
            (Shape::Square, (1, 1)),
            (Shape::Single, (3, 1)),
            (Shape::Single, (3, 2)),
        ]);
        let swapped = state(&[
            (Shape::Square, (1, 1)),
            (Shape::Single, (3, 2)),
            (Shape::Single, (3, 1)),
        ]);
        assert_eq!(a.interchangeable_key(goal), swapped.interchangeable_key(goal));
        assert_ne!(a.canonical_key(), swapped.canonical_key());

        let moved_goal = a.with_placement(goal, Placement::new(1, 3));
        assert_ne!(a.interchangeable_key(goal), moved_goal.interchangeable_key(goal));
    }

    #[test]
    fn display_grid() {
        let s = state(&[(Shape::Wide, (1, 1)), (Shape::Tall, (2, 4))]);
        let lines: Vec<String> = s.to_string().lines().map(|l| l.trim_end().to_string()).collect();
        assert_eq!(lines[0], " 0  0  .  .");
        assert_eq!(lines[1], " .  .  .  1");
        assert_eq!(lines[2], " .  .  .  1");
        assert_eq!(lines.len(), ROWS as usize);
    }
}
