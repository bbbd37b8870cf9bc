use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use strum::VariantArray;

use crate::board::{BoardState, PieceId, Placement};
use crate::error::IllegalMove;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, VariantArray)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// `(rows, cols)` shift of one step.
    pub fn as_offset(&self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
            Direction::Right => (0, 1),
        }
    }

    /// Direction and number of steps of a straight line from `from` to `to`.
    /// `None` if the two differ on both axes or not at all.
    pub fn between(from: Placement, to: Placement) -> Option<(Self, u8)> {
        match (from.row == to.row, from.col == to.col) {
            (true, false) if to.col > from.col => Some((Direction::Right, to.col - from.col)),
            (true, false) => Some((Direction::Left, from.col - to.col)),
            (false, true) if to.row > from.row => Some((Direction::Down, to.row - from.row)),
            (false, true) => Some((Direction::Up, from.row - to.row)),
            _ => None,
        }
    }

    /// The placements `1..=steps` cells from `from` towards `self`, in order.
    /// `steps` must not carry the walk below row or column 0.
    fn walk(self, from: Placement, steps: u8) -> impl Iterator<Item = Placement> {
        (1..=steps).map(move |step| match self {
            Direction::Up => Placement::new(from.row - step, from.col),
            Direction::Left => Placement::new(from.row, from.col - step),
            Direction::Down => Placement::new(from.row + step, from.col),
            Direction::Right => Placement::new(from.row, from.col + step),
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Direction::Up => "Up",
            Direction::Left => "Left",
            Direction::Down => "Down",
            Direction::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// A proposed new placement for one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub piece: PieceId,
    pub to: Placement,
}

impl Move {
    pub const fn new(piece: PieceId, to: Placement) -> Self {
        Self { piece, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece {} -> {}", self.piece, self.to)
    }
}

/// Every legal one-cell move of every piece, pieces in id order and
/// directions in [`Direction::VARIANTS`] order.
pub fn legal_single_step_moves(state: &BoardState) -> Vec<Move> {
    let mut moves = Vec::new();
    for id in state.piece_ids() {
        let Some(at) = state.placement(id) else {
            continue;
        };
        for dir in Direction::VARIANTS {
            if let Some(to) = at.offset_by(dir.as_offset()) {
                if state.is_legal(id, to) {
                    moves.push(Move::new(id, to));
                }
            }
        }
    }
    moves
}

/// The state after sliding `piece` one cell towards `dir`, if that is legal.
pub fn try_move(state: &BoardState, piece: PieceId, dir: Direction) -> Option<BoardState> {
    let to = state.placement(piece)?.offset_by(dir.as_offset())?;
    state
        .is_legal(piece, to)
        .then(|| state.with_placement(piece, to))
}

/// Checks a straight-line relocation one cell at a time, so a piece can never
/// hop over another piece to reach an empty destination.
pub fn check_relocation(
    state: &BoardState,
    piece: PieceId,
    from: Placement,
    to: Placement,
) -> Result<(), IllegalMove> {
    let actual = state.placement(piece).ok_or(IllegalMove::UnknownPiece(piece))?;
    if actual != from {
        return Err(IllegalMove::StaleOrigin {
            piece,
            claimed: from,
            actual,
        });
    }
    if from == to {
        return Ok(());
    }

    let (dir, distance) = Direction::between(from, to).ok_or(IllegalMove::NotStraight { from, to })?;
    // every cell on the way is checked, the first offending one is reported
    for at in dir.walk(from, distance) {
        state.check_placement(piece, at)?;
    }
    Ok(())
}

/// Boolean form of [`check_relocation`]. Rejections are logged at trace level.
pub fn validate_relocation(state: &BoardState, piece: PieceId, from: Placement, to: Placement) -> bool {
    match check_relocation(state, piece, from, to) {
        Ok(()) => true,
        Err(reason) => {
            log::trace!("rejected relocation of piece {piece} from {from} to {to}: {reason}");
            false
        }
    }
}

/// Resolves a snapped drag target to a single axis: whichever of the row or
/// column displacement is larger wins, the other is reset to `from`.
/// Equal displacements resolve to the row axis.
pub fn axis_lock(from: Placement, to: Placement) -> Placement {
    if from.col.abs_diff(to.col) > from.row.abs_diff(to.row) {
        Placement::new(from.row, to.col)
    } else {
        Placement::new(to.row, from.col)
    }
}

/// Applies `mv` as a straight relocation from the piece's current placement.
pub fn apply_move(state: &BoardState, mv: Move) -> Result<BoardState, IllegalMove> {
    let from = state.placement(mv.piece).ok_or(IllegalMove::UnknownPiece(mv.piece))?;
    check_relocation(state, mv.piece, from, mv.to)?;
    Ok(state.with_placement(mv.piece, mv.to))
}

/// Takes up to `steps` uniformly chosen legal single-step moves from `state`.
pub fn random_walk<R: Rng + ?Sized>(state: &BoardState, steps: usize, rng: &mut R) -> BoardState {
    let mut current = state.clone();
    for _ in 0..steps {
        let Some(&mv) = legal_single_step_moves(&current).choose(rng) else {
            break;
        };
        current = current.with_placement(mv.piece, mv.to);
    }
    current
}
