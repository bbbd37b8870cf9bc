//! A* solution lengths checked against plain breadth-first search, plus
//! replay, determinism and background-run behaviour.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use klotski::{
    apply_move, legal_single_step_moves, solve, BoardState, CanonicalKey, Dedupe, Move, PieceId, Placement,
    PuzzleDefinition, Session, Shape, SolveError, Solver, SolverConfig, SolverStatus,
};

/// Fewest single-step moves to the goal, by exhaustive BFS.
fn bfs_distance(def: &PuzzleDefinition, key: impl Fn(&BoardState) -> CanonicalKey) -> Option<usize> {
    let start = def.initial_state();
    let mut seen = HashSet::from([key(&start)]);
    let mut queue = VecDeque::from([(start, 0usize)]);

    while let Some((state, depth)) = queue.pop_front() {
        if def.is_solved(&state) {
            return Some(depth);
        }
        for mv in legal_single_step_moves(&state) {
            let next = apply_move(&state, mv).unwrap();
            if seen.insert(key(&next)) {
                queue.push_back((next, depth + 1));
            }
        }
    }
    None
}

fn replay_single_steps(def: &PuzzleDefinition, moves: &[Move]) -> BoardState {
    let mut state = def.initial_state();
    for mv in moves {
        assert!(
            legal_single_step_moves(&state).contains(mv),
            "{mv} is not a legal single step from\n{state}"
        );
        state = apply_move(&state, *mv).unwrap();
        assert!(state.is_consistent());
    }
    state
}

fn config(dedupe: Dedupe) -> SolverConfig {
    SolverConfig {
        dedupe,
        ..SolverConfig::default()
    }
}

fn reduced_boards() -> Vec<PuzzleDefinition> {
    use Shape::*;

    vec![
        PuzzleDefinition::new(
            &[
                (Square, Placement::new(1, 1)),
                (Tall, Placement::new(1, 3)),
                (Single, Placement::new(1, 4)),
                (Wide, Placement::new(3, 3)),
                (Single, Placement::new(5, 1)),
            ],
            PieceId(0),
            Placement::new(4, 2),
        )
        .unwrap(),
        PuzzleDefinition::new(
            &[
                (Square, Placement::new(1, 2)),
                (Tall, Placement::new(1, 1)),
                (Tall, Placement::new(1, 4)),
                (Wide, Placement::new(3, 2)),
                (Single, Placement::new(4, 2)),
                (Single, Placement::new(4, 3)),
            ],
            PieceId(0),
            Placement::new(4, 2),
        )
        .unwrap(),
        PuzzleDefinition::new(
            &[
                (Single, Placement::new(1, 1)),
                (Wide, Placement::new(2, 1)),
                (Tall, Placement::new(1, 3)),
                (Single, Placement::new(3, 2)),
            ],
            PieceId(0),
            Placement::new(5, 4),
        )
        .unwrap(),
    ]
}

#[test]
fn reduced_boards_match_breadth_first_search() {
    for def in reduced_boards() {
        let expected = bfs_distance(&def, |s| s.canonical_key()).expect("reduced board is solvable");

        for dedupe in [Dedupe::Exact, Dedupe::Interchangeable] {
            let solution = Solver::new(Arc::new(def.clone()), config(dedupe))
                .solve(&def.initial_state())
                .unwrap();
            assert_eq!(solution.len(), expected, "{dedupe:?} dedupe on\n{}", def.initial_state());
            assert!(def.is_solved(&replay_single_steps(&def, &solution.moves)));
        }
    }
}

/// Fewest single-step moves for the classic layout.
const CLASSIC_SOLUTION_LEN: usize = 116;

#[test]
fn default_solve_finds_classic_reference_length() {
    let def = PuzzleDefinition::classic();
    let solution = solve(&def, &def.initial_state()).unwrap();
    assert_eq!(solution.len(), CLASSIC_SOLUTION_LEN);
    assert!(def.is_solved(&replay_single_steps(&def, &solution.moves)));
}

#[test]
fn default_solve_on_reduced_board_is_optimal() {
    let def = &reduced_boards()[0];
    let solution = solve(def, &def.initial_state()).unwrap();
    assert_eq!(Some(solution.len()), bfs_distance(def, |s| s.canonical_key()));
}

#[test]
fn classic_board_is_solved_optimally() {
    let def = PuzzleDefinition::classic();
    let goal = def.goal();
    let solver = Solver::new(Arc::new(def.clone()), config(Dedupe::Interchangeable));
    let solution = solver.solve(&def.initial_state()).unwrap();

    let end = replay_single_steps(&def, &solution.moves);
    assert!(def.is_solved(&end));
    assert_eq!(end.placement(goal), Some(Placement::new(4, 2)));

    let expected = bfs_distance(&def, |s| s.interchangeable_key(goal)).unwrap();
    assert_eq!(solution.len(), expected);
    assert_eq!(expected, CLASSIC_SOLUTION_LEN);
}

#[test]
fn classic_solutions_are_reproducible() {
    let def = PuzzleDefinition::classic();
    let solver = Solver::new(Arc::new(def.clone()), config(Dedupe::Interchangeable));
    let first = solver.solve(&def.initial_state()).unwrap();
    let second = solver.solve(&def.initial_state()).unwrap();
    assert_eq!(first.len(), second.len());
    assert_eq!(first.moves, second.moves);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn low_budget_is_distinct_from_exhaustion() {
    let def = PuzzleDefinition::classic();
    let config = SolverConfig {
        max_expansions: 100,
        dedupe: Dedupe::Interchangeable,
    };
    let err = Solver::new(Arc::new(def.clone()), config)
        .solve(&def.initial_state())
        .unwrap_err();
    assert!(matches!(err, SolveError::BudgetExceeded { budget: 100, .. }));
    assert_eq!(err.stats().expanded, 100);
}

#[test]
fn session_solves_classic_in_background() {
    let mut session = Session::new(Arc::new(PuzzleDefinition::classic()));
    assert!(session.begin_solve(SolverConfig::default()).unwrap());

    let moves = match session.wait_for_solver() {
        SolverStatus::Solved(moves) => moves.clone(),
        other => panic!("classic puzzle should solve, got {other:?}"),
    };

    let mut last = None;
    for frame in session.replay().unwrap() {
        let (_, state) = frame.unwrap();
        last = Some(state);
    }
    assert!(session.definition().is_solved(&last.unwrap()));
    assert_eq!(moves.len(), CLASSIC_SOLUTION_LEN);
}

#[test]
fn session_search_can_be_cancelled() {
    let mut session = Session::new(Arc::new(PuzzleDefinition::classic()));
    let config = SolverConfig {
        max_expansions: usize::MAX,
        dedupe: Dedupe::Exact,
    };
    session.begin_solve(config).unwrap();
    session.cancel_solve();
    assert!(matches!(
        session.wait_for_solver(),
        SolverStatus::Failed(SolveError::Cancelled { .. })
    ));
}
