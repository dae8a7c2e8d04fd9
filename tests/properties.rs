use fifteen_solver::{
    scramble, solve, solve_staged, AStar, Bfs, Board, Error, Heuristic, Iddfs, Policy, Pos,
    Strategy, TargetSet, BLANK, CELLS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const PRESETS: [usize; 6] = [1, 2, 4, 5, 6, 7];

/// The solved board with the blank swapped to every cell in turn.
fn blank_everywhere() -> Vec<Board> {
    (0..CELLS)
        .map(|idx| {
            let mut cells = [0; CELLS];
            for (cell, value) in cells.iter_mut().zip(1..) {
                *cell = value;
            }
            cells.swap(idx, CELLS - 1);
            Board::from_cells(cells).unwrap()
        })
        .collect()
}

fn scrambled(moves: usize, seed: u64) -> Board {
    let mut rng = StdRng::seed_from_u64(seed);
    scramble(&Board::solved(), moves, &mut rng)
        .into_iter()
        .try_fold(Board::solved(), |board, action| board.apply(action))
        .unwrap()
}

fn replay(board: &Board, actions: &[Pos]) -> Board {
    actions
        .iter()
        .try_fold(*board, |board, &action| board.apply(action))
        .unwrap()
}

#[test]
fn legal_actions_surround_the_blank() {
    for board in blank_everywhere() {
        let blank = board.blank();
        assert_eq!(board[blank], BLANK);

        let actions = board.legal_actions();
        let on_row_edge = blank.0 == 0 || blank.0 == 3;
        let on_col_edge = blank.1 == 0 || blank.1 == 3;
        let expected = match (on_row_edge, on_col_edge) {
            (true, true) => 2,
            (true, false) | (false, true) => 3,
            (false, false) => 4,
        };
        assert_eq!(actions.len(), expected, "blank at {blank}");
        for action in actions {
            assert!(action.is_in_bounds());
            assert!(action.is_adjacent(blank));
        }
    }
}

#[test]
fn apply_is_involutive() {
    for board in blank_everywhere() {
        for action in board.legal_actions() {
            let next = board.apply(action).unwrap();
            assert_ne!(next, board);
            assert_eq!(next.blank(), action);
            assert_eq!(next[board.blank()], board[action]);
            assert_eq!(next.apply(board.blank()).unwrap(), board);
        }
    }
}

#[test]
fn apply_rejects_far_cells() {
    let board = Board::solved();
    for action in [Pos(0, 0), Pos(3, 3), Pos(2, 2), Pos(4, 3), Pos(3, 4)] {
        assert_eq!(
            board.apply(action),
            Err(Error::IllegalAction {
                action,
                blank: Pos(3, 3),
            })
        );
    }
}

#[test]
fn heuristic_is_bounded_and_consistent() {
    for seed in 0..20 {
        let board = scrambled(60, seed);
        for n in PRESETS {
            let policy = Policy::breaks(n).unwrap();
            for &targets in policy.stages() {
                let h = board.heuristic(targets);
                assert!(h as usize <= 6 * targets.len());
                assert_eq!(h == 0, board.is_partial_goal(targets));
                for action in board.legal_actions() {
                    let next = board.apply(action).unwrap();
                    assert!(next.heuristic(targets).abs_diff(h) <= 1);
                }
            }
        }
    }
    assert_eq!(Board::solved().heuristic(TargetSet::FULL), 0);
}

#[test]
fn blank_never_counts_toward_the_estimate() {
    let board =
        Board::from_rows([[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 14, 16, 15]])
            .unwrap();
    let blank_only = TargetSet::from_values([BLANK]).unwrap();
    let with_blank = TargetSet::from_values([1, 2, BLANK]).unwrap();
    let without_blank = TargetSet::from_values([1, 2]).unwrap();

    for heuristic in Heuristic::ALL {
        assert_eq!(heuristic.estimate(&board, blank_only), 0, "{heuristic:?}");
        assert_eq!(
            heuristic.estimate(&board, with_blank),
            heuristic.estimate(&board, without_blank),
            "{heuristic:?}"
        );
    }
    // Zero estimate, yet the blank is off its cell.
    assert!(!board.is_partial_goal(blank_only));
    assert!(board.is_partial_goal(without_blank));
    assert!(!board.is_partial_goal(with_blank));

    let policy = Policy::new(vec![with_blank, TargetSet::FULL]).unwrap();
    assert_eq!(solve(&board, &policy), Ok(vec![Pos(3, 3)]));
    let policy = Policy::new(vec![blank_only, TargetSet::FULL]).unwrap();
    let solution = solve_staged(&AStar::default(), &board, &policy, || {})
        .unwrap();
    assert_eq!(solution.stages[0].actions, [Pos(3, 3)]);
    assert!(solution.stages[1].actions.is_empty());
    assert!(solution.board.is_solved());
}

#[test]
fn documented_examples() {
    let cases = [
        (
            [[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 14, 16, 15]],
            vec![Pos(3, 3)],
        ),
        (
            [[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 16, 14, 15]],
            vec![Pos(3, 2), Pos(3, 3)],
        ),
        (
            [[1, 2, 3, 4], [5, 6, 7, 16], [9, 10, 11, 8], [13, 14, 15, 12]],
            vec![Pos(2, 3), Pos(3, 3)],
        ),
    ];
    for (rows, expected) in cases {
        let board = Board::from_rows(rows).unwrap();
        for n in PRESETS {
            let actions = solve(&board, &Policy::breaks(n).unwrap()).unwrap();
            assert_eq!(actions, expected, "{n} stages on\n{board}");
            assert!(replay(&board, &actions).is_solved());
        }
    }
}

#[test]
fn solved_board_needs_no_moves() {
    for n in PRESETS {
        let policy = Policy::breaks(n).unwrap();
        assert_eq!(solve(&Board::solved(), &policy), Ok(vec![]));
    }
}

#[test]
fn unsolvable_boards_fail_fast() {
    let board =
        Board::from_rows([[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 15, 14, 16]])
            .unwrap();
    assert!(!board.is_solvable());
    assert_eq!(
        solve(&board, &Policy::breaks(7).unwrap()),
        Err(Error::UnsolvableConfiguration)
    );
    assert_eq!(
        solve_staged(&Bfs, &board, &Policy::single(), || {}),
        Err(Error::UnsolvableConfiguration)
    );
}

#[test]
fn random_walks_always_solve() {
    let policies = [7, 5, 4].map(|n| Policy::breaks(n).unwrap());
    for moves in (0..=80).step_by(10) {
        for seed in 0..3 {
            let board = scrambled(moves, seed);
            for policy in &policies {
                let solution = solve_staged(&AStar::default(), &board, policy, || {})
                    .unwrap();
                assert!(solution.board.is_solved());
                assert_eq!(replay(&board, &solution.actions), solution.board);
            }
        }
    }
}

#[test]
fn stages_keep_earlier_tiles_in_place() {
    let policy = Policy::breaks(7).unwrap();
    for seed in 0..10 {
        let board = scrambled(100, seed);
        let solution = solve_staged(&AStar::default(), &board, &policy, || {})
            .unwrap();
        assert_eq!(solution.stages.len(), policy.stages().len());

        let mut current = board;
        for (i, stage) in solution.stages.iter().enumerate() {
            assert_eq!(replay(&current, &stage.actions), stage.board);
            for earlier in &policy.stages()[..=i] {
                assert!(stage.board.is_partial_goal(*earlier));
            }
            current = stage.board;
        }
        assert_eq!(
            solution.actions.len(),
            solution
                .stages
                .iter()
                .map(|stage| stage.actions.len())
                .sum::<usize>()
        );
    }
}

#[test]
fn strategies_agree_on_shortest_paths() {
    let iddfs = Iddfs::default();
    let astars = Heuristic::ALL.map(AStar::new);
    let mut strategies: Vec<&dyn Strategy> = vec![&Bfs, &iddfs];
    for astar in &astars {
        strategies.push(astar);
    }
    for moves in [1, 3, 6, 9] {
        for seed in 0..4 {
            let board = scrambled(moves, seed);
            let lengths = strategies
                .iter()
                .map(|strategy| {
                    let stage = strategy
                        .search(&board, TargetSet::FULL, &mut || {})
                        .unwrap();
                    assert!(stage.board.is_solved(), "{}", strategy.name());
                    assert_eq!(replay(&board, &stage.actions), stage.board);
                    stage.actions.len()
                })
                .collect::<Vec<_>>();
            assert!(lengths[0] <= moves);
            assert!(lengths.iter().all(|&len| len == lengths[0]), "{lengths:?}");
        }
    }
}

#[test]
fn uninformed_strategies_plug_into_stages() {
    let policy = Policy::breaks(7).unwrap();
    let board = scrambled(8, 11);
    let iddfs = Iddfs::default();
    for strategy in [&Bfs as &dyn Strategy, &iddfs] {
        let solution = solve_staged(strategy, &board, &policy, || {}).unwrap();
        assert!(solution.board.is_solved());
    }
}

#[test]
fn on_step_counts_expansions() {
    let board = scrambled(40, 5);
    let mut steps = 0;
    let policy = Policy::breaks(5).unwrap();
    let solution = solve_staged(&AStar::default(), &board, &policy, || steps += 1)
        .unwrap();
    assert_eq!(steps, solution.expanded());
}
