use mc_2048::engine::{self, Board, Move};
use mc_2048::{best_move, scores, simple_best_move, MonteCarlo, Policy, RolloutConfig, NO_MOVE_SCORE};
use rand::{rngs::StdRng, SeedableRng};

/// Rows 0-2 are locked and row 3 is empty: only Down changes the board.
fn only_down() -> Board {
    Board::from_ranks([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [0, 0, 0, 0]]).unwrap()
}

#[test]
fn scenario_d_single_legal_direction() {
    engine::initialize();
    let b = only_down();
    assert_eq!(b.legal_moves().collect::<Vec<_>>(), vec![Move::Down]);
    let mut rng = StdRng::seed_from_u64(4);
    for policy in Policy::ALL {
        for (samples, depth) in [(0, 0), (1, 1), (8, 0), (16, 25)] {
            assert_eq!(best_move(b, samples, depth, policy, &mut rng), Some(Move::Down));
        }
        assert_eq!(simple_best_move(b, policy), Some(Move::Down));
    }
}

#[test]
fn legality_exclusion() {
    engine::initialize();
    let mut rng = StdRng::seed_from_u64(8);
    let mut b = Board::EMPTY.spawn_tile(&mut rng).unwrap().spawn_tile(&mut rng).unwrap();
    for _ in 0..40 {
        if b.is_terminal() {
            break;
        }
        let s = scores(b, 6, 10, Policy::EmptyCells, &mut rng);
        for dir in Move::ALL {
            if b.can_move(dir) {
                assert!(s[dir.index()] >= 0.0);
            } else {
                assert_eq!(s[dir.index()], NO_MOVE_SCORE);
            }
        }
        let best = best_move(b, 6, 10, Policy::EmptyCells, &mut rng).unwrap();
        assert!(b.can_move(best));
        b = b.make_move(best, &mut rng).0;
    }
}

#[test]
fn scores_include_the_evaluated_moves_gain() {
    engine::initialize();
    let mut rng = StdRng::seed_from_u64(12);
    // Row 0 = [4, 4, 0, 0]: Left and Right both merge for 8 before any rollout.
    let b = Board::from_raw(0x0022);
    let s = scores(b, 20, 0, Policy::Composite, &mut rng);
    assert_eq!(s, [8.0, 8.0, NO_MOVE_SCORE, 0.0]);
    // Equal scores: the lower index wins.
    assert_eq!(best_move(b, 20, 0, Policy::Composite, &mut rng), Some(Move::Left));
}

#[test]
fn same_seed_same_scores() {
    engine::initialize();
    let b = Board::from_ranks([[2, 1, 0, 0], [3, 1, 0, 1], [0, 2, 0, 0], [0, 0, 0, 0]]).unwrap();
    for policy in Policy::ALL {
        let a = scores(b, 24, 30, policy, &mut StdRng::seed_from_u64(55));
        let c = scores(b, 24, 30, policy, &mut StdRng::seed_from_u64(55));
        assert_eq!(a, c, "{policy}");
    }
}

#[test]
fn parallel_and_sequential_agree() {
    engine::initialize();
    let b = Board::from_ranks([[1, 1, 2, 0], [0, 3, 0, 0], [0, 0, 1, 0], [2, 0, 0, 0]]).unwrap();
    let run = |parallel| {
        let cfg = RolloutConfig { samples: 40, max_depth: 40, policy: Policy::Smoothness, parallel };
        let mut mc = MonteCarlo::with_config(cfg);
        let evals = mc.branch_evals(b, &mut StdRng::seed_from_u64(101));
        (evals, mc.last_stats())
    };
    let (seq, seq_stats) = run(false);
    let (par, par_stats) = run(true);
    assert_eq!(seq, par);
    assert_eq!(seq_stats, par_stats);
    assert_eq!(seq_stats.trials, 40 * b.legal_moves().count() as u64);
}

#[test]
fn depth_caps_plies_per_trial() {
    engine::initialize();
    let b = Board::from_raw(0x0011);
    let cfg = RolloutConfig { samples: 10, max_depth: 3, policy: Policy::Gradient, parallel: true };
    let mut mc = MonteCarlo::with_config(cfg);
    mc.branch_evals(b, &mut StdRng::seed_from_u64(6));
    let stats = mc.last_stats();
    assert!(stats.plies <= stats.trials * 3);
    assert!(stats.trials > 0);
}

#[test]
fn advisor_plays_to_completion() {
    engine::initialize();
    let mut rng = StdRng::seed_from_u64(2048);
    let cfg = RolloutConfig { samples: 4, max_depth: 8, policy: Policy::FirstLegal, parallel: true };
    let mut mc = MonteCarlo::with_config(cfg);
    let mut b = Board::EMPTY.spawn_tile(&mut rng).unwrap().spawn_tile(&mut rng).unwrap();
    let mut moves = 0;
    while !b.is_terminal() {
        let dir = mc.best_move(b, &mut rng).expect("non-terminal board has a legal move");
        b = b.make_move(dir, &mut rng).0;
        moves += 1;
        assert!(moves < 100_000);
    }
    assert_eq!(mc.best_move(b, &mut rng), None);
    assert!(moves > 0);
}
