use criterion::{criterion_group, criterion_main, Criterion};
use mc_2048::engine::{self, Board, Move};
use mc_2048::{MonteCarlo, Policy, RolloutConfig};
use rand::{rngs::StdRng, SeedableRng};
use rayon::ThreadPoolBuilder;
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(7777);
    let mut boards = Vec::new();
    let mut b = Board::EMPTY.spawn_tile(&mut rng).unwrap().spawn_tile(&mut rng).unwrap();
    boards.push(b);
    for i in 0..16 {
        let (nb, _) = b.make_move(Move::ALL[i % 4], &mut rng);
        if nb.is_terminal() { break; }
        b = nb;
        boards.push(b);
    }
    boards
}

fn bench_branch_evals(c: &mut Criterion) {
    engine::initialize();
    // Pin a small pool for stability
    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let boards = corpus();

    for parallel in [false, true] {
        let cfg = RolloutConfig { samples: 64, max_depth: 20, policy: Policy::Composite, parallel };
        let mut mc = MonteCarlo::with_config(cfg);
        let name = if parallel { "rollout_par/branch_evals" } else { "rollout_seq/branch_evals" };
        c.bench_function(name, |bch| {
            let mut rng = StdRng::seed_from_u64(1);
            bch.iter(|| pool.install(|| {
                let mut acc = 0.0;
                for &bd in &boards {
                    for eval in mc.branch_evals(bd, &mut rng) {
                        if eval.legal { acc += eval.score; }
                    }
                }
                black_box(acc)
            }))
        });
    }
}

fn bench_e2e(c: &mut Criterion) {
    engine::initialize();
    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let cfg = RolloutConfig { samples: 32, max_depth: 10, policy: Policy::EmptyCells, parallel: true };
    let mut mc = MonteCarlo::with_config(cfg);
    c.bench_function("e2e_par/32_moves", |bch| {
        bch.iter(|| pool.install(|| {
            let mut rng = StdRng::seed_from_u64(13);
            let mut b = Board::EMPTY.spawn_tile(&mut rng).unwrap().spawn_tile(&mut rng).unwrap();
            let mut steps = 0;
            while steps < 32 && !b.is_terminal() {
                let Some(dir) = mc.best_move(b, &mut rng) else { break };
                b = b.make_move(dir, &mut rng).0;
                steps += 1;
            }
            black_box((b.raw(), steps))
        }))
    });
}

criterion_group!(rollout, bench_branch_evals, bench_e2e);
criterion_main!(rollout);
