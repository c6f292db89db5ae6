use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::engine::{self, Board, Move};

use super::playout::{run_trial, trial_seed, Outcome};
use super::{best_branch, BranchEval, RolloutConfig, RolloutStats};

/// Monte Carlo move evaluator.
///
/// Each evaluation draws one base seed from the caller's RNG; trial
/// `(direction, sample)` then runs on its own `StdRng` derived from it. For a
/// given caller seed the scores are identical with or without `parallel`.
pub struct MonteCarlo {
    cfg: RolloutConfig,
    stats: RolloutStats,
}

impl MonteCarlo {
    pub fn new() -> Self { Self::with_config(RolloutConfig::default()) }

    /// Panics if [`engine::initialize`] has not run.
    pub fn with_config(cfg: RolloutConfig) -> Self {
        engine::tables();
        Self { cfg, stats: RolloutStats::default() }
    }

    #[inline]
    pub fn config(&self) -> &RolloutConfig { &self.cfg }

    /// Estimate every direction.
    ///
    /// Returns a fixed array in move-index order (`[Left, Right, Up, Down]`).
    /// No-op directions are `legal = false` with [`super::NO_MOVE_SCORE`].
    pub fn branch_evals<R: Rng + ?Sized>(&mut self, board: Board, rng: &mut R) -> [BranchEval; 4] {
        let base_seed: u64 = rng.gen();
        let results: Vec<(BranchEval, Outcome)> = if self.cfg.parallel {
            Move::ALL
                .par_iter()
                .map(|&dir| self.evaluate_direction(board, dir, base_seed))
                .collect()
        } else {
            Move::ALL
                .iter()
                .map(|&dir| self.evaluate_direction(board, dir, base_seed))
                .collect()
        };

        let mut out = Move::ALL.map(BranchEval::illegal);
        let mut total = Outcome::default();
        for (idx, (eval, outcome)) in results.into_iter().enumerate() {
            out[idx] = eval;
            total = total.merge(outcome);
        }
        self.stats = RolloutStats { trials: total.trials, plies: total.plies };
        log::debug!(
            "rollout {:?} samples={} depth={} policy={} trials={} plies={} scores={:?}",
            board,
            self.cfg.samples,
            self.cfg.max_depth,
            self.cfg.policy,
            total.trials,
            total.plies,
            out.map(|eval| eval.score),
        );
        out
    }

    /// Per-direction scores in move-index order.
    pub fn scores<R: Rng + ?Sized>(&mut self, board: Board, rng: &mut R) -> [f64; 4] {
        self.branch_evals(board, rng).map(|eval| eval.score)
    }

    /// Highest-scoring legal direction, lowest index on ties.
    ///
    /// `None` when no direction is legal.
    pub fn best_move<R: Rng + ?Sized>(&mut self, board: Board, rng: &mut R) -> Option<Move> {
        best_branch(&self.branch_evals(board, rng))
    }

    /// Stats collected by the last call to [`Self::branch_evals`],
    /// [`Self::scores`] or [`Self::best_move`].
    #[inline]
    pub fn last_stats(&self) -> RolloutStats { self.stats }

    #[inline]
    pub fn reset_stats(&mut self) { self.stats = RolloutStats::default(); }

    fn evaluate_direction(&self, board: Board, dir: Move, base_seed: u64) -> (BranchEval, Outcome) {
        let (child, gain) = board.apply(dir);
        if child == board {
            return (BranchEval::illegal(dir), Outcome::default());
        }
        let RolloutConfig { samples, max_depth, policy, parallel } = self.cfg;
        let trial = |sample: u64| {
            let mut rng = StdRng::seed_from_u64(trial_seed(base_seed, dir, sample));
            run_trial(child, gain, max_depth, policy, &mut rng)
        };
        let outcome = if parallel {
            (0..samples as u64)
                .into_par_iter()
                .map(trial)
                .reduce(Outcome::default, Outcome::merge)
        } else {
            (0..samples as u64).map(trial).fold(Outcome::default(), Outcome::merge)
        };
        (BranchEval { dir, score: outcome.mean_gain(), legal: true }, outcome)
    }
}

impl Default for MonteCarlo { fn default() -> Self { Self::new() } }
