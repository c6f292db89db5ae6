//! Policy-guided Monte Carlo move evaluation.
//!
//! For each direction the engine applies the move, then plays `samples`
//! randomized continuations from the child board. Each continuation spawns a
//! tile, picks the next move with [`crate::policy::simple_best_move`], and
//! repeats until the board is terminal or `max_depth` policy moves were made.
//! A direction's score is the mean total gain of its continuations.
//!
//! This is a one-ply lookahead estimate. Trials share nothing but the frozen
//! engine tables, so they run in parallel (rayon) on independent RNG streams.
//!
//! ```
//! use mc_2048::engine::{self, Board};
//! use mc_2048::rollout::{MonteCarlo, RolloutConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! engine::initialize();
//! let mut rng = StdRng::seed_from_u64(123);
//! let b0 = Board::EMPTY.spawn_tile(&mut rng).unwrap().spawn_tile(&mut rng).unwrap();
//! let mut mc = MonteCarlo::with_config(RolloutConfig { samples: 8, max_depth: 10, ..Default::default() });
//! let scores = mc.scores(b0, &mut rng);
//! assert!(mc.best_move(b0, &mut rng).is_some());
//! assert!(scores.iter().any(|s| s.is_finite()));
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::Move;
use crate::policy::{first_argmax, Policy};

mod monte_carlo;
mod playout;

pub use monte_carlo::MonteCarlo;

/// Score given to a direction that does not change the board.
///
/// Strictly below every attainable score (gains are never negative), so a
/// no-op direction is never selected while any legal one exists.
pub const NO_MOVE_SCORE: f64 = f64::NEG_INFINITY;

/// Rollout knobs.
///
/// - `samples`: trials per legal direction.
/// - `max_depth`: cap on policy moves per trial after the evaluated move.
/// - `policy`: move selector used inside trials.
/// - `parallel`: run trials on the rayon pool. Results do not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RolloutConfig {
    pub samples: u32,
    pub max_depth: u32,
    pub policy: Policy,
    pub parallel: bool,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self { samples: 100, max_depth: 50, policy: Policy::Composite, parallel: true }
    }
}

/// Per-direction estimate at the root.
///
/// - `score` is the mean trial gain, or [`NO_MOVE_SCORE`] when illegal.
/// - `legal` is false when the move is a no-op for the evaluated board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub score: f64,
    pub legal: bool,
}

impl BranchEval {
    pub(crate) fn illegal(dir: Move) -> Self { Self { dir, score: NO_MOVE_SCORE, legal: false } }
}

/// Highest-scoring legal branch, lowest index on ties; `None` if none is legal.
pub fn best_branch(evals: &[BranchEval; 4]) -> Option<Move> {
    first_argmax(evals.iter().filter(|eval| eval.legal).map(|eval| (eval.dir, eval.score)))
}

/// Work done by the last evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloutStats {
    /// Trials played, over all legal directions.
    pub trials: u64,
    /// Policy moves made inside those trials.
    pub plies: u64,
}
