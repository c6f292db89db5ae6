use rand::Rng;

use crate::engine::{Board, Gain, Move};
use crate::policy::{simple_best_move, Policy};

/// Totals over one or more trials. Integer sums keep the reduction exact and
/// independent of the order trials finish in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) trials: u64,
    pub(crate) gain: u64,
    pub(crate) plies: u64,
}

impl Outcome {
    #[inline]
    pub(crate) fn merge(self, other: Outcome) -> Outcome {
        Outcome {
            trials: self.trials + other.trials,
            gain: self.gain + other.gain,
            plies: self.plies + other.plies,
        }
    }

    /// Mean gain per trial; 0 when no trial ran.
    pub(crate) fn mean_gain(&self) -> f64 {
        if self.trials == 0 { 0.0 } else { self.gain as f64 / self.trials as f64 }
    }
}

/// Seed for trial `sample` of direction `dir`, derived from the evaluation's
/// base seed with a SplitMix64 finalizer so neighbouring trials get unrelated
/// streams.
#[inline]
pub(crate) fn trial_seed(base: u64, dir: Move, sample: u64) -> u64 {
    let mut z = base ^ ((dir.index() as u64) << 56) ^ sample.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Play one continuation from `child`, the board right after the evaluated
/// move (which earned `first_gain`).
///
/// Every spawn follows a legal move, so the board always has an empty cell
/// when a tile is placed.
pub(crate) fn run_trial<R: Rng + ?Sized>(
    child: Board,
    first_gain: Gain,
    max_depth: u32,
    policy: Policy,
    rng: &mut R,
) -> Outcome {
    let mut board = child;
    let mut gain = first_gain as u64;
    let mut plies = 0u32;
    loop {
        board = board.with_random_tile(rng);
        if plies == max_depth || board.is_terminal() {
            break;
        }
        let Some(dir) = simple_best_move(board, policy) else { break };
        let (next, merged) = board.apply(dir);
        gain += merged as u64;
        board = next;
        plies += 1;
    }
    Outcome { trials: 1, gain, plies: plies as u64 }
}
