//! Flat entry points for orchestration code (advisor loops, dataset
//! generators, policy benchmarks). Each call forwards to the typed API in
//! [`crate::engine`], [`crate::policy`] and [`crate::rollout`].
//!
//! ```
//! use mc_2048::{best_move, board_to_array, initialize, is_terminal, scores, Board, Move, Policy};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! initialize();
//! let mut rng = StdRng::seed_from_u64(7);
//! // Row 0 = [2, 2, 0, 0]
//! let b = Board::from_raw(0x0011);
//! assert!(!is_terminal(b));
//! let s = scores(b, 16, 8, Policy::Composite, &mut rng);
//! assert_eq!(s[Move::Up.index()], f64::NEG_INFINITY);
//! assert!(best_move(b, 16, 8, Policy::Composite, &mut rng).is_some());
//! assert_eq!(board_to_array(b)[0], [2, 2, 0, 0]);
//! ```

use rand::Rng;

use crate::engine::{self, Board, Gain, Move, Tables};
use crate::error::EngineError;
use crate::policy::{self, Policy};
use crate::rollout::{MonteCarlo, RolloutConfig};

/// One-time table setup. Must run before any other call; repeated calls are
/// harmless and return the same tables.
///
/// Also builds the composite heuristic table so the first `Composite`
/// evaluation does not pay for it.
pub fn initialize() -> &'static Tables {
    let tables = engine::initialize();
    policy::heuristic::warm();
    tables
}

/// Slide/merge `board` in `direction`. A returned `(board, 0)` with the input
/// board unchanged marks an illegal move.
#[inline]
pub fn apply_move(board: Board, direction: Move) -> (Board, Gain) { board.apply(direction) }

/// Place a 2 (90%) or 4 (10%) in a uniformly chosen empty cell.
///
/// [`EngineError::Uninitialized`] before [`initialize`], [`EngineError::BoardFull`]
/// when no cell is empty.
pub fn spawn_tile<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Result<Board, EngineError> {
    engine::try_tables()?;
    board.spawn_tile(rng)
}

#[inline]
pub fn is_terminal(board: Board) -> bool { board.is_terminal() }

/// Greedy one-ply move under `policy`; `None` on a terminal board.
pub fn simple_best_move(board: Board, policy: Policy) -> Option<Move> {
    policy::simple_best_move(board, policy)
}

/// Mean rollout gain per direction, in move-index order. Illegal directions
/// score [`crate::rollout::NO_MOVE_SCORE`]. Panics before [`initialize`].
pub fn scores<R: Rng + ?Sized>(
    board: Board,
    n_samples: u32,
    max_depth: u32,
    policy: Policy,
    rng: &mut R,
) -> [f64; 4] {
    rollout(n_samples, max_depth, policy).scores(board, rng)
}

/// Argmax of [`scores`] over legal directions, lowest index on ties.
pub fn best_move<R: Rng + ?Sized>(
    board: Board,
    n_samples: u32,
    max_depth: u32,
    policy: Policy,
    rng: &mut R,
) -> Option<Move> {
    rollout(n_samples, max_depth, policy).best_move(board, rng)
}

/// Row-major tile values (2, 4, 8, ...), 0 for empty cells.
pub fn board_to_array(board: Board) -> [[u32; 4]; 4] { board.to_array() }

fn rollout(samples: u32, max_depth: u32, policy: Policy) -> MonteCarlo {
    MonteCarlo::with_config(RolloutConfig { samples, max_depth, policy, ..Default::default() })
}
