//! mc-2048: a bit-packed 2048 engine + Monte Carlo move evaluation
//!
//! This crate provides:
//! - A compact `Board` type with table-driven moves (`apply`, `spawn_tile`, `is_terminal`, ...)
//! - A closed family of heuristic move policies (`policy` module)
//! - A policy-guided Monte Carlo rollout evaluator, parallel over rayon (`rollout` module)
//! - Flat query functions for orchestration code (`api`, re-exported here)
//!
//! Quick start:
//! ```
//! use mc_2048::{initialize, Board, MonteCarlo, RolloutConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // One-time table init
//! initialize();
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut b = Board::EMPTY.spawn_tile(&mut rng).unwrap().spawn_tile(&mut rng).unwrap();
//!
//! // A few advised moves
//! let mut advisor = MonteCarlo::with_config(RolloutConfig { samples: 16, max_depth: 10, ..Default::default() });
//! for _ in 0..3 {
//!     if b.is_terminal() { break; }
//!     let Some(dir) = advisor.best_move(b, &mut rng) else { break };
//!     b = b.make_move(dir, &mut rng).0;
//! }
//! assert!(b.count_empty() < 16);
//! ```
//!
//! Randomness is always an explicit `&mut impl Rng` parameter; seed it for
//! reproducible results.
//!
pub mod api;
pub mod engine;
pub mod error;
pub mod policy;
pub mod rollout;

pub use api::{apply_move, best_move, board_to_array, initialize, is_terminal, scores, simple_best_move, spawn_tile};
pub use engine::{Board, Gain, Move};
pub use error::EngineError;
pub use policy::Policy;
pub use rollout::{BranchEval, MonteCarlo, RolloutConfig, RolloutStats, NO_MOVE_SCORE};
