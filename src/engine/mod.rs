//! Bit-packed 2048 engine: board representation, line tables and the
//! move / spawn / terminal primitives built on them.
//!
//! Call [`initialize`] once before any board operation. It builds the line
//! tables and freezes them for the lifetime of the process.
//!
//! ```
//! use mc_2048::engine::{self, Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! engine::initialize();
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::EMPTY.spawn_tile(&mut rng).unwrap().spawn_tile(&mut rng).unwrap();
//! let (b1, gain) = b0.apply(Move::Left);
//! assert!(b1 == b0 || b1.count_empty() >= b0.count_empty());
//! assert!(gain % 4 == 0);
//! ```

pub mod state;
pub mod tables;

pub use state::{Board, Gain, Line, Move, Rank, MAX_RANK};
pub use tables::{initialize, tables, try_tables, Tables};
