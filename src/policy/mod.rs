//! Heuristic board evaluators and the greedy one-ply move selector.
//!
//! A [`Policy`] is a closed family of deterministic, higher-is-better board
//! formulas. The same policy drives [`simple_best_move`] on its own and the
//! move choice inside Monte Carlo rollouts.
//!
//! ```
//! use mc_2048::engine::{self, Board, Move};
//! use mc_2048::policy::{simple_best_move, Policy};
//!
//! engine::initialize();
//! // A lone tile in the top-left corner can only go right or down. Both
//! // leave 15 empty cells, so the lower index wins the tie.
//! let b = Board::from_raw(0x1);
//! assert_eq!(simple_best_move(b, Policy::EmptyCells), Some(Move::Right));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::{Board, Move};
use crate::error::EngineError;

pub(crate) mod heuristic;

/// Board evaluation formula, identified by a small integer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Policy {
    /// Minus the summed rank distance of every cell to its closest neighbour.
    Smoothness = 0,
    /// Number of empty cells.
    EmptyCells = 1,
    /// Constant score: the tie-break picks the lowest legal direction.
    FirstLegal = 2,
    /// Tile values weighted by a snake gradient toward the top-left corner.
    Gradient = 3,
    /// Per-line empty / merge / monotonicity / magnitude score over rows and columns.
    Composite = 4,
}

impl Policy {
    /// All policies in id order.
    pub const ALL: [Policy; 5] = [
        Policy::Smoothness,
        Policy::EmptyCells,
        Policy::FirstLegal,
        Policy::Gradient,
        Policy::Composite,
    ];

    pub fn from_id(id: u8) -> Result<Self, EngineError> {
        Policy::ALL.get(id as usize).copied().ok_or(EngineError::UnknownPolicy(id))
    }

    #[inline]
    pub fn id(self) -> u8 { self as u8 }

    pub fn name(self) -> &'static str {
        match self {
            Policy::Smoothness => "smoothness",
            Policy::EmptyCells => "empty-cells",
            Policy::FirstLegal => "first-legal",
            Policy::Gradient => "gradient",
            Policy::Composite => "composite",
        }
    }

    /// Score `board`; higher is better. Pure function of `(board, self)`.
    #[inline]
    pub fn evaluate(self, board: Board) -> f64 {
        match self {
            Policy::Smoothness => heuristic::smoothness(board),
            Policy::EmptyCells => heuristic::empty_cells(board),
            Policy::FirstLegal => 0.0,
            Policy::Gradient => heuristic::gradient(board),
            Policy::Composite => heuristic::composite(board),
        }
    }
}

impl TryFrom<u8> for Policy {
    type Error = EngineError;

    fn try_from(id: u8) -> Result<Self, Self::Error> { Policy::from_id(id) }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Accepts a policy name (`"composite"`) or its numeric id (`"4"`).
impl FromStr for Policy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<u8>() {
            return Policy::from_id(id);
        }
        Policy::ALL
            .into_iter()
            .find(|policy| policy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::UnknownPolicyName(s.to_string()))
    }
}

/// Greedy one-ply choice: the legal direction whose result `policy` rates
/// highest. Ties go to the lowest direction index.
///
/// Returns `None` only when every direction is a no-op (a terminal board).
pub fn simple_best_move(board: Board, policy: Policy) -> Option<Move> {
    first_argmax(Move::ALL.into_iter().filter_map(|dir| {
        let moved = board.shift(dir);
        (moved != board).then(|| (dir, policy.evaluate(moved)))
    }))
}

/// First candidate holding the maximum score, scanning in iteration order.
///
/// Only a strictly greater score replaces the current best, so equal maxima
/// resolve to the earliest (lowest-index) direction.
pub(crate) fn first_argmax(candidates: impl IntoIterator<Item = (Move, f64)>) -> Option<Move> {
    let mut best: Option<(Move, f64)> = None;
    for (dir, score) in candidates {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((dir, score)),
        }
    }
    best.map(|(dir, _)| dir)
}
