use std::sync::OnceLock;

use crate::engine::state::{extract_line, line_ranks, transpose, Line};
use crate::engine::{Board, Rank};

/// Composite score of every 16-bit line, built on first use.
static LINE_SCORES: OnceLock<Box<[f64]>> = OnceLock::new();

/// Build the composite line table ahead of the first `Composite` evaluation.
pub(crate) fn warm() {
    let _ = line_scores();
}

fn line_scores() -> &'static [f64] {
    LINE_SCORES
        .get_or_init(|| (0..=Line::MAX).map(line_score).collect())
        .as_ref()
}

/// Snake-shaped position weights anchored in the top-left corner.
const GRADIENT: [[f64; 4]; 4] = [
    [15.0, 14.0, 13.0, 12.0],
    [8.0, 9.0, 10.0, 11.0],
    [7.0, 6.0, 5.0, 4.0],
    [0.0, 1.0, 2.0, 3.0],
];

/// Minus the summed distance of each cell to its closest orthogonal neighbour,
/// measured in ranks. Empty cells count as rank 0.
pub(crate) fn smoothness(board: Board) -> f64 {
    let grid = board.to_ranks();
    let mut total = 0u32;
    for row in 0..4 {
        for col in 0..4 {
            let rank = grid[row][col];
            let mut closest = 16u32;
            let neighbours = [
                row.checked_sub(1).map(|r| grid[r][col]),
                (row < 3).then(|| grid[row + 1][col]),
                col.checked_sub(1).map(|c| grid[row][c]),
                (col < 3).then(|| grid[row][col + 1]),
            ];
            for other in neighbours.into_iter().flatten() {
                closest = closest.min(rank.abs_diff(other) as u32);
            }
            total += closest;
        }
    }
    -(total as f64)
}

pub(crate) fn empty_cells(board: Board) -> f64 { board.count_empty() as f64 }

/// Position-weighted tile magnitude over [`GRADIENT`].
pub(crate) fn gradient(board: Board) -> f64 {
    let values = board.to_array();
    GRADIENT
        .iter()
        .zip(values.iter())
        .flat_map(|(weights, tiles)| weights.iter().zip(tiles.iter()))
        .map(|(&weight, &tile)| weight * tile as f64)
        .sum()
}

/// Sum of the precomputed line scores over the 4 rows and 4 columns.
pub(crate) fn composite(board: Board) -> f64 {
    let scores = line_scores();
    let cols = transpose(board.raw());
    (0..4).fold(0.0, |score, idx| {
        score + scores[extract_line(board.raw(), idx) as usize] + scores[extract_line(cols, idx) as usize]
    })
}

// Credit to Nneonneo for heuristic structure
/// Composite score of one line.
pub(crate) fn line_score(line: Line) -> f64 {
    const LOST_PENALTY: f64 = 200_000.0;
    let ranks = line_ranks(line);
    LOST_PENALTY + empty_term(&ranks) + merge_term(&ranks) - monotonicity_term(&ranks) - magnitude_term(&ranks)
}

fn empty_term(ranks: &[Rank; 4]) -> f64 {
    const EMPTY_WEIGHT: f64 = 270.0;
    ranks.iter().filter(|&&rank| rank == 0).count() as f64 * EMPTY_WEIGHT
}

/// Runs of equal nonzero ranks; a run of `n` tiles counts `n` merge candidates.
fn merge_term(ranks: &[Rank; 4]) -> f64 {
    const MERGES_WEIGHT: f64 = 700.0;
    let mut merges = 0u32;
    let mut run = 0u32;
    for pair in ranks.windows(2) {
        if pair[0] == pair[1] && pair[0] != 0 {
            run += 1;
        } else if run > 0 {
            merges += 1 + run;
            run = 0;
        }
    }
    if run > 0 {
        merges += 1 + run;
    }
    merges as f64 * MERGES_WEIGHT
}

fn monotonicity_term(ranks: &[Rank; 4]) -> f64 {
    const MONOTONICITY_POWER: f64 = 4.0;
    const MONOTONICITY_WEIGHT: f64 = 47.0;
    let (mut decreasing, mut increasing) = (0.0, 0.0);
    for pair in ranks.windows(2) {
        let a = (pair[0] as f64).powf(MONOTONICITY_POWER);
        let b = (pair[1] as f64).powf(MONOTONICITY_POWER);
        if a > b {
            decreasing += a - b;
        } else {
            increasing += b - a;
        }
    }
    f64::min(decreasing, increasing) * MONOTONICITY_WEIGHT
}

fn magnitude_term(ranks: &[Rank; 4]) -> f64 {
    const SUM_POWER: f64 = 3.5;
    const SUM_WEIGHT: f64 = 11.0;
    ranks.iter().map(|&rank| (rank as f64).powf(SUM_POWER)).sum::<f64>() * SUM_WEIGHT
}
