/// Programmer-misuse conditions reported by the engine.
///
/// Expected per-call outcomes (an illegal direction, a terminal board) are
/// encoded as values instead: `Option<Move>`, the `legal` flag on
/// [`crate::rollout::BranchEval`], or the [`crate::rollout::NO_MOVE_SCORE`] sentinel.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine tables not initialized; call initialize() first")]
    Uninitialized,
    #[error("cannot spawn a tile on a board with no empty cell")]
    BoardFull,
    #[error("unknown policy id: {0}")]
    UnknownPolicy(u8),
    #[error("unknown policy name: {0}")]
    UnknownPolicyName(String),
    #[error("invalid move index: {0} (expected 0..=3)")]
    InvalidMove(u8),
    #[error("rank {rank} at row {row}, col {col} exceeds the maximum rank of 15")]
    InvalidRank { row: usize, col: usize, rank: u8 },
}
