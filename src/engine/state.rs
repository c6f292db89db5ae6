use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::tables::{tables, MOVES_TOWARD_END, MOVES_TOWARD_START};

type BoardRaw = u64;
/// A row, or a column after transposition. Nibble index 0 is the low nibble.
pub type Line = u16;
/// Score earned by merges.
pub type Gain = u32;
/// `2^rank` is the tile value; 0 is an empty cell.
pub type Rank = u8;

/// Largest rank a nibble can hold (tile 32768).
pub const MAX_RANK: Rank = 15;

/// A direction to slide/merge tiles.
///
/// The discriminant is the move index used across the whole API (score
/// vectors, CLI output, datasets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Move {
    /// Toward column 0.
    Left = 0,
    Right = 1,
    /// Toward row 0.
    Up = 2,
    Down = 3,
}

impl Move {
    /// All directions in index order.
    pub const ALL: [Move; 4] = [Move::Left, Move::Right, Move::Up, Move::Down];

    #[inline]
    pub fn index(self) -> usize { self as usize }

    #[inline]
    pub fn from_index(idx: usize) -> Option<Move> { Move::ALL.get(idx).copied() }
}

impl TryFrom<u8> for Move {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Move::from_index(value as usize).ok_or(EngineError::InvalidMove(value))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Left => "left",
            Move::Right => "right",
            Move::Up => "up",
            Move::Down => "down",
        };
        f.write_str(name)
    }
}

/// Packed 4x4 2048 board as 16 4-bit ranks in a `u64`.
///
/// Cell `(row, col)` lives in nibble `4 * row + col` counted from the least
/// significant bits, so row `r` is the 16-bit line at bits `16r..16r + 16`.
/// Boards are values: every operation returns a new board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self { Board(raw) }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub fn into_raw(self) -> BoardRaw { self.0 }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw { self.0 }

    /// Build a board from a row-major grid of ranks.
    ///
    /// ```
    /// use mc_2048::engine::Board;
    /// let b = Board::from_ranks([[1, 1, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// assert_eq!(b.raw(), 0x0011);
    /// ```
    pub fn from_ranks(grid: [[Rank; 4]; 4]) -> Result<Self, EngineError> {
        let mut raw = 0;
        for (row, ranks) in grid.iter().enumerate() {
            for (col, &rank) in ranks.iter().enumerate() {
                if rank > MAX_RANK {
                    return Err(EngineError::InvalidRank { row, col, rank });
                }
                raw |= (rank as BoardRaw) << cell_shift(row, col);
            }
        }
        Ok(Board(raw))
    }

    /// Rank stored at `(row, col)`; 0 means empty.
    #[inline]
    pub fn rank(self, row: usize, col: usize) -> Rank {
        ((self.0 >> cell_shift(row, col)) & 0xf) as Rank
    }

    /// Tile value at `(row, col)` (0 if empty), e.g. 2, 4, 8, ...
    #[inline]
    pub fn tile_value(self, row: usize, col: usize) -> u32 {
        match self.rank(row, col) {
            0 => 0,
            rank => 1 << rank,
        }
    }

    /// Row-major grid of ranks, for feature extraction.
    pub fn to_ranks(self) -> [[Rank; 4]; 4] {
        std::array::from_fn(|row| std::array::from_fn(|col| self.rank(row, col)))
    }

    /// Row-major grid of tile values, 0 for empty cells.
    pub fn to_array(self) -> [[u32; 4]; 4] {
        std::array::from_fn(|row| std::array::from_fn(|col| self.tile_value(row, col)))
    }

    /// Slide/merge in `dir`, returning the new board and the merge gain.
    ///
    /// When the returned board equals `self` the move is a no-op: the gain is
    /// 0 and the move is illegal, so no tile may be spawned after it.
    ///
    /// ```
    /// use mc_2048::engine::{self, Board, Move};
    /// engine::initialize();
    /// let b = Board::from_raw(0x0011);
    /// assert_eq!(b.apply(Move::Left), (Board::from_raw(0x0002), 4));
    /// assert_eq!(b.apply(Move::Up), (b, 0));
    /// ```
    #[inline]
    pub fn apply(self, dir: Move) -> (Board, Gain) {
        let t = tables();
        match dir {
            Move::Left => {
                let (raw, gain) = slide_rows(self.0, |line| t.slide(line));
                (Board(raw), gain)
            }
            Move::Right => {
                let (raw, gain) = slide_rows(self.0, |line| t.slide_reversed(line));
                (Board(raw), gain)
            }
            Move::Up => {
                let (cols, gain) = slide_rows(transpose(self.0), |line| t.slide(line));
                (Board(transpose(cols)), gain)
            }
            Move::Down => {
                let (cols, gain) = slide_rows(transpose(self.0), |line| t.slide_reversed(line));
                (Board(transpose(cols)), gain)
            }
        }
    }

    /// The board after sliding in `dir`, without the gain.
    #[inline]
    pub fn shift(self, dir: Move) -> Board { self.apply(dir).0 }

    /// True if sliding in `dir` changes the board.
    #[inline]
    pub fn can_move(self, dir: Move) -> bool {
        let t = tables();
        let (raw, flag) = match dir {
            Move::Left => (self.0, MOVES_TOWARD_START),
            Move::Right => (self.0, MOVES_TOWARD_END),
            Move::Up => (transpose(self.0), MOVES_TOWARD_START),
            Move::Down => (transpose(self.0), MOVES_TOWARD_END),
        };
        (0..4).any(|idx| t.mobility(extract_line(raw, idx)) & flag != 0)
    }

    /// Legal directions in index order.
    pub fn legal_moves(self) -> impl Iterator<Item = Move> {
        Move::ALL.into_iter().filter(move |&dir| self.can_move(dir))
    }

    /// True if no direction changes the board. The empty board is terminal.
    ///
    /// Reads one mobility byte per row and per column; no move is simulated.
    #[inline]
    pub fn is_terminal(self) -> bool {
        let t = tables();
        let cols = transpose(self.0);
        (0..4).all(|idx| t.mobility(extract_line(self.0, idx)) | t.mobility(extract_line(cols, idx)) == 0)
    }

    /// Insert a 2 (90%) or 4 (10%) tile into a uniformly chosen empty cell.
    ///
    /// Returns [`EngineError::BoardFull`] when no cell is empty.
    ///
    /// ```
    /// use mc_2048::engine::{self, Board};
    /// use rand::{SeedableRng, rngs::StdRng};
    /// engine::initialize();
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.spawn_tile(&mut rng).unwrap().spawn_tile(&mut rng).unwrap();
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn spawn_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Board, EngineError> {
        if self.count_empty() == 0 {
            return Err(EngineError::BoardFull);
        }
        Ok(self.with_random_tile(rng))
    }

    /// Spawn without the emptiness check. Callers guarantee an empty cell,
    /// which always holds right after a legal move.
    #[inline]
    pub(crate) fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Board {
        let empty = self.count_empty();
        debug_assert!(empty > 0, "spawn on a full board");
        let mut index = rng.gen_range(0..empty);
        let mut rest = self.0;
        let mut tile = random_rank(rng) as BoardRaw;
        loop {
            while rest & 0xf != 0 {
                rest >>= 4;
                tile <<= 4;
            }
            if index == 0 {
                break;
            }
            index -= 1;
            rest >>= 4;
            tile <<= 4;
        }
        Board(self.0 | tile)
    }

    /// Apply `dir` and, if it was legal, spawn a tile. Returns the merge gain.
    ///
    /// An illegal direction returns `(self, 0)` and consumes no randomness.
    pub fn make_move<R: Rng + ?Sized>(self, dir: Move, rng: &mut R) -> (Board, Gain) {
        let (moved, gain) = self.apply(dir);
        if moved == self {
            (self, 0)
        } else {
            (moved.with_random_tile(rng), gain)
        }
    }

    /// Count the number of empty cells.
    #[inline]
    pub fn count_empty(self) -> u32 {
        // Fold each nibble onto its low bit: a set bit marks an occupied cell.
        let mut occupied = self.0;
        occupied |= occupied >> 1;
        occupied |= occupied >> 2;
        occupied &= 0x1111_1111_1111_1111;
        16 - occupied.count_ones()
    }

    /// Highest rank on the board (0 for the empty board).
    pub fn highest_rank(self) -> Rank {
        (0..16).map(|nibble| ((self.0 >> (4 * nibble)) & 0xf) as Rank).max().unwrap_or(0)
    }

    /// Highest tile value on the board (0 for the empty board).
    pub fn highest_tile(self) -> u32 {
        match self.highest_rank() {
            0 => 0,
            rank => 1 << rank,
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, values) in self.to_array().iter().enumerate() {
            if row > 0 {
                writeln!(f, "{}", "-".repeat(31))?;
            }
            let cells: Vec<String> = values
                .iter()
                .map(|&v| if v == 0 { " ".repeat(7) } else { format!("{v:^7}") })
                .collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board { fn from(v: BoardRaw) -> Self { Board::from_raw(v) } }
impl From<Board> for BoardRaw { fn from(b: Board) -> Self { b.into_raw() } }

#[inline(always)]
fn cell_shift(row: usize, col: usize) -> usize { 16 * row + 4 * col }

#[inline(always)]
fn random_rank<R: Rng + ?Sized>(rng: &mut R) -> Rank { if rng.gen_range(0..10) < 9 { 1 } else { 2 } }

#[inline(always)]
fn slide_rows(raw: BoardRaw, slide: impl Fn(Line) -> (Line, Gain)) -> (BoardRaw, Gain) {
    (0..4).fold((0, 0), |(acc, gain), idx| {
        let (line, merged) = slide(extract_line(raw, idx));
        (acc | (line as BoardRaw) << (16 * idx), gain + merged)
    })
}

/// Line `idx` (row `idx`, or column `idx` of a transposed board).
#[inline(always)]
pub(crate) fn extract_line(raw: BoardRaw, idx: usize) -> Line {
    ((raw >> (16 * idx)) & 0xffff) as Line
}

// Credit to Nneonneo
#[inline(always)]
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F0_0F0F_F0F0_0F0F;
    let a2 = x & 0x0000_F0F0_0000_F0F0;
    let a3 = x & 0x0F0F_0000_0F0F_0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00_FF00_00FF_00FF;
    let b2 = a & 0x00FF_00FF_0000_0000;
    let b3 = a & 0x0000_0000_FF00_FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

#[inline(always)]
pub(crate) fn reverse_line(line: Line) -> Line {
    (line & 0xf) << 12 | (line & 0xf0) << 4 | (line & 0xf00) >> 4 | (line & 0xf000) >> 12
}

pub(crate) fn line_ranks(line: Line) -> [Rank; 4] {
    std::array::from_fn(|idx| ((line >> (4 * idx)) & 0xf) as Rank)
}

pub(crate) fn ranks_to_line(ranks: [Rank; 4]) -> Line {
    ranks
        .iter()
        .enumerate()
        .fold(0, |line, (idx, &rank)| line | ((rank as Line) & 0xf) << (4 * idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::initialize;
    use rand::{rngs::StdRng, SeedableRng};

    fn board(grid: [[Rank; 4]; 4]) -> Board { Board::from_ranks(grid).unwrap() }

    #[test]
    fn it_transpose_swaps_rows_and_cols() {
        let b = board([[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 14, 15, 0]]);
        let t = Board::from_raw(transpose(b.raw()));
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(t.rank(row, col), b.rank(col, row));
            }
        }
        assert_eq!(transpose(transpose(b.raw())), b.raw());
    }

    #[test]
    fn it_reverse_line() {
        assert_eq!(reverse_line(0x1234), 0x4321);
        assert_eq!(reverse_line(reverse_line(0xa0b1)), 0xa0b1);
    }

    #[test]
    fn test_move_left() {
        initialize();
        let b = board([[1, 2, 3, 4], [1, 3, 3, 2], [2, 0, 0, 2], [1, 0, 0, 2]]);
        let (moved, gain) = b.apply(Move::Left);
        assert_eq!(moved, board([[1, 2, 3, 4], [1, 4, 2, 0], [3, 0, 0, 0], [1, 2, 0, 0]]));
        assert_eq!(gain, 16 + 8);
    }

    #[test]
    fn test_move_right() {
        initialize();
        let b = board([[1, 2, 3, 4], [1, 3, 3, 2], [2, 0, 0, 2], [1, 0, 0, 2]]);
        let (moved, gain) = b.apply(Move::Right);
        assert_eq!(moved, board([[1, 2, 3, 4], [0, 1, 4, 2], [0, 0, 0, 3], [0, 0, 1, 2]]));
        assert_eq!(gain, 16 + 8);
    }

    #[test]
    fn test_move_up() {
        initialize();
        let b = board([[1, 1, 2, 1], [2, 3, 0, 0], [3, 3, 0, 0], [4, 2, 2, 2]]);
        let (moved, gain) = b.apply(Move::Up);
        assert_eq!(moved, board([[1, 1, 3, 1], [2, 4, 0, 2], [3, 2, 0, 0], [4, 0, 0, 0]]));
        assert_eq!(gain, 16 + 8);
    }

    #[test]
    fn test_move_down() {
        initialize();
        let b = board([[1, 1, 2, 1], [2, 3, 0, 0], [3, 3, 0, 0], [4, 2, 2, 2]]);
        let (moved, gain) = b.apply(Move::Down);
        assert_eq!(moved, board([[1, 0, 0, 0], [2, 1, 0, 0], [3, 4, 0, 1], [4, 2, 3, 2]]));
        assert_eq!(gain, 16 + 8);
    }

    #[test]
    fn it_can_move_matches_apply() {
        initialize();
        let mut rng = StdRng::seed_from_u64(5);
        let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
        for step in 0..200 {
            for dir in Move::ALL {
                assert_eq!(b.can_move(dir), b.shift(dir) != b, "{b:?} {dir}");
            }
            let Some(dir) = b.legal_moves().nth(step % 2).or_else(|| b.legal_moves().next()) else { break };
            b = b.make_move(dir, &mut rng).0;
        }
    }

    #[test]
    fn it_count_empty() {
        assert_eq!(Board::EMPTY.count_empty(), 16);
        assert_eq!(Board::from_raw(0x1111_0000_1111_0000).count_empty(), 8);
        assert_eq!(Board::from_raw(0x0000_0000_0000_0011).count_empty(), 14);
        assert_eq!(Board::from_raw(0x8000_0000_0000_0000).count_empty(), 15);
    }

    #[test]
    fn it_tile_values() {
        let b = Board::from_raw(0xfedc_ba98_7654_3210);
        assert_eq!(b.tile_value(0, 0), 0);
        assert_eq!(b.tile_value(0, 3), 8);
        assert_eq!(b.tile_value(2, 2), 1024);
        assert_eq!(b.tile_value(3, 3), 32768);
        assert_eq!(b.highest_tile(), 32768);
        assert_eq!(b.to_array()[1], [16, 32, 64, 128]);
    }

    #[test]
    fn it_rejects_out_of_range_rank() {
        let mut grid = [[0u8; 4]; 4];
        grid[2][1] = 16;
        assert_eq!(Board::from_ranks(grid), Err(EngineError::InvalidRank { row: 2, col: 1, rank: 16 }));
    }

    #[test]
    fn it_fills_board_with_random_tiles() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut b = Board::EMPTY;
        for _ in 0..16 {
            b = b.spawn_tile(&mut rng).unwrap();
        }
        assert_eq!(b.count_empty(), 0);
        assert_eq!(b.spawn_tile(&mut rng), Err(EngineError::BoardFull));
    }

    #[test]
    fn it_make_move_skips_spawn_on_noop() {
        initialize();
        let mut rng = StdRng::seed_from_u64(3);
        let b = board([[1, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(b.make_move(Move::Left, &mut rng), (b, 0));
        let (next, gain) = b.make_move(Move::Right, &mut rng);
        assert_eq!(gain, 0);
        assert_eq!(next.count_empty(), 14);
        assert_eq!(next.rank(0, 3), 1);
    }

    #[test]
    fn it_move_try_from() {
        assert_eq!(Move::try_from(2), Ok(Move::Up));
        assert_eq!(Move::try_from(4), Err(EngineError::InvalidMove(4)));
        assert_eq!(Move::from_index(3), Some(Move::Down));
        assert_eq!(Move::from_index(4), None);
        for (idx, dir) in Move::ALL.into_iter().enumerate() {
            assert_eq!(dir.index(), idx);
        }
    }
}
