use std::sync::OnceLock;
use std::time::Instant;

use crate::error::EngineError;

use super::state::{line_ranks, ranks_to_line, reverse_line, Gain, Line, MAX_RANK};

/// Precomputed outcome of sliding every possible 16-bit line.
///
/// Only the canonical direction (toward nibble index 0) is simulated. The
/// opposite direction reverses the line before and after the lookup, and the
/// vertical directions run the same lookups on a transposed board.
///
/// Layout, all indexed by the raw line value:
/// - `slide[i]`: the line after the canonical slide/merge.
/// - `gain[i]`: sum of `2^(e+1)` over every merge in that slide.
/// - `mobility[i]`: [`MOVES_TOWARD_START`] / [`MOVES_TOWARD_END`] bits.
pub struct Tables {
    slide: Box<[Line]>,
    gain: Box<[Gain]>,
    mobility: Box<[u8]>,
}

pub(crate) const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

/// The canonical slide changes the line.
pub(crate) const MOVES_TOWARD_START: u8 = 0b01;
/// The reversed slide changes the line.
pub(crate) const MOVES_TOWARD_END: u8 = 0b10;

static TABLES: OnceLock<Tables> = OnceLock::new();

/// Build the line tables on first call and return the frozen instance.
///
/// Later calls (from any thread) return the same tables without rebuilding.
pub fn initialize() -> &'static Tables {
    TABLES.get_or_init(Tables::build)
}

/// The frozen tables, or [`EngineError::Uninitialized`] before [`initialize`].
pub fn try_tables() -> Result<&'static Tables, EngineError> {
    TABLES.get().ok_or(EngineError::Uninitialized)
}

/// The frozen tables. Panics if [`initialize`] has not run.
#[inline(always)]
pub fn tables() -> &'static Tables {
    TABLES
        .get()
        .expect("engine tables not initialized; call engine::initialize() first")
}

impl Tables {
    /// Simulate the canonical slide for every line. Single-threaded.
    pub fn build() -> Self {
        let start = Instant::now();
        // Allocate on the heap to avoid large stack frames
        let mut slide = vec![0 as Line; LINE_TABLE_SIZE];
        let mut gain = vec![0 as Gain; LINE_TABLE_SIZE];

        for idx in 0..LINE_TABLE_SIZE {
            let line = idx as Line;
            let (result, merged) = slide_line(line);
            slide[idx] = result;
            gain[idx] = merged;
        }

        // Mobility needs the full slide table for the reversed lookup.
        let mobility: Vec<u8> = (0..LINE_TABLE_SIZE)
            .map(|idx| {
                let line = idx as Line;
                let mut flags = 0;
                if slide[idx] != line {
                    flags |= MOVES_TOWARD_START;
                }
                let reversed = reverse_line(line);
                if reverse_line(slide[reversed as usize]) != line {
                    flags |= MOVES_TOWARD_END;
                }
                flags
            })
            .collect();

        log::debug!("built line tables in {:?}", start.elapsed());
        Tables {
            slide: slide.into_boxed_slice(),
            gain: gain.into_boxed_slice(),
            mobility: mobility.into_boxed_slice(),
        }
    }

    /// Canonical slide: compact toward index 0, merging each pair once.
    #[inline(always)]
    pub fn slide(&self, line: Line) -> (Line, Gain) {
        let idx = line as usize;
        debug_assert!(idx < LINE_TABLE_SIZE);
        // SAFETY: every table holds LINE_TABLE_SIZE entries and a `Line` is a u16.
        unsafe { (*self.slide.get_unchecked(idx), *self.gain.get_unchecked(idx)) }
    }

    /// Slide toward index 3, via the canonical table on the reversed line.
    #[inline(always)]
    pub fn slide_reversed(&self, line: Line) -> (Line, Gain) {
        let (result, gain) = self.slide(reverse_line(line));
        (reverse_line(result), gain)
    }

    #[inline(always)]
    pub(crate) fn mobility(&self, line: Line) -> u8 {
        // SAFETY: see `slide`.
        unsafe { *self.mobility.get_unchecked(line as usize) }
    }
}

/// One canonical pass over a line.
///
/// Nonzero ranks are compacted in order, then equal neighbours are merged
/// left to right; a merged cell is consumed and cannot merge again in the same
/// pass. A pair of rank-15 tiles does not merge: rank 16 is not representable
/// in a nibble, so the pair stays blocked instead of wrapping to empty.
pub(crate) fn slide_line(line: Line) -> (Line, Gain) {
    let mut tiles = [0u8; 4];
    let mut len = 0;
    for rank in line_ranks(line) {
        if rank != 0 {
            tiles[len] = rank;
            len += 1;
        }
    }

    let mut out = [0u8; 4];
    let mut gain: Gain = 0;
    let (mut read, mut write) = (0, 0);
    while read < len {
        let rank = tiles[read];
        if read + 1 < len && tiles[read + 1] == rank && rank < MAX_RANK {
            out[write] = rank + 1;
            gain += 1 << (rank + 1);
            read += 2;
        } else {
            out[write] = rank;
            read += 1;
        }
        write += 1;
    }
    (ranks_to_line(out), gain)
}
