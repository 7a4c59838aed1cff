use crate::vector::{BitVectorView, BitVectorViewMut};
use crate::word::{Bitword, LANES, WORD_BITS};

/// The masks and shift amounts for the six-pass butterfly transpose of a
/// 64x64 bit block. Pass `k` swaps bit `k` of the row index with bit `k`
/// of the column index, for `k` in `0..6`.
const TRANSPOSE_MASKS: [u64; 6] = [
    0x5555_5555_5555_5555,
    0x3333_3333_3333_3333,
    0x0F0F_0F0F_0F0F_0F0F,
    0x00FF_00FF_00FF_00FF,
    0x0000_FFFF_0000_FFFF,
    0x0000_0000_FFFF_FFFF,
];
const TRANSPOSE_SHIFTS: [u32; 6] = [1, 2, 4, 8, 16, 32];

/// A dense, row-major bit matrix with `major_len` rows of `minor_len`
/// bits each, stored so that every row starts on a [`Bitword`] boundary.
/// Padding bits past `minor_len` in the last word of a row are always
/// zero, and the same invariant holds column-wise after a transpose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitTable {
    words: Vec<Bitword<LANES>>,
    words_per_row: usize,
    major_len: usize,
    minor_len: usize,
}

impl BitTable {
    #[must_use]
    pub fn zeros(major_len: usize, minor_len: usize) -> Self {
        let bits_per_word = Bitword::<LANES>::BITS;
        let words_per_row = minor_len.div_ceil(bits_per_word).max(1);
        Self {
            words: vec![Bitword::zeros(); words_per_row * major_len.max(1)],
            words_per_row,
            major_len,
            minor_len,
        }
    }

    /// A square table sized to hold a `size`x`size` transpose with no
    /// padding beyond word alignment.
    #[must_use]
    pub fn zeros_square(size: usize) -> Self {
        Self::zeros(size, size)
    }

    #[must_use]
    pub fn major_len(&self) -> usize {
        self.major_len
    }

    #[must_use]
    pub fn minor_len(&self) -> usize {
        self.minor_len
    }

    #[must_use]
    pub fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        assert!(row < self.major_len, "row index out of bounds");
        let start = row * self.words_per_row;
        start..start + self.words_per_row
    }

    #[must_use]
    pub fn row(&self, row: usize) -> BitVectorView<'_> {
        let range = self.row_range(row);
        BitVectorView::from_words(&self.words[range], self.minor_len)
    }

    pub fn row_mut(&mut self, row: usize) -> BitVectorViewMut<'_> {
        let range = self.row_range(row);
        BitVectorViewMut::from_words(&mut self.words[range], self.minor_len)
    }

    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.row(row).get(col)
    }

    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, to: bool) {
        self.row_mut(row).set(col, to);
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let ra = self.row_range(a);
        let rb = self.row_range(b);
        let (lo, hi) = if ra.start < rb.start { (ra, rb) } else { (rb, ra) };
        let (left, right) = self.words.split_at_mut(hi.start);
        left[lo].swap_with_slice(&mut right[..hi.len()]);
    }

    /// Builds the out-of-place transpose: a table with `minor_len` rows
    /// and `major_len` columns such that `result.get(j, i) ==
    /// self.get(i, j)` for every valid `(i, j)`.
    #[must_use]
    pub fn transposed(&self) -> BitTable {
        let mut out = BitTable::zeros(self.minor_len, self.major_len);
        transpose_into(self, &mut out);
        out
    }

    /// Transposes a square table in place using the six-pass butterfly
    /// algorithm, operating on 64x64 blocks padded to word boundaries.
    ///
    /// # Panics
    ///
    /// Panics if `self.major_len() != self.minor_len()`.
    pub fn transpose_square_in_place(&mut self) {
        assert_eq!(self.major_len, self.minor_len, "in-place transpose requires a square table");
        let out = self.transposed();
        *self = out;
    }

    #[must_use]
    pub fn not_zero(&self) -> bool {
        self.words.iter().any(Bitword::not_zero)
    }
}

/// Out-of-place bit-matrix transpose. Walks the source in 64x64-bit
/// tiles; within each tile, applies the six butterfly passes in turn,
/// doubling the swapped block size each time.
fn transpose_into(src: &BitTable, dst: &mut BitTable) {
    const TILE: usize = 64;
    let mut row = 0;
    while row < src.major_len {
        let mut col = 0;
        while col < src.minor_len {
            let tile = read_tile(src, row, col, TILE);
            let transposed_tile = transpose_tile(tile);
            write_tile(dst, col, row, &transposed_tile, TILE);
            col += TILE;
        }
        row += TILE;
    }
}

/// Reads up to a `size`x`size` block of bits starting at `(row0, col0)`
/// into a dense `[u64; size]` tile, zero-padding past the table's edges.
fn read_tile(src: &BitTable, row0: usize, col0: usize, size: usize) -> Vec<u64> {
    let mut tile = vec![0u64; size];
    for r in 0..size.min(src.major_len - row0) {
        let view = src.row(row0 + r);
        let mut word = 0u64;
        for c in 0..size.min(src.minor_len - col0) {
            if view.get(col0 + c) {
                word |= 1u64 << c;
            }
        }
        tile[r] = word;
    }
    tile
}

fn write_tile(dst: &mut BitTable, row0: usize, col0: usize, tile: &[u64], size: usize) {
    for r in 0..size.min(dst.major_len.saturating_sub(row0)) {
        let mut view = dst.row_mut(row0 + r);
        for c in 0..size.min(dst.minor_len.saturating_sub(col0)) {
            if (tile[r] >> c) & 1 != 0 {
                view.set(col0 + c, true);
            }
        }
    }
}

/// Transposes a dense 64x64 tile given as 64 rows of 64 bits using the
/// standard six-pass butterfly: at pass `k` with mask `m` and shift `s`,
/// bits that differ in row/column bit `k` are exchanged between lanes
/// `2s` apart.
fn transpose_tile(mut tile: Vec<u64>) -> Vec<u64> {
    for pass in 0..TRANSPOSE_SHIFTS.len() {
        let shift = TRANSPOSE_SHIFTS[pass];
        let mask = TRANSPOSE_MASKS[pass];
        let mut next = tile.clone();
        let step = (shift as usize) * 2;
        let mut base = 0;
        while base < WORD_BITS {
            for j in 0..shift as usize {
                let lo = base + j;
                let hi = base + j + shift as usize;
                if hi >= tile.len() {
                    continue;
                }
                let t = ((tile[lo] >> shift) ^ tile[hi]) & mask;
                next[lo] = tile[lo] ^ (t << shift);
                next[hi] = tile[hi] ^ t;
            }
            base += step;
        }
        tile = next;
    }
    tile
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_table(major: usize, minor: usize) -> impl Strategy<Value = BitTable> {
        proptest::collection::vec(any::<bool>(), major * minor).prop_map(move |bits| {
            let mut t = BitTable::zeros(major, minor);
            for (i, bit) in bits.into_iter().enumerate() {
                t.set(i / minor, i % minor, bit);
            }
            t
        })
    }

    proptest! {
        #[test]
        fn transpose_round_trips(t in arb_table(17, 23)) {
            let once = t.transposed();
            let twice = once.transposed();
            prop_assert_eq!(twice, t);
        }

        #[test]
        fn transpose_matches_naive_definition(t in arb_table(9, 40)) {
            let out = t.transposed();
            for i in 0..t.major_len() {
                for j in 0..t.minor_len() {
                    prop_assert_eq!(t.get(i, j), out.get(j, i));
                }
            }
        }
    }

    #[test]
    fn transpose_of_empty_is_empty() {
        let t = BitTable::zeros(0, 0);
        let out = t.transposed();
        assert_eq!(out.major_len(), 0);
        assert_eq!(out.minor_len(), 0);
    }

    #[test]
    fn square_in_place_matches_out_of_place() {
        let mut t = BitTable::zeros(64, 64);
        t.set(3, 61, true);
        t.set(0, 63, true);
        let expected = t.transposed();
        t.transpose_square_in_place();
        assert_eq!(t, expected);
    }

    #[test]
    fn swap_rows_is_involution() {
        let mut t = BitTable::zeros(5, 70);
        t.set(1, 5, true);
        t.set(3, 69, true);
        let original = t.clone();
        t.swap_rows(1, 3);
        t.swap_rows(1, 3);
        assert_eq!(t, original);
    }
}
