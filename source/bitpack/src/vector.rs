use crate::word::{Bitword, LANES};
use rand::Rng;

fn word_count_for(num_bits: usize) -> usize {
    let bits_per_word = Bitword::<LANES>::BITS;
    num_bits.div_ceil(bits_per_word).max(1)
}

/// A logical sequence of bits backed by a cache-aligned array of
/// [`Bitword`]s. Padding bits past the declared length are always zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<Bitword<LANES>>,
    len: usize,
}

impl BitVector {
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![Bitword::zeros(); word_count_for(len)],
            len,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn words(&self) -> &[Bitword<LANES>] {
        &self.words
    }

    pub fn words_mut(&mut self) -> &mut [Bitword<LANES>] {
        &mut self.words
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index out of bounds");
        let bits_per_word = Bitword::<LANES>::BITS;
        self.words[index / bits_per_word].get(index % bits_per_word)
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set(&mut self, index: usize, to: bool) {
        assert!(index < self.len, "bit index out of bounds");
        let bits_per_word = Bitword::<LANES>::BITS;
        self.words[index / bits_per_word].set(index % bits_per_word, to);
    }

    pub fn clear(&mut self) {
        for word in &mut self.words {
            *word = Bitword::zeros();
        }
    }

    /// Randomizes the first `n` bits using `rng`, leaving the rest zero.
    ///
    /// # Panics
    ///
    /// Panics if `n > self.len()`.
    pub fn randomize(&mut self, n: usize, rng: &mut impl Rng) {
        assert!(n <= self.len);
        for i in 0..n {
            self.set(i, rng.gen());
        }
    }

    pub fn xor_assign(&mut self, other: &BitVector) {
        assert_eq!(self.word_count(), other.word_count());
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a ^= b;
        }
    }

    pub fn and_assign(&mut self, other: &BitVector) {
        assert_eq!(self.word_count(), other.word_count());
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a &= b;
        }
    }

    pub fn or_assign(&mut self, other: &BitVector) {
        assert_eq!(self.word_count(), other.word_count());
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= b;
        }
    }

    #[must_use]
    pub fn not_zero(&self) -> bool {
        self.words.iter().any(Bitword::not_zero)
    }

    #[must_use]
    pub fn popcount(&self) -> usize {
        self.words.iter().map(|w| w.popcount() as usize).sum()
    }

    pub fn swap_with(&mut self, other: &mut BitVector) {
        assert_eq!(self.len, other.len);
        std::mem::swap(&mut self.words, &mut other.words);
    }

    #[must_use]
    pub fn support(&self) -> Vec<usize> {
        (0..self.len).filter(|&i| self.get(i)).collect()
    }

    #[must_use]
    pub fn as_view(&self) -> BitVectorView<'_> {
        BitVectorView {
            words: &self.words,
            len: self.len,
        }
    }

    pub fn as_view_mut(&mut self) -> BitVectorViewMut<'_> {
        BitVectorViewMut {
            words: &mut self.words,
            len: self.len,
        }
    }
}

impl std::fmt::Display for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.len {
            write!(f, "{}", u8::from(self.get(i)))?;
        }
        Ok(())
    }
}

/// A borrowed, read-only view over a row of a [`crate::BitTable`].
pub struct BitVectorView<'a> {
    words: &'a [Bitword<LANES>],
    len: usize,
}

impl<'a> BitVectorView<'a> {
    pub(crate) fn from_words(words: &'a [Bitword<LANES>], len: usize) -> Self {
        Self { words, len }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len);
        let bits_per_word = Bitword::<LANES>::BITS;
        self.words[index / bits_per_word].get(index % bits_per_word)
    }

    #[must_use]
    pub fn to_owned(&self) -> BitVector {
        BitVector {
            words: self.words.to_vec(),
            len: self.len,
        }
    }

    #[must_use]
    pub fn popcount(&self) -> usize {
        self.words.iter().map(|w| w.popcount() as usize).sum()
    }
}

/// A borrowed, mutable view over a row of a [`crate::BitTable`].
pub struct BitVectorViewMut<'a> {
    words: &'a mut [Bitword<LANES>],
    len: usize,
}

impl<'a> BitVectorViewMut<'a> {
    pub(crate) fn from_words(words: &'a mut [Bitword<LANES>], len: usize) -> Self {
        Self { words, len }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len);
        let bits_per_word = Bitword::<LANES>::BITS;
        self.words[index / bits_per_word].get(index % bits_per_word)
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set(&mut self, index: usize, to: bool) {
        assert!(index < self.len);
        let bits_per_word = Bitword::<LANES>::BITS;
        self.words[index / bits_per_word].set(index % bits_per_word, to);
    }

    pub fn xor_assign(&mut self, other: &BitVectorView<'_>) {
        assert_eq!(self.words.len(), other.words.len());
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a ^= b;
        }
    }

    pub fn clear(&mut self) {
        for word in self.words.iter_mut() {
            *word = Bitword::zeros();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_round_trip() {
        let mut v = BitVector::zeros(130);
        v.set(0, true);
        v.set(63, true);
        v.set(64, true);
        v.set(129, true);
        assert!(v.get(0) && v.get(63) && v.get(64) && v.get(129));
        assert!(!v.get(1));
        assert_eq!(v.popcount(), 4);
    }

    #[test]
    fn xor_assign_clears_padding_safe() {
        let mut a = BitVector::zeros(5);
        let mut b = BitVector::zeros(5);
        a.set(0, true);
        b.set(0, true);
        a.xor_assign(&b);
        assert!(!a.not_zero());
    }

    #[test]
    fn display_matches_bits() {
        let mut v = BitVector::zeros(4);
        v.set(1, true);
        v.set(3, true);
        assert_eq!(v.to_string(), "0101");
    }
}
