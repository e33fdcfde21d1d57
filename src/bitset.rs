//! A dense bit-set over fact indices
//!
//! Every boolean proposition in a compiled world ("fact") is an integer index,
//! and almost everything the engine does boils down to set algebra over those
//! indices. [`BitSet`] is the workhorse: cubes in a DNF, solver results and
//! opacity masks are all bit-sets.
//!
//! The subset test is the hot path of simplification (it's called millions of
//! times while pruning a large world), so [`BitSet::is_subset_of`] short-circuits
//! on the cached popcount before touching any words.

use std::fmt;

type Word = u64;
const WORD_BITS: usize = Word::BITS as usize;

/// A growable set of small non-negative integers ("facts").
///
/// Comparisons between two `BitSet`s are only meaningful when both were built
/// against the same fact universe; the set itself does not track a universe
/// size and grows on demand.
#[derive(Clone, Default)]
pub struct BitSet {
    words: Vec<Word>,
    /// Number of set bits, kept in sync by `set_bit`/`clear_bit`.
    count: usize,
}

impl BitSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        BitSet {
            words: Vec::new(),
            count: 0,
        }
    }

    /// Creates an empty set with room for `bits` facts preallocated.
    pub fn with_capacity(bits: usize) -> Self {
        BitSet {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS)),
            count: 0,
        }
    }

    /// Creates a set containing exactly the given fact.
    pub fn single(bit: usize) -> Self {
        let mut set = BitSet::new();
        set.set_bit(bit);
        set
    }

    /// Sets `bit`, if not already set. Returns `self` for chaining.
    pub fn set_bit(&mut self, bit: usize) -> &mut Self {
        let word = bit / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1 << (bit % WORD_BITS);
        if self.words[word] & mask == 0 {
            self.words[word] |= mask;
            self.count += 1;
        }
        self
    }

    /// Clears `bit`, if set. Returns `self` for chaining.
    pub fn clear_bit(&mut self, bit: usize) -> &mut Self {
        let word = bit / WORD_BITS;
        if let Some(w) = self.words.get_mut(word) {
            let mask = 1 << (bit % WORD_BITS);
            if *w & mask != 0 {
                *w &= !mask;
                self.count -= 1;
            }
        }
        self
    }

    /// Returns true iff `bit` is set.
    pub fn test(&self, bit: usize) -> bool {
        let word = bit / WORD_BITS;
        self.words
            .get(word)
            .is_some_and(|w| w & (1 << (bit % WORD_BITS)) != 0)
    }

    /// Returns a new set with the bits that are both in `self` and `other`.
    pub fn and(&self, other: &BitSet) -> BitSet {
        let len = self.words.len().min(other.words.len());
        let mut count = 0;
        let words: Vec<Word> = (0..len)
            .map(|i| {
                let w = self.words[i] & other.words[i];
                count += w.count_ones() as usize;
                w
            })
            .collect();
        BitSet { words, count }
    }

    /// Returns a new set with the bits that are in `self` or in `other`.
    pub fn or(&self, other: &BitSet) -> BitSet {
        let (long, short) = if self.words.len() >= other.words.len() {
            (&self.words, &other.words)
        } else {
            (&other.words, &self.words)
        };
        let mut count = 0;
        let words: Vec<Word> = long
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let w = w | short.get(i).copied().unwrap_or(0);
                count += w.count_ones() as usize;
                w
            })
            .collect();
        BitSet { words, count }
    }

    /// Returns true iff every bit in `self` is also set in `other`.
    ///
    /// The popcount pre-check is what makes large-scale subsumption removal
    /// affordable; don't remove it.
    pub fn is_subset_of(&self, other: &BitSet) -> bool {
        if self.count > other.count {
            return false;
        }
        self.words.iter().enumerate().all(|(i, &w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    /// Returns true iff there is a bit that's set in both `self` and `other`.
    pub fn intersects(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(&a, &b)| a & b != 0)
    }

    /// Returns true iff no bits are set.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of set bits. O(1).
    pub fn num_set_bits(&self) -> usize {
        self.count
    }

    /// Assuming that this set has exactly one set bit, returns it.
    pub fn single_set_bit(&self) -> Option<usize> {
        if self.count == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Iterates over all set bits, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let base = i * WORD_BITS;
            let mut w = word;
            std::iter::from_fn(move || {
                if w == 0 {
                    None
                } else {
                    let bit = w.trailing_zeros() as usize;
                    w &= w - 1;
                    Some(base + bit)
                }
            })
        })
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        if self.count != other.count {
            return false;
        }
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for BitSet {}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BitSet::new();
        for bit in iter {
            set.set_bit(bit);
        }
        set
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
