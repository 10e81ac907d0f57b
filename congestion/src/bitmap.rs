//! Relaxed atomic bitmap and its plain snapshot.
//!
//! # Invariants
//! - Bits live in `AtomicU64` words; padding bits beyond `width` stay zero
//!   because out-of-range indices are never written.
//! - `words.len() == width.div_ceil(64)`.
//!
//! # Ordering
//! Every operation is `Relaxed`. The bits carry no data dependency, and the
//! reader only needs some recent value of each word.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free bitmap with one bit per execution-context slot
pub struct AtomicBitmap {
    words: Vec<AtomicU64>,
    width: usize,
}

impl fmt::Debug for AtomicBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicBitmap")
            .field("width", &self.width)
            .field("bits", &self.snapshot())
            .finish()
    }
}

impl AtomicBitmap {
    /// Creates a cleared bitmap `width` bits wide
    pub fn new(width: usize) -> Self {
        let words = (0..width.div_ceil(64)).map(|_| AtomicU64::new(0)).collect();
        Self { words, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Sets bit `idx`; out-of-range indices are ignored
    #[inline]
    pub fn set(&self, idx: usize) {
        if idx < self.width {
            self.words[idx / 64].fetch_or(1u64 << (idx % 64), Ordering::Relaxed);
        }
    }

    /// Clears bit `idx`; out-of-range indices are ignored
    #[inline]
    pub fn clear(&self, idx: usize) {
        if idx < self.width {
            self.words[idx / 64].fetch_and(!(1u64 << (idx % 64)), Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn test(&self, idx: usize) -> bool {
        idx < self.width
            && self.words[idx / 64].load(Ordering::Relaxed) & (1u64 << (idx % 64)) != 0
    }

    /// Clears every bit
    pub fn reset(&self) {
        for word in &self.words {
            word.store(0, Ordering::Relaxed);
        }
    }

    /// Copies the bitmap word by word
    ///
    /// Words are loaded independently, so the result may mix bits from
    /// before and after a concurrent write.
    pub fn snapshot(&self) -> CongestionBits {
        CongestionBits {
            words: self
                .words
                .iter()
                .map(|word| word.load(Ordering::Relaxed))
                .collect(),
            width: self.width,
        }
    }
}

/// Plain copy of an [`AtomicBitmap`]
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CongestionBits {
    words: Vec<u64>,
    width: usize,
}

impl fmt::Debug for CongestionBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_set()).finish()
    }
}

impl CongestionBits {
    /// Empty snapshot of the given width
    pub fn empty(width: usize) -> Self {
        Self {
            words: vec![0; width.div_ceil(64)],
            width,
        }
    }

    /// Builds a snapshot with the listed bits set
    pub fn from_bits(width: usize, bits: impl IntoIterator<Item = usize>) -> Self {
        let mut snapshot = Self::empty(width);
        for idx in bits {
            if idx < width {
                snapshot.words[idx / 64] |= 1u64 << (idx % 64);
            }
        }
        snapshot
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn test(&self, idx: usize) -> bool {
        idx < self.width && self.words[idx / 64] & (1u64 << (idx % 64)) != 0
    }

    /// Number of set bits
    pub fn count(&self) -> u32 {
        self.words.iter().map(|word| word.count_ones()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    /// Indices of set bits, ascending
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width).filter(move |idx| self.test(*idx))
    }
}
