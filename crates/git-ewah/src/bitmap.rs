//! The compressed bitmap type and its builder operations.
//!
//! A bitmap is a sequence of blocks `[marker | literal_1 .. literal_L]`
//! (see [`crate::marker`] for the marker word layout). The builder only
//! ever appends; bits already observed are never cleared in place.

use crate::iter::{BitIter, WordIter};
use crate::marker::{self, MAX_LITERAL_COUNT, MAX_RUN_LENGTH};
use crate::word_buffer::WordBuffer;

/// An EWAH (Enhanced Word-Aligned Hybrid) compressed bitmap.
#[derive(Debug, Clone)]
pub struct EwahBitmap {
    pub(crate) buffer: WordBuffer,
    pub(crate) bit_size: u64,
    /// Index of the active marker within `buffer`.
    pub(crate) rlw_index: usize,
}

impl EwahBitmap {
    pub fn new() -> Self {
        let mut buffer = WordBuffer::new();
        buffer.push(marker::make(false, 0, 0));
        Self {
            buffer,
            bit_size: 0,
            rlw_index: 0,
        }
    }

    /// Reset to the empty bitmap, keeping allocated capacity.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.buffer.push(marker::make(false, 0, 0));
        self.bit_size = 0;
        self.rlw_index = 0;
    }

    pub fn bit_size(&self) -> u64 {
        self.bit_size
    }

    pub fn is_empty(&self) -> bool {
        self.bit_size == 0
    }

    pub(crate) fn active_marker(&self) -> u64 {
        self.buffer.get(self.rlw_index)
    }

    /// Push a fresh all-zero marker and make it the active one.
    fn open_new_marker(&mut self) {
        self.buffer.push(marker::make(false, 0, 0));
        self.rlw_index = self.buffer.len() - 1;
    }

    /// Extend the logical bit string by `n` clean words of value `v`.
    ///
    /// Returns the number of words represented by the call (always `n`);
    /// the active marker may saturate and spill into several markers, but
    /// that spilling is an implementation detail, not a partial failure.
    pub fn add_empty_words(&mut self, v: bool, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }

        let marker = self.active_marker();
        let can_extend =
            marker::literal_count(marker) == 0 && (marker::run_length(marker) == 0 || marker::fill_bit(marker) == v);

        let mut remaining = n;
        if can_extend {
            let space = MAX_RUN_LENGTH - marker::run_length(marker);
            let add = space.min(n);
            let marker = marker::with_fill_bit(marker, v);
            let marker = marker::with_run_length(marker, marker::run_length(marker) + add);
            self.buffer.set(self.rlw_index, marker);
            remaining = n - add;
        }
        // When the active marker can't be extended (it already carries
        // literals, or its fill bit disagrees with `v`), the loop below
        // opens a fresh one on its first iteration.

        while remaining > 0 {
            self.open_new_marker();
            let chunk = remaining.min(MAX_RUN_LENGTH);
            self.buffer.set(self.rlw_index, marker::make(v, chunk, 0));
            remaining -= chunk;
        }

        self.bit_size += 64 * n;
        n
    }

    /// Append `words.len()` literal words, optionally bitwise-negated during
    /// the copy. Splits across fresh markers when the active marker's
    /// 31-bit literal counter would overflow.
    pub fn add_dirty_words(&mut self, words: &[u64], negate: bool) -> u64 {
        let n = words.len();
        if n == 0 {
            return 0;
        }

        let mut idx = 0;
        while idx < n {
            let marker = self.active_marker();
            if marker::literal_count(marker) >= MAX_LITERAL_COUNT {
                self.open_new_marker();
            }
            let marker = self.active_marker();
            let space = MAX_LITERAL_COUNT - marker::literal_count(marker);
            let chunk = space.min((n - idx) as u64) as usize;

            for &w in &words[idx..idx + chunk] {
                self.buffer.push(if negate { !w } else { w });
            }

            let marker = self.active_marker();
            let marker = marker::with_literal_count(marker, marker::literal_count(marker) + chunk as u64);
            self.buffer.set(self.rlw_index, marker);
            idx += chunk;
        }

        self.bit_size += 64 * n as u64;
        n as u64
    }

    /// Set the bit at absolute position `i`.
    ///
    /// Positions must be non-decreasing across calls (repeating the most
    /// recently set position is allowed and a no-op); violating this is a
    /// programming error and panics.
    pub fn set(&mut self, i: u64) {
        assert!(
            i + 1 >= self.bit_size,
            "ewah set() requires non-decreasing positions: got {i}, bit_size is {}",
            self.bit_size
        );

        let target_word = i / 64;
        let bit_in_word = i % 64;

        if self.bit_size > 0 {
            let last_word = (self.bit_size - 1) / 64;
            if target_word == last_word {
                let marker = self.active_marker();
                if marker::literal_count(marker) > 0 {
                    let last = self.buffer.len() - 1;
                    let w = self.buffer.get(last);
                    self.buffer.set(last, w | (1u64 << bit_in_word));
                } else if !marker::fill_bit(marker) {
                    // The tail word is still folded into a clean run of
                    // zeros with no literal to OR into. Split it off: the
                    // run shrinks by the one word that now needs to carry
                    // this bit, which becomes a fresh literal.
                    let run = marker::run_length(marker);
                    self.buffer
                        .set(self.rlw_index, marker::with_run_length(marker, run - 1));
                    self.add_dirty_words(&[1u64 << bit_in_word], false);
                }
                // If the run's fill bit is already 1, the bit is already
                // logically set and the run representation doesn't need
                // to change.
                self.bit_size = i + 1;
                return;
            }
            let gap = target_word - last_word - 1;
            if gap > 0 {
                self.add_empty_words(false, gap);
            }
        } else if target_word > 0 {
            self.add_empty_words(false, target_word);
        }

        self.add_dirty_words(&[1u64 << bit_in_word], false);
        self.bit_size = i + 1;
    }

    /// Flip every bit in place: negate markers' fill bit and bitwise-negate
    /// every literal. Linear in buffer size.
    pub fn not(&mut self) {
        let mut pos = 0;
        while pos < self.buffer.len() {
            let marker = self.buffer.get(pos);
            self.buffer
                .set(pos, marker::with_fill_bit(marker, !marker::fill_bit(marker)));

            let lit = marker::literal_count(marker) as usize;
            for k in 0..lit {
                let idx = pos + 1 + k;
                let w = self.buffer.get(idx);
                self.buffer.set(idx, !w);
            }
            pos += 1 + lit;
        }

        self.mask_tail_literal();
    }

    /// Zero out the unused high bits of the final literal so that no
    /// operation can leave observable garbage above `bit_size`.
    pub(crate) fn mask_tail_literal(&mut self) {
        let valid_bits = self.bit_size % 64;
        if valid_bits == 0 {
            return;
        }
        let marker = self.active_marker();
        if marker::literal_count(marker) == 0 {
            return;
        }
        let last = self.buffer.len() - 1;
        let mask = (1u64 << valid_bits) - 1;
        let w = self.buffer.get(last);
        self.buffer.set(last, w & mask);
    }

    /// Number of set bits.
    pub fn popcount(&self) -> u64 {
        self.bit_iter().count() as u64
    }

    /// Visit every set bit in ascending order; stop early if `visitor`
    /// returns `false`.
    pub fn each_bit(&self, mut visitor: impl FnMut(u32) -> bool) {
        for pos in self.bit_iter() {
            if !visitor(pos) {
                break;
            }
        }
    }

    pub fn word_iter(&self) -> WordIter<'_> {
        WordIter::new(self)
    }

    pub fn bit_iter(&self) -> BitIter<'_> {
        BitIter::new(self)
    }

    /// Diagnostic textual dump (unspecified, unstable layout — for
    /// debugging and test failure messages only).
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut pos = 0;
        while pos < self.buffer.len() {
            let marker = self.buffer.get(pos);
            let lit = marker::literal_count(marker) as usize;
            out.push_str(&format!(
                "marker[b={} run={} lit={}]",
                marker::fill_bit(marker) as u8,
                marker::run_length(marker),
                lit
            ));
            for k in 0..lit {
                out.push_str(&format!(" {:016x}", self.buffer.get(pos + 1 + k)));
            }
            out.push('\n');
            pos += 1 + lit;
        }
        out
    }
}

impl Default for EwahBitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for EwahBitmap {
    fn eq(&self, other: &Self) -> bool {
        if self.bit_size != other.bit_size {
            return false;
        }
        self.masked_words() == other.masked_words()
    }
}

impl Eq for EwahBitmap {}

impl EwahBitmap {
    /// Words yielded by the word iterator, with the tail word's unused
    /// high bits zeroed, used for logical (as opposed to byte-for-byte)
    /// equality.
    fn masked_words(&self) -> Vec<u64> {
        let mut words: Vec<u64> = self.word_iter().collect();
        if let Some(last) = words.last_mut() {
            let valid_bits = self.bit_size % 64;
            if valid_bits != 0 {
                *last &= (1u64 << valid_bits) - 1;
            }
        }
        words
    }
}
