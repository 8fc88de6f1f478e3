use crate::bitmap::EwahBitmap;
use crate::marker;

/// Yields consecutive uncompressed 64-bit words of a bitmap.
///
/// Yields exactly `ceil(bit_size / 64)` words for a non-empty bitmap. The
/// final word's bits above `bit_size % 64` are whatever the underlying
/// literal holds; callers that need exact truncation should mask using
/// `bit_size`.
pub struct WordIter<'a> {
    bitmap: &'a EwahBitmap,
    /// Index of the next buffer word to read (marker or literal).
    pointer: usize,
    /// Remaining clean words in the current block.
    compressed: u64,
    /// Remaining literal words in the current block.
    literals: u64,
    /// Fill bit of the current block's clean run.
    b: bool,
}

impl<'a> WordIter<'a> {
    pub(crate) fn new(bitmap: &'a EwahBitmap) -> Self {
        Self {
            bitmap,
            pointer: 0,
            compressed: 0,
            literals: 0,
            b: false,
        }
    }

    fn load_marker(&mut self) -> bool {
        if self.pointer >= self.bitmap.buffer.len() {
            return false;
        }
        let marker = self.bitmap.buffer.get(self.pointer);
        self.pointer += 1;
        self.compressed = marker::run_length(marker);
        self.literals = marker::literal_count(marker);
        self.b = marker::fill_bit(marker);
        true
    }
}

impl<'a> Iterator for WordIter<'a> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if self.compressed > 0 {
                self.compressed -= 1;
                return Some(marker::fill_word(self.b));
            }
            if self.literals > 0 {
                let w = self.bitmap.buffer.get(self.pointer);
                self.pointer += 1;
                self.literals -= 1;
                return Some(w);
            }
            if !self.load_marker() {
                return None;
            }
        }
    }
}
