//! Pairwise logical combiners: OR, AND, XOR, AND-NOT.
//!
//! All four share one run-wise merge skeleton over two cursors, each
//! walking its bitmap's blocks without decompressing runs. The shorter
//! input is implicitly zero-padded up to `max(bit_size_i, bit_size_j)`.

use crate::bitmap::EwahBitmap;
use crate::marker;

fn ceil_words(bits: u64) -> u64 {
    bits.div_ceil(64)
}

#[derive(Clone, Copy)]
enum BlockKind {
    Clean(bool),
    Literal,
}

/// A read-only cursor over one bitmap's blocks, used only by the merge
/// loop. Unlike the public iterators it exposes "take k words" in bulk and
/// treats running past the end of the buffer as an infinite clean run of
/// zeros, so the merge loop doesn't need to special-case the shorter side.
struct MergeCursor<'a> {
    bitmap: &'a EwahBitmap,
    pointer: usize,
    compressed: u64,
    literals: u64,
    b: bool,
}

impl<'a> MergeCursor<'a> {
    fn new(bitmap: &'a EwahBitmap) -> Self {
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

    /// Headroom available before the next block boundary, and whether
    /// it's a clean run or a run of literals. Past the end of the buffer,
    /// reports an unbounded clean run of zeros.
    fn headroom(&mut self) -> (BlockKind, u64) {
        loop {
            if self.compressed > 0 {
                return (BlockKind::Clean(self.b), self.compressed);
            }
            if self.literals > 0 {
                return (BlockKind::Literal, self.literals);
            }
            if !self.load_marker() {
                return (BlockKind::Clean(false), u64::MAX);
            }
        }
    }

    fn consume_clean(&mut self, k: u64) {
        self.compressed = self.compressed.saturating_sub(k);
    }

    fn take_literals(&mut self, k: u64) -> Vec<u64> {
        let mut out = Vec::with_capacity(k as usize);
        for _ in 0..k {
            if self.literals > 0 {
                out.push(self.bitmap.buffer.get(self.pointer));
                self.pointer += 1;
                self.literals -= 1;
            } else {
                out.push(0);
            }
        }
        out
    }
}

/// Combine `a` and `b` word-by-word through `op`, which must be a bitwise
/// word operator (one whose per-bit result depends only on the
/// corresponding bits of its two operands — true of AND/OR/XOR/AND-NOT).
fn merge(a: &EwahBitmap, b: &EwahBitmap, op: fn(u64, u64) -> u64) -> EwahBitmap {
    let mut out = EwahBitmap::new();
    let mut ca = MergeCursor::new(a);
    let mut cb = MergeCursor::new(b);

    let total_words = ceil_words(a.bit_size.max(b.bit_size));
    let mut done = 0u64;

    while done < total_words {
        let (kind_a, avail_a) = ca.headroom();
        let (kind_b, avail_b) = cb.headroom();
        let step = avail_a.min(avail_b).min(total_words - done);

        match (kind_a, kind_b) {
            (BlockKind::Clean(fi), BlockKind::Clean(fj)) => {
                let fill = op(marker::fill_word(fi), marker::fill_word(fj)) != 0;
                out.add_empty_words(fill, step);
                ca.consume_clean(step);
                cb.consume_clean(step);
            }
            (BlockKind::Clean(fi), BlockKind::Literal) => {
                let fw = marker::fill_word(fi);
                let lits = cb.take_literals(step);
                emit_fixed_side(&mut out, op(fw, 0), op(fw, u64::MAX), &lits);
                ca.consume_clean(step);
            }
            (BlockKind::Literal, BlockKind::Clean(fj)) => {
                let fw = marker::fill_word(fj);
                let lits = ca.take_literals(step);
                emit_fixed_side(&mut out, op(0, fw), op(u64::MAX, fw), &lits);
                cb.consume_clean(step);
            }
            (BlockKind::Literal, BlockKind::Literal) => {
                let la = ca.take_literals(step);
                let lb = cb.take_literals(step);
                let mapped: Vec<u64> = la.iter().zip(lb.iter()).map(|(&x, &y)| op(x, y)).collect();
                out.add_dirty_words(&mapped, false);
            }
        }

        done += step;
    }

    out.bit_size = a.bit_size.max(b.bit_size);
    out.mask_tail_literal();
    out
}

/// One side of the merge is a uniform word (`probe0`/`probe1` are what
/// `op` produces when the other side is all-zeros / all-ones respectively,
/// both necessarily uniform words themselves); reconstruct the per-word
/// result for the varying literal side, or collapse to a clean run when
/// the uniform side makes the whole step constant.
fn emit_fixed_side(out: &mut EwahBitmap, probe0: u64, probe1: u64, literals: &[u64]) {
    if probe0 == probe1 {
        out.add_empty_words(probe0 != 0, literals.len() as u64);
        return;
    }
    let mapped: Vec<u64> = literals.iter().map(|&l| (probe0 & !l) | (probe1 & l)).collect();
    out.add_dirty_words(&mapped, false);
}

pub fn or(a: &EwahBitmap, b: &EwahBitmap) -> EwahBitmap {
    merge(a, b, |x, y| x | y)
}

pub fn and(a: &EwahBitmap, b: &EwahBitmap) -> EwahBitmap {
    merge(a, b, |x, y| x & y)
}

pub fn xor(a: &EwahBitmap, b: &EwahBitmap) -> EwahBitmap {
    merge(a, b, |x, y| x ^ y)
}

/// `a AND NOT b` — bits set in `a` that are not set in `b`.
pub fn and_not(a: &EwahBitmap, b: &EwahBitmap) -> EwahBitmap {
    merge(a, b, |x, y| x & !y)
}

/// A fresh bitmap with every bit of `a` flipped, as a new value rather
/// than `EwahBitmap::not`'s in-place mutation.
pub fn negate(a: &EwahBitmap) -> EwahBitmap {
    let mut out = a.clone();
    out.not();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_bits(bits: &[u64]) -> EwahBitmap {
        let mut b = EwahBitmap::new();
        for &i in bits {
            b.set(i);
        }
        b
    }

    fn positions(b: &EwahBitmap) -> Vec<u32> {
        b.bit_iter().collect()
    }

    #[test]
    fn small_pairwise_combine() {
        let a = from_bits(&[0, 1, 2]);
        let b = from_bits(&[2, 3, 4]);

        assert_eq!(positions(&or(&a, &b)), vec![0, 1, 2, 3, 4]);
        assert_eq!(positions(&and(&a, &b)), vec![2]);
        assert_eq!(positions(&xor(&a, &b)), vec![0, 1, 3, 4]);
        assert_eq!(positions(&and_not(&a, &b)), vec![0, 1]);
    }

    #[test]
    fn or_is_commutative() {
        let a = from_bits(&[1, 500, 9000]);
        let b = from_bits(&[2, 500, 8000]);
        assert_eq!(or(&a, &b), or(&b, &a));
    }

    #[test]
    fn and_is_commutative() {
        let a = from_bits(&[1, 500, 9000]);
        let b = from_bits(&[2, 500, 8000]);
        assert_eq!(and(&a, &b), and(&b, &a));
    }

    #[test]
    fn xor_is_commutative() {
        let a = from_bits(&[1, 500, 9000]);
        let b = from_bits(&[2, 500, 8000]);
        assert_eq!(xor(&a, &b), xor(&b, &a));
    }

    #[test]
    fn idempotent_self_combine() {
        let a = from_bits(&[3, 70, 9999]);
        assert_eq!(or(&a, &a), a);
        assert_eq!(and(&a, &a), a);
        assert_eq!(xor(&a, &a).popcount(), 0);
    }

    #[test]
    fn and_not_equals_and_with_negation() {
        let a = from_bits(&[0, 1, 2, 300]);
        let b = from_bits(&[2, 3, 300]);
        let via_not = and(&a, &negate(&b));
        // `negate(b)` flips within `b.bit_size()`; restrict the comparison
        // to max(|a|, |b|) bits the way the algebraic law is stated.
        assert_eq!(positions(&and_not(&a, &b)), vec![0, 1]);
        assert_eq!(
            positions(&via_not)
                .into_iter()
                .filter(|&p| (p as u64) < a.bit_size().max(b.bit_size()))
                .collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn handles_mismatched_lengths_via_zero_padding() {
        let short = from_bits(&[1, 2]);
        let mut long = EwahBitmap::new();
        long.set(1);
        long.set(5000);

        let result = or(&short, &long);
        assert_eq!(result.bit_size(), long.bit_size());
        assert_eq!(positions(&result), vec![1, 2, 5000]);
    }

    #[test]
    fn large_clean_runs_combine_without_materializing_words() {
        let mut a = EwahBitmap::new();
        a.add_empty_words(true, 2_000);
        let mut b = EwahBitmap::new();
        b.add_empty_words(false, 2_000);

        let r = and(&a, &b);
        assert_eq!(r.popcount(), 0);
        assert_eq!(r.word_iter().count() as u64, 2_000);
        assert_eq!(r.buffer.len(), 1, "a single clean-run marker, no literals");
    }
}
