//! Stateful cursors over a finished [`crate::bitmap::EwahBitmap`].
//!
//! Both iterators borrow the bitmap; the borrow checker enforces the "no
//! mutation while an iterator is live" rule from the design notes, rather
//! than a runtime check.

mod bit_iter;
mod word_iter;

pub use bit_iter::BitIter;
pub use word_iter::WordIter;
