//! EWAH (Enhanced Word-Aligned Hybrid) compressed bitmaps.
//!
//! A compressed bitmap is a run-length, word-aligned encoding of an
//! arbitrarily large bit vector: runs of all-zero or all-one 64-bit words
//! are represented by a count rather than stored, while words that mix
//! zeros and ones ("literals" / "dirty words") are stored verbatim. This
//! is the data structure underlying reachability bitmaps and other
//! set-membership indexes over pack object positions — see
//! `git-pack::bitmap` for a read-only consumer of the same wire format.
//!
//! Bits are only ever appended ([`EwahBitmap::set`] requires
//! non-decreasing positions); there is no in-place clear of an already
//! observed bit. [`combine::or`]/[`combine::and`]/[`combine::xor`]/
//! [`combine::and_not`] merge two compressed bitmaps without fully
//! decompressing either.

pub mod bitmap;
pub mod combine;
pub mod error;
mod iter;
pub mod marker;
mod serialize;
pub mod uncompressed;
mod word_buffer;

pub use bitmap::EwahBitmap;
pub use combine::{and, and_not, negate, or, xor};
pub use error::EwahError;
pub use iter::{BitIter, WordIter};
pub use uncompressed::BitVector;
