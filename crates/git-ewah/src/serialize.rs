//! Fixed-layout, big-endian serialization:
//!
//! ```text
//! u32 bit_size
//! u32 num_words
//! u64 word[0..num_words]   (big-endian)
//! u32 rlw_offset
//! ```
//!
//! Routed through abstract `std::io::Read`/`Write` rather than a concrete
//! file descriptor, matching `PackWriter`'s `io::Write`-generic style.

use std::io::{Read, Write};

use crate::bitmap::EwahBitmap;
use crate::error::EwahError;
use crate::word_buffer::WordBuffer;

impl EwahBitmap {
    /// Serialize in the fixed big-endian layout. Fails with
    /// [`EwahError::TooLarge`] rather than truncating if `bit_size` or the
    /// word count don't fit in 32 bits.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<(), EwahError> {
        let bit_size = u32::try_from(self.bit_size)
            .map_err(|_| EwahError::TooLarge { field: "bit_size", value: self.bit_size })?;
        let num_words = u32::try_from(self.buffer.len())
            .map_err(|_| EwahError::TooLarge { field: "num_words", value: self.buffer.len() as u64 })?;
        let rlw_offset = u32::try_from(self.rlw_index)
            .map_err(|_| EwahError::TooLarge { field: "rlw_offset", value: self.rlw_index as u64 })?;

        w.write_all(&bit_size.to_be_bytes())?;
        w.write_all(&num_words.to_be_bytes())?;
        for i in 0..self.buffer.len() {
            w.write_all(&self.buffer.get(i).to_be_bytes())?;
        }
        w.write_all(&rlw_offset.to_be_bytes())?;
        Ok(())
    }

    /// Deserialize a bitmap written by [`EwahBitmap::serialize`].
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self, EwahError> {
        let bit_size = read_u32(r)?;
        let num_words = read_u32(r)?;

        let mut buffer = WordBuffer::new();
        for _ in 0..num_words {
            buffer.push(read_u64(r)?);
        }

        let rlw_offset = read_u32(r)?;
        if num_words == 0 {
            return Err(EwahError::Corrupt("bitmap stream has zero words, no marker present".into()));
        }
        if rlw_offset >= num_words {
            return Err(EwahError::Corrupt(format!(
                "rlw_offset {rlw_offset} out of range for {num_words} words"
            )));
        }

        Ok(Self {
            buffer,
            bit_size: bit_size as u64,
            rlw_index: rlw_offset as usize,
        })
    }
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32, EwahError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64, EwahError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_deserialize_round_trip() {
        let mut b = EwahBitmap::new();
        for i in [3u64, 32, 48, 63, 1024, 7600] {
            b.set(i);
        }

        let mut bytes = Vec::new();
        b.serialize(&mut bytes).unwrap();

        let mut cursor = &bytes[..];
        let restored = EwahBitmap::deserialize(&mut cursor).unwrap();

        assert_eq!(restored, b);
        assert_eq!(restored.bit_size, b.bit_size);
        assert_eq!(restored.rlw_index, b.rlw_index);
        assert_eq!(restored.bit_iter().collect::<Vec<_>>(), b.bit_iter().collect::<Vec<_>>());
    }

    #[test]
    fn round_trip_empty_bitmap() {
        let b = EwahBitmap::new();
        let mut bytes = Vec::new();
        b.serialize(&mut bytes).unwrap();
        let mut cursor = &bytes[..];
        let restored = EwahBitmap::deserialize(&mut cursor).unwrap();
        assert_eq!(restored, b);
    }

    #[test]
    fn wire_format_is_big_endian() {
        let mut b = EwahBitmap::new();
        b.set(0);
        let mut bytes = Vec::new();
        b.serialize(&mut bytes).unwrap();

        let bit_size = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(bit_size, 1);
    }

    #[test]
    fn short_read_is_an_io_error() {
        let truncated = [0u8; 3];
        let mut cursor = &truncated[..];
        let err = EwahBitmap::deserialize(&mut cursor).unwrap_err();
        assert!(matches!(err, EwahError::Io(_)));
    }

    #[test]
    fn bad_rlw_offset_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_be_bytes()); // bit_size
        bytes.extend_from_slice(&1u32.to_be_bytes()); // num_words
        bytes.extend_from_slice(&0u64.to_be_bytes()); // the one word
        bytes.extend_from_slice(&5u32.to_be_bytes()); // rlw_offset, out of range

        let mut cursor = &bytes[..];
        let err = EwahBitmap::deserialize(&mut cursor).unwrap_err();
        assert!(matches!(err, EwahError::Corrupt(_)));
    }
}
