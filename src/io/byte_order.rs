//! Byte order (endianness) handling
//!
//! Decodes multi-byte values from byte slices in either byte order. COG
//! sources are memory mapped, so every value is read straight out of the
//! mapped file rather than through a `Read` implementation.

use crate::error::{Error, Result};

/// Represents the byte order (endianness) of binary data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (least significant byte first)
    LittleEndian,
    /// Big-endian byte order (most significant byte first)
    BigEndian,
}

impl ByteOrder {
    /// Detects byte order from TIFF magic bytes
    ///
    /// TIFF files start with either "II" (0x4949) for little-endian
    /// or "MM" (0x4D4D) for big-endian.
    pub fn from_tiff_magic(magic: [u8; 2]) -> Option<Self> {
        match &magic {
            b"II" => Some(ByteOrder::LittleEndian),
            b"MM" => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }

    /// Detects the byte order from the first two bytes of a file
    pub fn detect(data: &[u8]) -> Result<Self> {
        let magic = [
            *data.first().ok_or_else(|| Error::InvalidFormat("Empty file".to_string()))?,
            *data.get(1).ok_or_else(|| Error::InvalidFormat("Truncated header".to_string()))?,
        ];

        Self::from_tiff_magic(magic).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "Invalid byte order magic bytes: {:02X}{:02X}",
                magic[0], magic[1]
            ))
        })
    }

    /// Decodes a u16 from the first two bytes of `bytes`
    pub fn u16(&self, bytes: &[u8]) -> u16 {
        let raw = [bytes[0], bytes[1]];
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(raw),
            ByteOrder::BigEndian => u16::from_be_bytes(raw),
        }
    }

    /// Decodes a u32 from the first four bytes of `bytes`
    pub fn u32(&self, bytes: &[u8]) -> u32 {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(raw),
            ByteOrder::BigEndian => u32::from_be_bytes(raw),
        }
    }

    /// Decodes a u64 from the first eight bytes of `bytes`
    pub fn u64(&self, bytes: &[u8]) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[..8]);
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(raw),
            ByteOrder::BigEndian => u64::from_be_bytes(raw),
        }
    }

    /// Decodes an f64 from the first eight bytes of `bytes`
    pub fn f64(&self, bytes: &[u8]) -> f64 {
        f64::from_bits(self.u64(bytes))
    }

    /// Bounds-checked u16 read at `offset`
    pub fn read_u16(&self, data: &[u8], offset: u64) -> Result<u16> {
        Ok(self.u16(slice_at(data, offset, 2)?))
    }

    /// Bounds-checked u32 read at `offset`
    pub fn read_u32(&self, data: &[u8], offset: u64) -> Result<u32> {
        Ok(self.u32(slice_at(data, offset, 4)?))
    }

    /// Bounds-checked u64 read at `offset`
    pub fn read_u64(&self, data: &[u8], offset: u64) -> Result<u64> {
        Ok(self.u64(slice_at(data, offset, 8)?))
    }
}

/// Returns `len` bytes of `data` starting at `offset`, or an error when the
/// range runs past the end.
pub fn slice_at(data: &[u8], offset: u64, len: usize) -> Result<&[u8]> {
    let start = usize::try_from(offset)
        .map_err(|_| Error::InvalidFormat(format!("Offset {} too large", offset)))?;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            Error::InvalidFormat(format!(
                "Read of {} bytes at offset {} past end of file ({} bytes)",
                len,
                offset,
                data.len()
            ))
        })?;
    Ok(&data[start..end])
}
