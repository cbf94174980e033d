//! Tile decompression for the TIFF compression schemes found in COGs

pub mod deflate;
pub mod lzw;
pub mod packbits;
pub mod jpeg;

use crate::error::{Error, Result};

/// Compression types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression
    None,
    /// Deflate/ZIP compression (Adobe and legacy tag values)
    Deflate,
    /// LZW compression
    Lzw,
    /// PackBits compression
    PackBits,
    /// JPEG compression (TIFF technote 2)
    Jpeg,
}

impl Compression {
    /// Creates compression from TIFF compression tag value
    pub fn from_tag(value: u64) -> Result<Self> {
        match value {
            1 => Ok(Compression::None),
            5 => Ok(Compression::Lzw),
            7 => Ok(Compression::Jpeg),
            8 | 32946 => Ok(Compression::Deflate),
            32773 => Ok(Compression::PackBits),
            _ => Err(Error::Unsupported(format!("Compression type {}", value))),
        }
    }

    /// Returns the name of this compression type
    pub fn name(&self) -> &'static str {
        match self {
            Compression::None => "None",
            Compression::Deflate => "Deflate/ZIP",
            Compression::Lzw => "LZW",
            Compression::PackBits => "PackBits",
            Compression::Jpeg => "JPEG",
        }
    }

    /// Decompresses one tile or strip
    ///
    /// `expected_len` is the decoded size implied by the tile geometry and is
    /// only used to size buffers. `jpeg_tables` carries the shared
    /// `JPEGTables` stream when the file has one.
    pub fn decompress(
        &self,
        data: &[u8],
        expected_len: usize,
        jpeg_tables: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Deflate => deflate::decompress(data, expected_len),
            Compression::Lzw => lzw::decompress(data, expected_len),
            Compression::PackBits => packbits::decompress(data, expected_len),
            Compression::Jpeg => jpeg::decompress(data, jpeg_tables),
        }
    }
}
