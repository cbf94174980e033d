//! JPEG decompression for TIFF tiles

use crate::error::{Error, Result};

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Decompresses a JPEG tile, splicing in the shared `JPEGTables` stream
/// when the tile is an abbreviated stream.
pub fn decompress(data: &[u8], tables: Option<&[u8]>) -> Result<Vec<u8>> {
    let stream = match tables {
        Some(tables) if tables.len() > 4 && data.starts_with(&SOI) => splice_tables(tables, data),
        _ => data.to_vec(),
    };

    let mut decoder = jpeg_decoder::Decoder::new(stream.as_slice());
    decoder
        .decode()
        .map_err(|e| Error::InvalidFormat(format!("JPEG error: {}", e)))
}

/// Tables stream without its EOI followed by the tile stream without its SOI
fn splice_tables(tables: &[u8], data: &[u8]) -> Vec<u8> {
    let tables = tables.strip_suffix(&EOI).unwrap_or(tables);
    let mut stream = Vec::with_capacity(tables.len() + data.len());
    stream.extend_from_slice(tables);
    stream.extend_from_slice(&data[SOI.len()..]);
    stream
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_jpeg() {
        let data = vec![0xFF, 0xD8, 0xFF, 0xE0];
        assert!(decompress(&data, None).is_err());
    }

    #[test]
    fn test_splice_tables() {
        let tables = [0xFF, 0xD8, 0xFF, 0xDB, 0x01, 0xFF, 0xD9];
        let tile = [0xFF, 0xD8, 0xFF, 0xDA, 0x02, 0xFF, 0xD9];
        let spliced = splice_tables(&tables, &tile);
        assert_eq!(spliced, vec![0xFF, 0xD8, 0xFF, 0xDB, 0x01, 0xFF, 0xDA, 0x02, 0xFF, 0xD9]);
    }
}
