//! PackBits decompression
//!
//! PackBits is the Macintosh run-length scheme TIFF adopted as compression 32773.

use crate::error::{Error, Result};

/// Decompresses PackBits compressed data
///
/// - header in 0..=127: copy the next `header + 1` bytes literally
/// - header in -127..=-1: repeat the next byte `1 - header` times
/// - header == -128: no-op
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_len);
    let mut rest = data;

    while let Some((&header, tail)) = rest.split_first() {
        let header = header as i8;
        rest = tail;

        if header == -128 {
            continue;
        }

        if header >= 0 {
            let count = header as usize + 1;
            if rest.len() < count {
                return Err(Error::InvalidFormat("PackBits: truncated literal run".to_string()));
            }
            output.extend_from_slice(&rest[..count]);
            rest = &rest[count..];
        } else {
            let (&byte, tail) = rest
                .split_first()
                .ok_or_else(|| Error::InvalidFormat("PackBits: missing run byte".to_string()))?;
            let count = (1 - header as isize) as usize;
            output.resize(output.len() + count, byte);
            rest = tail;
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_runs() {
        let data = vec![1, 0x41, 0x42, (-2i8) as u8, 0x55, (-128i8) as u8, 0, 0x43];
        let result = decompress(&data, 6).unwrap();
        assert_eq!(result, vec![0x41, 0x42, 0x55, 0x55, 0x55, 0x43]);
    }

    #[test]
    fn test_truncated_literal() {
        assert!(decompress(&[3, 0x41], 4).is_err());
        assert!(decompress(&[(-3i8) as u8], 4).is_err());
    }
}
