//! Parallel chunk decoding

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::warn;

use crate::io::ByteOrder;
use super::tiles::ChunkLayout;

/// Decodes the given chunks on the rayon pool
///
/// A chunk that fails to decode is logged and left out of the map, so
/// callers read its pixels as missing rather than failing the whole read.
pub fn load_chunks_parallel(
    layout: &ChunkLayout,
    data: &[u8],
    byte_order: ByteOrder,
    indices: &[usize],
) -> HashMap<usize, Vec<u8>> {
    indices
        .par_iter()
        .filter_map(|&index| match layout.load_chunk(data, byte_order, index) {
            Ok(chunk) => Some((index, chunk)),
            Err(e) => {
                warn!(chunk = index, error = %e, "failed to decode chunk, treating as empty");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Compression;
    use crate::types::DataType;

    fn layout(offsets: Vec<u64>, byte_counts: Vec<u64>) -> ChunkLayout {
        ChunkLayout {
            width: 4,
            height: 2,
            chunk_width: 2,
            chunk_height: 2,
            chunks_across: 2,
            chunks_down: 1,
            samples_per_pixel: 1,
            planar: false,
            data_type: DataType::U8,
            compression: Compression::None,
            predictor: 1,
            offsets,
            byte_counts,
            jpeg_tables: None,
        }
    }

    #[test]
    fn test_load_chunks() {
        let data: Vec<u8> = (0..8).collect();
        let layout = layout(vec![0, 4], vec![4, 4]);
        let chunks = load_chunks_parallel(&layout, &data, ByteOrder::LittleEndian, &[0, 1]);
        assert_eq!(chunks[&0], vec![0, 1, 2, 3]);
        assert_eq!(chunks[&1], vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_broken_chunk_is_skipped() {
        let data: Vec<u8> = (0..8).collect();
        let layout = layout(vec![0, 100], vec![4, 4]);
        let chunks = load_chunks_parallel(&layout, &data, ByteOrder::LittleEndian, &[0, 1]);
        assert!(chunks.contains_key(&0));
        assert!(!chunks.contains_key(&1));
    }
}
