//! Tile and strip layout, loading and predictor reversal

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::formats::tiff::{tags, IFD};
use crate::io::{slice_at, ByteOrder};
use crate::types::DataType;

use super::tags::TagReader;

/// Where the compressed chunks (tiles or strips) of one image live and how
/// to turn them back into samples
#[derive(Debug, Clone)]
pub struct ChunkLayout {
    pub width: u64,
    pub height: u64,
    pub chunk_width: u64,
    pub chunk_height: u64,
    pub chunks_across: u64,
    pub chunks_down: u64,
    pub samples_per_pixel: usize,
    pub planar: bool,
    pub data_type: DataType,
    pub compression: Compression,
    pub predictor: u64,
    pub offsets: Vec<u64>,
    pub byte_counts: Vec<u64>,
    pub jpeg_tables: Option<Vec<u8>>,
}

impl ChunkLayout {
    /// Builds the layout of a tiled or stripped IFD
    pub fn from_ifd(ifd: &IFD, tag_reader: &TagReader<'_>) -> Result<Self> {
        let data_type = ifd.data_type().ok_or_else(|| {
            Error::Unsupported(format!(
                "Sample format {} with {} bits",
                ifd.sample_format(),
                ifd.bits_per_sample()
            ))
        })?;
        Self::with_data_type(ifd, tag_reader, data_type)
    }

    fn with_data_type(ifd: &IFD, tag_reader: &TagReader<'_>, data_type: DataType) -> Result<Self> {
        let dims = ifd
            .dimensions()
            .ok_or(Error::MissingTag(tags::IMAGE_WIDTH))?;

        let (chunk_width, chunk_height, offsets_tag, counts_tag) = match ifd.tile_dimensions() {
            Some(tile) => (tile.width, tile.height, tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS),
            None => {
                let rows = ifd.rows_per_strip().unwrap_or(dims.height).min(dims.height);
                (dims.width, rows, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
            }
        };
        if chunk_width == 0 || chunk_height == 0 {
            return Err(Error::InvalidFormat("Zero sized tile or strip".to_string()));
        }

        let offsets_entry = ifd.get_entry(offsets_tag).ok_or(Error::MissingTag(offsets_tag))?;
        let offsets = tag_reader.read_u64s(offsets_entry)?;
        let counts_entry = ifd.get_entry(counts_tag).ok_or(Error::MissingTag(counts_tag))?;
        let byte_counts = tag_reader.read_u64s(counts_entry)?;

        let jpeg_tables = match ifd.get_entry(tags::JPEG_TABLES) {
            Some(entry) => Some(tag_reader.read_bytes(entry)?.to_vec()),
            None => None,
        };

        let layout = Self {
            width: dims.width,
            height: dims.height,
            chunk_width,
            chunk_height,
            chunks_across: dims.width.div_ceil(chunk_width),
            chunks_down: dims.height.div_ceil(chunk_height),
            samples_per_pixel: ifd.samples_per_pixel() as usize,
            planar: ifd.is_planar(),
            data_type,
            compression: Compression::from_tag(ifd.compression())?,
            predictor: ifd.predictor(),
            offsets,
            byte_counts,
            jpeg_tables,
        };

        let planes = if layout.planar { layout.samples_per_pixel as u64 } else { 1 };
        let expected = layout.chunks_across * layout.chunks_down * planes;
        if (layout.offsets.len() as u64) < expected
            || (layout.byte_counts.len() as u64) < expected
        {
            return Err(Error::InvalidFormat(format!(
                "Expected {} chunks, found {} offsets and {} byte counts",
                expected,
                layout.offsets.len(),
                layout.byte_counts.len()
            )));
        }

        Ok(layout)
    }

    /// Samples stored per pixel inside one chunk
    fn samples_per_chunk_pixel(&self) -> usize {
        if self.planar { 1 } else { self.samples_per_pixel }
    }

    /// Chunk index holding pixel (x, y) of `band` (0-based)
    pub fn chunk_index(&self, x: u64, y: u64, band: usize) -> usize {
        let cx = x / self.chunk_width;
        let cy = y / self.chunk_height;
        let plane = if self.planar { band as u64 } else { 0 };
        (plane * self.chunks_across * self.chunks_down + cy * self.chunks_across + cx) as usize
    }

    /// Byte offset of pixel (x, y) of `band` inside its decoded chunk
    pub fn sample_offset(&self, x: u64, y: u64, band: usize) -> usize {
        let col = (x % self.chunk_width) as usize;
        let row = (y % self.chunk_height) as usize;
        let spp = self.samples_per_chunk_pixel();
        let sample_band = if self.planar { 0 } else { band };
        ((row * self.chunk_width as usize + col) * spp + sample_band) * self.data_type.size()
    }

    /// Decodes one sample from a decoded chunk, `None` when the chunk is short
    pub fn sample(
        &self,
        chunk: &[u8],
        x: u64,
        y: u64,
        band: usize,
        order: ByteOrder,
    ) -> Option<f64> {
        let offset = self.sample_offset(x, y, band);
        let bytes = chunk.get(offset..offset + self.data_type.size())?;
        Some(self.data_type.decode(bytes, order))
    }

    /// Reads, decompresses and un-predicts one chunk
    ///
    /// Empty chunks (byte count 0) decode to zeros.
    pub fn load_chunk(&self, data: &[u8], order: ByteOrder, index: usize) -> Result<Vec<u8>> {
        let offset = *self
            .offsets
            .get(index)
            .ok_or_else(|| Error::OutOfBounds(format!("Chunk index {}", index)))?;
        let byte_count = self.byte_counts.get(index).copied().unwrap_or(0);

        let row_bytes =
            self.chunk_width as usize * self.samples_per_chunk_pixel() * self.data_type.size();
        let expected_len = row_bytes * self.chunk_height as usize;

        if byte_count == 0 {
            return Ok(vec![0u8; expected_len]);
        }

        let len = usize::try_from(byte_count)
            .map_err(|_| Error::InvalidFormat(format!("Chunk {} too large", index)))?;
        let compressed = slice_at(data, offset, len)?;
        let mut decoded = self
            .compression
            .decompress(compressed, expected_len, self.jpeg_tables.as_deref())?;

        match self.predictor {
            1 => {}
            2 => undo_horizontal_predictor(
                &mut decoded,
                row_bytes,
                self.samples_per_chunk_pixel(),
                self.data_type.size(),
                order,
            ),
            3 => undo_float_predictor(
                &mut decoded,
                row_bytes,
                self.samples_per_chunk_pixel(),
                self.data_type.size(),
                order,
            ),
            other => return Err(Error::Unsupported(format!("Predictor {}", other))),
        }

        Ok(decoded)
    }
}

/// Layout of an internal transparency mask (`NewSubfileType` mask bit)
///
/// Masks hold one sample per pixel, either bit-packed (most significant bit
/// first, rows padded to whole bytes) or one byte per pixel. Any non-zero
/// sample is a valid pixel.
#[derive(Debug, Clone)]
pub struct MaskLayout {
    pub chunks: ChunkLayout,
    pub packed: bool,
}

impl MaskLayout {
    pub fn from_ifd(ifd: &IFD, tag_reader: &TagReader<'_>) -> Result<Self> {
        let packed = match (ifd.samples_per_pixel(), ifd.bits_per_sample()) {
            (1, 1) => true,
            (1, 8) => false,
            (samples, bits) => {
                return Err(Error::Unsupported(format!(
                    "Mask with {} sample(s) of {} bits",
                    samples, bits
                )))
            }
        };
        let chunks = ChunkLayout::with_data_type(ifd, tag_reader, DataType::U8)?;
        Ok(Self { chunks, packed })
    }

    pub fn chunk_index(&self, x: u64, y: u64) -> usize {
        self.chunks.chunk_index(x, y, 0)
    }

    /// Whether pixel (x, y) is valid, `None` when the decoded chunk is short
    pub fn is_valid(&self, chunk: &[u8], x: u64, y: u64) -> Option<bool> {
        let chunk_width = self.chunks.chunk_width as usize;
        let col = (x % self.chunks.chunk_width) as usize;
        let row = (y % self.chunks.chunk_height) as usize;
        if self.packed {
            let byte = *chunk.get(row * chunk_width.div_ceil(8) + col / 8)?;
            Some(byte & (0x80 >> (col % 8)) != 0)
        } else {
            chunk.get(row * chunk_width + col).map(|&value| value != 0)
        }
    }
}

/// Reverses horizontal differencing (predictor 2), sample by sample
fn undo_horizontal_predictor(
    data: &mut [u8],
    row_bytes: usize,
    stride: usize,
    sample_size: usize,
    order: ByteOrder,
) {
    if row_bytes == 0 {
        return;
    }
    let step = stride * sample_size;

    for row in data.chunks_mut(row_bytes) {
        match sample_size {
            1 => {
                for i in step..row.len() {
                    row[i] = row[i].wrapping_add(row[i - step]);
                }
            }
            2 => {
                let mut i = step;
                while i + 2 <= row.len() {
                    let sum = order.u16(&row[i..]).wrapping_add(order.u16(&row[i - step..]));
                    write_u16(&mut row[i..i + 2], sum, order);
                    i += 2;
                }
            }
            4 => {
                let mut i = step;
                while i + 4 <= row.len() {
                    let sum = order.u32(&row[i..]).wrapping_add(order.u32(&row[i - step..]));
                    write_u32(&mut row[i..i + 4], sum, order);
                    i += 4;
                }
            }
            _ => {
                let mut i = step;
                while i + 8 <= row.len() {
                    let sum = order.u64(&row[i..]).wrapping_add(order.u64(&row[i - step..]));
                    let bytes = match order {
                        ByteOrder::LittleEndian => sum.to_le_bytes(),
                        ByteOrder::BigEndian => sum.to_be_bytes(),
                    };
                    row[i..i + 8].copy_from_slice(&bytes);
                    i += 8;
                }
            }
        }
    }
}

fn write_u16(out: &mut [u8], value: u16, order: ByteOrder) {
    let bytes = match order {
        ByteOrder::LittleEndian => value.to_le_bytes(),
        ByteOrder::BigEndian => value.to_be_bytes(),
    };
    out.copy_from_slice(&bytes);
}

fn write_u32(out: &mut [u8], value: u32, order: ByteOrder) {
    let bytes = match order {
        ByteOrder::LittleEndian => value.to_le_bytes(),
        ByteOrder::BigEndian => value.to_be_bytes(),
    };
    out.copy_from_slice(&bytes);
}

/// Reverses the floating point predictor (predictor 3)
///
/// Each row holds the bytes of its samples split into planes, most
/// significant byte plane first, byte-wise differenced across the row.
fn undo_float_predictor(
    data: &mut [u8],
    row_bytes: usize,
    stride: usize,
    sample_size: usize,
    order: ByteOrder,
) {
    if row_bytes == 0 {
        return;
    }
    let samples = row_bytes / sample_size;
    let mut shuffled = vec![0u8; row_bytes];

    for row in data.chunks_exact_mut(row_bytes) {
        for i in stride..row.len() {
            row[i] = row[i].wrapping_add(row[i - stride]);
        }
        shuffled.copy_from_slice(row);

        for sample in 0..samples {
            for byte in 0..sample_size {
                let plane_value = shuffled[byte * samples + sample];
                let target = match order {
                    ByteOrder::BigEndian => byte,
                    ByteOrder::LittleEndian => sample_size - 1 - byte,
                };
                row[sample * sample_size + target] = plane_value;
            }
        }
    }
}
