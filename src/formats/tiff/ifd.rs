//! Image File Directory (IFD) structures

use std::collections::HashMap;
use crate::types::{Dimensions, DataType};
use super::tags;

/// Represents an Image File Directory entry
///
/// `data_offset` always points at the first value byte in the file, whether
/// the values live inline in the entry or elsewhere. `value` caches the first
/// value of integer-typed entries so scalar tags need no further reads.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Absolute file offset of the value bytes
    pub data_offset: u64,
    /// First value for integer field types, 0 otherwise
    pub value: u64,
}

impl IFDEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u64, data_offset: u64, value: u64) -> Self {
        Self {
            tag,
            field_type,
            count,
            data_offset,
            value,
        }
    }

    /// Returns the size in bytes of one value of this entry's field type
    pub fn field_type_size(&self) -> usize {
        tags::field_type_size(self.field_type)
    }

    /// Total size in bytes of the entry's values
    pub fn byte_len(&self) -> u64 {
        self.count.saturating_mul(self.field_type_size() as u64)
    }

    /// Whether the values fit in the entry itself
    pub fn is_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        self.byte_len() <= inline_size
    }
}

/// Represents an Image File Directory
#[derive(Debug, Clone)]
pub struct IFD {
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in file
    pub offset: u64,
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    tag_map: HashMap<u16, usize>,
}

impl IFD {
    /// Creates a new IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            number,
            offset,
            entries: Vec::new(),
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    pub fn add_entry(&mut self, entry: IFDEntry) {
        let index = self.entries.len();
        self.tag_map.insert(entry.tag, index);
        self.entries.push(entry);
    }

    /// Gets an entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag).and_then(|&idx| self.entries.get(idx))
    }

    /// Gets the first value of an integer tag
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.get_entry(tag).map(|e| e.value)
    }

    /// Returns image dimensions if available
    pub fn dimensions(&self) -> Option<Dimensions> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some(Dimensions::new(width, height))
    }

    /// Returns compression tag value, 1 (none) when absent
    pub fn compression(&self) -> u64 {
        self.get_tag_value(tags::COMPRESSION).unwrap_or(1)
    }

    /// Returns samples per pixel
    pub fn samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Returns bits per sample of the first sample, 1 when absent
    pub fn bits_per_sample(&self) -> u64 {
        self.get_tag_value(tags::BITS_PER_SAMPLE).unwrap_or(1)
    }

    /// Returns sample format (1=unsigned, 2=signed, 3=float)
    pub fn sample_format(&self) -> u64 {
        self.get_tag_value(tags::SAMPLE_FORMAT).unwrap_or(1)
    }

    /// Determines the pixel data type based on TIFF tags
    pub fn data_type(&self) -> Option<DataType> {
        DataType::from_tiff(self.sample_format(), self.bits_per_sample())
    }

    /// Whether samples of each band are stored in separate planes
    pub fn is_planar(&self) -> bool {
        self.get_tag_value(tags::PLANAR_CONFIGURATION) == Some(2)
    }

    /// Returns the predictor, 1 (none) when absent
    pub fn predictor(&self) -> u64 {
        self.get_tag_value(tags::PREDICTOR).unwrap_or(1)
    }

    /// Returns tile dimensions if tiled
    pub fn tile_dimensions(&self) -> Option<Dimensions> {
        let width = self.get_tag_value(tags::TILE_WIDTH)?;
        let height = self.get_tag_value(tags::TILE_LENGTH)?;
        Some(Dimensions::new(width, height))
    }

    /// Rows per strip, defaulting to the whole image
    pub fn rows_per_strip(&self) -> Option<u64> {
        self.get_tag_value(tags::ROWS_PER_STRIP)
            .or_else(|| self.dimensions().map(|d| d.height))
    }

    /// NewSubfileType bit field, 0 when absent
    pub fn subfile_type(&self) -> u64 {
        self.get_tag_value(tags::NEW_SUBFILE_TYPE).unwrap_or(0)
    }

    /// Whether this IFD is a transparency mask rather than image data
    pub fn is_mask(&self) -> bool {
        self.subfile_type() & tags::SUBFILE_MASK != 0
    }

    /// Whether this IFD is a reduced-resolution copy of the main image
    pub fn is_overview(&self) -> bool {
        self.subfile_type() & tags::SUBFILE_REDUCED_RESOLUTION != 0 && !self.is_mask()
    }

    /// Returns number of entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns all GeoTIFF related tags
    pub fn geotiff_tags(&self) -> Vec<&IFDEntry> {
        self.entries.iter()
            .filter(|e| {
                matches!(e.tag,
                    tags::MODEL_PIXEL_SCALE |
                    tags::MODEL_TIEPOINT |
                    tags::MODEL_TRANSFORMATION |
                    tags::GEO_KEY_DIRECTORY |
                    tags::GEO_DOUBLE_PARAMS |
                    tags::GEO_ASCII_PARAMS
                )
            })
            .collect()
    }

    /// Checks if this IFD has GeoTIFF tags
    pub fn is_geotiff(&self) -> bool {
        !self.geotiff_tags().is_empty()
    }
}
