//! Core data types for cogserv

use crate::io::ByteOrder;

/// Represents pixel data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}

impl DataType {
    /// Maps TIFF `SampleFormat` and `BitsPerSample` onto a data type
    pub fn from_tiff(sample_format: u64, bits_per_sample: u64) -> Option<Self> {
        match (sample_format, bits_per_sample) {
            (1, 8) => Some(DataType::U8),
            (1, 16) => Some(DataType::U16),
            (1, 32) => Some(DataType::U32),
            (2, 8) => Some(DataType::I8),
            (2, 16) => Some(DataType::I16),
            (2, 32) => Some(DataType::I32),
            (3, 32) => Some(DataType::F32),
            (3, 64) => Some(DataType::F64),
            _ => None,
        }
    }

    /// Returns the size in bytes for this data type
    pub fn size(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::F64 => 8,
        }
    }

    /// Returns the name of this data type
    pub fn name(&self) -> &'static str {
        match self {
            DataType::U8 => "U8",
            DataType::U16 => "U16",
            DataType::U32 => "U32",
            DataType::I8 => "I8",
            DataType::I16 => "I16",
            DataType::I32 => "I32",
            DataType::F32 => "F32",
            DataType::F64 => "F64",
        }
    }

    /// Decodes one sample from the start of `bytes` as f64
    ///
    /// `bytes` must hold at least [`DataType::size`] bytes.
    pub fn decode(&self, bytes: &[u8], order: ByteOrder) -> f64 {
        match self {
            DataType::U8 => bytes[0] as f64,
            DataType::I8 => bytes[0] as i8 as f64,
            DataType::U16 => order.u16(bytes) as f64,
            DataType::I16 => order.u16(bytes) as i16 as f64,
            DataType::U32 => order.u32(bytes) as f64,
            DataType::I32 => order.u32(bytes) as i32 as f64,
            DataType::F32 => f32::from_bits(order.u32(bytes)) as f64,
            DataType::F64 => f64::from_bits(order.u64(bytes)),
        }
    }
}

/// Represents image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u64,
    /// Height in pixels
    pub height: u64,
}

impl Dimensions {
    /// Creates new dimensions
    pub fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    /// Returns the total number of pixels
    pub fn pixel_count(&self) -> u64 {
        self.width * self.height
    }
}

/// A (west, south, east, north) envelope in some CRS
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    /// Absolute east-west extent
    pub fn width(&self) -> f64 {
        (self.east - self.west).abs()
    }

    /// Absolute north-south extent
    pub fn height(&self) -> f64 {
        (self.north - self.south).abs()
    }

    /// True when any edge is non-finite or the extent collapses to a line
    pub fn is_degenerate(&self) -> bool {
        let finite = self.west.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.north.is_finite();
        !finite || self.width() == 0.0 || self.height() == 0.0
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.west, self.south, self.east, self.north)
    }
}
