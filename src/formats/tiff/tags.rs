//! TIFF tag constants

/// Subfile kind bit field (reduced resolution, page, mask)
pub const NEW_SUBFILE_TYPE: u16 = 254;

/// Image width in pixels
pub const IMAGE_WIDTH: u16 = 256;

/// Image height in pixels
pub const IMAGE_LENGTH: u16 = 257;

/// Bits per sample
pub const BITS_PER_SAMPLE: u16 = 258;

/// Compression scheme
pub const COMPRESSION: u16 = 259;

/// Photometric interpretation
pub const PHOTOMETRIC_INTERPRETATION: u16 = 262;

/// Strip offsets
pub const STRIP_OFFSETS: u16 = 273;

/// Samples per pixel
pub const SAMPLES_PER_PIXEL: u16 = 277;

/// Rows per strip
pub const ROWS_PER_STRIP: u16 = 278;

/// Strip byte counts
pub const STRIP_BYTE_COUNTS: u16 = 279;

/// Planar configuration (1 = chunky, 2 = planar)
pub const PLANAR_CONFIGURATION: u16 = 284;

/// Predictor (1 = none, 2 = horizontal, 3 = floating point)
pub const PREDICTOR: u16 = 317;

/// Tile width
pub const TILE_WIDTH: u16 = 322;

/// Tile length
pub const TILE_LENGTH: u16 = 323;

/// Tile offsets
pub const TILE_OFFSETS: u16 = 324;

/// Tile byte counts
pub const TILE_BYTE_COUNTS: u16 = 325;

/// Meaning of samples beyond the colour channels
pub const EXTRA_SAMPLES: u16 = 338;

/// Sample format
pub const SAMPLE_FORMAT: u16 = 339;

/// Shared JPEG quantization and Huffman tables
pub const JPEG_TABLES: u16 = 347;

/// GeoTIFF ModelPixelScaleTag
pub const MODEL_PIXEL_SCALE: u16 = 33550;

/// GeoTIFF ModelTiepointTag
pub const MODEL_TIEPOINT: u16 = 33922;

/// GeoTIFF ModelTransformationTag
pub const MODEL_TRANSFORMATION: u16 = 34264;

/// GeoTIFF GeoKeyDirectoryTag
pub const GEO_KEY_DIRECTORY: u16 = 34735;

/// GeoTIFF GeoDoubleParamsTag
pub const GEO_DOUBLE_PARAMS: u16 = 34736;

/// GeoTIFF GeoAsciiParamsTag
pub const GEO_ASCII_PARAMS: u16 = 34737;

/// GDAL metadata
pub const GDAL_METADATA: u16 = 42112;

/// GDAL no data value, stored as ASCII
pub const GDAL_NODATA: u16 = 42113;

/// NewSubfileType bit marking a reduced resolution image
pub const SUBFILE_REDUCED_RESOLUTION: u64 = 0x1;

/// NewSubfileType bit marking a transparency mask
pub const SUBFILE_MASK: u64 = 0x4;

/// Returns the name of a TIFF tag
pub fn tag_name(tag: u16) -> &'static str {
    match tag {
        NEW_SUBFILE_TYPE => "NewSubfileType",
        IMAGE_WIDTH => "ImageWidth",
        IMAGE_LENGTH => "ImageLength",
        BITS_PER_SAMPLE => "BitsPerSample",
        COMPRESSION => "Compression",
        PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        STRIP_OFFSETS => "StripOffsets",
        SAMPLES_PER_PIXEL => "SamplesPerPixel",
        ROWS_PER_STRIP => "RowsPerStrip",
        STRIP_BYTE_COUNTS => "StripByteCounts",
        PLANAR_CONFIGURATION => "PlanarConfiguration",
        PREDICTOR => "Predictor",
        TILE_WIDTH => "TileWidth",
        TILE_LENGTH => "TileLength",
        TILE_OFFSETS => "TileOffsets",
        TILE_BYTE_COUNTS => "TileByteCounts",
        EXTRA_SAMPLES => "ExtraSamples",
        SAMPLE_FORMAT => "SampleFormat",
        JPEG_TABLES => "JPEGTables",
        MODEL_PIXEL_SCALE => "ModelPixelScale",
        MODEL_TIEPOINT => "ModelTiepoint",
        MODEL_TRANSFORMATION => "ModelTransformation",
        GEO_KEY_DIRECTORY => "GeoKeyDirectory",
        GEO_DOUBLE_PARAMS => "GeoDoubleParams",
        GEO_ASCII_PARAMS => "GeoAsciiParams",
        GDAL_METADATA => "GDAL_METADATA",
        GDAL_NODATA => "GDAL_NODATA",
        _ => "Unknown",
    }
}

/// Field type constants
pub mod field_types {
    pub const BYTE: u16 = 1;
    pub const ASCII: u16 = 2;
    pub const SHORT: u16 = 3;
    pub const LONG: u16 = 4;
    /// Two LONGs: numerator, denominator
    pub const RATIONAL: u16 = 5;
    pub const SBYTE: u16 = 6;
    pub const UNDEFINED: u16 = 7;
    pub const SSHORT: u16 = 8;
    pub const SLONG: u16 = 9;
    /// Two SLONGs
    pub const SRATIONAL: u16 = 10;
    pub const FLOAT: u16 = 11;
    pub const DOUBLE: u16 = 12;
    /// Offset to a sub-IFD
    pub const IFD: u16 = 13;
    /// BigTIFF only
    pub const LONG8: u16 = 16;
    /// BigTIFF only
    pub const SLONG8: u16 = 17;
    /// BigTIFF only
    pub const IFD8: u16 = 18;
}

/// Size in bytes of one value of the given field type
///
/// Unknown types count as one byte so their entries can still be skipped.
pub fn field_type_size(field_type: u16) -> usize {
    use field_types::*;
    match field_type {
        BYTE | ASCII | SBYTE | UNDEFINED => 1,
        SHORT | SSHORT => 2,
        LONG | SLONG | FLOAT | IFD => 4,
        RATIONAL | SRATIONAL | DOUBLE | LONG8 | SLONG8 | IFD8 => 8,
        _ => 1,
    }
}

/// Returns the name of a field type
pub fn field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::IFD => "IFD",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}
