//! Image assembly: channel layout and encoding of the final pixels

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use mime::Mime;

use crate::error::{Error, Result};
use crate::raster::PixelBuffer;

/// Quality used for lossy formats when the request names none
pub const DEFAULT_QUALITY: u8 = 80;

const IMAGE_WEBP: &str = "image/webp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    /// File extension, as used in request paths
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn mime(&self) -> Mime {
        match self {
            OutputFormat::Png => mime::IMAGE_PNG,
            OutputFormat::Jpeg => mime::IMAGE_JPEG,
            OutputFormat::Webp => IMAGE_WEBP.parse().unwrap_or(mime::IMAGE_STAR),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(ext: &str) -> Result<Self> {
        match ext {
            "png" => Ok(OutputFormat::Png),
            "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encoded image bytes with their media type
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime: Mime,
}

impl EncodedImage {
    /// Writes the bytes to `path`
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Inline `data:<mime>;base64,...` URI of the bytes
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encodes `pixels` as `format`
///
/// PNG and WebP keep all four channels. JPEG drops alpha. `quality` applies
/// to the lossy formats and is clamped to `1..=100`.
pub fn assemble(pixels: &PixelBuffer, format: OutputFormat, quality: u8) -> Result<EncodedImage> {
    let quality = quality.clamp(1, 100);
    let width = u32::try_from(pixels.width)
        .map_err(|_| Error::Encode(format!("Width {} too large", pixels.width)))?;
    let height = u32::try_from(pixels.height)
        .map_err(|_| Error::Encode(format!("Height {} too large", pixels.height)))?;

    let bytes = match format {
        OutputFormat::Png => {
            let mut bytes = Vec::new();
            PngEncoder::new(&mut bytes)
                .write_image(&pixels.data, width, height, ExtendedColorType::Rgba8)
                .map_err(|e| Error::Encode(format!("PNG: {}", e)))?;
            bytes
        }
        OutputFormat::Jpeg => encode_jpeg(pixels, quality)?,
        OutputFormat::Webp => webp::Encoder::from_rgba(&pixels.data, width, height)
            .encode_simple(false, f32::from(quality))
            .map_err(|e| Error::Encode(format!("WebP: {:?}", e)))?
            .to_vec(),
    };

    Ok(EncodedImage { bytes, mime: format.mime() })
}

/// Progressive baseline-compatible JPEG with optimized Huffman tables
fn encode_jpeg(pixels: &PixelBuffer, quality: u8) -> Result<Vec<u8>> {
    let width = u16::try_from(pixels.width)
        .map_err(|_| Error::Encode(format!("Width {} exceeds the JPEG limit", pixels.width)))?;
    let height = u16::try_from(pixels.height)
        .map_err(|_| Error::Encode(format!("Height {} exceeds the JPEG limit", pixels.height)))?;

    let mut bytes = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut bytes, quality);
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(&pixels.to_rgb(), width, height, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| Error::Encode(format!("JPEG: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn gradient(width: usize, height: usize) -> PixelBuffer {
        let data = (0..width * height)
            .flat_map(|i| {
                let alpha = if i % 3 == 0 { 0 } else { 255 };
                [(i * 7 % 256) as u8, (i * 13 % 256) as u8, 90, alpha]
            })
            .collect();
        PixelBuffer::from_rgba(width, height, data).unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert!(matches!("gif".parse::<OutputFormat>(), Err(Error::UnsupportedFormat(_))));
        assert!(matches!("PNG".parse::<OutputFormat>(), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(OutputFormat::Png.mime().as_ref(), "image/png");
        assert_eq!(OutputFormat::Jpeg.mime().as_ref(), "image/jpeg");
        assert_eq!(OutputFormat::Webp.mime().as_ref(), "image/webp");
    }

    #[test]
    fn test_png_is_lossless() {
        let pixels = gradient(17, 9);
        let encoded = assemble(&pixels, OutputFormat::Png, DEFAULT_QUALITY).unwrap();
        assert_eq!(encoded.mime, mime::IMAGE_PNG);

        let decoded = image::load_from_memory(&encoded.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (17, 9));
        assert_eq!(decoded.into_raw(), pixels.data);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let encoded = assemble(&gradient(16, 16), OutputFormat::Jpeg, 90).unwrap();
        let decoded = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn test_jpeg_is_progressive() {
        let encoded = assemble(&gradient(16, 16), OutputFormat::Jpeg, 80).unwrap();
        let has_marker = |marker: u8| encoded.bytes.windows(2).any(|w| w == [0xFF, marker]);
        // SOF2 is the progressive frame header, SOF0 the baseline one
        assert!(has_marker(0xC2));
        assert!(!has_marker(0xC0));
    }

    #[test]
    fn test_webp_keeps_alpha() {
        let encoded = assemble(&gradient(8, 8), OutputFormat::Webp, 0).unwrap();
        assert_eq!(&encoded.bytes[..4], b"RIFF");
        assert_eq!(&encoded.bytes[8..12], b"WEBP");
        assert_eq!(encoded.mime.as_ref(), "image/webp");

        let decoded = webp::Decoder::new(&encoded.bytes).decode().unwrap();
        assert!(decoded.is_alpha());
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
        assert_eq!(decoded.len(), 8 * 8 * 4);
    }

    #[test]
    fn test_data_uri() {
        let encoded = assemble(&gradient(4, 4), OutputFormat::Png, DEFAULT_QUALITY).unwrap();
        let uri = encoded.data_uri();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), encoded.bytes);
    }

    #[test]
    fn test_export() {
        let encoded = assemble(&gradient(4, 4), OutputFormat::Png, DEFAULT_QUALITY).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        encoded.export(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), encoded.bytes);
    }
}
