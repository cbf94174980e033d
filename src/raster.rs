//! In-memory pixel arrays passed between the pipeline stages

use crate::error::{Error, Result};

/// Mask value of a transparent (invalid) pixel
pub const MASK_INVALID: u8 = 0;
/// Mask value of an opaque (valid) pixel
pub const MASK_VALID: u8 = 255;

/// Reprojected samples as read by a raster engine
///
/// `bands` is band-major: one row-major `width * height` plane per requested
/// band, in request order. `mask` holds only [`MASK_INVALID`] or
/// [`MASK_VALID`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub width: usize,
    pub height: usize,
    pub bands: Vec<Vec<f64>>,
    pub mask: Vec<u8>,
}

impl RawSample {
    pub fn new(width: usize, height: usize, bands: Vec<Vec<f64>>, mask: Vec<u8>) -> Result<Self> {
        let pixels = width * height;
        if mask.len() != pixels {
            return Err(Error::InvalidFormat(format!(
                "Mask has {} values for a {}x{} sample",
                mask.len(),
                width,
                height
            )));
        }
        if let Some(band) = bands.iter().find(|band| band.len() != pixels) {
            return Err(Error::InvalidFormat(format!(
                "Band has {} values for a {}x{} sample",
                band.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, bands, mask })
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Row-major RGBA bytes, four per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != width * height * 4 {
            return Err(Error::InvalidFormat(format!(
                "{} bytes cannot hold {}x{} RGBA pixels",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Copy without the alpha channel
    pub fn to_rgb(&self) -> Vec<u8> {
        self.data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }

    /// Replaces every alpha byte with the matching mask value
    pub fn set_alpha(&mut self, mask: &[u8]) {
        for (px, &alpha) in self.data.chunks_exact_mut(4).zip(mask) {
            px[3] = alpha;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_sample_shape_checks() {
        assert!(RawSample::new(2, 2, vec![vec![0.0; 4]], vec![255; 4]).is_ok());
        assert!(RawSample::new(2, 2, vec![vec![0.0; 3]], vec![255; 4]).is_err());
        assert!(RawSample::new(2, 2, vec![vec![0.0; 4]], vec![255; 5]).is_err());
    }

    #[test]
    fn test_pixel_buffer_alpha_and_rgb() {
        let mut buffer = PixelBuffer::from_rgba(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        buffer.set_alpha(&[MASK_VALID, MASK_INVALID]);
        assert_eq!(buffer.pixel(0, 0), Some([1, 2, 3, 255]));
        assert_eq!(buffer.pixel(1, 0), Some([5, 6, 7, 0]));
        assert_eq!(buffer.pixel(2, 0), None);
        assert_eq!(buffer.to_rgb(), vec![1, 2, 3, 5, 6, 7]);
    }
}
