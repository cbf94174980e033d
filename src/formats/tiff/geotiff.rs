//! GeoTIFF specific functionality

use crate::error::Result;
use crate::projection::Affine;
use crate::types::Bounds;
use super::ifd::IFD;
use super::reader::tags::TagReader;
use super::tags;

/// GeoTIFF information extracted from an IFD
#[derive(Debug, Clone, Default)]
pub struct GeoInfo {
    /// Model pixel scale (ScaleX, ScaleY, ScaleZ)
    pub pixel_scale: Option<(f64, f64, f64)>,
    /// Model tiepoints (pixel coord -> model coord mapping)
    pub tiepoints: Vec<TiePoint>,
    /// Row-major 4x4 ModelTransformation matrix
    pub model_transform: Option<[f64; 16]>,
    /// EPSG code if detected
    pub epsg_code: Option<u32>,
    /// Whether pixel values describe points rather than areas
    pub pixel_is_point: bool,
    /// GeoAsciiParams citation
    pub citation: Option<String>,
}

/// Represents a GeoTIFF tiepoint
#[derive(Debug, Clone, Copy)]
pub struct TiePoint {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub geo_x: f64,
    pub geo_y: f64,
}

/// GeoKey constants
mod geo_keys {
    pub const RASTER_TYPE: u16 = 1025;
    pub const GEOGRAPHIC_TYPE: u16 = 2048;
    pub const PROJECTED_CS_TYPE: u16 = 3072;

    pub const RASTER_PIXEL_IS_POINT: u16 = 2;
    pub const USER_DEFINED: u16 = 32767;
}

impl GeoInfo {
    /// Extracts GeoTIFF information from an IFD
    pub fn from_ifd(ifd: &IFD, reader: &TagReader<'_>) -> Result<Option<Self>> {
        if !ifd.is_geotiff() {
            return Ok(None);
        }

        let mut geo_info = GeoInfo::default();

        if let Some(entry) = ifd.get_entry(tags::MODEL_PIXEL_SCALE) {
            let values = reader.read_doubles(entry)?;
            if values.len() >= 3 {
                geo_info.pixel_scale = Some((values[0], values[1], values[2]));
            } else if values.len() == 2 {
                geo_info.pixel_scale = Some((values[0], values[1], 0.0));
            }
        }

        if let Some(entry) = ifd.get_entry(tags::MODEL_TIEPOINT) {
            let values = reader.read_doubles(entry)?;
            geo_info.tiepoints = values
                .chunks_exact(6)
                .map(|chunk| TiePoint {
                    pixel_x: chunk[0],
                    pixel_y: chunk[1],
                    geo_x: chunk[3],
                    geo_y: chunk[4],
                })
                .collect();
        }

        if let Some(entry) = ifd.get_entry(tags::MODEL_TRANSFORMATION) {
            let values = reader.read_doubles(entry)?;
            if values.len() >= 16 {
                let mut matrix = [0.0; 16];
                matrix.copy_from_slice(&values[..16]);
                geo_info.model_transform = Some(matrix);
            }
        }

        if let Some(entry) = ifd.get_entry(tags::GEO_KEY_DIRECTORY) {
            let keys = reader.read_u16s(entry)?;
            let mut projected = None;
            let mut geographic = None;

            if keys.len() >= 4 {
                let num_keys = keys[3] as usize;
                for key in keys[4..].chunks_exact(4).take(num_keys) {
                    let (key_id, location, value) = (key[0], key[1], key[3]);
                    // only inline SHORT values matter here
                    if location != 0 {
                        continue;
                    }
                    match key_id {
                        geo_keys::RASTER_TYPE => {
                            geo_info.pixel_is_point = value == geo_keys::RASTER_PIXEL_IS_POINT;
                        }
                        geo_keys::PROJECTED_CS_TYPE => projected = Some(value),
                        geo_keys::GEOGRAPHIC_TYPE => geographic = Some(value),
                        _ => {}
                    }
                }
            }

            geo_info.epsg_code = projected
                .filter(|&code| code != 0 && code != geo_keys::USER_DEFINED)
                .or(geographic.filter(|&code| code != 0 && code != geo_keys::USER_DEFINED))
                .map(u32::from);
        }

        if let Some(entry) = ifd.get_entry(tags::GEO_ASCII_PARAMS) {
            let ascii = reader.read_ascii(entry)?;
            let ascii = ascii.trim_end_matches('|').to_string();
            if !ascii.is_empty() {
                geo_info.citation = Some(ascii);
            }
        }

        Ok(Some(geo_info))
    }

    /// Pixel-corner to model transform, following the area convention
    ///
    /// PixelIsPoint rasters are shifted by half a pixel so the result always
    /// refers to pixel corners.
    pub fn affine(&self) -> Option<Affine> {
        let transform = if let Some(m) = self.model_transform {
            Affine::new(m[0], m[1], m[3], m[4], m[5], m[7])
        } else {
            let (scale_x, scale_y, _) = self.pixel_scale?;
            let tp = self.tiepoints.first()?;
            Affine::new(
                scale_x,
                0.0,
                tp.geo_x - scale_x * tp.pixel_x,
                0.0,
                -scale_y,
                tp.geo_y + scale_y * tp.pixel_y,
            )
        };

        if self.pixel_is_point {
            Some(transform.translated_pixels(-0.5, -0.5))
        } else {
            Some(transform)
        }
    }

    /// Envelope of a `width` x `height` raster in model coordinates
    pub fn bounds(&self, width: u64, height: u64) -> Option<Bounds> {
        let transform = self.affine()?;
        let (w, h) = (width as f64, height as f64);
        let corners =
            [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|(col, row)| transform.apply(col, row));

        let mut bounds =
            Bounds::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            bounds.west = bounds.west.min(x);
            bounds.east = bounds.east.max(x);
            bounds.south = bounds.south.min(y);
            bounds.north = bounds.north.max(y);
        }
        Some(bounds)
    }
}

/// GDAL nodata value, if the tag is present and parses as a number
pub fn nodata(ifd: &IFD, reader: &TagReader<'_>) -> Result<Option<f64>> {
    match ifd.get_entry(tags::GDAL_NODATA) {
        Some(entry) => Ok(reader.read_ascii(entry)?.trim().parse::<f64>().ok()),
        None => Ok(None),
    }
}

/// Whether one of the extra samples is an associated or unassociated alpha
/// channel, returning its 0-based band index
pub fn alpha_band(ifd: &IFD, reader: &TagReader<'_>) -> Result<Option<usize>> {
    let entry = match ifd.get_entry(tags::EXTRA_SAMPLES) {
        Some(entry) => entry,
        None => return Ok(None),
    };
    let extra = reader.read_u16s(entry)?;
    let samples = ifd.samples_per_pixel() as usize;
    let first_extra = samples.saturating_sub(extra.len());

    Ok(extra
        .iter()
        .position(|&kind| kind == 1 || kind == 2)
        .map(|i| first_extra + i))
}

impl std::fmt::Display for GeoInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(epsg) = self.epsg_code {
            writeln!(f, "  EPSG Code: {}", epsg)?;
        }

        if let Some(ref name) = self.citation {
            writeln!(f, "  Citation: {}", name)?;
        }

        if let Some(transform) = self.affine() {
            writeln!(f, "  Pixel Size: {} x {}", transform.a, transform.e)?;
            writeln!(f, "  Origin: ({}, {})", transform.c, transform.f)?;
        }

        if self.pixel_is_point {
            writeln!(f, "  Raster type: PixelIsPoint")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tiff::ifd::IFDEntry;
    use crate::formats::tiff::tags::field_types;
    use crate::io::ByteOrder;

    /// Lays out tag payloads back to back and returns matching entries
    struct Payload {
        data: Vec<u8>,
        ifd: IFD,
    }

    impl Payload {
        fn new() -> Self {
            Self { data: Vec::new(), ifd: IFD::new(0, 0) }
        }

        fn doubles(mut self, tag: u16, values: &[f64]) -> Self {
            let offset = self.data.len() as u64;
            for v in values {
                self.data.extend_from_slice(&v.to_le_bytes());
            }
            let count = values.len() as u64;
            self.ifd.add_entry(IFDEntry::new(tag, field_types::DOUBLE, count, offset, 0));
            self
        }

        fn shorts(mut self, tag: u16, values: &[u16]) -> Self {
            let offset = self.data.len() as u64;
            for v in values {
                self.data.extend_from_slice(&v.to_le_bytes());
            }
            let count = values.len() as u64;
            let inline = values[0] as u64;
            self.ifd.add_entry(IFDEntry::new(tag, field_types::SHORT, count, offset, inline));
            self
        }

        fn ascii(mut self, tag: u16, text: &str) -> Self {
            let offset = self.data.len() as u64;
            self.data.extend_from_slice(text.as_bytes());
            self.data.push(0);
            let count = text.len() as u64 + 1;
            self.ifd.add_entry(IFDEntry::new(tag, field_types::ASCII, count, offset, 0));
            self
        }
    }

    #[test]
    fn test_scale_and_tiepoint() {
        let p = Payload::new()
            .doubles(tags::MODEL_PIXEL_SCALE, &[0.5, 0.25, 0.0])
            .doubles(tags::MODEL_TIEPOINT, &[0.0, 0.0, 0.0, 10.0, 50.0, 0.0])
            .shorts(tags::GEO_KEY_DIRECTORY, &[1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326]);
        let reader = TagReader::new(&p.data, ByteOrder::LittleEndian);
        let info = GeoInfo::from_ifd(&p.ifd, &reader).unwrap().unwrap();

        assert_eq!(info.epsg_code, Some(4326));
        let affine = info.affine().unwrap();
        assert_eq!((affine.a, affine.c, affine.e, affine.f), (0.5, 10.0, -0.25, 50.0));
        assert_eq!(info.bounds(20, 40).unwrap(), Bounds::new(10.0, 40.0, 20.0, 50.0));
    }

    #[test]
    fn test_projected_code_wins_and_pixel_is_point() {
        let p = Payload::new()
            .doubles(tags::MODEL_PIXEL_SCALE, &[10.0, 10.0, 0.0])
            .doubles(tags::MODEL_TIEPOINT, &[0.0, 0.0, 0.0, 1000.0, 2000.0, 0.0])
            .shorts(
                tags::GEO_KEY_DIRECTORY,
                &[1, 1, 0, 3, 1025, 0, 1, 2, 2048, 0, 1, 4326, 3072, 0, 1, 32633],
            );
        let reader = TagReader::new(&p.data, ByteOrder::LittleEndian);
        let info = GeoInfo::from_ifd(&p.ifd, &reader).unwrap().unwrap();

        assert_eq!(info.epsg_code, Some(32633));
        assert!(info.pixel_is_point);
        let affine = info.affine().unwrap();
        assert_eq!(affine.c, 995.0);
        assert_eq!(affine.f, 2005.0);
    }

    #[test]
    fn test_model_transformation() {
        let mut matrix = [0.0; 16];
        matrix[0] = 2.0;
        matrix[3] = -100.0;
        matrix[5] = -2.0;
        matrix[7] = 100.0;
        matrix[15] = 1.0;
        let p = Payload::new().doubles(tags::MODEL_TRANSFORMATION, &matrix);
        let reader = TagReader::new(&p.data, ByteOrder::LittleEndian);
        let info = GeoInfo::from_ifd(&p.ifd, &reader).unwrap().unwrap();

        assert_eq!(info.bounds(100, 50).unwrap(), Bounds::new(-100.0, 0.0, 100.0, 100.0));
        assert_eq!(info.epsg_code, None);
    }

    #[test]
    fn test_nodata_and_alpha() {
        let p = Payload::new()
            .ascii(tags::GDAL_NODATA, "-9999")
            .shorts(tags::EXTRA_SAMPLES, &[2])
            .shorts(tags::SAMPLES_PER_PIXEL, &[4]);
        let reader = TagReader::new(&p.data, ByteOrder::LittleEndian);

        assert_eq!(nodata(&p.ifd, &reader).unwrap(), Some(-9999.0));
        assert_eq!(alpha_band(&p.ifd, &reader).unwrap(), Some(3));
        assert!(GeoInfo::from_ifd(&p.ifd, &reader).unwrap().is_none());
    }
}
