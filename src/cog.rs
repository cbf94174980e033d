//! Request-scoped rendering pipeline
//!
//! One call opens the source, plans the output geometry, reads the warped
//! samples, colorizes them and encodes the result. The source is released
//! before the call returns, whatever the outcome.

use std::time::Instant;

use tracing::info;

use crate::colorize::{self, ColorConfig, ColorOptions};
use crate::encode::{self, EncodedImage, OutputFormat, DEFAULT_QUALITY};
use crate::engine::{with_source, RasterEngine, SourceRaster};
use crate::error::Result;
use crate::planner::{self, ViewRequest};

/// Output settings of one render
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub format: OutputFormat,
    /// Quality of lossy formats, 1 to 100
    pub quality: u8,
    pub color: ColorOptions,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: DEFAULT_QUALITY,
            color: ColorOptions::default(),
        }
    }
}

/// A raster addressed by locator, rendered through `engine`
pub struct Cog<'a, E: RasterEngine> {
    engine: &'a E,
    locator: String,
}

impl<'a, E: RasterEngine> Cog<'a, E> {
    pub fn new(engine: &'a E, locator: impl Into<String>) -> Self {
        Self { engine, locator: locator.into() }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Renders web mercator tile `z/x/y`
    pub fn get_tile(&self, z: u32, x: u32, y: u32, options: &ImageOptions) -> Result<EncodedImage> {
        self.render(ViewRequest::Tile { z, x, y }, options)
    }

    /// Renders the whole raster in geographic coordinates, `width` pixels wide
    pub fn get_map(&self, width: u64, options: &ImageOptions) -> Result<EncodedImage> {
        self.render(ViewRequest::Overview { width }, options)
    }

    /// Renders `view` with `options`
    pub fn render(&self, view: ViewRequest, options: &ImageOptions) -> Result<EncodedImage> {
        let started = Instant::now();
        let config = ColorConfig::resolve(&options.color);

        let image = with_source(self.engine, &self.locator, |source| {
            let geometry = planner::plan(self.engine, source.crs(), &source.bounds(), &view)?;
            let request = geometry.warp_request(&config.bands, planner::nodata_options(&*source));
            let raw = self.engine.reproject_read(source, &request)?;
            let pixels = colorize::apply(&raw, &config)?;
            encode::assemble(&pixels, options.format, options.quality)
        })?;

        info!(
            locator = %self.locator,
            %view,
            format = %options.format,
            colorizer = %config,
            bytes = image.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "rendered image"
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorize::palettes;
    use crate::engine::CogEngine;
    use crate::error::Error;
    use crate::testing::GeoTiffBuilder;

    fn color(pairs: &[(&str, &str)]) -> ImageOptions {
        let mut options = ImageOptions::default();
        for &(key, value) in pairs {
            let value = Some(value.to_string());
            match key {
                "bands" => options.color.bands = value,
                "colormap" => options.color.colormap = value,
                "ranges" => options.color.ranges = value,
                "interp" => options.color.interp = value,
                _ => panic!("unknown key {}", key),
            }
        }
        options
    }

    fn decode(image: &EncodedImage) -> image::RgbaImage {
        image::load_from_memory(&image.bytes).unwrap().to_rgba8()
    }

    #[test]
    fn test_overview_exact_classes() {
        let file = GeoTiffBuilder::new(40, 20, |x, _| if x < 20 { 10.0 } else { 20.0 })
            .georef(4326, 0.0, 10.0, 1.0, 1.0)
            .write();
        let engine = CogEngine::new();
        let cog = Cog::new(&engine, file.path().to_str().unwrap());

        let options = color(&[("colormap", "red,blue"), ("ranges", "10"), ("interp", "exact")]);
        let image = cog.get_map(100, &options).unwrap();
        assert_eq!(image.mime, mime::IMAGE_PNG);

        let decoded = decode(&image);
        assert_eq!(decoded.dimensions(), (100, 50));
        assert_eq!(decoded.get_pixel(10, 25).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(90, 25).0[3], 0);
    }

    #[test]
    fn test_tile_linear() {
        let file = GeoTiffBuilder::new(360, 180, |x, _| if x < 180 { 10.0 } else { 20.0 })
            .georef(4326, -180.0, 90.0, 1.0, 1.0)
            .tile(32)
            .write();
        let engine = CogEngine::new();
        let cog = Cog::new(&engine, file.path().to_str().unwrap());

        let options = color(&[("ranges", "0,20")]);
        let decoded = decode(&cog.get_tile(1, 0, 0, &options).unwrap());
        assert_eq!(decoded.dimensions(), (256, 256));

        let expected = palettes::default_colormap().lookup_unit(0.5);
        assert!(decoded.pixels().all(|px| px.0 == expected));
    }

    #[test]
    fn test_rgb_jpeg() {
        let file = GeoTiffBuilder::new(32, 32, |_, _| 200.0)
            .band(|_, _| 100.0)
            .band(|_, _| 50.0)
            .georef(4326, 0.0, 32.0, 1.0, 1.0)
            .write();
        let engine = CogEngine::new();
        let cog = Cog::new(&engine, file.path().to_str().unwrap());

        let mut options = color(&[("bands", "1,2,3")]);
        options.format = OutputFormat::Jpeg;
        let image = cog.get_map(32, &options).unwrap();
        assert_eq!(image.mime, mime::IMAGE_JPEG);

        let decoded = image::load_from_memory(&image.bytes).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        let px = decoded.to_rgb8().get_pixel(16, 16).0;
        assert!(px[0].abs_diff(200) < 8 && px[1].abs_diff(100) < 8 && px[2].abs_diff(50) < 8);
    }

    #[test]
    fn test_request_errors() {
        let file = GeoTiffBuilder::new(16, 16, |_, _| 1.0).write();
        let engine = CogEngine::new();
        let cog = Cog::new(&engine, file.path().to_str().unwrap());

        let out_of_range = cog.get_tile(1, 5, 0, &color(&[("ranges", "0,1")]));
        assert!(matches!(out_of_range, Err(Error::Geometry(_))));

        let no_ranges = cog.get_map(16, &ImageOptions::default());
        assert!(matches!(no_ranges, Err(Error::Colorization(_))));

        let missing_band = cog.get_map(16, &color(&[("bands", "2"), ("ranges", "0,1")]));
        assert!(matches!(missing_band, Err(Error::OutOfBounds(_))));

        let missing = Cog::new(&engine, "/nonexistent/cog.tif")
            .get_map(16, &color(&[("ranges", "0,1")]));
        assert!(matches!(missing, Err(Error::SourceUnavailable { .. })));
    }
}
