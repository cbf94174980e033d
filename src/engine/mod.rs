//! Raster engine boundary: opening sources and reading reprojected samples
//!
//! The pipeline only talks to [`RasterEngine`]; [`tiff::CogEngine`] is the
//! implementation backed by memory-mapped (Big)TIFF files.

pub mod tiff;

pub use tiff::{CogEngine, CogSource};

use tracing::debug;

use crate::error::Result;
use crate::projection::Affine;
use crate::raster::RawSample;
use crate::types::Bounds;

/// An opened raster, held for the duration of one request
///
/// Dropping the value releases it.
pub trait SourceRaster: Send {
    /// Locator the source was opened from
    fn locator(&self) -> &str;
    /// Native CRS as an EPSG code
    fn crs(&self) -> u32;
    /// Native envelope in [`SourceRaster::crs`] units
    fn bounds(&self) -> Bounds;
    fn nodata(&self) -> Option<f64>;
    fn band_count(&self) -> usize;
    /// Whether the source carries its own transparency, as an alpha band
    /// or an internal mask
    fn has_alpha(&self) -> bool;
}

/// Resampling used when output pixels do not line up with source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resampling {
    #[default]
    Nearest,
}

/// How the engine decides which pixels are transparent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodataOptions {
    /// Declared nodata value passed through to the read
    pub nodata: Option<f64>,
    /// Synthesize a mask from the source footprint
    pub add_alpha: bool,
}

/// Pixel window into the warped (VRT) grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub col_off: u64,
    pub row_off: u64,
    pub width: u64,
    pub height: u64,
}

impl Window {
    /// Window covering a whole `width` x `height` grid
    pub fn full(width: u64, height: u64) -> Self {
        Self { col_off: 0, row_off: 0, width, height }
    }
}

/// Everything a reprojected read needs
#[derive(Debug, Clone, PartialEq)]
pub struct WarpRequest {
    /// Target CRS as an EPSG code
    pub crs: u32,
    /// Transform of the warped grid
    pub transform: Affine,
    pub grid_width: u64,
    pub grid_height: u64,
    /// Part of the warped grid to read
    pub window: Window,
    /// Shape of the returned sample
    pub out_width: usize,
    pub out_height: usize,
    /// 1-based band indexes, in output order
    pub bands: Vec<usize>,
    pub resampling: Resampling,
    pub nodata: NodataOptions,
}

/// Opens raster sources and reads reprojected data from them
pub trait RasterEngine: Send + Sync {
    type Source: SourceRaster;

    /// Opens `locator`; every failure is reported as source unavailable
    fn open(&self, locator: &str) -> Result<Self::Source>;

    /// Natural north-up transform for reprojecting the whole of
    /// `src_bounds` to `dst_crs` at `width` x `height` pixels
    fn default_transform(
        &self,
        src_crs: u32,
        dst_crs: u32,
        width: u64,
        height: u64,
        src_bounds: &Bounds,
    ) -> Result<Affine>;

    /// Reads `request.bands` warped onto the requested grid, plus the mask
    fn reproject_read(&self, source: &mut Self::Source, request: &WarpRequest) -> Result<RawSample>;
}

/// Opens `locator`, runs `f` with it and releases it on every exit path
pub fn with_source<E, T, F>(engine: &E, locator: &str, f: F) -> Result<T>
where
    E: RasterEngine,
    F: FnOnce(&mut E::Source) -> Result<T>,
{
    let mut source = engine.open(locator)?;
    debug!(locator, crs = source.crs(), bands = source.band_count(), "opened source");
    let result = f(&mut source);
    drop(source);
    debug!(locator, ok = result.is_ok(), "released source");
    result
}
