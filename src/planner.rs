//! Output geometry for overview and tile requests

use std::fmt;

use tracing::debug;

use crate::engine::{NodataOptions, RasterEngine, Resampling, SourceRaster, WarpRequest, Window};
use crate::error::{Error, Result};
use crate::projection::{epsg, mercator, transform_bounds, Affine};
use crate::types::Bounds;

/// Edge length of a map tile in pixels, at every zoom level
pub const TILE_SIZE: u64 = 256;

/// Interior points sampled per edge when reprojecting source bounds
pub const OVERVIEW_DENSIFY_PTS: usize = 21;

/// What the caller wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRequest {
    /// Whole raster in geographic coordinates, `width` pixels wide
    Overview { width: u64 },
    /// One web mercator tile
    Tile { z: u32, x: u32, y: u32 },
}

impl ViewRequest {
    /// CRS the view is rendered in
    pub fn target_crs(&self) -> u32 {
        match self {
            ViewRequest::Overview { .. } => epsg::WGS84,
            ViewRequest::Tile { .. } => epsg::WEB_MERCATOR,
        }
    }
}

impl fmt::Display for ViewRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewRequest::Overview { width } => write!(f, "overview width={}", width),
            ViewRequest::Tile { z, x, y } => write!(f, "tile {}/{}/{}", z, x, y),
        }
    }
}

/// Output grid of a view and the warped grid covering it
#[derive(Debug, Clone, PartialEq)]
pub struct OutputGeometry {
    pub crs: u32,
    pub bounds: Bounds,
    pub width: u64,
    pub height: u64,
    /// Transform of the warped grid spanning exactly `bounds`
    pub warp_transform: Affine,
    pub warp_width: u64,
    pub warp_height: u64,
}

impl OutputGeometry {
    /// Read request for the whole warped grid, resampled to the output size
    pub fn warp_request(&self, bands: &[usize], nodata: NodataOptions) -> WarpRequest {
        WarpRequest {
            crs: self.crs,
            transform: self.warp_transform,
            grid_width: self.warp_width,
            grid_height: self.warp_height,
            window: Window::full(self.warp_width, self.warp_height),
            out_width: self.width as usize,
            out_height: self.height as usize,
            bands: bands.to_vec(),
            resampling: Resampling::Nearest,
            nodata,
        }
    }
}

/// Computes the output geometry of `view` for a source in `src_crs`
/// covering `src_bounds`
pub fn plan<E: RasterEngine>(
    engine: &E,
    src_crs: u32,
    src_bounds: &Bounds,
    view: &ViewRequest,
) -> Result<OutputGeometry> {
    if src_bounds.is_degenerate() {
        return Err(Error::Geometry(format!("Source bounds {} are degenerate", src_bounds)));
    }

    let crs = view.target_crs();
    let (bounds, width, height) = match *view {
        ViewRequest::Overview { width } => {
            if width == 0 {
                return Err(Error::Geometry("Overview width must be positive".to_string()));
            }
            let bounds = transform_bounds(src_crs, crs, src_bounds, OVERVIEW_DENSIFY_PTS)?;
            if bounds.is_degenerate() {
                return Err(Error::Geometry(format!(
                    "Reprojected bounds {} are degenerate",
                    bounds
                )));
            }
            let height = (width as f64 * (bounds.height() / bounds.width())) as u64;
            if height == 0 {
                return Err(Error::Geometry(format!(
                    "Overview {} pixels wide of {} has no rows",
                    width, bounds
                )));
            }
            (bounds, width, height)
        }
        ViewRequest::Tile { z, x, y } => (mercator::tile_bounds(z, x, y)?, TILE_SIZE, TILE_SIZE),
    };

    let natural = engine.default_transform(src_crs, crs, width, height, src_bounds)?;
    if !(natural.a > 0.0 && natural.e < 0.0 && natural.a.is_finite() && natural.e.is_finite()) {
        return Err(Error::Geometry(format!(
            "Natural transform has unusable scale ({}, {})",
            natural.a, natural.e
        )));
    }

    let warp_width = ((bounds.east - bounds.west) / natural.a).ceil();
    let warp_height = ((bounds.south - bounds.north) / natural.e).ceil();
    let usable = |size: f64| size >= 1.0 && size.is_finite();
    if !(usable(warp_width) && usable(warp_height)) {
        return Err(Error::Geometry(format!(
            "Warped grid {}x{} for {} is empty",
            warp_width, warp_height, bounds
        )));
    }
    let (warp_width, warp_height) = (warp_width as u64, warp_height as u64);
    let warp_transform = Affine::from_bounds(&bounds, warp_width, warp_height);

    debug!(
        %view,
        crs,
        %bounds,
        width,
        height,
        warp_width,
        warp_height,
        "planned output geometry"
    );

    Ok(OutputGeometry {
        crs,
        bounds,
        width,
        height,
        warp_transform,
        warp_width,
        warp_height,
    })
}

/// Transparency policy for reading `source`
///
/// A declared nodata value is the only source of transparency; a source
/// with its own alpha band keeps it; otherwise the engine synthesizes a
/// mask from the footprint.
pub fn nodata_options<S: SourceRaster>(source: &S) -> NodataOptions {
    match source.nodata() {
        Some(nodata) => NodataOptions { nodata: Some(nodata), add_alpha: false },
        None => NodataOptions { nodata: None, add_alpha: !source.has_alpha() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RawSample;

    /// Engine whose natural transform has a fixed pixel size
    struct FixedScale(f64);

    struct NoSource;

    impl SourceRaster for NoSource {
        fn locator(&self) -> &str {
            "none"
        }
        fn crs(&self) -> u32 {
            4326
        }
        fn bounds(&self) -> Bounds {
            Bounds::new(0.0, 0.0, 1.0, 1.0)
        }
        fn nodata(&self) -> Option<f64> {
            None
        }
        fn band_count(&self) -> usize {
            1
        }
        fn has_alpha(&self) -> bool {
            false
        }
    }

    impl RasterEngine for FixedScale {
        type Source = NoSource;

        fn open(&self, _: &str) -> Result<NoSource> {
            Ok(NoSource)
        }

        fn default_transform(&self, _: u32, _: u32, _: u64, _: u64, b: &Bounds) -> Result<Affine> {
            Ok(Affine::new(self.0, 0.0, b.west, 0.0, -self.0, b.north))
        }

        fn reproject_read(&self, _: &mut NoSource, _: &WarpRequest) -> Result<RawSample> {
            Err(Error::Unsupported("read".into()))
        }
    }

    struct Described {
        nodata: Option<f64>,
        alpha: bool,
    }

    impl SourceRaster for Described {
        fn locator(&self) -> &str {
            "described"
        }
        fn crs(&self) -> u32 {
            4326
        }
        fn bounds(&self) -> Bounds {
            Bounds::new(0.0, 0.0, 1.0, 1.0)
        }
        fn nodata(&self) -> Option<f64> {
            self.nodata
        }
        fn band_count(&self) -> usize {
            4
        }
        fn has_alpha(&self) -> bool {
            self.alpha
        }
    }

    #[test]
    fn test_tile_geometry() {
        let engine = FixedScale(1000.0);
        let src = Bounds::new(-1.0e6, -1.0e6, 1.0e6, 1.0e6);
        let view = ViewRequest::Tile { z: 3, x: 4, y: 2 };
        let geometry = plan(&engine, epsg::WEB_MERCATOR, &src, &view).unwrap();

        assert_eq!(geometry.crs, epsg::WEB_MERCATOR);
        assert_eq!(geometry.bounds, mercator::tile_bounds(3, 4, 2).unwrap());
        assert_eq!((geometry.width, geometry.height), (TILE_SIZE, TILE_SIZE));

        let span = geometry.bounds.width();
        assert_eq!(geometry.warp_width, (span / 1000.0).ceil() as u64);
        assert_eq!(geometry.warp_transform.c, geometry.bounds.west);
        assert_eq!(geometry.warp_transform.f, geometry.bounds.north);
    }

    #[test]
    fn test_overview_aspect() {
        let engine = FixedScale(0.1);
        let src = Bounds::new(-20.0, -5.0, 20.0, 15.0);
        let view = ViewRequest::Overview { width: 500 };
        let geometry = plan(&engine, epsg::WGS84, &src, &view).unwrap();

        assert_eq!(geometry.crs, epsg::WGS84);
        assert_eq!(geometry.width, 500);
        assert_eq!(geometry.height, 250);
        assert_eq!(geometry.bounds, src);
        assert_eq!((geometry.warp_width, geometry.warp_height), (400, 200));
    }

    #[test]
    fn test_overview_height_truncates() {
        let engine = FixedScale(0.1);
        let src = Bounds::new(0.0, 0.0, 3.0, 1.0);
        let view = ViewRequest::Overview { width: 100 };
        let geometry = plan(&engine, epsg::WGS84, &src, &view).unwrap();
        assert_eq!(geometry.height, 33);
    }

    #[test]
    fn test_warp_grid_rounds_up() {
        let engine = FixedScale(0.3);
        let src = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let view = ViewRequest::Overview { width: 10 };
        let geometry = plan(&engine, epsg::WGS84, &src, &view).unwrap();
        assert_eq!((geometry.warp_width, geometry.warp_height), (4, 4));
        assert!((geometry.warp_transform.a - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        let engine = FixedScale(1.0);
        let flat = Bounds::new(5.0, 0.0, 5.0, 10.0);
        let err = plan(&engine, epsg::WGS84, &flat, &ViewRequest::Overview { width: 500 });
        assert!(matches!(err, Err(Error::Geometry(_))));

        let src = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let err = plan(&engine, epsg::WGS84, &src, &ViewRequest::Overview { width: 0 });
        assert!(matches!(err, Err(Error::Geometry(_))));

        let wide = Bounds::new(0.0, 0.0, 1000.0, 1.0);
        let err = plan(&engine, epsg::WGS84, &wide, &ViewRequest::Overview { width: 10 });
        assert!(matches!(err, Err(Error::Geometry(_))));

        let err = plan(&FixedScale(0.0), epsg::WGS84, &src, &ViewRequest::Overview { width: 10 });
        assert!(matches!(err, Err(Error::Geometry(_))));
    }

    #[test]
    fn test_warp_request() {
        let engine = FixedScale(0.1);
        let src = Bounds::new(0.0, 0.0, 2.0, 1.0);
        let view = ViewRequest::Overview { width: 50 };
        let geometry = plan(&engine, epsg::WGS84, &src, &view).unwrap();
        let options = NodataOptions { nodata: None, add_alpha: true };
        let request = geometry.warp_request(&[1, 2, 3], options);

        assert_eq!(request.window, Window::full(20, 10));
        assert_eq!((request.out_width, request.out_height), (50, 25));
        assert_eq!(request.bands, vec![1, 2, 3]);
        assert_eq!(request.resampling, Resampling::Nearest);
    }

    #[test]
    fn test_nodata_policy() {
        let with_nodata = nodata_options(&Described { nodata: Some(-1.0), alpha: true });
        assert_eq!(with_nodata, NodataOptions { nodata: Some(-1.0), add_alpha: false });

        let with_alpha = nodata_options(&Described { nodata: None, alpha: true });
        assert_eq!(with_alpha, NodataOptions { nodata: None, add_alpha: false });

        let plain = nodata_options(&Described { nodata: None, alpha: false });
        assert_eq!(plain, NodataOptions { nodata: None, add_alpha: true });
    }
}
