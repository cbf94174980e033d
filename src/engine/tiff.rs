//! Raster engine over local Cloud-Optimized GeoTIFFs

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::formats::tiff::geotiff::{self, GeoInfo};
use crate::formats::tiff::reader::parallel::load_chunks_parallel;
use crate::formats::tiff::reader::tiles::{ChunkLayout, MaskLayout};
use crate::formats::tiff::TiffReader;
use crate::projection::{suggested_transform, Affine, Coordinate, Transformer};
use crate::raster::{RawSample, MASK_INVALID, MASK_VALID};
use crate::types::Bounds;

use super::{RasterEngine, SourceRaster, WarpRequest};

/// Engine reading memory-mapped (Big)TIFF files from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct CogEngine;

impl CogEngine {
    pub fn new() -> Self {
        Self
    }
}

/// One resolution of the image pyramid
#[derive(Debug, Clone)]
struct Level {
    layout: ChunkLayout,
    /// Internal mask of the same size, when the file has one
    mask: Option<MaskLayout>,
    /// Pixel-corner to source CRS transform of this level
    transform: Affine,
}

/// An opened COG
pub struct CogSource {
    locator: String,
    reader: TiffReader,
    levels: Vec<Level>,
    crs: u32,
    bounds: Bounds,
    nodata: Option<f64>,
    alpha_band: Option<usize>,
    band_count: usize,
}

impl CogSource {
    fn open(locator: &str) -> Result<Self> {
        let reader = TiffReader::open(locator)?;
        let tiff = reader.read()?;
        let tag_reader = reader.tag_reader();

        let main = tiff
            .main_ifd()
            .ok_or_else(|| Error::InvalidFormat("File has no images".to_string()))?;
        let dims = main
            .dimensions()
            .ok_or_else(|| Error::InvalidFormat("Main image has no dimensions".to_string()))?;

        let geo = GeoInfo::from_ifd(main, &tag_reader)?
            .ok_or_else(|| Error::InvalidFormat("Not a GeoTIFF".to_string()))?;
        let crs = geo
            .epsg_code
            .ok_or_else(|| Error::Unsupported("GeoTIFF without an EPSG code".to_string()))?;
        let base_transform = geo
            .affine()
            .ok_or_else(|| Error::InvalidFormat("Missing georeferencing".to_string()))?;
        let bounds = geo
            .bounds(dims.width, dims.height)
            .ok_or_else(|| Error::InvalidFormat("Missing georeferencing".to_string()))?;

        let mut masks = Vec::new();
        for ifd in tiff.masks() {
            match MaskLayout::from_ifd(ifd, &tag_reader) {
                Ok(mask) => masks.push(mask),
                Err(e) => warn!(locator, ifd = ifd.number, error = %e, "ignoring unreadable mask"),
            }
        }

        let mut levels = Vec::new();
        for ifd in tiff.pyramid() {
            let layout = ChunkLayout::from_ifd(ifd, &tag_reader)?;
            if layout.samples_per_pixel != main.samples_per_pixel() as usize {
                continue;
            }
            let size = (layout.width, layout.height);
            let mask = masks
                .iter()
                .find(|mask| (mask.chunks.width, mask.chunks.height) == size)
                .cloned();
            let transform = base_transform.scaled_pixels(
                dims.width as f64 / layout.width as f64,
                dims.height as f64 / layout.height as f64,
            );
            levels.push(Level { layout, mask, transform });
        }
        // a masked image must not be read through an unmasked overview
        if levels.first().is_some_and(|level| level.mask.is_some()) {
            levels.retain(|level| level.mask.is_some());
        }

        let nodata = geotiff::nodata(main, &tag_reader)?;
        let alpha_band = geotiff::alpha_band(main, &tag_reader)?;
        let band_count = main.samples_per_pixel() as usize;

        Ok(Self {
            locator: locator.to_string(),
            reader,
            levels,
            crs,
            bounds,
            nodata,
            alpha_band,
            band_count,
        })
    }

    /// Number of pyramid levels, full resolution included
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Whether transparency comes from an internal mask
    pub fn has_internal_mask(&self) -> bool {
        self.levels.first().is_some_and(|level| level.mask.is_some())
    }

    /// Picks the coarsest level whose pixels are not coarser than
    /// `source_pixel_size` (in source CRS units)
    fn choose_level(&self, source_pixel_size: f64) -> usize {
        let tolerance = 1.0 + 1e-9;
        let mut chosen = 0;
        for (index, level) in self.levels.iter().enumerate() {
            let t = &level.transform;
            let level_size = t.a.hypot(t.d).min(t.b.hypot(t.e));
            if level_size <= source_pixel_size * tolerance {
                chosen = index;
            }
        }
        chosen
    }
}

impl Drop for CogSource {
    fn drop(&mut self) {
        debug!(locator = %self.locator, "closing source");
    }
}

impl SourceRaster for CogSource {
    fn locator(&self) -> &str {
        &self.locator
    }

    fn crs(&self) -> u32 {
        self.crs
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn band_count(&self) -> usize {
        self.band_count
    }

    fn has_alpha(&self) -> bool {
        self.alpha_band.is_some() || self.has_internal_mask()
    }
}

/// Source location of one warped grid pixel
#[derive(Debug, Clone, Copy)]
struct Hit {
    x: u64,
    y: u64,
}

/// Nearest warped-grid index for each output index along one axis
fn axis_lookup(offset: u64, window_len: u64, out_len: usize) -> Vec<u64> {
    let ratio = window_len as f64 / out_len as f64;
    (0..out_len)
        .map(|i| {
            let index = ((i as f64 + 0.5) * ratio).floor() as u64;
            offset + index.min(window_len.saturating_sub(1))
        })
        .collect()
}

impl RasterEngine for CogEngine {
    type Source = CogSource;

    fn open(&self, locator: &str) -> Result<CogSource> {
        CogSource::open(locator).map_err(|e| Error::source_unavailable(locator, e))
    }

    fn default_transform(
        &self,
        src_crs: u32,
        dst_crs: u32,
        width: u64,
        height: u64,
        src_bounds: &Bounds,
    ) -> Result<Affine> {
        suggested_transform(src_crs, dst_crs, width, height, src_bounds)
    }

    fn reproject_read(&self, source: &mut CogSource, request: &WarpRequest) -> Result<RawSample> {
        let (out_w, out_h) = (request.out_width, request.out_height);
        if out_w == 0 || out_h == 0 || request.window.width == 0 || request.window.height == 0 {
            return Err(Error::Geometry(format!("Cannot read an empty {}x{} sample", out_w, out_h)));
        }
        for &band in &request.bands {
            if band == 0 || band > source.band_count {
                return Err(Error::OutOfBounds(format!(
                    "Band {} requested from a source with {} band(s)",
                    band, source.band_count
                )));
            }
        }
        if source.levels.is_empty() {
            return Err(Error::InvalidFormat(format!("{} has no readable image", source.locator)));
        }

        let to_source = Transformer::new(request.crs, source.crs)?;

        let cols = axis_lookup(request.window.col_off, request.window.width, out_w);
        let rows = axis_lookup(request.window.row_off, request.window.height, out_h);

        // output pixels never resolve finer than the warped grid
        let t = request.transform;
        let step_x = (request.window.width as f64 / out_w as f64).max(1.0);
        let step_y = (request.window.height as f64 / out_h as f64).max(1.0);
        let source_pixel_size =
            estimate_source_pixel_size(&to_source, &t, &request.window, step_x, step_y);
        let level_index = source_pixel_size
            .map(|size| source.choose_level(size))
            .unwrap_or(0);
        let level = &source.levels[level_index];
        let layout = &level.layout;
        let to_level = level.transform.inverse()?;

        debug!(
            locator = %source.locator,
            level = level_index,
            level_width = layout.width,
            level_height = layout.height,
            "reading level"
        );

        // map each distinct warped-grid pixel to a level pixel
        let unique_cols: Vec<u64> = dedup_sorted(&cols);
        let unique_rows: Vec<u64> = dedup_sorted(&rows);
        let mut grid: Vec<Option<Hit>> = Vec::with_capacity(unique_cols.len() * unique_rows.len());
        for &row in &unique_rows {
            for &col in &unique_cols {
                let (x, y) = t.apply(col as f64 + 0.5, row as f64 + 0.5);
                let hit = to_source
                    .transform(Coordinate::new(x, y))
                    .ok()
                    .filter(|p| p.is_finite())
                    .and_then(|p| {
                        let (px, py) = to_level.apply(p.x, p.y);
                        let (px, py) = (px.floor(), py.floor());
                        let inside = px >= 0.0
                            && py >= 0.0
                            && px < layout.width as f64
                            && py < layout.height as f64;
                        inside.then(|| Hit { x: px as u64, y: py as u64 })
                    });
                grid.push(hit);
            }
        }

        // an internal mask takes precedence over an alpha band
        let use_alpha = request.nodata.nodata.is_none() && !request.nodata.add_alpha;
        let mask_layout = if use_alpha { level.mask.as_ref() } else { None };
        let alpha_band = if use_alpha && mask_layout.is_none() { source.alpha_band } else { None };

        let mut band_indexes: Vec<usize> = request.bands.iter().map(|b| b - 1).collect();
        if let Some(alpha) = alpha_band {
            band_indexes.push(alpha);
        }

        let mut needed = BTreeSet::new();
        for hit in grid.iter().flatten() {
            for &band in &band_indexes {
                needed.insert(layout.chunk_index(hit.x, hit.y, band));
            }
        }
        let needed: Vec<usize> = needed.into_iter().collect();
        let order = source.reader.byte_order();
        let chunks = load_chunks_parallel(layout, source.reader.data(), order, &needed);
        debug!(requested = needed.len(), decoded = chunks.len(), "decoded chunks");

        let mask_chunks = match mask_layout {
            Some(mask) => {
                let needed: BTreeSet<usize> = grid
                    .iter()
                    .flatten()
                    .map(|hit| mask.chunk_index(hit.x, hit.y))
                    .collect();
                let needed: Vec<usize> = needed.into_iter().collect();
                load_chunks_parallel(&mask.chunks, source.reader.data(), order, &needed)
            }
            None => HashMap::new(),
        };

        let fill = request.nodata.nodata.unwrap_or(0.0);
        // `None` when the chunk failed to decode or is short
        let read = |hit: &Hit, band: usize| -> Option<f64> {
            chunks
                .get(&layout.chunk_index(hit.x, hit.y, band))
                .and_then(|chunk| layout.sample(chunk, hit.x, hit.y, band, order))
        };

        let pixels = out_w * out_h;
        let mut bands = vec![vec![fill; pixels]; request.bands.len()];
        let mut mask = vec![MASK_INVALID; pixels];
        let col_slot: Vec<usize> = cols.iter().map(|c| slot(&unique_cols, *c)).collect();
        let row_slot: Vec<usize> = rows.iter().map(|r| slot(&unique_rows, *r)).collect();

        for (out_row, &row_index) in row_slot.iter().enumerate() {
            for (out_col, &col_index) in col_slot.iter().enumerate() {
                let hit = match &grid[row_index * unique_cols.len() + col_index] {
                    Some(hit) => hit,
                    None => continue,
                };
                let pixel = out_row * out_w + out_col;

                let values: Option<Vec<f64>> = band_indexes[..bands.len()]
                    .iter()
                    .map(|&band| read(hit, band))
                    .collect();
                let Some(values) = values else {
                    continue;
                };
                for (band_values, value) in bands.iter_mut().zip(values) {
                    band_values[pixel] = value;
                }

                let valid = match (request.nodata.nodata, mask_layout, alpha_band) {
                    (Some(nodata), _, _) => {
                        !bands.iter().all(|values| same_value(values[pixel], nodata))
                    }
                    (None, Some(mask), _) => mask_chunks
                        .get(&mask.chunk_index(hit.x, hit.y))
                        .and_then(|chunk| mask.is_valid(chunk, hit.x, hit.y))
                        .unwrap_or(false),
                    (None, None, Some(alpha)) => read(hit, alpha).is_some_and(|a| a != 0.0),
                    (None, None, None) => true,
                };
                mask[pixel] = if valid { MASK_VALID } else { MASK_INVALID };
            }
        }

        RawSample::new(out_w, out_h, bands, mask)
    }
}

/// Equality that treats two NaNs as the same value
fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn dedup_sorted(values: &[u64]) -> Vec<u64> {
    let mut unique = values.to_vec();
    unique.dedup();
    unique
}

fn slot(unique: &[u64], value: u64) -> usize {
    unique.binary_search(&value).unwrap_or(0)
}

/// Size, in source CRS units, of one effective output pixel at the window centre
fn estimate_source_pixel_size(
    to_source: &Transformer,
    transform: &Affine,
    window: &super::Window,
    step_x: f64,
    step_y: f64,
) -> Option<f64> {
    let col = window.col_off as f64 + window.width as f64 / 2.0;
    let row = window.row_off as f64 + window.height as f64 / 2.0;

    let project = |col: f64, row: f64| {
        let (x, y) = transform.apply(col, row);
        to_source
            .transform(Coordinate::new(x, y))
            .ok()
            .filter(|p| p.is_finite())
    };

    let centre = project(col, row)?;
    let right = project(col + step_x, row)?;
    let below = project(col, row + step_y)?;

    let dx = (right.x - centre.x).hypot(right.y - centre.y);
    let dy = (below.x - centre.x).hypot(below.y - centre.y);
    let size = dx.min(dy);
    (size > 0.0 && size.is_finite()).then_some(size)
}
