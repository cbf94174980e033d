//! Turning raw samples into RGBA pixels

use rayon::prelude::*;

use super::colormap::Colormap;
use super::params::{ColorConfig, Interp};
use crate::error::{Error, Result};
use crate::raster::{PixelBuffer, RawSample, MASK_INVALID, MASK_VALID};

/// Number of colors discrete mode spreads its bins over
const DISCRETE_COLORS: i64 = 256;

/// Colorizes `raw` with `config`
///
/// Several bands are composed into RGB directly. A single band goes through
/// the colormap according to `config.interp`. Either way the alpha channel
/// ends up equal to the governing mask.
pub fn apply(raw: &RawSample, config: &ColorConfig) -> Result<PixelBuffer> {
    if raw.band_count() != config.bands.len() {
        return Err(Error::Colorization(format!(
            "Sample has {} bands but {} were requested",
            raw.band_count(),
            config.bands.len()
        )));
    }

    let data = match raw.bands.as_slice() {
        [single] => single,
        [] => return Err(Error::Colorization("No bands to colorize".to_string())),
        _ => return compose_rgb(raw),
    };

    let ranges = config.ranges.as_deref();
    let (rgba, mask) = match config.interp {
        Interp::Linear => (linear(data, ranges, &config.colormap)?, raw.mask.clone()),
        Interp::Discrete => (discrete(data, ranges, &config.colormap)?, raw.mask.clone()),
        Interp::Exact => exact(data, &raw.mask, ranges, &config.colormap)?,
    };

    let mut pixels = PixelBuffer::from_rgba(raw.width, raw.height, rgba)?;
    pixels.set_alpha(&mask);
    Ok(pixels)
}

/// Band values become bytes as they are, saturating outside `0..=255`
fn compose_rgb(raw: &RawSample) -> Result<PixelBuffer> {
    let [red, green, blue] = raw.bands.as_slice() else {
        return Err(Error::Colorization(format!(
            "Multi-band output needs exactly 3 bands, got {}",
            raw.band_count()
        )));
    };

    let mut rgba = vec![0u8; raw.pixel_count() * 4];
    rgba.par_chunks_mut(4).enumerate().for_each(|(i, px)| {
        px.copy_from_slice(&[red[i] as u8, green[i] as u8, blue[i] as u8, raw.mask[i]]);
    });
    PixelBuffer::from_rgba(raw.width, raw.height, rgba)
}

fn paint<F>(values: &[f64], color: F) -> Vec<u8>
where
    F: Fn(f64) -> [u8; 4] + Sync,
{
    let mut rgba = vec![0u8; values.len() * 4];
    rgba.par_chunks_mut(4)
        .zip(values.par_iter())
        .for_each(|(px, &value)| px.copy_from_slice(&color(value)));
    rgba
}

fn linear(data: &[f64], ranges: Option<&[f64]>, cmap: &Colormap) -> Result<Vec<u8>> {
    let Some(&[vmin, .., vmax]) = ranges else {
        return Err(Error::Colorization(
            "Linear interpolation needs at least 2 range values".to_string(),
        ));
    };
    if vmin > vmax {
        return Err(Error::Colorization(format!(
            "Range minimum {} is above maximum {}",
            vmin, vmax
        )));
    }

    let span = vmax - vmin;
    Ok(paint(data, |value| {
        if span == 0.0 {
            cmap.lookup_unit(0.0)
        } else {
            cmap.lookup_unit((value - vmin) / span)
        }
    }))
}

fn discrete(data: &[f64], ranges: Option<&[f64]>, cmap: &Colormap) -> Result<Vec<u8>> {
    let norm = BoundaryNorm::new(ranges.unwrap_or_default())?;
    Ok(paint(data, |value| match norm.index(value) {
        Some(index) => cmap.lookup_index(index),
        None => cmap.lookup_unit(f64::NAN),
    }))
}

/// Reclassifies exact matches to `1..=ranges.len()`; everything else,
/// including valid pixels with other values, becomes class 0 and invalid
fn exact(
    data: &[f64],
    mask: &[u8],
    ranges: Option<&[f64]>,
    cmap: &Colormap,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let classes = match ranges {
        Some(ranges) if !ranges.is_empty() => ranges,
        _ => {
            return Err(Error::Colorization(
                "Exact interpolation needs at least 1 range value".to_string(),
            ))
        }
    };

    let class_of = |value: f64, valid: u8| -> i64 {
        if valid != MASK_VALID {
            return 0;
        }
        // later duplicates win
        classes
            .iter()
            .rposition(|&class| class == value)
            .map_or(0, |n| n as i64 + 1)
    };

    let mut rgba = vec![0u8; data.len() * 4];
    let mut working = vec![MASK_INVALID; data.len()];
    rgba.par_chunks_mut(4)
        .zip(working.par_iter_mut())
        .enumerate()
        .for_each(|(i, (px, alpha))| {
            let class = class_of(data[i], mask[i]);
            if class > 0 {
                *alpha = MASK_VALID;
            }
            px.copy_from_slice(&cmap.lookup_index(class));
        });
    Ok((rgba, working))
}

/// Maps values to color indexes using bin edges
///
/// Values in `[b[i], b[i+1])` map to bin `i`; bins spread evenly over the
/// available colors. Values below the first edge map to -1 and values at
/// or above the last edge map past the end.
struct BoundaryNorm<'a> {
    boundaries: &'a [f64],
}

impl<'a> BoundaryNorm<'a> {
    fn new(boundaries: &'a [f64]) -> Result<Self> {
        if boundaries.is_empty() {
            return Err(Error::Colorization(
                "Discrete interpolation needs at least 1 range value".to_string(),
            ));
        }
        if boundaries.windows(2).any(|pair| !(pair[0] <= pair[1])) {
            return Err(Error::Colorization(format!(
                "Range values must be ascending, got {:?}",
                boundaries
            )));
        }
        if boundaries.len() as i64 - 1 > DISCRETE_COLORS {
            return Err(Error::Colorization(format!(
                "{} range values make more bins than {} colors",
                boundaries.len(),
                DISCRETE_COLORS
            )));
        }
        Ok(Self { boundaries })
    }

    fn index(&self, value: f64) -> Option<i64> {
        if value.is_nan() {
            return None;
        }
        let (first, last) = match self.boundaries {
            [first, .., last] => (*first, *last),
            [only] => (*only, *only),
            [] => return None,
        };
        if value < first {
            return Some(-1);
        }
        if value >= last {
            return Some(DISCRETE_COLORS);
        }

        let bin = self.boundaries.partition_point(|&edge| edge <= value) as i64 - 1;
        let regions = self.boundaries.len() as i64 - 1;
        Some(if regions == 1 {
            (DISCRETE_COLORS - 1) / 2
        } else if DISCRETE_COLORS > regions {
            ((DISCRETE_COLORS - 1) as f64 / (regions - 1) as f64 * bin as f64) as i64
        } else {
            bin
        })
    }
}
