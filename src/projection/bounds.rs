//! Envelope reprojection and suggested warp output

use crate::error::{Error, Result};
use crate::projection::{Affine, Coordinate, Transformer};
use crate::types::Bounds;

/// Points sampled along each edge when estimating a reprojected extent
const SUGGESTED_WARP_DENSIFY: usize = 21;

/// Reprojects an envelope, sampling `densify_pts` extra points along each
/// edge so curved images of straight edges stay inside the result
///
/// Points that fail to transform or land on non-finite coordinates are
/// skipped; the call only fails when none survive.
pub fn transform_bounds(
    from_epsg: u32,
    to_epsg: u32,
    bounds: &Bounds,
    densify_pts: usize,
) -> Result<Bounds> {
    let transformer = Transformer::new(from_epsg, to_epsg)?;
    transform_bounds_with(&transformer, bounds, densify_pts)
}

/// [`transform_bounds`] with an existing transformer
pub fn transform_bounds_with(
    transformer: &Transformer,
    bounds: &Bounds,
    densify_pts: usize,
) -> Result<Bounds> {
    let mut out = Bounds::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut hits = 0usize;

    for point in edge_points(bounds, densify_pts) {
        let projected = match transformer.transform(point) {
            Ok(p) if p.is_finite() => p,
            _ => continue,
        };
        out.west = out.west.min(projected.x);
        out.east = out.east.max(projected.x);
        out.south = out.south.min(projected.y);
        out.north = out.north.max(projected.y);
        hits += 1;
    }

    if hits == 0 {
        return Err(Error::Projection(format!(
            "No point of {} transforms from EPSG:{} to EPSG:{}",
            bounds,
            transformer.from_epsg(),
            transformer.to_epsg()
        )));
    }
    Ok(out)
}

/// Corners plus `densify_pts` interior points on each of the four edges
fn edge_points(bounds: &Bounds, densify_pts: usize) -> Vec<Coordinate> {
    let steps = densify_pts + 1;
    let mut points = Vec::with_capacity(4 * steps);

    for i in 0..steps {
        let t = i as f64 / steps as f64;
        let x = bounds.west + (bounds.east - bounds.west) * t;
        let y = bounds.south + (bounds.north - bounds.south) * t;
        // bottom and top run west to east, left and right run south to north
        points.push(Coordinate::new(x, bounds.south));
        points.push(Coordinate::new(bounds.east - (bounds.east - bounds.west) * t, bounds.north));
        points.push(Coordinate::new(bounds.east, y));
        points.push(Coordinate::new(bounds.west, bounds.north - (bounds.north - bounds.south) * t));
    }

    points
}

/// Natural north-up transform for warping `src_bounds` onto a
/// `width` x `height` grid in `dst_epsg`
///
/// The source extent is reprojected, and square pixels are sized so the
/// diagonal of the reprojected extent spans the diagonal of the grid.
pub fn suggested_transform(
    src_epsg: u32,
    dst_epsg: u32,
    width: u64,
    height: u64,
    src_bounds: &Bounds,
) -> Result<Affine> {
    if width == 0 || height == 0 {
        return Err(Error::Geometry(format!("Output grid {}x{} is empty", width, height)));
    }
    if src_bounds.is_degenerate() {
        return Err(Error::Geometry(format!("Source bounds {} are degenerate", src_bounds)));
    }

    let extent = transform_bounds(src_epsg, dst_epsg, src_bounds, SUGGESTED_WARP_DENSIFY)?;
    let diagonal = extent.width().hypot(extent.height());
    let pixel_size = diagonal / (width as f64).hypot(height as f64);

    if pixel_size == 0.0 || !pixel_size.is_finite() {
        return Err(Error::Geometry(format!("Reprojected extent {} is degenerate", extent)));
    }

    Ok(Affine::new(pixel_size, 0.0, extent.west, 0.0, -pixel_size, extent.north))
}
