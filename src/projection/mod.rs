//! Coordinate reference systems, transforms and raster georeferencing math

pub mod affine;
pub mod bounds;
pub mod coordinate;
pub mod mercator;
pub mod transformer;

pub use affine::Affine;
pub use bounds::{suggested_transform, transform_bounds, transform_bounds_with};
pub use coordinate::Coordinate;
pub use transformer::Transformer;

/// EPSG codes the pipeline targets
pub mod epsg {
    /// Geographic WGS84 longitude/latitude
    pub const WGS84: u32 = 4326;
    /// Spherical web mercator
    pub const WEB_MERCATOR: u32 = 3857;
}
