//! Colorization of raw samples
//!
//! [`ColorConfig::resolve`] turns raw options into settings without ever
//! failing, and [`apply`] turns a [`RawSample`](crate::raster::RawSample)
//! into RGBA pixels with those settings.

pub mod color;
pub mod colormap;
pub mod palettes;
pub mod params;
mod classify;

pub use classify::apply;
pub use colormap::Colormap;
pub use params::{ColorConfig, ColorOptions, Interp};
