//! cogserv - map tiles and overview images from Cloud-Optimized GeoTIFFs
//!
//! A request opens one COG, plans the output geometry for a web mercator
//! tile or a geographic overview, reads the reprojected samples, colorizes
//! them and encodes the result as PNG, JPEG or WebP.
//!
//! # Examples
//!
//! ```no_run
//! use cogserv::{CogEngine, Cog, ImageOptions, ColorOptions};
//!
//! let engine = CogEngine::new();
//! let cog = Cog::new(&engine, "scene.tif");
//!
//! let options = ImageOptions {
//!     color: ColorOptions {
//!         colormap: Some("Blues".to_string()),
//!         ranges: Some("100,150".to_string()),
//!         ..ColorOptions::default()
//!     },
//!     ..ImageOptions::default()
//! };
//! let tile = cog.get_tile(10, 163, 395, &options)?;
//! tile.export("tile.png")?;
//! # Ok::<(), cogserv::Error>(())
//! ```

pub mod io;
pub mod error;
pub mod types;
pub mod raster;
pub mod formats;
pub mod compression;
pub mod projection;
pub mod engine;
pub mod planner;
pub mod colorize;
pub mod encode;
pub mod cog;
pub mod config;
pub mod logging;
pub mod api;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use types::{Bounds, DataType, Dimensions};
pub use raster::{PixelBuffer, RawSample};
pub use formats::tiff::{Tiff, TiffReader, GeoInfo};
pub use engine::{CogEngine, CogSource, RasterEngine, SourceRaster};
pub use planner::{OutputGeometry, ViewRequest};
pub use colorize::{ColorConfig, ColorOptions, Interp};
pub use encode::{EncodedImage, OutputFormat};
pub use cog::{Cog, ImageOptions};
pub use config::ServerConfig;
