use serde::{Deserialize, Serialize};

use crate::colorize::ColorOptions;

/// Query string of tile and overview requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderQuery {
    pub bands: Option<String>,
    pub colormap: Option<String>,
    pub ranges: Option<String>,
    pub interp: Option<String>,
    pub quality: Option<u8>,
    /// Overview width; ignored by tile requests
    pub width: Option<u64>,
}

impl RenderQuery {
    pub fn color_options(&self) -> ColorOptions {
        ColorOptions {
            bands: self.bands.clone(),
            colormap: self.colormap.clone(),
            ranges: self.ranges.clone(),
            interp: self.interp.clone(),
        }
    }
}

/// What follows `~/` in a render path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    Tile { z: u32, x: u32, y: u32, ext: String },
    Map { ext: String },
}

impl RenderTarget {
    pub fn ext(&self) -> &str {
        match self {
            RenderTarget::Tile { ext, .. } | RenderTarget::Map { ext } => ext,
        }
    }
}

/// Splits `<key>~/tile/<z>/<x>/<y>.<ext>` or `<key>~/map.<ext>` into the
/// key and the target
pub fn parse_render_path(rest: &str) -> Option<(String, RenderTarget)> {
    let rest = rest.trim_start_matches('/');
    let (key, target) = rest.split_once("~/")?;
    if key.is_empty() {
        return None;
    }

    if let Some(ext) = target.strip_prefix("map.") {
        if ext.is_empty() || ext.contains('/') {
            return None;
        }
        return Some((key.to_string(), RenderTarget::Map { ext: ext.to_string() }));
    }

    let tile = target.strip_prefix("tile/")?;
    let (z, rest) = tile.split_once('/')?;
    let (x, last) = rest.split_once('/')?;
    let (y, ext) = last.split_once('.')?;
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    let target = RenderTarget::Tile {
        z: z.parse().ok()?,
        x: x.parse().ok()?,
        y: y.parse().ok()?,
        ext: ext.to_string(),
    };
    Some((key.to_string(), target))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
