//! Resolution of loosely typed colorization options
//!
//! Resolution never fails: every option that is absent or does not parse
//! falls back to its default.

use std::fmt;

use serde::Deserialize;
use tracing::debug;

use super::color::parse_color;
use super::colormap::{Colormap, RAMP_SIZE};
use super::palettes;

/// Class index 0 color of custom exact-mode colormaps
const UNCLASSIFIED_COLOR: [f64; 3] = [0.0, 0.0, 0.0];

/// How single-band values are classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interp {
    /// Continuous ramp between the first and last range value
    #[default]
    Linear,
    /// Bins bounded by the range values
    Discrete,
    /// One class per range value, exact matches only
    Exact,
}

impl Interp {
    fn resolve(raw: Option<&str>) -> Self {
        match raw {
            Some("linear") | None => Interp::Linear,
            Some("discrete") => Interp::Discrete,
            Some("exact") => Interp::Exact,
            Some(other) => {
                debug!(interp = other, "unknown interp, using linear");
                Interp::Linear
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interp::Linear => "linear",
            Interp::Discrete => "discrete",
            Interp::Exact => "exact",
        }
    }
}

/// Raw options as they arrive from a query string or the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ColorOptions {
    /// Comma-separated 1-based band indexes
    pub bands: Option<String>,
    /// Palette name or comma-separated color list
    pub colormap: Option<String>,
    /// Comma-separated numbers
    pub ranges: Option<String>,
    pub interp: Option<String>,
}

/// Fully resolved colorization settings
#[derive(Debug, Clone, PartialEq)]
pub struct ColorConfig {
    pub bands: Vec<usize>,
    pub colormap: Colormap,
    pub ranges: Option<Vec<f64>>,
    pub interp: Interp,
}

impl ColorConfig {
    /// Resolves `options`, `interp` first since the colormap depends on it
    pub fn resolve(options: &ColorOptions) -> Self {
        let interp = Interp::resolve(options.interp.as_deref());
        let bands = resolve_bands(options.bands.as_deref());
        let ranges = resolve_ranges(options.ranges.as_deref());
        let colormap = resolve_colormap(options.colormap.as_deref(), interp);

        Self { bands, colormap, ranges, interp }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self::resolve(&ColorOptions::default())
    }
}

impl fmt::Display for ColorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bands={:?} colormap={} interp={} ranges={:?}",
            self.bands,
            self.colormap.name(),
            self.interp.as_str(),
            self.ranges
        )
    }
}

fn resolve_bands(raw: Option<&str>) -> Vec<usize> {
    let parsed = raw.and_then(|raw| {
        raw.split(',')
            .map(|part| part.trim().parse::<usize>().ok().filter(|&band| band > 0))
            .collect::<Option<Vec<_>>>()
    });
    parsed.unwrap_or_else(|| {
        if let Some(raw) = raw {
            debug!(bands = raw, "unparseable bands, using band 1");
        }
        vec![1]
    })
}

fn resolve_ranges(raw: Option<&str>) -> Option<Vec<f64>> {
    let raw = raw?;
    let parsed = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>();
    if parsed.is_none() {
        debug!(ranges = raw, "unparseable ranges, ignoring");
    }
    parsed
}

fn resolve_colormap(raw: Option<&str>, interp: Interp) -> Colormap {
    let Some(raw) = raw else {
        return palettes::default_colormap();
    };
    if let Some(named) = palettes::named(raw) {
        return named;
    }
    if let Some(custom) = custom_colormap(raw, interp) {
        return custom;
    }
    debug!(colormap = raw, fallback = palettes::DEFAULT_PALETTE, "unusable colormap");
    palettes::default_colormap()
}

fn custom_colormap(raw: &str, interp: Interp) -> Option<Colormap> {
    let colors = raw.split(',').map(parse_color).collect::<Option<Vec<_>>>()?;
    match interp {
        Interp::Exact => {
            let mut classes = Vec::with_capacity(colors.len() + 1);
            classes.push(UNCLASSIFIED_COLOR);
            classes.extend(colors);
            Some(Colormap::listed("custom", classes))
        }
        _ if colors.len() >= 2 => Some(Colormap::from_list("custom", &colors, RAMP_SIZE)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> ColorOptions {
        let mut options = ColorOptions::default();
        for &(key, value) in pairs {
            let value = Some(value.to_string());
            match key {
                "bands" => options.bands = value,
                "colormap" => options.colormap = value,
                "ranges" => options.ranges = value,
                "interp" => options.interp = value,
                _ => panic!("unknown key {}", key),
            }
        }
        options
    }

    #[test]
    fn test_defaults() {
        let config = ColorConfig::default();
        assert_eq!(config.bands, vec![1]);
        assert_eq!(config.interp, Interp::Linear);
        assert_eq!(config.ranges, None);
        assert_eq!(config.colormap.name(), "jet");
    }

    #[test]
    fn test_valid_options() {
        let config = ColorConfig::resolve(&options(&[
            ("bands", "3,2,1"),
            ("colormap", "Blues"),
            ("ranges", "100, 150.5,-2e3"),
            ("interp", "discrete"),
        ]));
        assert_eq!(config.bands, vec![3, 2, 1]);
        assert_eq!(config.colormap.name(), "Blues");
        assert_eq!(config.ranges, Some(vec![100.0, 150.5, -2000.0]));
        assert_eq!(config.interp, Interp::Discrete);
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let config = ColorConfig::resolve(&options(&[
            ("bands", "1,x"),
            ("colormap", "#zzzzzz,red"),
            ("ranges", "1,,2"),
            ("interp", "Linear"),
        ]));
        assert_eq!(config, ColorConfig::default());

        assert_eq!(ColorConfig::resolve(&options(&[("bands", "0")])).bands, vec![1]);
        assert_eq!(ColorConfig::resolve(&options(&[("bands", "")])).bands, vec![1]);
        assert_eq!(ColorConfig::resolve(&options(&[("ranges", "")])).ranges, None);
    }

    #[test]
    fn test_custom_ramp() {
        let config = ColorConfig::resolve(&options(&[("colormap", "#000000,white")]));
        assert_eq!(config.colormap.name(), "custom");
        assert_eq!(config.colormap.len(), RAMP_SIZE);
        assert_eq!(config.colormap.entry(0), [0, 0, 0, 255]);
        assert_eq!(config.colormap.entry(RAMP_SIZE - 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_single_color_needs_exact() {
        let linear = ColorConfig::resolve(&options(&[("colormap", "red")]));
        assert_eq!(linear.colormap.name(), "jet");

        let exact = ColorConfig::resolve(&options(&[("colormap", "red"), ("interp", "exact")]));
        assert_eq!(exact.colormap.len(), 2);
        assert_eq!(exact.colormap.entry(0), [0, 0, 0, 255]);
        assert_eq!(exact.colormap.entry(1), [255, 0, 0, 255]);
    }

    #[test]
    fn test_exact_prepends_unclassified() {
        let raw = options(&[("colormap", "red,#00f"), ("interp", "exact")]);
        let config = ColorConfig::resolve(&raw);
        assert_eq!(config.colormap.len(), 3);
        assert_eq!(config.colormap.entry(2), [0, 0, 255, 255]);
    }

    #[test]
    fn test_named_palette_wins_over_colors() {
        let config = ColorConfig::resolve(&options(&[("colormap", "Reds"), ("interp", "exact")]));
        assert_eq!(config.colormap.name(), "Reds");
        assert_eq!(config.colormap.len(), RAMP_SIZE);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let raw = options(&[("bands", "2"), ("colormap", "red,blue"), ("ranges", "0,1")]);
        assert_eq!(ColorConfig::resolve(&raw), ColorConfig::resolve(&raw));

        let junk = options(&[("bands", "a"), ("colormap", ","), ("ranges", "b"), ("interp", "c")]);
        assert_eq!(ColorConfig::resolve(&junk), ColorConfig::resolve(&junk));
    }
}
