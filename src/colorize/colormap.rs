//! Lookup-table colormaps
//!
//! A colormap is a table of RGB entries. Values are looked up either as a
//! unit-interval float (continuous ramps, normalized data) or as a direct
//! integer index (class numbers). Entries become bytes by truncating
//! `component * 255`, and every entry is fully opaque.

use super::color::Rgb;

/// Entry count of continuous ramps
pub const RAMP_SIZE: usize = 256;

/// Color returned for values that cannot be looked up (NaN)
pub const BAD_COLOR: [u8; 4] = [0, 0, 0, 0];

/// Control points `(position, value)` of one color channel, positions
/// ascending from 0.0 to 1.0
pub type Segments = [(f64, f64)];

#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    lut: Vec<Rgb>,
}

impl Colormap {
    /// Table that uses `colors` as-is, one entry per color
    ///
    /// `colors` must not be empty.
    pub fn listed(name: impl Into<String>, colors: Vec<Rgb>) -> Self {
        Self { name: name.into(), lut: colors }
    }

    /// `n`-entry ramp through `colors`, evenly spaced
    ///
    /// `colors` needs at least two entries and `n` at least two.
    pub fn from_list(name: impl Into<String>, colors: &[Rgb], n: usize) -> Self {
        let step = 1.0 / (colors.len() - 1) as f64;
        let channel = |c: usize| -> Vec<(f64, f64)> {
            colors
                .iter()
                .enumerate()
                .map(|(i, color)| {
                    let x = if i + 1 == colors.len() { 1.0 } else { i as f64 * step };
                    (x, color[c])
                })
                .collect()
        };
        Self::from_segments(name, &channel(0), &channel(1), &channel(2), n)
    }

    /// `n`-entry ramp sampling piecewise-linear channels at `i / (n - 1)`
    pub fn from_segments(
        name: impl Into<String>,
        red: &Segments,
        green: &Segments,
        blue: &Segments,
        n: usize,
    ) -> Self {
        let last = (n.max(2) - 1) as f64;
        let lut = (0..n)
            .map(|i| {
                let position = i as f64 / last;
                [
                    interpolate(red, position),
                    interpolate(green, position),
                    interpolate(blue, position),
                ]
            })
            .collect();
        Self { name: name.into(), lut }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.lut.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lut.is_empty()
    }

    /// Same table back to front, named with an `_r` suffix (or without it
    /// when already reversed)
    pub fn reversed(&self) -> Self {
        let name = match self.name.strip_suffix("_r") {
            Some(base) => base.to_string(),
            None => format!("{}_r", self.name),
        };
        let mut lut = self.lut.clone();
        lut.reverse();
        Self { name, lut }
    }

    /// Entry `index` as RGBA bytes
    pub fn entry(&self, index: usize) -> [u8; 4] {
        match self.lut.get(index) {
            Some(&[r, g, b]) => [to_byte(r), to_byte(g), to_byte(b), 255],
            None => BAD_COLOR,
        }
    }

    /// Direct lookup of a class index; indexes below zero take the first
    /// entry and indexes past the end take the last
    pub fn lookup_index(&self, index: i64) -> [u8; 4] {
        if index < 0 {
            return self.entry(0);
        }
        let last = self.lut.len().saturating_sub(1);
        self.entry((index as usize).min(last))
    }

    /// Lookup of a normalized value
    ///
    /// `[0, 1]` spans the table, values outside it clamp to the end entries
    /// and NaN gives [`BAD_COLOR`].
    pub fn lookup_unit(&self, x: f64) -> [u8; 4] {
        if x.is_nan() {
            return BAD_COLOR;
        }
        let n = self.lut.len() as f64;
        let scaled = x * n;
        if scaled < 0.0 {
            self.entry(0)
        } else if scaled == n {
            self.lookup_index(self.lut.len() as i64 - 1)
        } else {
            // also clamps +inf
            self.lookup_index(scaled.min(i64::MAX as f64) as i64)
        }
    }
}

fn to_byte(component: f64) -> u8 {
    (component.clamp(0.0, 1.0) * 255.0) as u8
}

fn interpolate(segments: &Segments, position: f64) -> f64 {
    let upper = segments.partition_point(|&(x, _)| x < position);
    match (upper.checked_sub(1).and_then(|i| segments.get(i)), segments.get(upper)) {
        (Some(&(x0, y0)), Some(&(x1, y1))) if x1 > x0 => {
            let t = (position - x0) / (x1 - x0);
            y0 * (1.0 - t) + y1 * t
        }
        (_, Some(&(_, y))) => y,
        (Some(&(_, y)), None) => y,
        (None, None) => 0.0,
    }
    .clamp(0.0, 1.0)
}
