//! Pixel to model affine transforms
//!
//! Coefficients follow the usual raster convention:
//! `x = a * col + b * row + c`, `y = d * col + e * row + f`.

use crate::error::{Error, Result};
use crate::types::Bounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// North-up transform spreading `bounds` over a `width` x `height` grid
    pub fn from_bounds(bounds: &Bounds, width: u64, height: u64) -> Self {
        Self::new(
            (bounds.east - bounds.west) / width as f64,
            0.0,
            bounds.west,
            0.0,
            (bounds.south - bounds.north) / height as f64,
            bounds.north,
        )
    }

    /// Maps pixel (col, row) to model (x, y)
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Transform mapping model (x, y) back to pixel (col, row)
    pub fn inverse(&self) -> Result<Affine> {
        let det = self.a * self.e - self.b * self.d;
        if det == 0.0 || !det.is_finite() {
            return Err(Error::Geometry(format!("Affine transform {:?} is not invertible", self)));
        }

        let ia = self.e / det;
        let ib = -self.b / det;
        let id = -self.d / det;
        let ie = self.a / det;

        Ok(Affine::new(
            ia,
            ib,
            -(ia * self.c + ib * self.f),
            id,
            ie,
            -(id * self.c + ie * self.f),
        ))
    }

    /// Moves the origin by (`dx`, `dy`) pixels
    pub fn translated_pixels(&self, dx: f64, dy: f64) -> Affine {
        let (c, f) = self.apply(dx, dy);
        Affine::new(self.a, self.b, c, self.d, self.e, f)
    }

    /// Same origin with pixels `sx` times wider and `sy` times taller
    pub fn scaled_pixels(&self, sx: f64, sy: f64) -> Affine {
        Affine::new(self.a * sx, self.b * sy, self.c, self.d * sx, self.e * sy, self.f)
    }
}
