//! Spherical web mercator math and the XYZ tile grid

use crate::error::{Error, Result};
use crate::types::Bounds;

/// Radius of the sphere used by EPSG:3857
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Half the width of the projected world, in metres
pub const ORIGIN_SHIFT: f64 = std::f64::consts::PI * EARTH_RADIUS;

/// Latitude limit of the square web mercator world
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Deepest zoom level accepted for tile addressing
pub const MAX_ZOOM: u32 = 30;

/// WGS84 degrees to web mercator metres, latitude clamped to the square world
pub fn lonlat_to_meters(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = lon.to_radians() * EARTH_RADIUS;
    let y = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;
    (x, y)
}

/// Web mercator metres to WGS84 degrees
pub fn meters_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// Exact web mercator envelope of tile (z, x, y), y counted from the north
pub fn tile_bounds(z: u32, x: u32, y: u32) -> Result<Bounds> {
    if z > MAX_ZOOM {
        return Err(Error::Geometry(format!("Zoom {} exceeds maximum {}", z, MAX_ZOOM)));
    }
    let tiles = 1u64 << z;
    if x as u64 >= tiles || y as u64 >= tiles {
        return Err(Error::Geometry(format!(
            "Tile {}/{}/{} outside the {}x{} grid",
            z, x, y, tiles, tiles
        )));
    }

    let tile_size = 2.0 * ORIGIN_SHIFT / tiles as f64;
    let west = -ORIGIN_SHIFT + x as f64 * tile_size;
    let north = ORIGIN_SHIFT - y as f64 * tile_size;

    Ok(Bounds::new(west, north - tile_size, west + tile_size, north))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_tile() {
        let b = tile_bounds(0, 0, 0).unwrap();
        assert_eq!(b.west, -ORIGIN_SHIFT);
        assert_eq!(b.east, ORIGIN_SHIFT);
        assert_eq!(b.south, -ORIGIN_SHIFT);
        assert_eq!(b.north, ORIGIN_SHIFT);
        assert!((ORIGIN_SHIFT - 20037508.342789244).abs() < 1e-6);
    }

    #[test]
    fn test_tile_at_zoom_one() {
        let b = tile_bounds(1, 1, 0).unwrap();
        assert_eq!(b.west, 0.0);
        assert_eq!(b.south, 0.0);
        assert_eq!(b.east, ORIGIN_SHIFT);
        assert_eq!(b.north, ORIGIN_SHIFT);
    }

    #[test]
    fn test_tile_out_of_grid() {
        assert!(matches!(tile_bounds(2, 4, 0), Err(Error::Geometry(_))));
        assert!(matches!(tile_bounds(31, 0, 0), Err(Error::Geometry(_))));
    }

    #[test]
    fn test_latitude_clamp() {
        let (_, y) = lonlat_to_meters(0.0, 90.0);
        assert!((y - ORIGIN_SHIFT).abs() < 1.0);
        let (lon, lat) = meters_to_lonlat(ORIGIN_SHIFT, ORIGIN_SHIFT);
        assert!((lon - 180.0).abs() < 1e-9);
        assert!((lat - MAX_LATITUDE).abs() < 1e-6);
    }
}
