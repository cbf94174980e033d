use crate::error::{Error, Result};
use crate::projection::coordinate::Coordinate;
use crate::projection::epsg;
use crate::projection::mercator;
use proj::Proj;

enum Backend {
    Identity,
    LonLatToMercator,
    MercatorToLonLat,
    Proj(Proj),
}

/// Transforms coordinates between different coordinate reference systems
///
/// WGS84 and web mercator convert in closed form; every other pair goes
/// through PROJ.
pub struct Transformer {
    backend: Backend,
    from_epsg: u32,
    to_epsg: u32,
}

impl Transformer {
    /// Creates a new transformer from source to target CRS using EPSG codes
    pub fn new(from_epsg: u32, to_epsg: u32) -> Result<Self> {
        let backend = match (from_epsg, to_epsg) {
            (from, to) if from == to => Backend::Identity,
            (epsg::WGS84, epsg::WEB_MERCATOR) => Backend::LonLatToMercator,
            (epsg::WEB_MERCATOR, epsg::WGS84) => Backend::MercatorToLonLat,
            _ => {
                let from = format!("EPSG:{}", from_epsg);
                let to = format!("EPSG:{}", to_epsg);
                let proj = Proj::new_known_crs(&from, &to, None)
                    .map_err(|e| {
                        Error::Projection(format!(
                            "Failed to create projection {} -> {}: {}",
                            from, to, e
                        ))
                    })?;
                Backend::Proj(proj)
            }
        };

        Ok(Self {
            backend,
            from_epsg,
            to_epsg,
        })
    }

    /// Transforms a coordinate from source to target CRS
    pub fn transform(&self, coord: Coordinate) -> Result<Coordinate> {
        match &self.backend {
            Backend::Identity => Ok(coord),
            Backend::LonLatToMercator => {
                let (x, y) = mercator::lonlat_to_meters(coord.x, coord.y);
                Ok(Coordinate::new(x, y))
            }
            Backend::MercatorToLonLat => {
                let (lon, lat) = mercator::meters_to_lonlat(coord.x, coord.y);
                Ok(Coordinate::new(lon, lat))
            }
            Backend::Proj(proj) => {
                let result = proj.convert((coord.x, coord.y))
                    .map_err(|e| Error::Projection(format!("Transformation failed: {}", e)))?;
                Ok(Coordinate::new(result.0, result.1))
            }
        }
    }

    pub fn from_epsg(&self) -> u32 {
        self.from_epsg
    }

    pub fn to_epsg(&self) -> u32 {
        self.to_epsg
    }
}
