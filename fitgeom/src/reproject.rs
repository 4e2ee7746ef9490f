//! Reprojection via PROJ pour les SCR hors du registre intégré
//!
//! Disponible avec le feature `reproject`. Chaque anneau est converti en un
//! seul appel (`convert_array`).

use geo::{Coord, Geometry, LineString, MapCoords, MultiPolygon, Polygon};
use proj::{Area, Proj, ProjBuilder};

use crate::bridge::TransformContext;
use crate::crs::Crs;
use crate::FitError;

/// Opération PROJ entre deux SCR
pub struct Reprojector {
    proj: Proj,
    source: String,
    target: String,
}

impl Reprojector {
    /// Construit l'opération ; le contexte fournit grilles et zone d'intérêt
    pub fn new(source: &Crs, target: &Crs, context: &TransformContext) -> Result<Self, FitError> {
        let mut builder = ProjBuilder::new();
        if let Some(path) = &context.search_path {
            builder.set_search_paths(path).map_err(|e| {
                FitError::Transform(format!("Invalid PROJ search path {}: {}", path.display(), e))
            })?;
        }

        let area = context
            .area_of_interest
            .map(|aoi| Area::new(aoi.west, aoi.south, aoi.east, aoi.north));

        let proj = builder
            .proj_known_crs(source.authid(), target.authid(), area)
            .map_err(|e| {
                FitError::Transform(format!("PROJ cannot build {} -> {}: {}", source, target, e))
            })?;

        Ok(Self {
            proj,
            source: source.authid().to_string(),
            target: target.authid().to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Reprojette une géométrie ; les polygones sont traités anneau par anneau
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, FitError> {
        match geom {
            Geometry::Polygon(polygon) => Ok(Geometry::Polygon(self.polygon(polygon)?)),
            Geometry::MultiPolygon(parts) => {
                let polygons = parts
                    .0
                    .iter()
                    .map(|p| self.polygon(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
            }
            other => other.try_map_coords(|c| {
                let (x, y) = self.proj.convert((c.x, c.y)).map_err(transform_error)?;
                Ok(Coord { x, y })
            }),
        }
    }

    fn polygon(&self, polygon: &Polygon) -> Result<Polygon, FitError> {
        let interiors = polygon
            .interiors()
            .iter()
            .map(|ring| self.ring(ring))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(self.ring(polygon.exterior())?, interiors))
    }

    fn ring(&self, ring: &LineString) -> Result<LineString, FitError> {
        let mut points: Vec<(f64, f64)> = ring.coords().map(|c| (c.x, c.y)).collect();
        self.proj
            .convert_array(&mut points)
            .map_err(transform_error)?;
        Ok(points.into_iter().map(|(x, y)| Coord { x, y }).collect())
    }
}

fn transform_error(err: proj::ProjError) -> FitError {
    FitError::Transform(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    #[test]
    fn test_polygon_to_lambert93() {
        let reprojector = Reprojector::new(
            &Crs::from_epsg(4171).unwrap(),
            &Crs::from_epsg(2154).unwrap(),
            &TransformContext::default(),
        )
        .unwrap();

        let parcel = Geometry::Polygon(polygon![
            (x: 2.3500, y: 48.8500),
            (x: 2.3510, y: 48.8500),
            (x: 2.3510, y: 48.8506),
            (x: 2.3500, y: 48.8506),
        ]);
        let Geometry::Polygon(p) = reprojector.transform_geometry(&parcel).unwrap() else {
            panic!("Expected Polygon geometry");
        };
        let first = p.exterior().0[0];
        assert!(first.x > 650_000.0 && first.x < 655_000.0, "x={}", first.x);
        assert!(first.y > 6_858_000.0 && first.y < 6_864_000.0, "y={}", first.y);
        assert!(p.unsigned_area() > 4_000.0 && p.unsigned_area() < 5_000.0);
    }

    #[test]
    fn test_unknown_code() {
        let unknown = Crs::custom("EPSG:99999", crate::CrsKind::Projected, crate::MapUnit::Meters);
        let result = Reprojector::new(
            &unknown,
            &Crs::from_epsg(4326).unwrap(),
            &TransformContext::default(),
        );
        assert!(result.is_err());
    }
}
