//! Ajustement d'une géométrie à une surface cible
//!
//! Mise à l'échelle isotrope autour du centroïde : la forme, l'orientation des
//! anneaux, les trous et l'ordre des sommets sont conservés, seules les
//! coordonnées changent.

use geo::{Area, Centroid, Geometry, MultiPolygon, Point, Polygon, Scale, Translate};
use tracing::trace;

use crate::FitError;

/// Ajuste un polygone à la surface cible (unités du SCR de la géométrie)
pub fn fit_polygon(polygon: &Polygon, target_area: f64) -> Result<Polygon, FitError> {
    fit_scaled(polygon, target_area)
}

/// Ajuste un multipolygone comme un tout (un seul facteur, un seul centroïde)
pub fn fit_multi_polygon(
    multi_polygon: &MultiPolygon,
    target_area: f64,
) -> Result<MultiPolygon, FitError> {
    fit_scaled(multi_polygon, target_area)
}

/// Ajuste une géométrie surfacique (Polygon ou MultiPolygon)
pub fn fit_geometry(geometry: &Geometry, target_area: f64) -> Result<Geometry, FitError> {
    match geometry {
        Geometry::Polygon(p) => Ok(Geometry::Polygon(fit_polygon(p, target_area)?)),
        Geometry::MultiPolygon(mp) => Ok(Geometry::MultiPolygon(fit_multi_polygon(
            mp,
            target_area,
        )?)),
        other => Err(FitError::UnsupportedGeometry(geometry_type_name(other).to_string())),
    }
}

/// Facteur d'échelle linéaire qui amène `current_area` à `target_area`
pub fn scale_factor(current_area: f64, target_area: f64) -> f64 {
    (target_area / current_area).sqrt()
}

/// Écart en pourcentage entre la surface source et la surface ajustée
pub fn area_difference_percent(source_area: f64, fitted_area: f64) -> f64 {
    100.0 * (1.0 - source_area / fitted_area)
}

/// Vérifie qu'une surface cible est utilisable
pub fn validate_target_area(target_area: f64) -> Result<f64, FitError> {
    if target_area.is_finite() && target_area > 0.0 {
        Ok(target_area)
    } else {
        Err(FitError::InvalidTargetArea { value: target_area })
    }
}

fn fit_scaled<G>(geometry: &G, target_area: f64) -> Result<G, FitError>
where
    G: Area<f64> + Centroid<Output = Option<Point>> + Scale<f64> + Translate<f64>,
{
    let target_area = validate_target_area(target_area)?;

    let area = geometry.unsigned_area();
    if !area.is_finite() || area <= 0.0 {
        return Err(FitError::invalid_geometry(format!(
            "source area must be positive, got {}",
            area
        )));
    }

    let center1 = geometry
        .centroid()
        .ok_or_else(|| FitError::invalid_geometry("geometry has no centroid"))?;

    let s = scale_factor(area, target_area);
    let scaled = geometry.scale_around_point(s, s, Point::new(0.0, 0.0));

    let center2 = scaled
        .centroid()
        .ok_or_else(|| FitError::invalid_geometry("scaled geometry has no centroid"))?;

    let dx = center1.x() - center2.x();
    let dy = center1.y() - center2.y();
    trace!(area, target_area, scale = s, dx, dy, "Fitted geometry");

    Ok(scaled.translate(dx, dy))
}

fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, Coord, LineString};

    fn square() -> Polygon {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ]
    }

    fn assert_coord(actual: Coord, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
            "expected ({}, {}), got ({}, {})",
            x,
            y,
            actual.x,
            actual.y
        );
    }

    #[test]
    fn test_square_quadrupled() {
        let fitted = fit_polygon(&square(), 400.0).unwrap();

        let ring = &fitted.exterior().0;
        assert_eq!(ring.len(), 5);
        assert_coord(ring[0], -5.0, -5.0);
        assert_coord(ring[1], 15.0, -5.0);
        assert_coord(ring[2], 15.0, 15.0);
        assert_coord(ring[3], -5.0, 15.0);
        assert_coord(ring[4], -5.0, -5.0);
        assert!((fitted.unsigned_area() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_identity_when_area_matches() {
        let poly = square();
        let fitted = fit_polygon(&poly, poly.unsigned_area()).unwrap();

        for (a, b) in poly.exterior().0.iter().zip(fitted.exterior().0.iter()) {
            assert_coord(*b, a.x, a.y);
        }
    }

    #[test]
    fn test_keeps_winding_and_holes() {
        let poly = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]),
            vec![line_string![
                (x: 2.0, y: 2.0),
                (x: 4.0, y: 2.0),
                (x: 4.0, y: 4.0),
                (x: 2.0, y: 4.0),
                (x: 2.0, y: 2.0),
            ]],
        );
        let signed_before = poly.signed_area();

        let fitted = fit_polygon(&poly, 48.0).unwrap();

        assert_eq!(fitted.interiors().len(), 1);
        assert_eq!(fitted.interiors()[0].0.len(), 5);
        assert_eq!(fitted.signed_area().signum(), signed_before.signum());
        assert!((fitted.unsigned_area() - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_shrink_keeps_centroid() {
        let poly = polygon![
            (x: 100.0, y: 200.0),
            (x: 160.0, y: 210.0),
            (x: 150.0, y: 260.0),
            (x: 110.0, y: 250.0),
        ];
        let before = poly.centroid().unwrap();

        let fitted = fit_polygon(&poly, 10.0).unwrap();
        let after = fitted.centroid().unwrap();

        assert!((before.x() - after.x()).abs() < 1e-9);
        assert!((before.y() - after.y()).abs() < 1e-9);
        assert!((fitted.unsigned_area() - 10.0).abs() / 10.0 < 1e-9);
    }

    #[test]
    fn test_multi_polygon_single_factor() {
        let mp = MultiPolygon::new(vec![
            square(),
            polygon![
                (x: 20.0, y: 0.0),
                (x: 30.0, y: 0.0),
                (x: 30.0, y: 10.0),
                (x: 20.0, y: 10.0),
            ],
        ]);

        let fitted = fit_multi_polygon(&mp, 800.0).unwrap();

        assert!((fitted.unsigned_area() - 800.0).abs() < 1e-9);
        // Chaque partie double en côté
        assert!((fitted.0[0].unsigned_area() - 400.0).abs() < 1e-9);
        let c = fitted.centroid().unwrap();
        assert!((c.x() - 15.0).abs() < 1e-9 && (c.y() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_area_rejected() {
        let flat = polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 20.0, y: 0.0)];
        assert!(matches!(
            fit_polygon(&flat, 10.0),
            Err(FitError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_invalid_target_rejected() {
        for target in [0.0, -4.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                fit_polygon(&square(), target),
                Err(FitError::InvalidTargetArea { .. })
            ));
        }
    }

    #[test]
    fn test_unsupported_geometry() {
        let geom = Geometry::Point(Point::new(1.0, 1.0));
        match fit_geometry(&geom, 10.0) {
            Err(FitError::UnsupportedGeometry(name)) => assert_eq!(name, "Point"),
            other => panic!("Expected UnsupportedGeometry, got {:?}", other),
        }
    }

    #[test]
    fn test_area_difference_percent() {
        assert!((area_difference_percent(100.0, 400.0) - 75.0).abs() < 1e-12);
        assert!((area_difference_percent(400.0, 100.0) - (-300.0)).abs() < 1e-12);
        assert_eq!(scale_factor(100.0, 400.0), 2.0);
    }
}
