//! Lambert-93 (EPSG:2154), conique conforme sécante sur GRS80

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::ellipsoid::GRS80;
use super::Geographic;

/// Définition de la conique (angles en radians)
struct ConicDef {
    central_meridian: f64,
    origin_lat: f64,
    parallels: (f64, f64),
    false_easting: f64,
    false_northing: f64,
}

fn lambert93() -> ConicDef {
    ConicDef {
        central_meridian: 3.0_f64.to_radians(),
        origin_lat: 46.5_f64.to_radians(),
        parallels: (44.0_f64.to_radians(), 49.0_f64.to_radians()),
        false_easting: 700_000.0,
        false_northing: 6_600_000.0,
    }
}

/// Exposant, constante et rayon à l'origine
struct Cone {
    n: f64,
    c: f64,
    r0: f64,
}

impl ConicDef {
    fn cone(&self) -> Cone {
        let e = GRS80.e();
        let (phi1, phi2) = self.parallels;
        let m1 = GRS80.grande_normale(phi1) * phi1.cos();
        let m2 = GRS80.grande_normale(phi2) * phi2.cos();
        let l1 = isometric_latitude(phi1, e);
        let l2 = isometric_latitude(phi2, e);

        let n = (m1.ln() - m2.ln()) / (l2 - l1);
        let c = m1 / n * (n * l1).exp();
        let r0 = c * (-n * isometric_latitude(self.origin_lat, e)).exp();
        Cone { n, c, r0 }
    }
}

fn isometric_latitude(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    let half = (FRAC_PI_4 + phi / 2.0).tan();
    (half * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).ln()
}

/// Inverse de la latitude isométrique, par point fixe
fn latitude_from_isometric(l: f64, e: f64) -> f64 {
    let exp_l = l.exp();
    let mut phi = 2.0 * exp_l.atan() - FRAC_PI_2;
    for _ in 0..20 {
        let es = e * phi.sin();
        let next = 2.0 * (exp_l * ((1.0 + es) / (1.0 - es)).powf(e / 2.0)).atan() - FRAC_PI_2;
        let done = (next - phi).abs() < 1e-12;
        phi = next;
        if done {
            break;
        }
    }
    phi
}

/// Géographique (radians) vers Lambert-93
pub fn geographic_to_lambert93(geo: Geographic) -> (f64, f64) {
    let def = lambert93();
    let Cone { n, c, r0 } = def.cone();

    let radius = c * (-n * isometric_latitude(geo.lat, GRS80.e())).exp();
    let theta = n * (geo.lon - def.central_meridian);

    (
        def.false_easting + radius * theta.sin(),
        def.false_northing + r0 - radius * theta.cos(),
    )
}

/// Lambert-93 vers géographique (radians)
pub fn lambert93_to_geographic(x: f64, y: f64) -> Geographic {
    let def = lambert93();
    let Cone { n, c, r0 } = def.cone();

    let east = x - def.false_easting;
    let north = r0 - (y - def.false_northing);

    let radius = n.signum() * east.hypot(north);
    let theta = east.atan2(north);

    let lat = latitude_from_isometric(-(radius / c).ln() / n, GRS80.e());
    Geographic::new(def.central_meridian + theta / n, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notre_dame() {
        let (lon, lat) = lambert93_to_geographic(652_381.0, 6_861_967.0).to_degrees();
        assert!((lon - 2.3510).abs() < 0.001, "lon={}", lon);
        assert!((lat - 48.8560).abs() < 0.001, "lat={}", lat);
    }

    #[test]
    fn test_origin() {
        let (x, y) = geographic_to_lambert93(Geographic::from_degrees(3.0, 46.5));
        assert!((x - 700000.0).abs() < 1e-6, "x={}", x);
        assert!((y - 6600000.0).abs() < 1e-6, "y={}", y);
    }

    #[test]
    fn test_roundtrip_marseille() {
        let (x, y) = geographic_to_lambert93(Geographic::from_degrees(5.37, 43.30));
        let (lon, lat) = lambert93_to_geographic(x, y).to_degrees();

        assert!((lon - 5.37).abs() < 1e-9, "lon={}", lon);
        assert!((lat - 43.30).abs() < 1e-9, "lat={}", lat);
    }
}
