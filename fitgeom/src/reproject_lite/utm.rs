//! Projection UTM (Universal Transverse Mercator) sur WGS84
//!
//! Zones 1 à 60, hémisphères nord (EPSG:326zz) et sud (EPSG:327zz).

use super::ellipsoid::WGS84;
use super::Geographic;

/// Facteur d'échelle sur le méridien central
const K0: f64 = 0.9996;
/// False easting
const X0: f64 = 500000.0;

/// Zone UTM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub zone: u8,
    pub south: bool,
}

impl UtmZone {
    /// Longitude centrale de la zone (radians)
    fn central_meridian(self) -> f64 {
        ((self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
    }

    fn false_northing(self) -> f64 {
        if self.south {
            10000000.0
        } else {
            0.0
        }
    }
}

/// Convertit des coordonnées géographiques WGS84 vers UTM
pub fn geographic_to_utm(geo: Geographic, zone: UtmZone) -> (f64, f64) {
    let a = WGS84.a;
    let e2 = WGS84.e2();
    let ep2 = WGS84.ep2();

    let (sin_lat, cos_lat) = geo.lat.sin_cos();
    let tan_lat = geo.lat.tan();

    let n = a / (1.0 - e2 * sin_lat.powi(2)).sqrt();
    let t = tan_lat.powi(2);
    let c = ep2 * cos_lat.powi(2);
    let aa = (geo.lon - zone.central_meridian()) * cos_lat;
    let m = WGS84.meridian_arc(geo.lat);

    let x = K0
        * n
        * (aa
            + (1.0 - t + c) * aa.powi(3) / 6.0
            + (5.0 - 18.0 * t + t.powi(2) + 72.0 * c - 58.0 * ep2) * aa.powi(5) / 120.0)
        + X0;

    let y = K0
        * (m + n
            * tan_lat
            * (aa.powi(2) / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c.powi(2)) * aa.powi(4) / 24.0
                + (61.0 - 58.0 * t + t.powi(2) + 600.0 * c - 330.0 * ep2) * aa.powi(6) / 720.0))
        + zone.false_northing();

    (x, y)
}

/// Convertit UTM vers coordonnées géographiques WGS84
pub fn utm_to_geographic(x: f64, y: f64, zone: UtmZone) -> Geographic {
    let a = WGS84.a;
    let e2 = WGS84.e2();
    let ep2 = WGS84.ep2();

    // Coordonnées réduites
    let x = x - X0;
    let y = y - zone.false_northing();

    // Latitude du pied de la perpendiculaire
    let m = y / K0;
    let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let n1 = a / (1.0 - e2 * sin_phi1.powi(2)).sqrt();
    let t1 = tan_phi1.powi(2);
    let c1 = ep2 * cos_phi1.powi(2);
    let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1.powi(2)).powf(1.5);
    let d = x / (n1 * K0);

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                    - 252.0 * ep2
                    - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    let lon = zone.central_meridian()
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                * d.powi(5)
                / 120.0)
            / cos_phi1;

    Geographic::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE_20N: UtmZone = UtmZone {
        zone: 20,
        south: false,
    };
    const ZONE_22S: UtmZone = UtmZone {
        zone: 22,
        south: true,
    };

    #[test]
    fn test_martinique() {
        // Fort-de-France approximativement
        let geo = utm_to_geographic(708000.0, 1615000.0, ZONE_20N);
        let (lon, lat) = geo.to_degrees();

        assert!((lon - (-61.07)).abs() < 0.2, "lon={}", lon);
        assert!((lat - 14.60).abs() < 0.2, "lat={}", lat);
    }

    #[test]
    fn test_central_meridian_easting() {
        let (x, _) = geographic_to_utm(Geographic::from_degrees(-51.0, -15.0), ZONE_22S);
        assert!((x - 500000.0).abs() < 1e-6, "x={}", x);
    }

    #[test]
    fn test_roundtrip_brazil() {
        let (x, y) = geographic_to_utm(Geographic::from_degrees(-52.0, -15.0), ZONE_22S);
        assert!((x - 392487.77).abs() < 0.1, "x={}", x);
        assert!((y - 8341431.16).abs() < 0.1, "y={}", y);

        let (lon, lat) = utm_to_geographic(x, y, ZONE_22S).to_degrees();
        assert!((lon - (-52.0)).abs() < 1e-8, "lon={}", lon);
        assert!((lat - (-15.0)).abs() < 1e-8, "lat={}", lat);
    }
}
