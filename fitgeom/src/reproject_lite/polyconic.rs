//! Projection polyconique américaine (SAD69 / Brazil Polyconic, EPSG:29101)
//!
//! Formules ellipsoïdales de Snyder (Map Projections, A Working Manual, §18).

use super::ellipsoid::{Ellipsoid, GRS67_MODIFIED};
use super::Geographic;

/// Paramètres d'une projection polyconique
struct Polyconic {
    ellipsoid: Ellipsoid,
    /// Longitude origine
    lon0: f64,
    /// Latitude origine
    lat0: f64,
    /// False easting
    x0: f64,
    /// False northing
    y0: f64,
}

/// Brazil Polyconic: méridien central 54°W, origine à l'équateur
fn brazil() -> Polyconic {
    Polyconic {
        ellipsoid: GRS67_MODIFIED,
        lon0: (-54.0_f64).to_radians(),
        lat0: 0.0,
        x0: 5000000.0,
        y0: 10000000.0,
    }
}

const MAX_ITERATIONS: usize = 30;
const CONVERGENCE: f64 = 1e-12;

/// Convertit des coordonnées géographiques vers Brazil Polyconic
pub fn geographic_to_brazil_polyconic(geo: Geographic) -> (f64, f64) {
    forward(&brazil(), geo)
}

/// Convertit Brazil Polyconic vers coordonnées géographiques
pub fn brazil_polyconic_to_geographic(x: f64, y: f64) -> Geographic {
    inverse(&brazil(), x, y)
}

fn forward(p: &Polyconic, geo: Geographic) -> (f64, f64) {
    let el = &p.ellipsoid;
    let m0 = el.meridian_arc(p.lat0);
    let dlon = geo.lon - p.lon0;

    if geo.lat.abs() < CONVERGENCE {
        return (p.x0 + el.a * dlon, p.y0 - m0);
    }

    let e = dlon * geo.lat.sin();
    let n_cot = el.grande_normale(geo.lat) / geo.lat.tan();

    let x = n_cot * e.sin();
    let y = el.meridian_arc(geo.lat) - m0 + n_cot * (1.0 - e.cos());
    (p.x0 + x, p.y0 + y)
}

fn inverse(p: &Polyconic, x: f64, y: f64) -> Geographic {
    let el = &p.ellipsoid;
    let a = el.a;
    let e2 = el.e2();
    let m0 = el.meridian_arc(p.lat0);

    let x = x - p.x0;
    let y = y - p.y0;

    if (y + m0).abs() < CONVERGENCE * a {
        return Geographic::new(x / a + p.lon0, 0.0);
    }

    let big_a = (m0 + y) / a;
    let big_b = x.powi(2) / a.powi(2) + big_a.powi(2);

    // Newton-Raphson sur la latitude
    let mut lat = big_a;
    for _ in 0..MAX_ITERATIONS {
        let c = (1.0 - e2 * lat.sin().powi(2)).sqrt() * lat.tan();
        let ma = el.meridian_arc(lat) / a;
        let mp = el.meridian_arc_derivative(lat) / a;
        let sin_2lat = (2.0 * lat).sin();

        let num = big_a * (c * ma + 1.0) - ma - 0.5 * (ma.powi(2) + big_b) * c;
        let den = e2 * sin_2lat * (ma.powi(2) + big_b - 2.0 * big_a * ma) / (4.0 * c)
            + (big_a - ma) * (c * mp - 2.0 / sin_2lat)
            - mp;

        let delta = num / den;
        lat -= delta;
        if delta.abs() < CONVERGENCE {
            break;
        }
    }

    let c = (1.0 - e2 * lat.sin().powi(2)).sqrt() * lat.tan();
    let lon = (x * c / a).asin() / lat.sin() + p.lon0;

    Geographic::new(lon, lat)
}
