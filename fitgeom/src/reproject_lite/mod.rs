//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Projections supportées dans les deux sens :
//! - Géographique (longitude/latitude en degrés)
//! - Web Mercator (EPSG:3857)
//! - Lambert 93 (EPSG:2154)
//! - UTM WGS84 (EPSG:326zz / 327zz)
//! - Brazil Polyconic (EPSG:29101)
//!
//! La conversion passe toujours par les coordonnées géographiques. Les datums
//! sont considérés comme confondus : aucune grille de changement de datum
//! n'est appliquée (utiliser le feature `reproject` pour cela).

mod ellipsoid;
mod lambert;
mod mercator;
mod polyconic;
mod smart;
mod utm;

pub use ellipsoid::{Ellipsoid, GRS67_MODIFIED, GRS80, WGS84};
pub use smart::SmartReprojector;
pub use utm::UtmZone;

use geo::{Coord, Geometry, MapCoords};

use crate::FitError;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Définition d'une projection connue du reprojector léger
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Longitude/latitude en degrés
    LongLat,
    WebMercator,
    Lambert93,
    Utm(UtmZone),
    BrazilPolyconic,
}

impl Projection {
    /// Coordonnées projetées vers géographiques
    pub fn to_geographic(&self, x: f64, y: f64) -> Geographic {
        match self {
            Self::LongLat => Geographic::from_degrees(x, y),
            Self::WebMercator => mercator::web_mercator_to_geographic(x, y),
            Self::Lambert93 => lambert::lambert93_to_geographic(x, y),
            Self::Utm(zone) => utm::utm_to_geographic(x, y, *zone),
            Self::BrazilPolyconic => polyconic::brazil_polyconic_to_geographic(x, y),
        }
    }

    /// Coordonnées géographiques vers projetées
    pub fn from_geographic(&self, geo: Geographic) -> (f64, f64) {
        match self {
            Self::LongLat => geo.to_degrees(),
            Self::WebMercator => mercator::geographic_to_web_mercator(geo),
            Self::Lambert93 => lambert::geographic_to_lambert93(geo),
            Self::Utm(zone) => utm::geographic_to_utm(geo, *zone),
            Self::BrazilPolyconic => polyconic::geographic_to_brazil_polyconic(geo),
        }
    }
}

/// Reprojection légère entre deux projections connues
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source: Projection,
    target: Projection,
}

impl ReprojectorLite {
    pub fn new(source: Projection, target: Projection) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> Projection {
        self.source
    }

    pub fn target(&self) -> Projection {
        self.target
    }

    /// Transforme un point (x, y) de la source vers la cible
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64), FitError> {
        // Étape 1: Source → Géographique
        let geo = self.source.to_geographic(x, y);

        // Étape 2: Géographique → Cible
        let (tx, ty) = self.target.from_geographic(geo);

        if !tx.is_finite() || !ty.is_finite() {
            return Err(FitError::Transform(format!(
                "({}, {}) has no image from {:?} to {:?}",
                x, y, self.source, self.target
            )));
        }
        Ok((tx, ty))
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, FitError> {
        geom.try_map_coords(|c| {
            let (x, y) = self.transform_point(c.x, c.y)?;
            Ok(Coord { x, y })
        })
    }
}
