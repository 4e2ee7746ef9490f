//! Systèmes de coordonnées de référence (SCR)
//!
//! Un [`Crs`] est identifié par son code d'autorité (`EPSG:2154`). Le registre
//! intégré connaît les systèmes géographiques et projetés courants ; les autres
//! peuvent être déclarés avec [`Crs::custom`] et ne sont reprojetables que via
//! PROJ (feature `reproject`).

use std::fmt;
use std::str::FromStr;

use crate::reproject_lite::{Projection, UtmZone};
use crate::FitError;

/// SCR de calcul par défaut (SAD69 / Brazil Polyconic)
pub const DEFAULT_CALCULATION_CRS: &str = "EPSG:29101";

/// Nature du SCR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsKind {
    /// Unités angulaires, inadapté à un calcul de surface
    Geographic,
    /// Unités linéaires
    Projected,
}

/// Unité des coordonnées
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapUnit {
    Meters,
    Degrees,
}

impl MapUnit {
    /// Nom de l'unité tel qu'affiché à côté du champ de surface
    pub fn encode(self) -> &'static str {
        match self {
            Self::Meters => "meters",
            Self::Degrees => "degrees",
        }
    }
}

/// Système de coordonnées de référence
#[derive(Debug, Clone)]
pub struct Crs {
    authid: String,
    name: String,
    kind: CrsKind,
    unit: MapUnit,
    projection: Option<Projection>,
}

impl Crs {
    /// Résout un code EPSG depuis le registre intégré
    pub fn from_epsg(code: u32) -> Result<Self, FitError> {
        let (name, projection) = match code {
            4326 => ("WGS 84".to_string(), Projection::LongLat),
            4171 => ("RGF93".to_string(), Projection::LongLat),
            4618 => ("SAD69".to_string(), Projection::LongLat),
            4674 => ("SIRGAS 2000".to_string(), Projection::LongLat),
            3857 => ("WGS 84 / Pseudo-Mercator".to_string(), Projection::WebMercator),
            2154 => ("RGF93 / Lambert-93".to_string(), Projection::Lambert93),
            29101 => (
                "SAD69 / Brazil Polyconic".to_string(),
                Projection::BrazilPolyconic,
            ),
            32601..=32660 | 32701..=32760 => {
                let south = code > 32700;
                let zone = (code % 100) as u8;
                let name = format!("WGS 84 / UTM zone {}{}", zone, if south { "S" } else { "N" });
                (name, Projection::Utm(UtmZone { zone, south }))
            }
            _ => return Err(FitError::UnknownCrs(format!("EPSG:{}", code))),
        };

        let (kind, unit) = match projection {
            Projection::LongLat => (CrsKind::Geographic, MapUnit::Degrees),
            _ => (CrsKind::Projected, MapUnit::Meters),
        };

        Ok(Self {
            authid: format!("EPSG:{}", code),
            name,
            kind,
            unit,
            projection: Some(projection),
        })
    }

    /// Résout un identifiant d'autorité (`EPSG:2154`, `epsg:4326`)
    pub fn from_authid(authid: &str) -> Result<Self, FitError> {
        let trimmed = authid.trim();
        let code = trimmed
            .split_once(':')
            .filter(|(authority, _)| authority.eq_ignore_ascii_case("EPSG"))
            .and_then(|(_, code)| code.parse::<u32>().ok())
            .ok_or_else(|| FitError::UnknownCrs(trimmed.to_string()))?;
        Self::from_epsg(code)
    }

    /// Déclare un SCR hors registre (reprojection via PROJ uniquement)
    pub fn custom(authid: impl Into<String>, kind: CrsKind, unit: MapUnit) -> Self {
        let authid = normalize_authid(&authid.into());
        Self {
            name: authid.clone(),
            authid,
            kind,
            unit,
            projection: None,
        }
    }

    /// SCR de calcul par défaut
    pub fn default_calculation() -> Self {
        Self {
            authid: DEFAULT_CALCULATION_CRS.to_string(),
            name: "SAD69 / Brazil Polyconic".to_string(),
            kind: CrsKind::Projected,
            unit: MapUnit::Meters,
            projection: Some(Projection::BrazilPolyconic),
        }
    }

    pub fn authid(&self) -> &str {
        &self.authid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CrsKind {
        self.kind
    }

    pub fn map_unit(&self) -> MapUnit {
        self.unit
    }

    pub fn is_geographic(&self) -> bool {
        self.kind == CrsKind::Geographic
    }

    /// Projection utilisable par le reprojector léger
    pub fn projection(&self) -> Option<Projection> {
        self.projection
    }

    /// Libellé de l'unité de surface (`meters^2`)
    pub fn area_unit_label(&self) -> String {
        format!("{}^2", self.unit.encode())
    }
}

fn normalize_authid(authid: &str) -> String {
    match authid.trim().split_once(':') {
        Some((authority, code)) => format!("{}:{}", authority.to_ascii_uppercase(), code),
        None => authid.trim().to_string(),
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.authid == other.authid
    }
}

impl Eq for Crs {}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authid)
    }
}

impl FromStr for Crs {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_authid(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry() {
        let crs = Crs::from_authid("EPSG:2154").unwrap();
        assert_eq!(crs.kind(), CrsKind::Projected);
        assert_eq!(crs.area_unit_label(), "meters^2");

        let crs: Crs = "epsg:4326".parse().unwrap();
        assert!(crs.is_geographic());
        assert_eq!(crs.authid(), "EPSG:4326");
        assert_eq!(crs.area_unit_label(), "degrees^2");
    }

    #[test]
    fn test_utm_codes() {
        let crs = Crs::from_epsg(32722).unwrap();
        assert_eq!(crs.name(), "WGS 84 / UTM zone 22S");
        assert_eq!(
            crs.projection(),
            Some(Projection::Utm(UtmZone {
                zone: 22,
                south: true
            }))
        );
        assert!(Crs::from_epsg(32661).is_err());
    }

    #[test]
    fn test_unknown() {
        assert!(matches!(
            Crs::from_authid("EPSG:99999"),
            Err(FitError::UnknownCrs(_))
        ));
        assert!(Crs::from_authid("IGNF:LAMB93").is_err());
        assert!(Crs::from_authid("2154").is_err());
    }

    #[test]
    fn test_identity_by_authid() {
        let custom = Crs::custom("epsg:2154", CrsKind::Projected, MapUnit::Meters);
        assert_eq!(custom, Crs::from_epsg(2154).unwrap());
        assert_eq!(Crs::default_calculation(), Crs::from_epsg(29101).unwrap());
    }
}
