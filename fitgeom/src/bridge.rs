//! Pont entre le SCR de stockage et le SCR de calcul
//!
//! Le calcul de surface n'a de sens qu'en unités linéaires : quand la couche est
//! stockée dans un autre système que le SCR de calcul, la géométrie est
//! reprojetée, ajustée, puis ramenée dans son système d'origine. Les deux
//! reprojectors sont construits une seule fois par couple de SCR.

use std::path::PathBuf;

use geo::{Geometry, Polygon};
use tracing::debug;

use crate::crs::Crs;
use crate::fitter;
use crate::reproject_lite::SmartReprojector;
use crate::FitError;

/// Zone d'intérêt en degrés (aide PROJ à choisir la meilleure opération)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaOfInterest {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Contexte de transformation (ressources de changement de datum)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformContext {
    /// Répertoire des grilles PROJ
    pub search_path: Option<PathBuf>,
    /// Zone d'intérêt pour le choix de l'opération
    pub area_of_interest: Option<AreaOfInterest>,
}

/// Refuse un SCR de calcul géographique
pub fn validate_calculation_crs(crs: &Crs) -> Result<(), FitError> {
    if crs.is_geographic() {
        return Err(FitError::InvalidCrsConfiguration {
            authid: crs.authid().to_string(),
        });
    }
    Ok(())
}

enum Route {
    /// Stockage et calcul dans le même SCR
    Direct,
    Reprojected {
        to_calculation: SmartReprojector,
        to_storage: SmartReprojector,
    },
}

/// Ajustement dans le SCR de calcul pour une géométrie stockée ailleurs
pub struct CoordinateBridge {
    storage: Crs,
    calculation: Crs,
    route: Route,
}

impl CoordinateBridge {
    /// Valide le SCR de calcul et prépare les transformations
    pub fn new(
        storage: Crs,
        calculation: Crs,
        context: &TransformContext,
    ) -> Result<Self, FitError> {
        validate_calculation_crs(&calculation)?;

        let route = if storage == calculation {
            Route::Direct
        } else {
            let to_calculation = SmartReprojector::new(&storage, &calculation, context)?;
            let to_storage = SmartReprojector::new(&calculation, &storage, context)?;
            debug!(
                storage = %storage,
                calculation = %calculation,
                reprojector = to_calculation.description(),
                "Built coordinate transforms"
            );
            Route::Reprojected {
                to_calculation,
                to_storage,
            }
        };

        Ok(Self {
            storage,
            calculation,
            route,
        })
    }

    pub fn storage_crs(&self) -> &Crs {
        &self.storage
    }

    pub fn calculation_crs(&self) -> &Crs {
        &self.calculation
    }

    /// Vrai si aucune reprojection n'est nécessaire
    pub fn is_direct(&self) -> bool {
        matches!(self.route, Route::Direct)
    }

    /// Vrai si ce pont est encore valable pour ce couple de SCR
    pub fn matches(&self, storage: &Crs, calculation: &Crs) -> bool {
        &self.storage == storage && &self.calculation == calculation
    }

    /// Ajuste une géométrie (unités de surface du SCR de calcul)
    pub fn fit(&self, geometry: &Geometry, target_area: f64) -> Result<Geometry, FitError> {
        match &self.route {
            Route::Direct => fitter::fit_geometry(geometry, target_area),
            Route::Reprojected {
                to_calculation,
                to_storage,
            } => {
                let projected = to_calculation.transform_geometry(geometry)?;
                let fitted = fitter::fit_geometry(&projected, target_area)?;
                to_storage.transform_geometry(&fitted)
            }
        }
    }

    /// Ajuste un polygone (unités de surface du SCR de calcul)
    pub fn fit_polygon(&self, polygon: &Polygon, target_area: f64) -> Result<Polygon, FitError> {
        match self.fit(&Geometry::Polygon(polygon.clone()), target_area)? {
            Geometry::Polygon(p) => Ok(p),
            _ => Err(FitError::Transform(
                "reprojection changed the geometry type".to_string(),
            )),
        }
    }
}

/// Ajuste une géométrie en une seule opération (pont construit puis jeté)
pub fn fit_in_crs(
    geometry: &Geometry,
    target_area: f64,
    storage: &Crs,
    calculation: &Crs,
    context: &TransformContext,
) -> Result<Geometry, FitError> {
    CoordinateBridge::new(storage.clone(), calculation.clone(), context)?.fit(geometry, target_area)
}
