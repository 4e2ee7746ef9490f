//! Choix du moteur de reprojection pour un couple de SCR
//!
//! Formules Rust pur quand les deux SCR sont dans le registre intégré, PROJ
//! pour le reste (ou quand le contexte réclame des grilles de datum).

use geo::Geometry;
use tracing::debug;

use super::ReprojectorLite;
use crate::bridge::TransformContext;
use crate::crs::Crs;
use crate::FitError;

/// Transformation construite une fois par couple (source, cible)
pub enum SmartReprojector {
    /// Formules intégrées, datums considérés identiques
    Lite(ReprojectorLite),
    #[cfg(feature = "reproject")]
    Proj(crate::reproject::Reprojector),
    /// Source et cible identiques
    Identity,
}

impl SmartReprojector {
    /// Sélectionne le moteur ; `UnsupportedTransform` si aucun ne convient
    pub fn new(source: &Crs, target: &Crs, context: &TransformContext) -> Result<Self, FitError> {
        if source == target {
            return Ok(Self::Identity);
        }

        // Un contexte avec grilles ou zone d'intérêt demande PROJ
        let wants_proj = context.search_path.is_some() || context.area_of_interest.is_some();

        if !(wants_proj && cfg!(feature = "reproject")) {
            if let (Some(src), Some(dst)) = (source.projection(), target.projection()) {
                debug!(source = %source, target = %target, "Using built-in projection formulas");
                return Ok(Self::Lite(ReprojectorLite::new(src, dst)));
            }
        }

        #[cfg(feature = "reproject")]
        {
            debug!(source = %source, target = %target, "Using PROJ");
            let proj = crate::reproject::Reprojector::new(source, target, context)?;
            Ok(Self::Proj(proj))
        }

        #[cfg(not(feature = "reproject"))]
        Err(FitError::UnsupportedTransform {
            source_crs: source.authid().to_string(),
            target_crs: target.authid().to_string(),
        })
    }

    /// Reprojette une géométrie surfacique
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry, FitError> {
        match self {
            Self::Identity => Ok(geom.clone()),
            Self::Lite(lite) => lite.transform_geometry(geom),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_geometry(geom),
        }
    }

    /// Nom du moteur, pour les journaux
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Lite(_) => "built-in formulas",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "PROJ",
        }
    }
}
