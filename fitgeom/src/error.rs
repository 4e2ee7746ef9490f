//! Types d'erreurs pour le crate fitgeom

use thiserror::Error;

use crate::session::MessageLevel;
use crate::types::FeatureId;

/// Erreurs pouvant survenir lors de l'ajustement d'une géométrie
#[derive(Debug, Error)]
pub enum FitError {
    /// Le SCR de calcul est géographique (unités angulaires)
    #[error("Invalid CRS(need be projected): {authid}")]
    InvalidCrsConfiguration { authid: String },

    /// Couche absente, non polygonale ou sans champ double
    #[error("{0}")]
    InvalidLayer(String),

    /// Couche non éditable au moment de l'application
    #[error("Layer '{layer}' needs to be editable")]
    NotEditable { layer: String },

    /// Aucune entité sélectionnée
    #[error("Need selected features in '{layer}'")]
    NoSelection { layer: String },

    /// Champ de surface cible vide (null)
    #[error("Field '{field}' is empty")]
    EmptyField { field: String, fid: FeatureId },

    /// Entité sans géométrie
    #[error("Geometry is empty")]
    EmptyGeometry { fid: FeatureId },

    /// Géométrie dégénérée (surface nulle ou non finie)
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// Surface cible nulle, négative ou non finie
    #[error("Invalid target area: {value}")]
    InvalidTargetArea { value: f64 },

    /// Champ inconnu ou non numérique
    #[error("Field '{field}' is not a double field of '{layer}'")]
    UnknownField { field: String, layer: String },

    /// Identifiant de SCR non reconnu
    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),

    /// Type de géométrie non ajustable
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    /// Reprojection non disponible pour ce couple de SCR
    #[error("Reprojection from {source_crs} to {target_crs} is not supported")]
    UnsupportedTransform {
        source_crs: String,
        target_crs: String,
    },

    /// Échec de la transformation de coordonnées
    #[error("Coordinate transformation failed: {0}")]
    Transform(String),

    /// La couche hôte a refusé la nouvelle géométrie
    #[error("Layer rejected geometry change for feature {fid}")]
    GeometryRejected { fid: FeatureId },
}

impl FitError {
    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Crée une erreur de couche invalide
    pub fn invalid_layer(message: impl Into<String>) -> Self {
        Self::InvalidLayer(message.into())
    }

    /// Niveau du message à afficher pour cette erreur
    pub fn level(&self) -> MessageLevel {
        match self {
            Self::InvalidCrsConfiguration { .. } => MessageLevel::Critical,
            _ => MessageLevel::Warning,
        }
    }

    /// Vrai pour les cas où l'entité est simplement ignorée dans un lot
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::EmptyField { .. } | Self::EmptyGeometry { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = FitError::NotEditable {
            layer: "parcelles".to_string(),
        };
        assert_eq!(err.to_string(), "Layer 'parcelles' needs to be editable");

        let err = FitError::EmptyField {
            field: "area".to_string(),
            fid: 3,
        };
        assert_eq!(err.to_string(), "Field 'area' is empty");
        assert!(err.is_skip());
    }

    #[test]
    fn test_levels() {
        let err = FitError::InvalidCrsConfiguration {
            authid: "EPSG:4326".to_string(),
        };
        assert_eq!(err.level(), MessageLevel::Critical);
        assert_eq!(
            FitError::NoSelection {
                layer: "l".to_string()
            }
            .level(),
            MessageLevel::Warning
        );
    }
}
