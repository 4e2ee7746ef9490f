//! Session d'édition : ajustement des entités sélectionnées d'une couche
//!
//! La couche et la zone de messages appartiennent à l'application hôte ; elles
//! sont vues au travers des traits [`VectorLayer`] et [`Notifier`]. Une
//! [`FitSession`] est construite quand l'ajustement est activé sur une couche
//! et reconstruite (jamais modifiée) quand la couche ou un SCR change.

use std::fmt;

use geo::{Area, Geometry};
use tracing::{debug, info, warn};

use crate::bridge::{CoordinateBridge, TransformContext};
use crate::crs::Crs;
use crate::fitter;
use crate::types::{Feature, FeatureId, Field, GeometryType};
use crate::FitError;

/// Titre des messages envoyés à l'hôte
pub const TITLE: &str = "Fit geometry by area";

/// Niveau d'un message utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Critical,
    Success,
}

/// Zone de messages de l'application hôte
pub trait Notifier {
    fn push(&mut self, level: MessageLevel, title: &str, message: &str);
}

/// Couche vectorielle de l'application hôte
pub trait VectorLayer {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    /// SCR de stockage des géométries
    fn crs(&self) -> &Crs;
    fn geometry_type(&self) -> GeometryType;
    fn fields(&self) -> &[Field];
    fn is_editable(&self) -> bool;
    fn selected_features(&self) -> Vec<Feature>;
    /// Remplace la géométrie d'une entité, `false` si l'hôte refuse
    fn change_geometry(&mut self, fid: FeatureId, geometry: Geometry) -> bool;
    fn update_extents(&mut self);
    fn trigger_repaint(&mut self);
}

/// Bilan d'un ajustement par lot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Entités dont la géométrie a été remplacée
    pub fitted: Vec<FeatureId>,
    /// Entités ignorées : surface cible null
    pub skipped_empty_field: Vec<FeatureId>,
    /// Entités ignorées : pas de géométrie
    pub skipped_empty_geometry: Vec<FeatureId>,
    /// Entités en échec (géométrie dégénérée, surface invalide, reprojection)
    pub failed: Vec<(FeatureId, String)>,
}

impl BatchOutcome {
    pub fn skipped(&self) -> usize {
        self.skipped_empty_field.len() + self.skipped_empty_geometry.len()
    }

    pub fn processed(&self) -> usize {
        self.fitted.len() + self.skipped() + self.failed.len()
    }
}

/// Aperçu de l'ajustement de la première entité sélectionnée
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    pub fid: FeatureId,
    /// Surface actuelle dans le SCR de stockage
    pub source_area: f64,
    /// Surface après ajustement dans le SCR de stockage
    pub fitted_area: f64,
}

impl Preview {
    pub fn percent(&self) -> f64 {
        fitter::area_difference_percent(self.source_area, self.fitted_area)
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[FID = {}] Geometry to Fit -> {:+.6}%",
            self.fid,
            self.percent()
        )
    }
}

/// Contexte d'ajustement lié à une couche
pub struct FitSession {
    layer_id: String,
    layer_name: String,
    bridge: CoordinateBridge,
}

impl FitSession {
    /// Valide la couche active et prépare le pont de coordonnées
    pub fn open<L: VectorLayer + ?Sized>(
        layer: Option<&L>,
        calculation: &Crs,
        context: &TransformContext,
    ) -> Result<Self, FitError> {
        let layer = layer.ok_or_else(|| FitError::invalid_layer("Missing active layer."))?;

        if layer.geometry_type() != GeometryType::Polygon {
            return Err(FitError::invalid_layer(format!(
                "Invalid layer '{}'! Need be polygon layer.",
                layer.name()
            )));
        }
        if !layer.fields().iter().any(Field::is_double) {
            return Err(FitError::invalid_layer(format!(
                "Layer '{}' missing double field.",
                layer.name()
            )));
        }

        let bridge = CoordinateBridge::new(layer.crs().clone(), calculation.clone(), context)?;
        info!(
            layer = layer.name(),
            storage = %layer.crs(),
            calculation = %calculation,
            direct = bridge.is_direct(),
            "Fit session opened"
        );

        Ok(Self {
            layer_id: layer.id().to_string(),
            layer_name: layer.name().to_string(),
            bridge,
        })
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn bridge(&self) -> &CoordinateBridge {
        &self.bridge
    }

    /// Même couche, nouveau pont (changement de SCR de calcul)
    pub fn with_bridge(self, bridge: CoordinateBridge) -> Self {
        Self { bridge, ..self }
    }

    /// Ajuste toutes les entités sélectionnées ayant une surface cible
    pub fn apply<L: VectorLayer + ?Sized>(
        &self,
        layer: &mut L,
        field: &str,
    ) -> Result<BatchOutcome, FitError> {
        self.check_layer(&*layer)?;

        if !layer.is_editable() {
            return Err(FitError::NotEditable {
                layer: layer.name().to_string(),
            });
        }
        let features = layer.selected_features();
        if features.is_empty() {
            return Err(FitError::NoSelection {
                layer: layer.name().to_string(),
            });
        }
        check_field(&*layer, field)?;

        let mut outcome = BatchOutcome::default();
        for feature in &features {
            match self.fit_feature(feature, field) {
                Ok(geometry) => {
                    if layer.change_geometry(feature.id, geometry) {
                        outcome.fitted.push(feature.id);
                    } else {
                        let err = FitError::GeometryRejected { fid: feature.id };
                        warn!(fid = feature.id, "{}", err);
                        outcome.failed.push((feature.id, err.to_string()));
                    }
                }
                Err(FitError::EmptyField { fid, .. }) => {
                    debug!(fid, field, "Skipping feature without target area");
                    outcome.skipped_empty_field.push(fid);
                }
                Err(FitError::EmptyGeometry { fid }) => {
                    debug!(fid, "Skipping feature without geometry");
                    outcome.skipped_empty_geometry.push(fid);
                }
                Err(err) => {
                    warn!(fid = feature.id, error = %err, "Feature not fitted");
                    outcome.failed.push((feature.id, err.to_string()));
                }
            }
        }

        layer.update_extents();
        layer.trigger_repaint();

        info!(
            layer = layer.name(),
            fitted = outcome.fitted.len(),
            skipped = outcome.skipped(),
            failed = outcome.failed.len(),
            "Batch fit finished"
        );
        Ok(outcome)
    }

    /// Aperçu pour la première entité sélectionnée, `None` sans sélection
    pub fn preview<L: VectorLayer + ?Sized>(
        &self,
        layer: &L,
        field: &str,
    ) -> Result<Option<Preview>, FitError> {
        self.check_layer(layer)?;
        check_field(layer, field)?;

        let Some(feature) = layer.selected_features().into_iter().next() else {
            return Ok(None);
        };

        let fitted = self.fit_feature(&feature, field)?;
        let source_area = feature
            .geometry
            .as_ref()
            .map(|g| g.unsigned_area())
            .unwrap_or_default();

        Ok(Some(Preview {
            fid: feature.id,
            source_area,
            fitted_area: fitted.unsigned_area(),
        }))
    }

    /// Géométrie ajustée d'une entité, dans le SCR de stockage
    pub fn fit_feature(&self, feature: &Feature, field: &str) -> Result<Geometry, FitError> {
        let target_area = feature.target_area(field).ok_or_else(|| FitError::EmptyField {
            field: field.to_string(),
            fid: feature.id,
        })?;
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(FitError::EmptyGeometry { fid: feature.id })?;

        self.bridge.fit(geometry, target_area)
    }

    fn check_layer<L: VectorLayer + ?Sized>(&self, layer: &L) -> Result<(), FitError> {
        if layer.id() != self.layer_id {
            return Err(FitError::invalid_layer(format!(
                "Layer '{}' is not the layer being fitted ('{}')",
                layer.name(),
                self.layer_name
            )));
        }
        // Le pont ne vaut que pour le SCR de stockage vu à l'ouverture
        if layer.crs() != self.bridge.storage_crs() {
            return Err(FitError::invalid_layer(format!(
                "Layer '{}' CRS changed from {} to {}",
                layer.name(),
                self.bridge.storage_crs(),
                layer.crs()
            )));
        }
        Ok(())
    }
}

fn check_field<L: VectorLayer + ?Sized>(layer: &L, field: &str) -> Result<(), FitError> {
    if layer.fields().iter().any(|f| f.name == field && f.is_double()) {
        Ok(())
    } else {
        Err(FitError::UnknownField {
            field: field.to_string(),
            layer: layer.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_message() {
        let preview = Preview {
            fid: 7,
            source_area: 100.0,
            fitted_area: 400.0,
        };
        assert_eq!(
            preview.to_string(),
            "[FID = 7] Geometry to Fit -> +75.000000%"
        );

        let shrink = Preview {
            fid: 8,
            source_area: 400.0,
            fitted_area: 100.0,
        };
        assert_eq!(
            shrink.to_string(),
            "[FID = 8] Geometry to Fit -> -300.000000%"
        );
    }

    #[test]
    fn test_outcome_counts() {
        let outcome = BatchOutcome {
            fitted: vec![1, 2],
            skipped_empty_field: vec![3],
            skipped_empty_geometry: vec![4],
            failed: vec![(5, "Invalid geometry".to_string())],
        };
        assert_eq!(outcome.skipped(), 2);
        assert_eq!(outcome.processed(), 5);
    }
}
