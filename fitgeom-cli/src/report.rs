//! Rapport d'ajustement d'une couche
//!
//! Collecte le bilan d'un lot pour l'affichage console et l'export JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use fitgeom::{BatchOutcome, FeatureId};
use serde::Serialize;

/// Statut global du lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitStatus {
    /// Toutes les entités traitées ont été ajustées ou ignorées
    Success,
    /// Certaines entités ont échoué
    PartialSuccess,
    /// Aucune entité ajustée et au moins un échec
    Failed,
    /// Le lot n'a pas pu démarrer (couche non éditable, pas de sélection...)
    Aborted,
}

/// Échec sur une entité
#[derive(Debug, Clone, Serialize)]
pub struct FeatureFailure {
    pub fid: FeatureId,
    pub message: String,
}

/// Rapport complet d'un ajustement
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub layer: String,
    pub field: String,
    pub storage_crs: String,
    pub calculation_crs: String,
    pub duration_secs: f64,
    pub status: FitStatus,

    pub fitted: Vec<FeatureId>,
    pub skipped_empty_field: Vec<FeatureId>,
    pub skipped_empty_geometry: Vec<FeatureId>,
    pub failures: Vec<FeatureFailure>,

    /// Messages envoyés à l'utilisateur pendant le lot
    pub messages: Vec<String>,
}

impl FitReport {
    pub fn new(layer: &str, field: &str, storage_crs: &str, calculation_crs: &str) -> Self {
        Self {
            layer: layer.to_string(),
            field: field.to_string(),
            storage_crs: storage_crs.to_string(),
            calculation_crs: calculation_crs.to_string(),
            duration_secs: 0.0,
            status: FitStatus::Aborted,
            fitted: Vec::new(),
            skipped_empty_field: Vec::new(),
            skipped_empty_geometry: Vec::new(),
            failures: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Reprend le bilan d'un lot
    pub fn record_outcome(&mut self, outcome: BatchOutcome) {
        self.fitted = outcome.fitted;
        self.skipped_empty_field = outcome.skipped_empty_field;
        self.skipped_empty_geometry = outcome.skipped_empty_geometry;
        self.failures = outcome
            .failed
            .into_iter()
            .map(|(fid, message)| FeatureFailure { fid, message })
            .collect();
    }

    pub fn record_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final ; `started` est faux si le lot a été refusé
    pub fn finalize(&mut self, started: bool) {
        self.status = if !started {
            FitStatus::Aborted
        } else if self.failures.is_empty() {
            FitStatus::Success
        } else if self.fitted.is_empty() {
            FitStatus::Failed
        } else {
            FitStatus::PartialSuccess
        };
    }

    pub fn skipped(&self) -> usize {
        self.skipped_empty_field.len() + self.skipped_empty_geometry.len()
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("FIT REPORT - Layer {} (field {})", self.layer, self.field);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!(
            "CRS: storage {}, calculation {}",
            self.storage_crs, self.calculation_crs
        );

        println!("\n--- SUMMARY ---");
        println!(
            "Features: {} fitted, {} skipped (empty field: {}, empty geometry: {}), {} failed",
            self.fitted.len(),
            self.skipped(),
            self.skipped_empty_field.len(),
            self.skipped_empty_geometry.len(),
            self.failures.len()
        );

        if !self.failures.is_empty() {
            println!("\n--- FAILURES ({}) ---", self.failures.len());
            for f in self.failures.iter().take(20) {
                println!("  [FID = {}] {}", f.fid, f.message);
            }
            if self.failures.len() > 20 {
                println!("  ... and {} more", self.failures.len() - 20);
            }
        }

        if !self.messages.is_empty() {
            println!("\n--- MESSAGES ---");
            for m in &self.messages {
                println!("  {}", m);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} fitted, {} skipped, {} failed",
            self.layer,
            self.fitted.len(),
            self.skipped(),
            self.failures.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> FitReport {
        FitReport::new("parcelles", "surface", "EPSG:4674", "EPSG:29101")
    }

    #[test]
    fn test_finalize_success() {
        let mut report = report();
        report.record_outcome(BatchOutcome {
            fitted: vec![1, 2],
            skipped_empty_field: vec![3],
            ..Default::default()
        });
        report.finalize(true);

        assert_eq!(report.status, FitStatus::Success);
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn test_finalize_partial_and_failed() {
        let mut report = report();
        report.record_outcome(BatchOutcome {
            fitted: vec![1],
            failed: vec![(2, "Invalid target area: 0".to_string())],
            ..Default::default()
        });
        report.finalize(true);
        assert_eq!(report.status, FitStatus::PartialSuccess);

        report.fitted.clear();
        report.finalize(true);
        assert_eq!(report.status, FitStatus::Failed);
    }

    #[test]
    fn test_finalize_aborted() {
        let mut report = report();
        report.record_message("Layer 'parcelles' needs to be editable");
        report.finalize(false);
        assert_eq!(report.status, FitStatus::Aborted);
    }

    #[test]
    fn test_summary_and_save() {
        let mut report = report();
        report.record_outcome(BatchOutcome {
            fitted: vec![1],
            skipped_empty_geometry: vec![4],
            ..Default::default()
        });
        report.finalize(true);
        assert_eq!(report.summary(), "parcelles: 1 fitted, 1 skipped, 0 failed");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save_to_file(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#""status": "Success""#));
    }
}
