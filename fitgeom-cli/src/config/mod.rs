//! Paramètres persistés de l'outil

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fitgeom::{validate_calculation_crs, Crs};
use tracing::{debug, warn};

/// Clé du SCR de calcul
pub const CRS_KEY: &str = "Fit_geometry_by_area/crs";

/// Variable d'environnement donnant le chemin du fichier de paramètres
pub const SETTINGS_ENV: &str = "FITGEOM_SETTINGS";

/// Fichier de paramètres par défaut (répertoire courant)
pub const DEFAULT_SETTINGS_FILE: &str = "fitgeom-settings.json";

/// Paramètres clé/valeur stockés en JSON
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(flatten)]
    values: BTreeMap<String, String>,

    #[serde(skip)]
    path: PathBuf,
}

impl Settings {
    /// Chemin du fichier : argument, sinon `FITGEOM_SETTINGS`, sinon défaut
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => std::env::var_os(SETTINGS_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE)),
        }
    }

    /// Charge les paramètres ; un fichier absent donne des paramètres vides
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self {
                values: BTreeMap::new(),
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read settings file: {}", path.display()))?;
        let mut settings: Self =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;
        settings.path = path.to_path_buf();
        Ok(settings)
    }

    /// Écrit les paramètres dans leur fichier
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.path, json)
            .context(format!("Failed to write settings file: {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// SCR de calcul enregistré, ou EPSG:29101
    pub fn calculation_crs(&self) -> Crs {
        let Some(authid) = self.get(CRS_KEY) else {
            return Crs::default_calculation();
        };

        match Crs::from_authid(authid) {
            Ok(crs) if !crs.is_geographic() => crs,
            Ok(crs) => {
                warn!(crs = %crs, "Stored calculation CRS is geographic, using default");
                Crs::default_calculation()
            }
            Err(e) => {
                warn!(value = authid, error = %e, "Stored calculation CRS is invalid, using default");
                Crs::default_calculation()
            }
        }
    }

    /// Enregistre un nouveau SCR de calcul (refusé s'il est géographique)
    pub fn set_calculation_crs(&mut self, crs: &Crs) -> Result<()> {
        validate_calculation_crs(crs)?;
        self.set(CRS_KEY, crs.authid());
        Ok(())
    }
}
