//! # fitgeom-cli
//!
//! Ajustement des polygones d'une couche GeoJSON à la surface stockée dans un
//! de leurs champs.
//!
//! ## Usage CLI
//!
//! ```bash
//! # Ajuster toutes les entités (champ "surface", SCR de calcul enregistré)
//! fitgeom fit --input parcelles.geojson --field surface --output out.geojson
//!
//! # Aperçu de la première entité sélectionnée
//! fitgeom preview --input parcelles.geojson --field surface --ids 12
//!
//! # SCR de calcul persistant
//! fitgeom crs set EPSG:32722
//! ```

pub mod config;
pub mod layer;
pub mod notifier;
pub mod report;

pub use config::Settings;
pub use layer::GeoJsonLayer;
pub use notifier::TracingNotifier;
pub use report::{FitReport, FitStatus};
