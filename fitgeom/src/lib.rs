//! # fitgeom
//!
//! Ajuste la géométrie d'un polygone à une surface cible stockée dans un de ses
//! attributs, en conservant sa forme et son centroïde.
//!
//! ## Features
//!
//! - Mise à l'échelle isotrope autour du centroïde (types `geo`)
//! - Calcul dans un SCR projeté quand la couche est stockée en géographique
//! - Reprojection en Rust pur (Lambert 93, UTM, Web Mercator, Brazil Polyconic)
//! - Fallback PROJ avec le feature `reproject`
//! - Orchestration d'une session d'édition via des traits hôtes
//!
//! ## Usage
//!
//! ```rust
//! use fitgeom::{fit_polygon, Crs, CoordinateBridge, TransformContext};
//! use geo::polygon;
//!
//! let square = polygon![
//!     (x: 0.0, y: 0.0),
//!     (x: 10.0, y: 0.0),
//!     (x: 10.0, y: 10.0),
//!     (x: 0.0, y: 10.0),
//! ];
//! let fitted = fit_polygon(&square, 400.0)?;
//! assert_eq!(fitted.exterior().0.len(), 5);
//!
//! let bridge = CoordinateBridge::new(
//!     Crs::from_authid("EPSG:4326")?,
//!     Crs::from_authid("EPSG:29101")?,
//!     &TransformContext::default(),
//! )?;
//! assert!(!bridge.is_direct());
//! # Ok::<(), fitgeom::FitError>(())
//! ```

pub mod bridge;
pub mod controller;
pub mod crs;
pub mod error;
pub mod fitter;
#[cfg(feature = "reproject")]
pub mod reproject;
pub mod reproject_lite;
pub mod session;
pub mod types;

pub use bridge::{
    fit_in_crs, validate_calculation_crs, AreaOfInterest, CoordinateBridge, TransformContext,
};
pub use controller::FitController;
pub use crs::{Crs, CrsKind, MapUnit, DEFAULT_CALCULATION_CRS};
pub use error::FitError;
pub use fitter::{fit_geometry, fit_multi_polygon, fit_polygon};
pub use session::{BatchOutcome, FitSession, MessageLevel, Notifier, Preview, VectorLayer};
pub use types::{AttributeValue, Feature, FeatureId, Field, FieldType, GeometryType};

/// Vérifie si la reprojection PROJ est disponible
pub fn proj_available() -> bool {
    cfg!(feature = "reproject")
}
