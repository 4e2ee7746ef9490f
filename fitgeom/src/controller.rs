//! Point d'entrée événementiel pour l'application hôte
//!
//! L'hôte traduit ses signaux (case cochée, bouton, changement de champ ou de
//! SCR, suppression de couche) en appels synchrones. Toutes les erreurs sont
//! converties en messages pour le [`Notifier`] : rien ne remonte à l'hôte.

use tracing::{debug, warn};

use crate::bridge::{validate_calculation_crs, CoordinateBridge, TransformContext};
use crate::crs::Crs;
use crate::session::{BatchOutcome, FitSession, MessageLevel, Notifier, VectorLayer, TITLE};
use crate::FitError;

/// Contrôleur de l'outil d'ajustement
pub struct FitController<N: Notifier> {
    notifier: N,
    calculation_crs: Crs,
    context: TransformContext,
    session: Option<FitSession>,
    /// Adopter le SCR d'une couche projetée comme SCR de calcul
    follow_layer_crs: bool,
    /// Libellé d'aperçu de la première entité sélectionnée
    demo_feature: String,
}

impl<N: Notifier> FitController<N> {
    /// Crée un contrôleur avec un SCR de calcul déjà validé
    pub fn new(
        calculation_crs: Crs,
        context: TransformContext,
        notifier: N,
    ) -> Result<Self, FitError> {
        validate_calculation_crs(&calculation_crs)?;
        Ok(Self {
            notifier,
            calculation_crs,
            context,
            session: None,
            follow_layer_crs: true,
            demo_feature: String::new(),
        })
    }

    /// Désactive l'adoption automatique du SCR de la couche
    pub fn with_follow_layer_crs(mut self, follow: bool) -> Self {
        self.follow_layer_crs = follow;
        self
    }

    pub fn calculation_crs(&self) -> &Crs {
        &self.calculation_crs
    }

    pub fn session(&self) -> Option<&FitSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn demo_feature(&self) -> &str {
        &self.demo_feature
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn into_notifier(self) -> N {
        self.notifier
    }

    /// Changement du SCR de calcul ; `false` si refusé (l'ancien est conservé)
    pub fn on_calculation_crs_changed(&mut self, crs: Crs) -> bool {
        if let Err(err) = validate_calculation_crs(&crs) {
            warn!(crs = %crs, "Rejected calculation CRS");
            self.message(err.level(), "Invalid CRS(need be projected)");
            return false;
        }
        if crs == self.calculation_crs {
            return true;
        }

        if let Some(session) = &self.session {
            let storage = session.bridge().storage_crs().clone();
            match CoordinateBridge::new(storage, crs.clone(), &self.context) {
                Ok(bridge) => self.replace_bridge(bridge),
                Err(err) => {
                    warn!(crs = %crs, error = %err, "Calculation CRS not adopted");
                    self.report(&err);
                    return false;
                }
            }
        }

        debug!(previous = %self.calculation_crs, current = %crs, "Calculation CRS changed");
        self.calculation_crs = crs;
        true
    }

    /// Activation / désactivation de l'ajustement sur la couche active
    pub fn on_fit_toggled<L: VectorLayer + ?Sized>(
        &mut self,
        checked: bool,
        active_layer: Option<&L>,
    ) -> bool {
        self.demo_feature.clear();
        if !checked {
            self.session = None;
            return false;
        }

        if self.follow_layer_crs {
            if let Some(layer) = active_layer {
                if !layer.crs().is_geographic() {
                    self.calculation_crs = layer.crs().clone();
                }
            }
        }

        match FitSession::open(active_layer, &self.calculation_crs, &self.context) {
            Ok(session) => {
                self.session = Some(session);
                true
            }
            Err(err) => {
                self.session = None;
                self.report(&err);
                false
            }
        }
    }

    /// Application de l'ajustement aux entités sélectionnées
    pub fn on_apply<L: VectorLayer + ?Sized>(
        &mut self,
        layer: &mut L,
        field: &str,
    ) -> Option<BatchOutcome> {
        if self.session.is_none() {
            self.message(MessageLevel::Warning, "Fit geometry is not enabled");
            return None;
        }
        if !self.follow_storage_crs(&*layer) {
            return None;
        }
        let Some(session) = &self.session else {
            return None;
        };

        let result = session.apply(layer, field);
        self.demo_feature.clear();
        match result {
            Ok(outcome) => {
                for (fid, reason) in &outcome.failed {
                    self.message(MessageLevel::Warning, &format!("[FID = {}] {}", fid, reason));
                }
                Some(outcome)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// Changement du champ de surface : met à jour l'aperçu
    pub fn on_field_changed<L: VectorLayer + ?Sized>(&mut self, layer: &L, field: &str) -> &str {
        self.demo_feature.clear();
        if !self.follow_storage_crs(layer) {
            return &self.demo_feature;
        }
        let Some(session) = &self.session else {
            return &self.demo_feature;
        };

        match session.preview(layer, field) {
            Ok(Some(preview)) => self.demo_feature = preview.to_string(),
            Ok(None) => {}
            Err(err) => self.report(&err),
        }
        &self.demo_feature
    }

    /// La couche va être supprimée du projet
    pub fn on_layer_removed(&mut self, layer_id: &str) {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.layer_id() == layer_id)
        {
            debug!(layer_id, "Active layer removed, closing fit session");
            self.session = None;
            self.demo_feature.clear();
        }
    }

    /// Reconstruit le pont si le SCR de stockage de la couche a changé depuis
    /// l'ouverture ; `false` si le nouveau pont ne peut pas être construit
    fn follow_storage_crs<L: VectorLayer + ?Sized>(&mut self, layer: &L) -> bool {
        let Some(session) = &self.session else {
            return true;
        };
        if session.layer_id() != layer.id()
            || session.bridge().matches(layer.crs(), &self.calculation_crs)
        {
            return true;
        }

        debug!(
            layer = layer.name(),
            previous = %session.bridge().storage_crs(),
            current = %layer.crs(),
            "Layer CRS changed, rebuilding coordinate bridge"
        );
        match CoordinateBridge::new(
            layer.crs().clone(),
            self.calculation_crs.clone(),
            &self.context,
        ) {
            Ok(bridge) => {
                self.replace_bridge(bridge);
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    fn replace_bridge(&mut self, bridge: CoordinateBridge) {
        self.session = self.session.take().map(|s| s.with_bridge(bridge));
    }

    fn report(&mut self, err: &FitError) {
        self.message(err.level(), &err.to_string());
    }

    fn message(&mut self, level: MessageLevel, message: &str) {
        self.notifier.push(level, TITLE, message);
    }
}
