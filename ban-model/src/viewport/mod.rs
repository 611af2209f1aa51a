//! Synchronisation du viewport avec la géométrie de l'adresse active
//!
//! L'emprise n'est recalculée que lorsque la géométrie change (clé de hash),
//! et un cadrage n'est émis qu'une fois par changement. Une ancre de
//! navigation (hash d'URL) active suspend tout cadrage.

pub mod camera;
pub mod key;

pub use camera::{Camera, ScreenSize};
pub use key::GeometryKey;

use geojson::Geometry;
use tracing::{debug, trace};

use crate::bounds::{fit_parameters, geometry_bounds, Bounds, FitBounds};
use crate::types::AddressEntity;

/// Ce que le rendu doit faire de la vue courante
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportCommand {
    /// Conserver la vue courante
    Retain,
    /// Cadrer sur une emprise
    Fit(FitBounds),
}

/// Suivi de l'emprise de la géométrie active
#[derive(Debug, Default)]
pub struct ViewportSync {
    key: Option<GeometryKey>,
    bounds: Option<Bounds>,
    pending_fit: bool,
    anchor: Option<String>,
    recomputations: u64,
}

impl ViewportSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace la géométrie active
    ///
    /// Retourne `true` si l'emprise a été recalculée, `false` si la géométrie
    /// est identique à la précédente.
    pub fn set_geometry(&mut self, geometry: Option<&Geometry>) -> bool {
        let key = geometry.map(GeometryKey::of);
        if key == self.key {
            trace!("Géométrie inchangée, emprise conservée");
            return false;
        }

        self.key = key;
        self.bounds = geometry.and_then(geometry_bounds);
        self.pending_fit = self.bounds.is_some();
        self.recomputations += 1;

        debug!(
            key = ?self.key.map(|k| k.to_string()),
            bounds = ?self.bounds,
            "Emprise recalculée"
        );
        true
    }

    /// Suit la géométrie d'affichage d'une adresse (ou son absence)
    pub fn track(&mut self, entity: Option<&AddressEntity>) -> bool {
        let geometry = entity.and_then(AddressEntity::viewport_geometry);
        self.set_geometry(geometry.as_ref())
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Nombre de recalculs effectués depuis la création
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Active une ancre de navigation ; une ancre vide est ignorée
    pub fn set_anchor(&mut self, anchor: impl Into<String>) {
        let anchor = anchor.into();
        self.anchor = (!anchor.is_empty()).then_some(anchor);
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }

    /// Lève l'ancre si l'URL courante ne la porte plus
    pub fn observe_location(&mut self, current_hash: Option<&str>) {
        if let Some(anchor) = &self.anchor {
            if current_hash != Some(anchor.as_str()) {
                debug!(anchor = %anchor, current = ?current_hash, "Ancre abandonnée");
                self.anchor = None;
            }
        }
    }

    /// Consomme l'ancre (le défilement demandé a eu lieu)
    pub fn consume_anchor(&mut self) -> Option<String> {
        self.anchor.take()
    }

    /// Prochaine commande pour le rendu
    ///
    /// `Fit` une seule fois par changement d'emprise, `Retain` sinon ou tant
    /// qu'une ancre est active. Un cadrage retenu par l'ancre est émis dès
    /// qu'elle est levée.
    pub fn next_command(&mut self) -> ViewportCommand {
        if self.anchor.is_some() || !self.pending_fit {
            return ViewportCommand::Retain;
        }
        self.pending_fit = false;
        fit_parameters(self.bounds.as_ref()).map_or(ViewportCommand::Retain, ViewportCommand::Fit)
    }
}
