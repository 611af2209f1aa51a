//! # ban-model
//!
//! Modèle des adresses de la Base Adresse Nationale et calculs associés.
//!
//! ## Features
//!
//! - Adresses typées : commune, voie, lieu-dit, numéro (enum fermée)
//! - Titre/description d'affichage avec accords (aucun / 1 / n)
//! - Emprise des géométries GeoJSON, à n'importe quelle profondeur
//! - Synchronisation du viewport mémoïsée sur un hash de géométrie
//! - Table de classification du géocodage par lot
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ban_model::{AddressEntity, ViewModel, ViewportSync};
//!
//! let entity = AddressEntity::from_json(json)?;
//! let view = ViewModel::from_entity(&entity);
//! println!("{}", view.page_title());
//!
//! let mut viewport = ViewportSync::new();
//! viewport.track(Some(&entity));
//! let command = viewport.next_command();
//! ```

pub mod bounds;
pub mod error;
pub mod geocode;
pub mod types;
pub mod view;
pub mod viewport;

pub use bounds::{compute_bounds, fit_parameters, geometry_bounds, Bounds, FitBounds};
pub use error::ModelError;
pub use geocode::{GeocodeCategory, GeocodeStatus};
pub use types::{
    AddressEntity, AddressKind, AdminRef, Commune, CommuneRef, LieuDit, Numero, NumeroSummary,
    Voie, VoieRef, VoieSummary,
};
pub use view::{count_phrase, Counted, ViewModel};
pub use viewport::{Camera, GeometryKey, ScreenSize, ViewportCommand, ViewportSync};
