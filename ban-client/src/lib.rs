//! # ban-client
//!
//! Client de la Base Adresse Nationale.
//!
//! ## Features
//!
//! - Résolution d'un identifiant en adresse typée (commune, voie, lieu-dit, numéro)
//! - Recherche incrémentale avec anti-rebond et réponses périmées ignorées
//! - Recherche de communes, reverse et explorateur des voies
//! - Géocodage par lot d'un fichier CSV
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ban_client::{AddressPage, AddressResolver, Config};
//!
//! let config = Config::from_env();
//! let mut page = AddressPage::new(AddressResolver::new(&config)?);
//! page.navigate("38185_0010").await;
//! println!("{}", page.view_model().page_title());
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod geocode;
mod http;
pub mod page;
pub mod resolver;
pub mod search;

pub use config::Config;
pub use directory::{AddressSuggestion, CommuneRecord, DirectoryClient, ExploreData};
pub use error::ClientError;
pub use geocode::{BatchGeocodeClient, GeocodeError, GeocodeFile, GeocodeFilter, GeocodeJob};
pub use page::{AddressPage, PageState};
pub use resolver::AddressResolver;
pub use search::{Debouncer, SearchController, SearchItem, SearchState, DEBOUNCE_DELAY, MAX_RESULTS};
