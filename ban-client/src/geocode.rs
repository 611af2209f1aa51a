//! Géocodage par lot d'un fichier CSV
//!
//! Envoie le fichier en multipart à `/search/csv/` et classe la réponse :
//! le contenu tel quel en cas de succès, sinon une des trois catégories
//! d'échec avec le message à afficher à l'utilisateur.

use std::collections::BTreeSet;
use std::path::Path;

use ban_model::{GeocodeCategory, GeocodeStatus};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ClientError;
use crate::http;

/// Noms de champs multipart réservés aux colonnes et au fichier
const RESERVED_FIELDS: [&str; 2] = ["columns", "data"];

/// Échec d'un géocodage par lot
#[derive(Debug, Error)]
#[error("Batch geocoding failed ({category}, status {http_status:?})")]
pub struct GeocodeError {
    /// Absent si la requête n'a pas abouti (erreur réseau)
    pub http_status: Option<u16>,
    pub category: GeocodeCategory,
    #[source]
    source: Option<reqwest::Error>,
}

impl GeocodeError {
    fn from_status(status: u16, category: GeocodeCategory) -> Self {
        Self {
            http_status: Some(status),
            category,
            source: None,
        }
    }

    fn transport(source: reqwest::Error) -> Self {
        Self {
            http_status: None,
            category: GeocodeCategory::Unknown,
            source: Some(source),
        }
    }

    /// Réponse acceptée mais contenu illisible
    fn body(status: u16, source: reqwest::Error) -> Self {
        Self {
            http_status: Some(status),
            category: GeocodeCategory::Unknown,
            source: Some(source),
        }
    }

    /// Message à afficher tel quel
    pub fn user_message(&self) -> &'static str {
        self.category.user_message()
    }
}

/// Critère de filtrage (ex: `citycode` = `38185`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeocodeFilter {
    pub name: String,
    pub value: String,
}

impl GeocodeFilter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Vrai si le nom est celui d'un champ déjà utilisé par la requête
    pub fn is_reserved(&self) -> bool {
        RESERVED_FIELDS.contains(&self.name.as_str())
    }
}

/// Fichier à géocoder
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeFile {
    pub name: String,
    pub content: Bytes,
}

impl GeocodeFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Lit un fichier sur disque
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data.csv".to_string());
        Ok(Self::new(name, content))
    }
}

/// Fichier, colonnes à géocoder et filtres
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeJob {
    pub file: GeocodeFile,
    /// Ordre conservé, doublons autorisés
    pub columns: Vec<String>,
    pub filters: BTreeSet<GeocodeFilter>,
}

impl GeocodeJob {
    pub fn new(file: GeocodeFile) -> Self {
        Self {
            file,
            columns: Vec::new(),
            filters: BTreeSet::new(),
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Ajoute un filtre ; `columns` et `data` sont ignorés
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let filter = GeocodeFilter::new(name, value);
        if filter.is_reserved() {
            warn!(name = %filter.name, "Filtre ignoré : nom réservé");
        } else {
            self.filters.insert(filter);
        }
        self
    }

    /// Corps multipart : colonnes, filtres, puis le fichier en dernier
    fn into_form(self) -> Form {
        let mut form = Form::new();
        for column in self.columns {
            form = form.text("columns", column);
        }
        for filter in self.filters.into_iter().filter(|f| !f.is_reserved()) {
            form = form.text(filter.name, filter.value);
        }
        let data = Part::bytes(self.file.content.to_vec()).file_name(self.file.name);
        form.part("data", data)
    }
}

/// Client du géocodage par lot
#[derive(Debug, Clone)]
pub struct BatchGeocodeClient {
    client: reqwest::Client,
    url: Url,
}

impl BatchGeocodeClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_client(config)?,
            url: http::endpoint(&config.api_adresse_url, &["search", "csv", ""])?,
        })
    }

    /// Envoie le fichier et retourne le résultat tel que produit par le service
    pub async fn submit(&self, job: GeocodeJob) -> Result<Bytes, GeocodeError> {
        info!(
            file = %job.file.name,
            size = job.file.content.len(),
            columns = job.columns.len(),
            filters = job.filters.len(),
            "Géocodage par lot"
        );

        let response = self
            .client
            .post(self.url.clone())
            .multipart(job.into_form())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Géocodage par lot injoignable");
                GeocodeError::transport(e)
            })?;

        let status = response.status().as_u16();
        match GeocodeStatus::from_code(status) {
            GeocodeStatus::Success => {
                let payload = response.bytes().await.map_err(|e| {
                    warn!(status, error = %e, "Lecture du résultat interrompue");
                    GeocodeError::body(status, e)
                })?;
                info!(status, size = payload.len(), "Géocodage par lot terminé");
                Ok(payload)
            }
            GeocodeStatus::Failed(category) => {
                warn!(status, category = %category, "Géocodage par lot refusé");
                Err(GeocodeError::from_status(status, category))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_builder_keeps_column_order() {
        let job = GeocodeJob::new(GeocodeFile::new("adresses.csv", "nom,ville\n"))
            .column("nom")
            .column("ville")
            .column("nom")
            .filter("citycode", "38185")
            .filter("citycode", "38185");

        assert_eq!(job.columns, vec!["nom", "ville", "nom"]);
        assert_eq!(job.filters.len(), 1);
    }

    #[test]
    fn test_reserved_filter_names_are_skipped() {
        let job = GeocodeJob::new(GeocodeFile::new("adresses.csv", "nom,ville\n"))
            .filter("columns", "ville")
            .filter("data", "autre.csv")
            .filter("postcode", "38000");

        let names: Vec<&str> = job.filters.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["postcode"]);
        assert!(GeocodeFilter::new("columns", "x").is_reserved());
        assert!(!GeocodeFilter::new("citycode", "38185").is_reserved());
    }

    #[test]
    fn test_error_message_follows_category() {
        let err = GeocodeError::from_status(503, GeocodeCategory::Overloaded);
        assert_eq!(err.user_message(), GeocodeCategory::Overloaded.user_message());
        assert!(err.to_string().contains("503"), "{}", err);
    }

    #[tokio::test]
    async fn test_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adresses.csv");
        std::fs::write(&path, "nom,ville\nmairie,Grenoble\n").unwrap();

        let file = GeocodeFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "adresses.csv");
        assert_eq!(&file.content[..], b"nom,ville\nmairie,Grenoble\n");
    }
}
