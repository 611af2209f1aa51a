//! Erreurs des clients HTTP

use ban_model::ModelError;
use thiserror::Error;

/// Erreurs de résolution et de recherche
#[derive(Debug, Error)]
pub enum ClientError {
    /// Ressource absente (404), à afficher comme « pas d'adresse »
    #[error("Not found: {0}")]
    NotFound(String),

    /// La réponse ne correspond à aucune sorte d'adresse connue
    #[error("Invalid response shape")]
    InvalidShape(#[from] ModelError),

    #[error("Network error on {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} on {url}")]
    Status { url: String, status: u16 },

    #[error("Unexpected content type {content_type:?} on {url}")]
    UnexpectedContentType {
        url: String,
        content_type: Option<String>,
    },

    #[error("Failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Vrai si relancer la même opération peut aboutir
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Decode { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
