//! Résolution d'un identifiant d'adresse

use ban_model::AddressEntity;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ClientError;
use crate::http;

/// Client du service de résolution `/address/{id}`
#[derive(Debug, Clone)]
pub struct AddressResolver {
    client: reqwest::Client,
    base_url: String,
}

impl AddressResolver {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_client(config)?,
            base_url: config.lookup_url.clone(),
        })
    }

    /// Résout un identifiant en adresse
    ///
    /// L'identifiant est opaque : il est transmis comme un seul segment de
    /// chemin, sans être interprété.
    ///
    /// # Errors
    ///
    /// `NotFound` si le service ne connaît pas l'identifiant, `InvalidShape`
    /// si la réponse ne correspond à aucune sorte d'adresse.
    pub async fn resolve(&self, id: &str) -> Result<AddressEntity, ClientError> {
        let url = http::endpoint(&self.base_url, &["address", id])?;
        let value: serde_json::Value = http::get_json(&self.client, url).await?;
        let entity = AddressEntity::from_json(value)?;

        info!(id = %id, kind = %entity.kind(), "Adresse résolue");
        Ok(entity)
    }

    /// Comme [`resolve`](Self::resolve), un identifiant inconnu donnant `None`
    pub async fn resolve_optional(&self, id: &str) -> Result<Option<AddressEntity>, ClientError> {
        match self.resolve(id).await {
            Ok(entity) => Ok(Some(entity)),
            Err(ClientError::NotFound(_)) => {
                debug!(id = %id, "Adresse inconnue");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
