//! Requêtes GET JSON partagées par les clients

use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ClientError;

/// Client HTTP avec le timeout de la configuration
pub(crate) fn build_client(config: &Config) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(ClientError::Build)
}

/// Construit `{base}/{segments...}`, chaque segment étant encodé tel quel
/// (un `/` dans un identifiant reste dans le même segment)
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = Url::parse(base).map_err(|e| ClientError::invalid_url(base, e))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ClientError::invalid_url(base, "cannot be a base"))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

/// GET puis décodage JSON
///
/// 404 donne `NotFound`, tout autre statut non-2xx `Status`, et une réponse
/// qui n'est pas `application/json` `UnexpectedContentType`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: Url,
) -> Result<T, ClientError> {
    debug!(url = %url, "GET");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| ClientError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        debug!(url = %url, "Not found");
        return Err(ClientError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        warn!(url = %url, status = status.as_u16(), "Unexpected status");
        return Err(ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    if !content_type
        .as_deref()
        .is_some_and(|c| c.contains("application/json"))
    {
        return Err(ClientError::UnexpectedContentType {
            url: url.to_string(),
            content_type,
        });
    }

    let body = response.bytes().await.map_err(|source| ClientError::Network {
        url: url.to_string(),
        source,
    })?;

    serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint("http://localhost:3000/lookup", &["address", "38185_0010/a b"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/lookup/address/38185_0010%2Fa%20b"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let url = endpoint("http://localhost:3000/", &["communes", "38185"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/communes/38185");
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        assert!(matches!(
            endpoint("localhost", &["x"]),
            Err(ClientError::InvalidUrl { .. })
        ));
        assert!(matches!(
            endpoint("mailto:ban@example.org", &["x"]),
            Err(ClientError::InvalidUrl { .. })
        ));
    }
}
