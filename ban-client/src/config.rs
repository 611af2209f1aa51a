//! Configuration des clients HTTP

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

const DEFAULT_API_ADRESSE: &str = "https://api-adresse.data.gouv.fr";
const DEFAULT_LOOKUP: &str = "https://plateforme.adresse.data.gouv.fr/lookup";
const DEFAULT_GEO_API: &str = "https://geo.api.gouv.fr";
const DEFAULT_EXPLORE: &str = "https://sandbox.geo.api.gouv.fr/explore";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Points d'accès et réglages réseau
///
/// Passée explicitement à chaque client, jamais lue globalement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API Adresse (recherche, reverse, géocodage CSV)
    pub api_adresse_url: String,
    /// Service de résolution des identifiants (`/address/{id}`)
    pub lookup_url: String,
    /// API Géo (communes)
    pub geo_api_url: String,
    /// Explorateur des voies et numéros
    pub explore_url: String,
    /// Timeout de chaque requête, en millisecondes
    pub timeout_ms: u64,
    /// Nombre de résultats demandés à la recherche
    pub search_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_adresse_url: DEFAULT_API_ADRESSE.into(),
            lookup_url: DEFAULT_LOOKUP.into(),
            geo_api_url: DEFAULT_GEO_API.into(),
            explore_url: DEFAULT_EXPLORE.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement
    ///
    /// Un fichier `.env` est lu s'il existe ; les variables absentes ou
    /// invalides gardent leur valeur par défaut.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_adresse_url: var("BAN_API_ADRESSE").unwrap_or(defaults.api_adresse_url),
            lookup_url: var("BAN_API_LOOKUP").unwrap_or(defaults.lookup_url),
            geo_api_url: var("BAN_GEO_API").unwrap_or(defaults.geo_api_url),
            explore_url: var("BAN_EXPLORE_API").unwrap_or(defaults.explore_url),
            timeout_ms: var("BAN_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_ms),
            search_limit: var("BAN_SEARCH_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.search_limit),
        }
    }

    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Vérifie que les URLs sont valides et le timeout non nul
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("api_adresse_url", &self.api_adresse_url),
            ("lookup_url", &self.lookup_url),
            ("geo_api_url", &self.geo_api_url),
            ("explore_url", &self.explore_url),
        ] {
            Url::parse(url).context(format!("Invalid {}: {}", name, url))?;
        }
        if self.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be greater than zero");
        }
        if self.search_limit == 0 {
            anyhow::bail!("search_limit must be greater than zero");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Configuration pointant tous les services vers une même base (tests, proxy)
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_adresse_url: base.into(),
            lookup_url: base.into(),
            geo_api_url: base.into(),
            explore_url: format!("{}/explore", base),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.search_limit, 5);
    }

    #[test]
    fn test_from_vars() {
        let vars: HashMap<&str, &str> = [
            ("BAN_API_ADRESSE", "http://localhost:7878"),
            ("BAN_TIMEOUT_MS", "2500"),
            ("BAN_SEARCH_LIMIT", "not a number"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_vars(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_adresse_url, "http://localhost:7878");
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.search_limit, DEFAULT_SEARCH_LIMIT);
        assert_eq!(config.geo_api_url, DEFAULT_GEO_API);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"geo_api_url": "http://geo.local", "timeout_ms": 500}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.geo_api_url, "http://geo.local");
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.api_adresse_url, DEFAULT_API_ADRESSE);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            lookup_url: "not a url".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            timeout_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_base_url() {
        let config = Config::with_base_url("http://127.0.0.1:4000/");
        assert_eq!(config.lookup_url, "http://127.0.0.1:4000");
        assert_eq!(config.explore_url, "http://127.0.0.1:4000/explore");
        config.validate().unwrap();
    }
}
