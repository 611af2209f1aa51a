//! Annuaires : recherche d'adresses, reverse, communes et explorateur

use ban_model::AdminRef;
use geojson::Geometry;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::ClientError;
use crate::http;
use crate::search::SearchItem;

/// Champs demandés à l'API Géo pour une commune
const COMMUNE_FIELDS: &str =
    "code,nom,codesPostaux,surface,population,centre,contour,departement,region";

/// Propriétés d'un résultat de l'API Adresse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressProperties {
    pub id: String,
    pub label: String,
    /// housenumber, street, locality ou municipality
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub citycode: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// « 38, Isère, Auvergne-Rhône-Alpes »
    #[serde(default)]
    pub context: Option<String>,
}

/// Résultat de recherche (feature GeoJSON de l'API Adresse)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    pub properties: AddressProperties,
}

impl SearchItem for AddressSuggestion {
    fn id(&self) -> &str {
        &self.properties.id
    }

    fn label(&self) -> &str {
        &self.properties.label
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<AddressSuggestion>,
}

/// Commune de l'API Géo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneRecord {
    pub code: String,
    pub nom: String,
    #[serde(default)]
    pub codes_postaux: Vec<String>,
    #[serde(default)]
    pub population: Option<u64>,
    /// Surface en hectares
    #[serde(default)]
    pub surface: Option<f64>,
    #[serde(default)]
    pub departement: Option<AdminRef>,
    #[serde(default)]
    pub region: Option<AdminRef>,
    #[serde(default)]
    pub centre: Option<Geometry>,
    #[serde(default)]
    pub contour: Option<Geometry>,
}

impl SearchItem for CommuneRecord {
    fn id(&self) -> &str {
        &self.code
    }

    fn label(&self) -> &str {
        &self.nom
    }
}

/// Données brutes de l'explorateur pour une voie
#[derive(Debug, Clone, PartialEq)]
pub struct ExploreData {
    pub commune: CommuneRecord,
    /// Voies de la commune
    pub voies: Vec<serde_json::Value>,
    /// Numéros de la voie
    pub numeros: Vec<serde_json::Value>,
    code_voie: String,
}

impl ExploreData {
    /// Voie demandée parmi les voies de la commune
    pub fn voie(&self) -> Option<&serde_json::Value> {
        self.voies
            .iter()
            .find(|v| v.get("codeVoie").and_then(|c| c.as_str()) == Some(self.code_voie.as_str()))
    }

    /// Numéro sélectionné parmi les numéros de la voie
    pub fn numero(&self, numero: &str) -> Option<&serde_json::Value> {
        self.numeros.iter().find(|n| match n.get("numero") {
            Some(serde_json::Value::String(s)) => s == numero,
            Some(serde_json::Value::Number(v)) => v.to_string() == numero,
            _ => false,
        })
    }
}

/// Client des annuaires (API Adresse, API Géo, explorateur)
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: reqwest::Client,
    config: Config,
}

impl DirectoryClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_client(config)?,
            config: config.clone(),
        })
    }

    /// Recherche plein texte d'adresses, classées par pertinence
    pub async fn search(&self, q: &str) -> Result<Vec<AddressSuggestion>, ClientError> {
        self.search_near(q, None).await
    }

    /// Recherche favorisant les résultats proches de `near` (lon, lat)
    pub async fn search_near(
        &self,
        q: &str,
        near: Option<(f64, f64)>,
    ) -> Result<Vec<AddressSuggestion>, ClientError> {
        let mut url = http::endpoint(&self.config.api_adresse_url, &["search", ""])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", q);
            if let Some((lng, lat)) = near {
                query
                    .append_pair("lng", &lng.to_string())
                    .append_pair("lat", &lat.to_string());
            }
            query.append_pair("limit", &self.config.search_limit.to_string());
        }

        let response: SearchResponse = http::get_json(&self.client, url).await?;
        debug!(q = %q, results = response.features.len(), "Recherche d'adresses");
        Ok(response.features)
    }

    /// Adresses les plus proches d'un point
    pub async fn reverse(&self, lng: f64, lat: f64) -> Result<Vec<AddressSuggestion>, ClientError> {
        let mut url = http::endpoint(&self.config.api_adresse_url, &["reverse", ""])?;
        url.query_pairs_mut()
            .append_pair("lng", &lng.to_string())
            .append_pair("lat", &lat.to_string());

        let response: SearchResponse = http::get_json(&self.client, url).await?;
        Ok(response.features)
    }

    /// Recherche de communes par nom, les plus peuplées en premier
    pub async fn search_communes(&self, nom: &str) -> Result<Vec<CommuneRecord>, ClientError> {
        let mut url = http::endpoint(&self.config.geo_api_url, &["communes"])?;
        url.query_pairs_mut()
            .append_pair("nom", nom)
            .append_pair("fields", COMMUNE_FIELDS)
            .append_pair("boost", "population");

        let communes: Vec<CommuneRecord> = http::get_json(&self.client, url).await?;
        debug!(nom = %nom, results = communes.len(), "Recherche de communes");
        Ok(communes)
    }

    /// Commune par code INSEE
    pub async fn commune(&self, code: &str) -> Result<CommuneRecord, ClientError> {
        http::get_json(&self.client, self.commune_url(code)?).await
    }

    /// Voies d'une commune (explorateur, JSON brut)
    pub async fn explore_commune(&self, code: &str) -> Result<Vec<serde_json::Value>, ClientError> {
        let url = http::endpoint(&self.config.explore_url, &[code])?;
        http::get_json(&self.client, url).await
    }

    /// Commune, voies et numéros d'une voie, récupérés en parallèle
    pub async fn explore(&self, code: &str, code_voie: &str) -> Result<ExploreData, ClientError> {
        let voie_url = http::endpoint(&self.config.explore_url, &[code, code_voie])?;

        let (commune, voies, numeros) = tokio::try_join!(
            self.commune(code),
            self.explore_commune(code),
            http::get_json::<Vec<serde_json::Value>>(&self.client, voie_url),
        )?;

        Ok(ExploreData {
            commune,
            voies,
            numeros,
            code_voie: code_voie.to_string(),
        })
    }

    fn commune_url(&self, code: &str) -> Result<Url, ClientError> {
        let mut url = http::endpoint(&self.config.geo_api_url, &["communes", code])?;
        url.query_pairs_mut()
            .append_pair("fields", COMMUNE_FIELDS)
            .append_pair("boost", "population");
        Ok(url)
    }
}
