//! Modèle des adresses de la Base Adresse Nationale
//!
//! Une adresse est exactement une des quatre sortes connues (commune, voie,
//! lieu-dit, numéro), sélectionnée par le champ `type` de la réponse.

use geojson::{Geometry, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::bounds::Bounds;
use crate::ModelError;

/// Sorte d'adresse (valeur du champ `type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    Commune,
    Voie,
    LieuDit,
    Numero,
}

impl AddressKind {
    /// Tag tel qu'il apparaît dans les réponses de l'API
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commune => "commune",
            Self::Voie => "voie",
            Self::LieuDit => "lieu-dit",
            Self::Numero => "numero",
        }
    }

    /// Retrouve la sorte depuis le tag, `None` si le tag est inconnu
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "commune" => Some(Self::Commune),
            "voie" => Some(Self::Voie),
            "lieu-dit" => Some(Self::LieuDit),
            "numero" => Some(Self::Numero),
            _ => None,
        }
    }
}

impl std::fmt::Display for AddressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Référence vers une région ou un département
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRef {
    pub code: String,
    pub nom: String,
}

/// Référence vers la commune propriétaire d'une voie ou d'un numéro
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuneRef {
    #[serde(default)]
    pub id: Option<String>,
    pub nom: String,
    pub code: String,
    /// Absente pour certaines communes d'outre-mer
    #[serde(default)]
    pub region: Option<AdminRef>,
    #[serde(default)]
    pub departement: Option<AdminRef>,
}

/// Référence vers la voie propriétaire d'un numéro
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoieRef {
    #[serde(default)]
    pub id: Option<String>,
    pub nom_voie: String,
}

/// Voie listée dans une commune
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoieSummary {
    pub id: String,
    pub nom_voie: String,
    #[serde(default)]
    pub nb_numeros: u32,
}

/// Numéro listé dans une voie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumeroSummary {
    pub id: String,
    #[serde(deserialize_with = "house_number")]
    pub numero: String,
    #[serde(default)]
    pub suffixe: Option<String>,
    #[serde(default)]
    pub position: Option<Geometry>,
}

impl NumeroSummary {
    /// Numéro complet avec suffixe (ex: "12bis")
    pub fn label(&self) -> String {
        full_number(&self.numero, self.suffixe.as_deref())
    }
}

/// Commune
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commune {
    #[serde(default)]
    pub id: Option<String>,
    pub nom_commune: String,
    /// Code INSEE
    pub code_commune: String,
    pub nb_numeros: u32,
    pub nb_voies: u32,
    #[serde(default)]
    pub region: Option<AdminRef>,
    #[serde(default)]
    pub departement: Option<AdminRef>,
    /// Géométrie d'affichage (polygone ou point)
    #[serde(default)]
    pub contour: Option<Geometry>,
    #[serde(default, rename = "displayBBox")]
    pub display_bbox: Option<Bounds>,
    #[serde(default)]
    pub voies: Vec<VoieSummary>,
}

/// Voie (rue, avenue, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voie {
    pub id: String,
    pub nom_voie: String,
    pub commune: CommuneRef,
    pub nb_numeros: u32,
    #[serde(default)]
    pub numeros: Vec<NumeroSummary>,
    #[serde(default, rename = "displayBBox")]
    pub display_bbox: Option<Bounds>,
}

/// Lieu-dit (toponyme sans numérotation classique)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LieuDit {
    pub id: String,
    pub nom_voie: String,
    pub commune: CommuneRef,
    pub nb_numeros: u32,
    #[serde(default, rename = "displayBBox")]
    pub display_bbox: Option<Bounds>,
}

/// Numéro (adresse au niveau du bâtiment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Numero {
    pub id: String,
    #[serde(deserialize_with = "house_number")]
    pub numero: String,
    #[serde(default)]
    pub suffixe: Option<String>,
    pub voie: VoieRef,
    pub commune: CommuneRef,
    /// Toujours un Point
    pub position: Geometry,
    #[serde(default)]
    pub parcelles: Vec<String>,
    #[serde(default)]
    pub code_postal: Option<String>,
    #[serde(default)]
    pub lieu_dit_complement_nom: Option<String>,
    #[serde(default, rename = "displayBBox")]
    pub display_bbox: Option<Bounds>,
}

impl Numero {
    /// Numéro complet avec suffixe (ex: "12bis")
    pub fn label(&self) -> String {
        full_number(&self.numero, self.suffixe.as_deref())
    }

    /// Coordonnées (lon, lat) de la position
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match &self.position.value {
            Value::Point(p) if p.len() >= 2 => Some((p[0], p[1])),
            _ => None,
        }
    }
}

/// Une adresse de la BAN
#[derive(Debug, Clone, PartialEq)]
pub enum AddressEntity {
    Commune(Commune),
    Voie(Voie),
    LieuDit(LieuDit),
    Numero(Numero),
}

impl AddressEntity {
    /// Décode une réponse JSON en sélectionnant la variante par son champ `type`
    ///
    /// # Errors
    ///
    /// `MissingKind`/`UnknownKind` si le tag n'est pas reconnu, `InvalidShape`
    /// si le contenu ne correspond pas à la variante, `InvalidGeometry` si la
    /// position d'un numéro n'est pas un Point.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ModelError> {
        let kind = {
            let tag = value
                .get("type")
                .and_then(serde_json::Value::as_str)
                .ok_or(ModelError::MissingKind)?;
            AddressKind::from_tag(tag).ok_or_else(|| ModelError::UnknownKind(tag.to_string()))?
        };

        let entity = match kind {
            AddressKind::Commune => Self::Commune(decode(kind, value)?),
            AddressKind::Voie => Self::Voie(decode(kind, value)?),
            AddressKind::LieuDit => Self::LieuDit(decode(kind, value)?),
            AddressKind::Numero => Self::Numero(decode(kind, value)?),
        };

        entity.validate()?;
        Ok(entity)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if let Self::Numero(numero) = self {
            if numero.coordinates().is_none() {
                return Err(ModelError::invalid_geometry(
                    &numero.id,
                    "position must be a Point",
                ));
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> AddressKind {
        match self {
            Self::Commune(_) => AddressKind::Commune,
            Self::Voie(_) => AddressKind::Voie,
            Self::LieuDit(_) => AddressKind::LieuDit,
            Self::Numero(_) => AddressKind::Numero,
        }
    }

    /// Identifiant de l'adresse (code INSEE pour une commune sans id)
    pub fn id(&self) -> &str {
        match self {
            Self::Commune(c) => c.id.as_deref().unwrap_or(&c.code_commune),
            Self::Voie(v) => &v.id,
            Self::LieuDit(l) => &l.id,
            Self::Numero(n) => &n.id,
        }
    }

    pub fn is_toponym(&self) -> bool {
        matches!(self, Self::LieuDit(_))
    }

    /// Code INSEE de la commune de l'adresse
    pub fn commune_code(&self) -> &str {
        match self {
            Self::Commune(c) => &c.code_commune,
            Self::Voie(v) => &v.commune.code,
            Self::LieuDit(l) => &l.commune.code,
            Self::Numero(n) => &n.commune.code,
        }
    }

    /// Géométrie d'affichage portée par l'adresse
    pub fn display_geometry(&self) -> Option<&Geometry> {
        match self {
            Self::Commune(c) => c.contour.as_ref(),
            Self::Numero(n) => Some(&n.position),
            Self::Voie(_) | Self::LieuDit(_) => None,
        }
    }

    pub fn display_bbox(&self) -> Option<Bounds> {
        match self {
            Self::Commune(c) => c.display_bbox,
            Self::Voie(v) => v.display_bbox,
            Self::LieuDit(l) => l.display_bbox,
            Self::Numero(n) => n.display_bbox,
        }
    }

    /// Géométrie à cadrer : la géométrie d'affichage, sinon l'emprise
    /// `displayBBox` sous forme de polygone
    pub fn viewport_geometry(&self) -> Option<Geometry> {
        self.display_geometry()
            .cloned()
            .or_else(|| self.display_bbox().map(|b| b.to_polygon()))
    }
}

fn decode<T: DeserializeOwned>(kind: AddressKind, value: serde_json::Value) -> Result<T, ModelError> {
    serde_json::from_value(value).map_err(|e| ModelError::invalid_shape(kind.as_str(), e.to_string()))
}

/// Numéro + suffixe, un suffixe vide étant ignoré
pub(crate) fn full_number(numero: &str, suffixe: Option<&str>) -> String {
    format!("{}{}", numero, suffixe.unwrap_or(""))
}

/// Accepte un numéro sous forme d'entier ou de chaîne
fn house_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}
