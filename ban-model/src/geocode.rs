//! Classification des réponses du géocodage par lot
//!
//! La table est fermée : tout statut non-2xx tombe dans exactement une des
//! trois catégories, « inconnue » servant de cas par défaut.

use serde::Serialize;

/// Catégorie d'échec d'un géocodage par lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GeocodeCategory {
    /// Le formatage des données empêche le traitement (400)
    BadInput,
    /// Service surchargé, réessayer plus tard (502, 503)
    Overloaded,
    /// Tout autre échec
    Unknown,
}

impl GeocodeCategory {
    /// Message à afficher tel quel à l'utilisateur
    pub fn user_message(self) -> &'static str {
        match self {
            Self::BadInput => "Une erreur dans le formatage des données rend l’opération impossible. Veuillez vous rapprocher de notre équipe avec un échantillon minimal qui reproduit le problème.",
            Self::Overloaded => "Le service est actuellement surchargé. Merci de réessayer dans quelques minutes",
            Self::Unknown => "Une erreur inconnue est survenue. N’hésitez pas à réessayer ultérieurement et à revenir vers nous le cas échéant.",
        }
    }

    /// Vrai si relancer le même fichier plus tard a une chance d'aboutir
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::BadInput)
    }
}

impl std::fmt::Display for GeocodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BadInput => "bad input",
            Self::Overloaded => "overloaded",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Résultat de la classification d'un statut HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeStatus {
    Success,
    Failed(GeocodeCategory),
}

impl GeocodeStatus {
    pub fn from_code(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            400 => Self::Failed(GeocodeCategory::BadInput),
            502 | 503 => Self::Failed(GeocodeCategory::Overloaded),
            _ => Self::Failed(GeocodeCategory::Unknown),
        }
    }
}
