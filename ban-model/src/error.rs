//! Types d'erreurs pour le crate ban-model

use thiserror::Error;

/// Erreurs pouvant survenir lors du décodage d'une adresse
#[derive(Debug, Error)]
pub enum ModelError {
    /// Le champ `type` est absent ou n'est pas une chaîne
    #[error("Missing address type tag")]
    MissingKind,

    /// Le champ `type` ne correspond à aucune des quatre sortes connues
    #[error("Unknown address type: {0}")]
    UnknownKind(String),

    /// La réponse ne correspond pas à la forme attendue pour sa sorte
    #[error("Invalid shape for {kind}: {reason}")]
    InvalidShape { kind: &'static str, reason: String },

    /// Géométrie inattendue (ex: position d'un numéro qui n'est pas un Point)
    #[error("Invalid geometry for {entity_id}: {reason}")]
    InvalidGeometry { entity_id: String, reason: String },
}

impl ModelError {
    /// Crée une erreur de forme avec contexte
    pub fn invalid_shape(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            kind,
            reason: reason.into(),
        }
    }

    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(entity_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            entity_id: entity_id.into(),
            reason: reason.into(),
        }
    }
}
