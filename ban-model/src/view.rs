//! Titre et description d'une adresse pour l'affichage

use serde::Serialize;

use crate::types::{full_number, AddressEntity, AdminRef};

/// Nom du site, suffixe des titres de page
pub const SITE_NAME: &str = "Base Adresse Nationale";

const DEFAULT_DESCRIPTION: &str = "Consultez les adresses de la Base Adresse Nationale";

/// Ce qu'on compte dans les descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counted {
    Voie,
    Numero,
}

impl Counted {
    fn singular(self) -> &'static str {
        match self {
            Self::Voie => "voie",
            Self::Numero => "numéro",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Self::Voie => "voies",
            Self::Numero => "numéros",
        }
    }

    fn is_feminine(self) -> bool {
        matches!(self, Self::Voie)
    }
}

/// Accorde un compteur : « aucun numéro répertorié », « 1 voie répertoriée »,
/// « 12 numéros répertoriés »
pub fn count_phrase(count: u32, counted: Counted) -> String {
    let (listed_one, listed_many) = if counted.is_feminine() {
        ("répertoriée", "répertoriées")
    } else {
        ("répertorié", "répertoriés")
    };

    match count {
        0 => {
            let none = if counted.is_feminine() { "aucune" } else { "aucun" };
            format!("{} {} {}", none, counted.singular(), listed_one)
        }
        1 => format!("1 {} {}", counted.singular(), listed_one),
        n => format!("{} {} {}", n, counted.plural(), listed_many),
    }
}

/// Vue d'une adresse : titre, description et ligne de localisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub title: String,
    pub description: String,
    /// « Région - Département (code) », absente si l'une des deux manque
    pub location: Option<String>,
}

impl Default for ViewModel {
    /// Vue de la page sans adresse sélectionnée
    fn default() -> Self {
        Self {
            title: SITE_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            location: None,
        }
    }
}

impl ViewModel {
    pub fn from_entity(entity: &AddressEntity) -> Self {
        match entity {
            AddressEntity::Commune(c) => Self {
                title: format!("{} ({})", c.nom_commune, c.code_commune),
                description: format!(
                    "{} : {}, {}",
                    c.nom_commune,
                    count_phrase(c.nb_voies, Counted::Voie),
                    count_phrase(c.nb_numeros, Counted::Numero)
                ),
                location: location_line(c.region.as_ref(), c.departement.as_ref()),
            },
            AddressEntity::Voie(v) => Self {
                title: format!("{}, {} ({})", v.nom_voie, v.commune.nom, v.commune.code),
                description: format!(
                    "{}, voie de la commune de {} : {}",
                    v.nom_voie,
                    v.commune.nom,
                    count_phrase(v.nb_numeros, Counted::Numero)
                ),
                location: location_line(v.commune.region.as_ref(), v.commune.departement.as_ref()),
            },
            AddressEntity::LieuDit(l) => Self {
                title: format!("{}, {} ({})", l.nom_voie, l.commune.nom, l.commune.code),
                description: format!("{}, lieu-dit de la commune de {}", l.nom_voie, l.commune.nom),
                location: location_line(l.commune.region.as_ref(), l.commune.departement.as_ref()),
            },
            AddressEntity::Numero(n) => {
                let number = full_number(&n.numero, n.suffixe.as_deref());
                Self {
                    title: format!(
                        "{} {}, {} ({})",
                        number, n.voie.nom_voie, n.commune.nom, n.commune.code
                    ),
                    description: format!(
                        "Numéro {} {}, à {} ({})",
                        number, n.voie.nom_voie, n.commune.nom, n.commune.code
                    ),
                    location: location_line(
                        n.commune.region.as_ref(),
                        n.commune.departement.as_ref(),
                    ),
                }
            }
        }
    }

    /// Vue d'une adresse optionnelle, la vue par défaut en l'absence d'adresse
    pub fn from_optional(entity: Option<&AddressEntity>) -> Self {
        entity.map(Self::from_entity).unwrap_or_default()
    }

    /// Titre de page, suffixé par le nom du site
    pub fn page_title(&self) -> String {
        if self.title == SITE_NAME {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, SITE_NAME)
        }
    }
}

fn location_line(region: Option<&AdminRef>, departement: Option<&AdminRef>) -> Option<String> {
    let (region, departement) = (region?, departement?);
    Some(format!(
        "{} - {} ({})",
        region.nom, departement.nom, departement.code
    ))
}
