//! Page d'une adresse : résolution, vue et viewport

use ban_model::{AddressEntity, ViewModel, ViewportCommand, ViewportSync};
use tracing::warn;

use crate::resolver::AddressResolver;

/// État de la page après navigation
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    /// Aucune adresse (pas encore de navigation, ou identifiant inconnu)
    Empty,
    Loaded(AddressEntity),
    /// Message de l'erreur de résolution
    Failed(String),
}

/// Orchestration d'une page d'adresse
///
/// Un identifiant inconnu donne la page par défaut, pas une erreur.
#[derive(Debug)]
pub struct AddressPage {
    resolver: AddressResolver,
    state: PageState,
    viewport: ViewportSync,
}

impl AddressPage {
    pub fn new(resolver: AddressResolver) -> Self {
        Self {
            resolver,
            state: PageState::Empty,
            viewport: ViewportSync::new(),
        }
    }

    /// Résout `id` et met à jour l'état et le viewport
    pub async fn navigate(&mut self, id: &str) -> &PageState {
        self.state = match self.resolver.resolve_optional(id).await {
            Ok(Some(entity)) => PageState::Loaded(entity),
            Ok(None) => PageState::Empty,
            Err(e) => {
                warn!(id = %id, error = %e, "Échec de la résolution");
                PageState::Failed(e.to_string())
            }
        };
        let entity = match &self.state {
            PageState::Loaded(entity) => Some(entity),
            PageState::Empty | PageState::Failed(_) => None,
        };
        self.viewport.track(entity);
        &self.state
    }

    /// Comme [`navigate`](Self::navigate), avec une ancre à faire défiler
    /// avant tout cadrage
    pub async fn navigate_to_anchor(&mut self, id: &str, anchor: &str) -> &PageState {
        self.viewport.set_anchor(anchor);
        self.navigate(id).await
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn entity(&self) -> Option<&AddressEntity> {
        match &self.state {
            PageState::Loaded(entity) => Some(entity),
            PageState::Empty | PageState::Failed(_) => None,
        }
    }

    pub fn view_model(&self) -> ViewModel {
        ViewModel::from_optional(self.entity())
    }

    /// Prochaine commande de cadrage pour la carte
    pub fn viewport_command(&mut self) -> ViewportCommand {
        self.viewport.next_command()
    }

    pub fn viewport(&self) -> &ViewportSync {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportSync {
        &mut self.viewport
    }
}
