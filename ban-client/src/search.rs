//! Recherche incrémentale pendant la saisie
//!
//! Chaque frappe relance une fenêtre d'attente de 200 ms ; seule la dernière
//! saisie d'une période calme déclenche une requête. Chaque requête émise
//! reçoit un identifiant croissant, et une réponse n'est appliquée que si son
//! identifiant est encore le plus récent : les résultats ne régressent jamais
//! vers une requête plus ancienne, même si le réseau répond dans le désordre.
//! Les requêtes périmées ne sont pas interrompues, seulement ignorées.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Fenêtre d'attente entre deux frappes
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(200);

/// Nombre maximal de résultats affichés
pub const MAX_RESULTS: usize = 5;

/// Élément affichable dans une liste de résultats
pub trait SearchItem: Clone + Send + Sync + 'static {
    /// Identifiant transmis à la navigation
    fn id(&self) -> &str;
    /// Texte affiché et recopié dans le champ à la sélection
    fn label(&self) -> &str;
}

/// Vrai si la saisie peut donner lieu à une requête : non vide et commençant
/// par une lettre à casse ou un chiffre 0-9
pub fn is_searchable(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c.to_lowercase().ne(c.to_uppercase()))
}

/// État de la recherche, publié en bloc à chaque changement
#[derive(Debug, Clone)]
pub struct SearchState<T> {
    pub input_text: String,
    /// Identifiant de la dernière requête émise et non encore réglée
    pub pending_request_id: Option<u64>,
    pub results: Vec<T>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    last_request_id: u64,
}

impl<T> Default for SearchState<T> {
    fn default() -> Self {
        Self {
            input_text: String::new(),
            pending_request_id: None,
            results: Vec::new(),
            is_loading: false,
            last_error: None,
            last_request_id: 0,
        }
    }
}

impl<T> SearchState<T> {
    /// Enregistre l'émission d'une requête et retourne son identifiant
    pub fn begin_request(&mut self) -> u64 {
        self.last_request_id += 1;
        self.pending_request_id = Some(self.last_request_id);
        self.is_loading = true;
        self.last_request_id
    }

    /// Applique le résultat de la requête `id`
    ///
    /// Retourne `false` (état inchangé) si une requête plus récente a été
    /// émise depuis, ou si la recherche a été abandonnée.
    pub fn settle<E: Display>(&mut self, id: u64, outcome: Result<Vec<T>, E>) -> bool {
        if self.pending_request_id != Some(id) {
            return false;
        }

        self.pending_request_id = None;
        self.is_loading = false;
        match outcome {
            Ok(mut results) => {
                results.truncate(MAX_RESULTS);
                self.results = results;
                self.last_error = None;
            }
            Err(e) => {
                self.results.clear();
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    /// Abandonne la recherche en cours ; une réponse attendue sera ignorée
    pub fn reset(&mut self) {
        self.pending_request_id = None;
        self.results.clear();
        self.is_loading = false;
        self.last_error = None;
    }
}

/// Anti-rebond par numéro de génération
///
/// Chaque déclenchement invalide les tickets précédents.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Ouvre une nouvelle fenêtre
    pub fn trigger(&self) -> DebounceTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        DebounceTicket {
            generation,
            current: Arc::clone(&self.generation),
            delay: self.delay,
        }
    }

    /// Invalide la fenêtre en cours sans en ouvrir de nouvelle
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

/// Fenêtre ouverte par [`Debouncer::trigger`]
#[derive(Debug)]
pub struct DebounceTicket {
    generation: u64,
    current: Arc<AtomicU64>,
    delay: Duration,
}

impl DebounceTicket {
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    /// Attend la fin de la fenêtre ; `true` si aucun déclenchement n'a eu lieu
    /// entre-temps
    pub async fn wait(self) -> bool {
        tokio::time::sleep(self.delay).await;
        self.is_current()
    }
}

type Navigate = Box<dyn Fn(&str) + Send + Sync>;

/// Contrôleur de recherche, générique sur la fonction de recherche distante
///
/// `on_input` est synchrone mais lance des tâches : il doit être appelé depuis
/// un runtime Tokio.
pub struct SearchController<T, F> {
    state: Arc<watch::Sender<SearchState<T>>>,
    lookup: Arc<F>,
    debouncer: Debouncer,
    navigate: Navigate,
}

impl<T, F, Fut, E> SearchController<T, F>
where
    T: SearchItem,
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    /// `navigate` reçoit l'identifiant de l'élément sélectionné
    pub fn new(lookup: F, navigate: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self::with_debouncer(lookup, navigate, Debouncer::default())
    }

    pub fn with_debouncer(
        lookup: F,
        navigate: impl Fn(&str) + Send + Sync + 'static,
        debouncer: Debouncer,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            state: Arc::new(state),
            lookup: Arc::new(lookup),
            debouncer,
            navigate: Box::new(navigate),
        }
    }

    /// Nouvelle saisie
    pub fn on_input(&self, text: impl Into<String>) {
        let text = text.into();
        let searchable = is_searchable(&text);

        self.state.send_modify(|s| {
            s.input_text.clone_from(&text);
            if searchable {
                // la requête en vol ne correspond plus à la saisie
                s.pending_request_id = None;
                s.results.clear();
                s.is_loading = true;
                s.last_error = None;
            } else {
                s.reset();
            }
        });

        if !searchable {
            self.debouncer.cancel();
            trace!("Saisie ignorée");
            return;
        }

        let ticket = self.debouncer.trigger();
        let state = Arc::clone(&self.state);
        let lookup = Arc::clone(&self.lookup);

        tokio::spawn(async move {
            if !ticket.wait().await {
                trace!(query = %text, "Fenêtre remplacée");
                return;
            }

            let mut id = 0;
            state.send_modify(|s| id = s.begin_request());
            debug!(id, query = %text, "Recherche lancée");

            let outcome = lookup(text).await;
            if let Err(e) = &outcome {
                warn!(id, error = %e, "Échec de la recherche");
            }

            if !state.send_if_modified(|s| s.settle(id, outcome)) {
                debug!(id, "Réponse périmée ignorée");
            }
        });
    }

    /// Sélection d'un résultat : navigation puis recopie du libellé
    pub fn on_select(&self, item: &T) {
        debug!(id = %item.id(), "Sélection");
        (self.navigate)(item.id());

        self.debouncer.cancel();
        self.state.send_modify(|s| {
            s.input_text = item.label().to_string();
            s.reset();
        });
    }

    /// Copie de l'état courant
    pub fn state(&self) -> SearchState<T> {
        self.state.borrow().clone()
    }

    /// Abonnement aux changements d'état
    pub fn subscribe(&self) -> watch::Receiver<SearchState<T>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(String);

    impl SearchItem for Item {
        fn id(&self) -> &str {
            &self.0
        }

        fn label(&self) -> &str {
            &self.0
        }
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item(format!("item {}", i))).collect()
    }

    #[test]
    fn test_is_searchable() {
        assert!(is_searchable("Paris"));
        assert!(is_searchable("12 rue"));
        assert!(is_searchable("Évry"));
        assert!(!is_searchable(""));
        assert!(!is_searchable(" Paris"));
        assert!(!is_searchable("-Paris"));
        assert!(is_searchable("12"));
        assert!(is_searchable("ÉVRY"));
        assert!(!is_searchable("中国"));
        assert!(!is_searchable("٣ rue"));
        assert!(!is_searchable("ª"));
        assert!(!is_searchable("²"));
    }

    #[test]
    fn test_settle_applies_latest_only() {
        let mut state = SearchState::default();
        let first = state.begin_request();
        let second = state.begin_request();
        assert!(second > first);

        assert!(state.settle(second, Ok::<_, String>(vec![Item("new".into())])));
        assert!(!state.settle(first, Ok::<_, String>(vec![Item("old".into())])));
        assert_eq!(state.results, vec![Item("new".into())]);
        assert!(!state.is_loading);
        assert_eq!(state.pending_request_id, None);
    }

    #[test]
    fn test_settle_truncates() {
        let mut state = SearchState::default();
        let id = state.begin_request();
        state.settle(id, Ok::<_, String>(items(12)));
        assert_eq!(state.results.len(), MAX_RESULTS);
        assert_eq!(state.results[0], Item("item 0".into()));
    }

    #[test]
    fn test_settle_error_clears_results() {
        let mut state = SearchState::default();
        let id = state.begin_request();
        state.settle(id, Ok::<_, String>(items(2)));

        let id = state.begin_request();
        assert!(state.settle(id, Err::<Vec<Item>, _>("boom")));
        assert!(state.results.is_empty());
        assert_eq!(state.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_reset_invalidates_pending() {
        let mut state = SearchState::default();
        let id = state.begin_request();
        state.reset();
        assert!(!state.settle(id, Ok::<_, String>(items(1))));
        assert!(state.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_keeps_last_ticket() {
        let debouncer = Debouncer::default();
        let first = debouncer.trigger();
        let second = debouncer.trigger();
        assert!(!first.wait().await);
        assert!(second.wait().await);

        let third = debouncer.trigger();
        debouncer.cancel();
        assert!(!third.wait().await);
    }

    type Pending = std::pin::Pin<Box<dyn Future<Output = Result<Vec<Item>, String>> + Send>>;

    fn recording_lookup(
        calls: Arc<Mutex<Vec<String>>>,
    ) -> impl Fn(String) -> Pending + Send + Sync + 'static {
        move |q: String| -> Pending {
            calls.lock().unwrap().push(q.clone());
            Box::pin(async move {
                // Plus la requête est courte, plus la réponse est lente
                let delay = 600u64.saturating_sub(100 * q.len() as u64);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(vec![Item(q)])
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_lookup_per_window() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let controller = SearchController::new(recording_lookup(Arc::clone(&calls)), |_| {});

        controller.on_input("P");
        controller.on_input("Pa");
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.on_input("Par");
        assert!(controller.state().is_loading);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*calls.lock().unwrap(), vec!["Par".to_string()]);

        let state = controller.state();
        assert_eq!(state.results, vec![Item("Par".into())]);
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_responses_keep_newest() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let controller = SearchController::new(recording_lookup(Arc::clone(&calls)), |_| {});

        // "a" répond en 500 ms, "abcd" en 200 ms
        controller.on_input("a");
        tokio::time::sleep(Duration::from_millis(250)).await;
        controller.on_input("abcd");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(controller.state().results, vec![Item("abcd".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystroke_drops_in_flight_response() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let controller = SearchController::new(recording_lookup(Arc::clone(&calls)), |_| {});

        // "Par" part à 200 ms et répond à 500 ms, pendant la fenêtre de "Pari"
        controller.on_input("Par");
        tokio::time::sleep(Duration::from_millis(450)).await;
        controller.on_input("Pari");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let state = controller.state();
        assert_eq!(state.input_text, "Pari");
        assert!(state.results.is_empty());
        assert!(state.is_loading);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let state = controller.state();
        assert_eq!(state.results, vec![Item("Pari".into())]);
        assert!(!state.is_loading);
        assert_eq!(*calls.lock().unwrap(), vec!["Par".to_string(), "Pari".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_cancels_window() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let controller = SearchController::new(recording_lookup(Arc::clone(&calls)), |_| {});

        controller.on_input("Paris");
        controller.on_input("");

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(calls.lock().unwrap().is_empty());
        let state = controller.state();
        assert!(state.results.is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_captured_in_state() {
        let controller = SearchController::new(
            |_q: String| async { Err::<Vec<Item>, _>("service indisponible") },
            |_| {},
        );

        controller.on_input("Paris");
        tokio::time::sleep(Duration::from_millis(300)).await;

        let state = controller.state();
        assert_eq!(state.last_error.as_deref(), Some("service indisponible"));
        assert!(state.results.is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_select_navigates_and_copies_label() {
        let navigated = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&navigated);
        let controller = SearchController::new(
            |_q: String| async { Ok::<_, String>(Vec::<Item>::new()) },
            move |id| *sink.lock().unwrap() = Some(id.to_string()),
        );

        controller.on_select(&Item("38185_0010".into()));
        assert_eq!(navigated.lock().unwrap().as_deref(), Some("38185_0010"));
        assert_eq!(controller.state().input_text, "38185_0010");
    }
}
