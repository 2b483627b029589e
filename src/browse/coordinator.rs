//! Two-level browsing state machine: catalog of shows, then one show's
//! episodes.
//!
//! The coordinator owns the caches and the browse state. It is driven by
//! discrete events from a single event loop: user input arrives through the
//! `select_*`/`set_*` methods, and fetch results arrive as [`FetchOutcome`]s
//! on the channel returned by [`NavigationCoordinator::new`], to be handed
//! back through [`NavigationCoordinator::complete`].
//!
//! ```text
//!            select_show(Some)          fetch ok
//!   Idle ─────────────────────► Loading ─────────► Browsing
//!    ▲                            │  ▲                 │
//!    │ select_show(None)          │  │ select_show /   │
//!    │ (from any state)  fetch err│  │ retry (miss)    │
//!    │                            ▼  │                 │
//!    └───────────────────────── Error ◄────────────────┘
//!                                      (cache hit goes straight to Browsing)
//! ```

use super::cache::{CatalogKey, Collection, CollectionCache};
use super::filter::filter;
use super::selection::SelectionState;
use super::source::DataSource;
use crate::error::Result;
use crate::types::{Episode, EpisodeId, Show, ShowId};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Label shown in place of a count while no show is selected.
pub const IDLE_LABEL: &str = "Select a show...";

/// User-facing message for a failed episode fetch.
pub const EPISODES_ERROR_MESSAGE: &str = "Error loading episodes. Please try again later.";

/// User-facing message for a failed catalog fetch.
pub const SHOWS_ERROR_MESSAGE: &str = "Error loading shows. Please try again later.";

/// Where the episode scope is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle {
    /// No show chosen.
    Idle,
    /// Episodes for the show are being fetched.
    Loading(ShowId),
    /// Episodes for the show are available.
    Browsing(ShowId),
    /// The episode fetch for the show failed.
    Error { show_id: ShowId, message: String },
}

impl Lifecycle {
    /// The show this state refers to, if any.
    pub fn show_id(&self) -> Option<ShowId> {
        match self {
            Lifecycle::Idle => None,
            Lifecycle::Loading(id) | Lifecycle::Browsing(id) => Some(*id),
            Lifecycle::Error { show_id, .. } => Some(*show_id),
        }
    }
}

/// Load status of the show catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogStatus {
    NotLoaded,
    Loading,
    Ready,
    Failed(String),
}

/// Result of a fetch, tagged with what was fetched.
#[derive(Debug)]
pub enum FetchOutcome {
    Catalog(Result<Vec<Show>>),
    Episodes {
        show_id: ShowId,
        result: Result<Vec<Episode>>,
    },
}

/// Derived output delivered to subscribers after every state change.
#[derive(Debug)]
pub struct StateChange<'a> {
    pub lifecycle: &'a Lifecycle,
    pub display: Vec<&'a Episode>,
    pub count_label: String,
}

/// Episode-scope state for the active show.
///
/// Reset as a whole whenever the active show changes, so the query and the
/// pin never outlive the list they refer to.
#[derive(Debug, Default)]
pub struct BrowseState {
    pub active_show: Option<ShowId>,
    pub episodes: Collection<Episode>,
    pub selection: SelectionState<EpisodeId>,
}

impl BrowseState {
    fn reset(&mut self, active_show: Option<ShowId>) {
        *self = Self {
            active_show,
            ..Self::default()
        };
    }
}

/// Format an "N of M" count.
pub fn count_label(shown: usize, total: usize) -> String {
    format!("{} of {}", shown, total)
}

type Subscriber = Box<dyn FnMut(&StateChange<'_>)>;

/// Coordinates caching, filtering and selection across the show and episode
/// scopes.
pub struct NavigationCoordinator<S> {
    source: Arc<S>,
    outcomes: mpsc::UnboundedSender<FetchOutcome>,
    catalog_cache: CollectionCache<CatalogKey, Show>,
    catalog: Collection<Show>,
    catalog_status: CatalogStatus,
    show_selection: SelectionState<ShowId>,
    episode_cache: CollectionCache<ShowId, Episode>,
    browse: BrowseState,
    lifecycle: Lifecycle,
    subscribers: Vec<Subscriber>,
}

impl<S: DataSource> NavigationCoordinator<S> {
    /// Create a coordinator reading from `source`.
    ///
    /// Fetch results are delivered on the returned receiver; the owner must
    /// pass each one to [`complete`](Self::complete).
    pub fn new(source: Arc<S>) -> (Self, mpsc::UnboundedReceiver<FetchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            source,
            outcomes: tx,
            catalog_cache: CollectionCache::new(),
            catalog: Arc::default(),
            catalog_status: CatalogStatus::NotLoaded,
            show_selection: SelectionState::new(),
            episode_cache: CollectionCache::new(),
            browse: BrowseState::default(),
            lifecycle: Lifecycle::Idle,
            subscribers: Vec::new(),
        };
        (coordinator, rx)
    }

    /// Register a callback fired after every state-affecting event.
    pub fn subscribe(&mut self, callback: impl FnMut(&StateChange<'_>) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    // ---- Catalog scope ----

    /// Start loading the catalog unless it is cached or already loading.
    ///
    /// Calling this after a failure retries the fetch.
    pub fn load_catalog(&mut self) {
        if self.catalog_cache.contains(&CatalogKey::All) {
            self.catalog_status = CatalogStatus::Ready;
            return;
        }
        if !self.catalog_cache.begin_fetch(CatalogKey::All) {
            debug!("Catalog fetch already in flight");
            return;
        }

        self.catalog_status = CatalogStatus::Loading;
        debug!("Fetching catalog");

        let source = Arc::clone(&self.source);
        let tx = self.outcomes.clone();
        tokio::spawn(async move {
            let result = source.fetch_catalog().await;
            // A closed channel means the event loop has exited.
            let _ = tx.send(FetchOutcome::Catalog(result));
        });
    }

    pub fn catalog_status(&self) -> &CatalogStatus {
        &self.catalog_status
    }

    /// Every show in the catalog, sorted by name.
    pub fn catalog(&self) -> &[Show] {
        &self.catalog
    }

    /// Filter the show selector's options. Unpins the selector but keeps
    /// the active show's episodes on screen.
    pub fn set_show_query(&mut self, text: &str) {
        self.show_selection.set_query(text);
        self.notify();
    }

    pub fn show_query(&self) -> &str {
        self.show_selection.query()
    }

    /// Shows matching the show query, in catalog order.
    pub fn catalog_view(&self) -> Vec<&Show> {
        filter(&self.catalog, self.show_selection.query())
    }

    /// "N of M" for the show selector.
    pub fn catalog_count_label(&self) -> String {
        count_label(self.catalog_view().len(), self.catalog.len())
    }

    /// The show pinned in the show selector, if it is in the catalog.
    pub fn selected_show(&self) -> Option<&Show> {
        self.show_selection.resolve(&self.catalog)
    }

    /// The show whose episodes are active, looked up in the catalog.
    pub fn active_show(&self) -> Option<&Show> {
        let id = self.browse.active_show?;
        self.catalog.iter().find(|s| s.id == id)
    }

    // ---- Episode scope ----

    /// Choose a show, or `None` for the "no show" option.
    ///
    /// Changing the show resets the episode query and pin together. A cached
    /// episode list is shown immediately; otherwise a fetch is started.
    pub fn select_show(&mut self, show_id: Option<ShowId>) {
        match show_id {
            None => {
                self.show_selection.clear();
                self.browse.reset(None);
                self.lifecycle = Lifecycle::Idle;
            }
            Some(id) => {
                self.show_selection.select(id);
                let unchanged = matches!(
                    self.lifecycle,
                    Lifecycle::Loading(active) | Lifecycle::Browsing(active) if active == id
                );
                if unchanged {
                    debug!("Show {} is already active", id);
                } else {
                    self.enter_show(id);
                }
            }
        }
        self.notify();
    }

    /// Fetch again whatever failed: the catalog, the active show's episodes,
    /// or both.
    pub fn retry(&mut self) {
        if matches!(self.catalog_status, CatalogStatus::Failed(_)) {
            info!("Retrying catalog fetch");
            self.load_catalog();
        }
        if let Lifecycle::Error { show_id, .. } = self.lifecycle {
            info!("Retrying episode fetch for show {}", show_id);
            self.enter_show(show_id);
            self.notify();
        }
    }

    /// Replace the episode search text. Clears any pinned episode.
    pub fn set_episode_query(&mut self, text: &str) {
        if !self.is_browsing() {
            debug!("Ignoring episode query while {:?}", self.lifecycle);
            return;
        }
        self.browse.selection.set_query(text);
        self.notify();
    }

    /// Pin one episode, or `None` for the "no episode" option.
    ///
    /// Pinning clears the search text. An id that is not in the current list
    /// is treated as `None`.
    pub fn select_episode(&mut self, episode_id: Option<EpisodeId>) {
        if !self.is_browsing() {
            debug!("Ignoring episode selection while {:?}", self.lifecycle);
            return;
        }
        match episode_id {
            Some(id) if self.browse.episodes.iter().any(|e| e.id == id) => {
                self.browse.selection.select(id);
            }
            Some(id) => {
                debug!("Episode {} is not in the current list, clearing selection", id);
                self.browse.selection.clear();
            }
            None => self.browse.selection.clear(),
        }
        self.notify();
    }

    /// Clear both the episode query and the pin.
    pub fn show_all(&mut self) {
        if !self.is_browsing() {
            return;
        }
        self.browse.selection.reset();
        self.notify();
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn browse_state(&self) -> &BrowseState {
        &self.browse
    }

    pub fn episode_query(&self) -> &str {
        self.browse.selection.query()
    }

    pub fn pinned_episode(&self) -> Option<&Episode> {
        self.browse.selection.resolve(&self.browse.episodes)
    }

    /// The full episode list of the active show.
    pub fn episodes(&self) -> &[Episode] {
        &self.browse.episodes
    }

    /// Episodes to display: the pinned episode alone, or the filtered list.
    pub fn display_episodes(&self) -> Vec<&Episode> {
        self.browse.selection.view(&self.browse.episodes)
    }

    /// The current derived output.
    pub fn state(&self) -> StateChange<'_> {
        Self::snapshot(&self.lifecycle, &self.browse)
    }

    /// Whether any fetch is still outstanding.
    pub fn has_pending(&self) -> bool {
        self.catalog_cache.any_fetching() || self.episode_cache.any_fetching()
    }

    /// Whether the episode list for `show_id` is cached.
    pub fn is_cached(&self, show_id: ShowId) -> bool {
        self.episode_cache.contains(&show_id)
    }

    /// The cached episode list for `show_id`.
    pub fn cached_episodes(&self, show_id: ShowId) -> Option<Collection<Episode>> {
        self.episode_cache.get(&show_id)
    }

    // ---- Fetch completion ----

    /// Apply a finished fetch.
    ///
    /// Successful results are cached even when the user has moved on; they
    /// only replace the displayed list if they belong to the active show.
    /// Failures are never cached.
    pub fn complete(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Catalog(result) => self.complete_catalog(result),
            FetchOutcome::Episodes { show_id, result } => self.complete_episodes(show_id, result),
        }
    }

    fn complete_catalog(&mut self, result: Result<Vec<Show>>) {
        self.catalog_cache.finish_fetch(&CatalogKey::All);
        match result {
            Ok(mut shows) => {
                shows.sort_by_cached_key(|s| s.name.to_lowercase());
                info!("Loaded {} shows", shows.len());
                self.catalog = self.catalog_cache.put(CatalogKey::All, shows);
                self.catalog_status = CatalogStatus::Ready;
            }
            Err(e) => {
                warn!("Catalog fetch failed: {}", e);
                self.catalog_status = CatalogStatus::Failed(SHOWS_ERROR_MESSAGE.to_string());
            }
        }
        self.notify();
    }

    fn complete_episodes(&mut self, show_id: ShowId, result: Result<Vec<Episode>>) {
        self.episode_cache.finish_fetch(&show_id);
        let current = self.lifecycle == Lifecycle::Loading(show_id);

        match result {
            Ok(episodes) => {
                debug!("Fetched {} episodes for show {}", episodes.len(), show_id);
                let collection = self.episode_cache.put(show_id, episodes);
                if !current {
                    debug!("Discarding stale episodes for show {}", show_id);
                    return;
                }
                self.browse.episodes = collection;
                self.lifecycle = Lifecycle::Browsing(show_id);
            }
            Err(e) => {
                warn!("Episode fetch for show {} failed: {}", show_id, e);
                if !current {
                    return;
                }
                self.lifecycle = Lifecycle::Error {
                    show_id,
                    message: EPISODES_ERROR_MESSAGE.to_string(),
                };
            }
        }
        self.notify();
    }

    // ---- Internals ----

    fn is_browsing(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Browsing(_))
    }

    fn enter_show(&mut self, id: ShowId) {
        self.browse.reset(Some(id));
        match self.episode_cache.get(&id) {
            Some(collection) => {
                debug!("Episodes for show {} served from cache", id);
                self.browse.episodes = collection;
                self.lifecycle = Lifecycle::Browsing(id);
            }
            None => {
                self.lifecycle = Lifecycle::Loading(id);
                self.spawn_episodes_fetch(id);
            }
        }
    }

    fn spawn_episodes_fetch(&mut self, show_id: ShowId) {
        if !self.episode_cache.begin_fetch(show_id) {
            debug!("Episode fetch for show {} already in flight", show_id);
            return;
        }
        debug!("Fetching episodes for show {}", show_id);

        let source = Arc::clone(&self.source);
        let tx = self.outcomes.clone();
        tokio::spawn(async move {
            let result = source.fetch_episodes(show_id).await;
            let _ = tx.send(FetchOutcome::Episodes { show_id, result });
        });
    }

    fn snapshot<'a>(lifecycle: &'a Lifecycle, browse: &'a BrowseState) -> StateChange<'a> {
        let display = browse.selection.view(&browse.episodes);
        let count_label = match lifecycle {
            Lifecycle::Idle => IDLE_LABEL.to_string(),
            _ => count_label(display.len(), browse.episodes.len()),
        };
        StateChange {
            lifecycle,
            display,
            count_label,
        }
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let change = Self::snapshot(&self.lifecycle, &self.browse);
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    /// In-memory source with scripted failures and completion gates.
    #[derive(Default)]
    struct ScriptedSource {
        catalog: Vec<Show>,
        episodes: HashMap<ShowId, Vec<Episode>>,
        fail_once: Mutex<HashSet<ShowId>>,
        malformed: Mutex<HashSet<ShowId>>,
        catalog_failures: AtomicUsize,
        gates: Mutex<HashMap<ShowId, oneshot::Receiver<()>>>,
        episode_calls: AtomicUsize,
        catalog_calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn gate(&self, show_id: ShowId) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(show_id, rx);
            tx
        }
    }

    impl DataSource for ScriptedSource {
        async fn fetch_catalog(&self) -> Result<Vec<Show>> {
            self.catalog_calls.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .catalog_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(AppError::Transport("connection refused".to_string()));
            }
            Ok(self.catalog.clone())
        }

        async fn fetch_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>> {
            self.episode_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().remove(&show_id);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.fail_once.lock().unwrap().remove(&show_id) {
                return Err(AppError::Transport("HTTP 500".to_string()));
            }
            if self.malformed.lock().unwrap().contains(&show_id) {
                return crate::api::parse_episodes(show_id, "<html>502 Bad Gateway</html>");
            }
            self.episodes
                .get(&show_id)
                .cloned()
                .ok_or_else(|| AppError::Transport("HTTP 404 Not Found".to_string()))
        }
    }

    fn season(show_id: ShowId, count: u32) -> Vec<Episode> {
        (1..=count)
            .map(|n| {
                let name = if n == 1 { "Pilot".to_string() } else { format!("Chapter {}", n) };
                Episode::new(show_id * 100 + n as u64, show_id, 1, n, &name)
            })
            .collect()
    }

    fn source() -> ScriptedSource {
        let mut episodes = HashMap::new();
        episodes.insert(1, season(1, 12));
        episodes.insert(2, season(2, 3));
        episodes.insert(44, season(44, 2));
        ScriptedSource {
            catalog: vec![
                Show::new(2, "the office"),
                Show::new(1, "Breaking Bad"),
                Show::new(44, "Arrested Development"),
            ],
            episodes,
            ..Default::default()
        }
    }

    async fn settle(
        coordinator: &mut NavigationCoordinator<ScriptedSource>,
        rx: &mut mpsc::UnboundedReceiver<FetchOutcome>,
    ) {
        let outcome = rx.recv().await.expect("outcome channel closed");
        coordinator.complete(outcome);
    }

    fn ids(items: &[&Episode]) -> Vec<EpisodeId> {
        items.iter().map(|e| e.id).collect()
    }

    #[tokio::test]
    async fn test_catalog_sorted_and_filtered() {
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::new(source()));
        nav.load_catalog();
        assert_eq!(nav.catalog_status(), &CatalogStatus::Loading);
        settle(&mut nav, &mut rx).await;

        let names: Vec<_> = nav.catalog().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Arrested Development", "Breaking Bad", "the office"]);

        nav.set_show_query("break");
        let view: Vec<_> = nav.catalog_view().iter().map(|s| s.id).collect();
        assert_eq!(view, vec![1]);
        assert_eq!(nav.catalog_count_label(), "1 of 3");
    }

    #[tokio::test]
    async fn test_catalog_loaded_once() {
        let src = Arc::new(source());
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));
        nav.load_catalog();
        nav.load_catalog();
        settle(&mut nav, &mut rx).await;
        nav.load_catalog();
        assert_eq!(src.catalog_calls.load(Ordering::SeqCst), 1);
        assert_eq!(nav.catalog_status(), &CatalogStatus::Ready);
    }

    #[tokio::test]
    async fn test_idle_label() {
        let (nav, _rx) = NavigationCoordinator::new(Arc::new(source()));
        let state = nav.state();
        assert_eq!(state.lifecycle, &Lifecycle::Idle);
        assert!(state.display.is_empty());
        assert_eq!(state.count_label, IDLE_LABEL);
    }

    #[tokio::test]
    async fn test_query_then_pin() {
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::new(source()));
        nav.select_show(Some(1));
        assert_eq!(nav.lifecycle(), &Lifecycle::Loading(1));
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.lifecycle(), &Lifecycle::Browsing(1));
        assert_eq!(nav.state().count_label, "12 of 12");

        nav.set_episode_query("pilot");
        assert_eq!(ids(&nav.display_episodes()), vec![101]);
        assert_eq!(nav.state().count_label, "1 of 12");

        nav.select_episode(Some(105));
        assert_eq!(nav.episode_query(), "");
        assert_eq!(ids(&nav.display_episodes()), vec![105]);
        assert_eq!(nav.state().count_label, "1 of 12");

        nav.set_episode_query("");
        assert!(nav.pinned_episode().is_none());
        assert_eq!(nav.display_episodes().len(), 12);
    }

    #[tokio::test]
    async fn test_unknown_episode_treated_as_none() {
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::new(source()));
        nav.select_show(Some(2));
        settle(&mut nav, &mut rx).await;

        nav.set_episode_query("chapter");
        nav.select_episode(Some(9999));
        assert!(nav.pinned_episode().is_none());
        assert_eq!(nav.episode_query(), "chapter");
        assert_eq!(ids(&nav.display_episodes()), vec![202, 203]);
    }

    #[tokio::test]
    async fn test_show_all_clears_query_and_pin() {
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::new(source()));
        nav.select_show(Some(2));
        settle(&mut nav, &mut rx).await;

        nav.select_episode(Some(201));
        nav.show_all();
        assert!(nav.pinned_episode().is_none());
        assert_eq!(nav.episode_query(), "");
        assert_eq!(nav.display_episodes().len(), 3);
    }

    #[tokio::test]
    async fn test_changing_show_resets_query_and_pin() {
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::new(source()));
        nav.select_show(Some(1));
        settle(&mut nav, &mut rx).await;
        nav.set_episode_query("chapter");

        nav.select_show(Some(2));
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.episode_query(), "");
        assert!(nav.pinned_episode().is_none());
        assert_eq!(nav.state().count_label, "3 of 3");

        nav.select_episode(Some(202));
        nav.select_show(Some(1));
        // Cached: no Loading step, and the pin from show 2 is gone.
        assert_eq!(nav.lifecycle(), &Lifecycle::Browsing(1));
        assert!(nav.browse_state().selection.pinned().is_none());
        assert_eq!(nav.display_episodes().len(), 12);
    }

    #[tokio::test]
    async fn test_repeat_selection_fetches_once() {
        let src = Arc::new(source());
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));

        nav.select_show(Some(1));
        nav.select_show(Some(1));
        settle(&mut nav, &mut rx).await;
        let first = nav.cached_episodes(1).unwrap();

        nav.select_show(None);
        nav.select_show(Some(1));
        let second = nav.cached_episodes(1).unwrap();

        assert_eq!(src.episode_calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!nav.has_pending());
    }

    #[tokio::test]
    async fn test_in_flight_fetch_is_shared() {
        let src = Arc::new(source());
        let release = src.gate(1);
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));

        nav.select_show(Some(1));
        nav.select_show(Some(2));
        nav.select_show(Some(1));
        // Show 2 resolves first and is stale.
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.lifecycle(), &Lifecycle::Loading(1));

        release.send(()).unwrap();
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.lifecycle(), &Lifecycle::Browsing(1));
        assert_eq!(src.episode_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_then_retry() {
        let src = Arc::new(source());
        src.fail_once.lock().unwrap().insert(44);
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));

        nav.select_show(Some(44));
        settle(&mut nav, &mut rx).await;
        assert_eq!(
            nav.lifecycle(),
            &Lifecycle::Error {
                show_id: 44,
                message: EPISODES_ERROR_MESSAGE.to_string()
            }
        );
        assert!(!nav.is_cached(44));
        assert_eq!(nav.state().count_label, "0 of 0");

        // Input is ignored outside Browsing.
        nav.set_episode_query("pilot");
        assert_eq!(nav.episode_query(), "");

        nav.select_show(Some(44));
        assert_eq!(nav.lifecycle(), &Lifecycle::Loading(44));
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.lifecycle(), &Lifecycle::Browsing(44));
        assert_eq!(src.episode_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_action() {
        let src = Arc::new(source());
        src.fail_once.lock().unwrap().insert(2);
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));

        nav.select_show(Some(2));
        settle(&mut nav, &mut rx).await;
        nav.retry();
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.lifecycle(), &Lifecycle::Browsing(2));
    }

    #[tokio::test]
    async fn test_catalog_failure_then_reload() {
        let src = Arc::new(source());
        src.catalog_failures.store(1, Ordering::SeqCst);
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));

        nav.load_catalog();
        settle(&mut nav, &mut rx).await;
        assert_eq!(
            nav.catalog_status(),
            &CatalogStatus::Failed(SHOWS_ERROR_MESSAGE.to_string())
        );
        assert!(nav.catalog().is_empty());
        assert!(!nav.has_pending());

        nav.load_catalog();
        assert_eq!(nav.catalog_status(), &CatalogStatus::Loading);
        settle(&mut nav, &mut rx).await;
        assert_eq!(src.catalog_calls.load(Ordering::SeqCst), 2);
        assert_eq!(nav.catalog_status(), &CatalogStatus::Ready);
        assert_eq!(nav.catalog().len(), 3);
    }

    #[tokio::test]
    async fn test_retry_reloads_failed_catalog() {
        let src = Arc::new(source());
        src.catalog_failures.store(1, Ordering::SeqCst);
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));

        nav.load_catalog();
        settle(&mut nav, &mut rx).await;
        nav.retry();
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.catalog_status(), &CatalogStatus::Ready);
        assert_eq!(nav.lifecycle(), &Lifecycle::Idle);

        // Nothing failed, so nothing is fetched.
        nav.retry();
        assert!(!nav.has_pending());
        assert_eq!(src.catalog_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_shows_generic_message() {
        let src = Arc::new(source());
        src.malformed.lock().unwrap().insert(44);
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));

        nav.select_show(Some(44));
        settle(&mut nav, &mut rx).await;
        assert_eq!(
            nav.lifecycle(),
            &Lifecycle::Error {
                show_id: 44,
                message: EPISODES_ERROR_MESSAGE.to_string()
            }
        );
        assert!(!nav.is_cached(44));
    }

    #[tokio::test]
    async fn test_stale_response_does_not_replace_display() {
        let src = Arc::new(source());
        let release_a = src.gate(1);
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));

        nav.select_show(Some(1));
        nav.select_show(Some(2));
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.lifecycle(), &Lifecycle::Browsing(2));

        release_a.send(()).unwrap();
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.lifecycle(), &Lifecycle::Browsing(2));
        assert_eq!(ids(&nav.display_episodes()), vec![201, 202, 203]);
        // The stale result still populated the cache.
        assert!(nav.is_cached(1));
    }

    #[tokio::test]
    async fn test_stale_failure_is_ignored() {
        let src = Arc::new(source());
        src.fail_once.lock().unwrap().insert(1);
        let release_a = src.gate(1);
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::clone(&src));

        nav.select_show(Some(1));
        nav.select_show(None);
        release_a.send(()).unwrap();
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.lifecycle(), &Lifecycle::Idle);
        assert!(!nav.is_cached(1));
    }

    #[tokio::test]
    async fn test_show_query_keeps_episodes() {
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::new(source()));
        nav.load_catalog();
        settle(&mut nav, &mut rx).await;
        nav.select_show(Some(2));
        settle(&mut nav, &mut rx).await;
        assert_eq!(nav.selected_show().map(|s| s.id), Some(2));

        nav.set_show_query("arrested");
        assert!(nav.selected_show().is_none());
        assert_eq!(nav.active_show().map(|s| s.id), Some(2));
        assert_eq!(nav.lifecycle(), &Lifecycle::Browsing(2));

        nav.select_show(Some(44));
        assert_eq!(nav.show_query(), "");
    }

    #[tokio::test]
    async fn test_subscribers_see_every_transition() {
        let (mut nav, mut rx) = NavigationCoordinator::new(Arc::new(source()));
        let seen: Rc<RefCell<Vec<(Lifecycle, String)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        nav.subscribe(move |change| {
            sink.borrow_mut()
                .push((change.lifecycle.clone(), change.count_label.clone()));
        });

        nav.select_show(Some(2));
        settle(&mut nav, &mut rx).await;
        nav.set_episode_query("chapter 3");
        nav.select_show(None);

        let seen = seen.borrow();
        assert_eq!(
            *seen,
            vec![
                (Lifecycle::Loading(2), "0 of 0".to_string()),
                (Lifecycle::Browsing(2), "3 of 3".to_string()),
                (Lifecycle::Browsing(2), "1 of 3".to_string()),
                (Lifecycle::Idle, IDLE_LABEL.to_string()),
            ]
        );
    }
}
