// Debounced VIN search - query-as-you-type against the backend or the local catalog
use crate::application::notifications::Notifier;
use crate::application::vehicle_backend::{SearchHit, VehicleBackend};
use crate::domain::vehicle::{StatusFilter, VehicleCatalog};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Remote,
    Local,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub mode: SearchMode,
    pub debounce: Duration,
    pub min_query_len: usize,
    pub page_size: usize,
    pub blur_grace: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            mode: SearchMode::Remote,
            debounce: Duration::from_millis(300),
            min_query_len: 3,
            page_size: 10,
            blur_grace: Duration::from_millis(150),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub loading: bool,
    /// Whether the result list is showing
    pub open: bool,
    pub status_filter: StatusFilter,
}

#[derive(Default)]
struct Pending {
    debounce: Option<JoinHandle<()>>,
    request: Option<JoinHandle<()>>,
    blur: Option<JoinHandle<()>>,
}

impl Pending {
    fn cancel_search(&mut self) {
        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }
        if let Some(request) = self.request.take() {
            request.abort();
        }
    }

    fn cancel_blur(&mut self) {
        if let Some(timer) = self.blur.take() {
            timer.abort();
        }
    }
}

struct Inner {
    backend: Arc<dyn VehicleBackend>,
    catalog: Arc<VehicleCatalog>,
    settings: SearchSettings,
    notifier: Notifier,
    state: watch::Sender<SearchState>,
    selection: watch::Sender<Option<String>>,
    generation: AtomicU64,
    pending: Mutex<Pending>,
}

impl Inner {
    /// Invalidate every request issued so far and return the new generation
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn filter_locally(&self, query: &str, status: StatusFilter) -> Vec<SearchHit> {
        self.catalog
            .filter(query, status, self.settings.page_size)
            .into_iter()
            .map(|v| SearchHit {
                vin: v.vin,
                label: Some(v.label),
            })
            .collect()
    }

    /// Runs once the debounce delay has elapsed without further input
    async fn execute(self: Arc<Self>, query: String) {
        match self.settings.mode {
            SearchMode::Local => {
                self.state.send_modify(|s| {
                    s.results = self.filter_locally(&query, s.status_filter);
                });
            }
            SearchMode::Remote => {
                let mut pending = self.pending.lock().await;
                if let Some(previous) = pending.request.take() {
                    previous.abort();
                }
                let generation = self.next_generation();
                let inner = Arc::clone(&self);
                pending.request = Some(tokio::spawn(async move {
                    inner.remote(query, generation).await;
                }));
            }
        }
    }

    async fn remote(&self, query: String, generation: u64) {
        self.state.send_modify(|s| s.loading = true);
        tracing::debug!("searching vehicles for {:?}", query);

        let result = self.backend.search_vehicles(&query).await;
        if !self.is_current(generation) {
            return;
        }

        match result {
            Ok(hits) => self.state.send_modify(|s| {
                s.results = hits;
                s.loading = false;
            }),
            Err(e) => {
                self.state.send_modify(|s| s.loading = false);
                tracing::warn!("VIN search for {:?} failed: {}", query, e);
                self.notifier.error("Search failed", e.to_string()).await;
            }
        }
    }
}

/// Interactive VIN lookup.
///
/// Keystrokes restart a debounce timer; when it fires the search runs either
/// against the backend (cancelling whatever request is still out) or against
/// the catalog. Selecting a hit publishes its VIN to subscribers.
#[derive(Clone)]
pub struct VinSearch {
    inner: Arc<Inner>,
}

impl VinSearch {
    pub fn new(
        backend: Arc<dyn VehicleBackend>,
        catalog: Arc<VehicleCatalog>,
        settings: SearchSettings,
        notifier: Notifier,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        let (selection, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                backend,
                catalog,
                settings,
                notifier,
                state,
                selection,
                generation: AtomicU64::new(0),
                pending: Mutex::new(Pending::default()),
            }),
        }
    }

    /// A keystroke: `text` is the whole input value after the edit
    pub async fn input(&self, text: &str) {
        let inner = &self.inner;
        let mut pending = inner.pending.lock().await;
        if let Some(timer) = pending.debounce.take() {
            timer.abort();
        }

        let query = text.to_string();
        inner.state.send_modify(|s| {
            s.query = query.clone();
            s.open = true;
        });

        let trimmed = query.trim();
        let too_short = match inner.settings.mode {
            SearchMode::Remote => trimmed.chars().count() < inner.settings.min_query_len,
            SearchMode::Local => trimmed.is_empty(),
        };
        if too_short {
            if let Some(request) = pending.request.take() {
                request.abort();
            }
            inner.next_generation();
            inner.state.send_modify(|s| {
                s.results.clear();
                s.loading = false;
            });
            return;
        }

        let delay = inner.settings.debounce;
        let debounced = Arc::clone(inner);
        pending.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debounced.execute(query).await;
        }));
    }

    /// Pick a result: publishes the VIN and closes the list without searching again
    pub async fn select(&self, vin: &str) {
        let inner = &self.inner;
        let mut pending = inner.pending.lock().await;
        pending.cancel_search();
        pending.cancel_blur();
        inner.next_generation();

        inner.state.send_modify(|s| {
            s.query = vin.to_string();
            s.results.clear();
            s.loading = false;
            s.open = false;
        });
        inner.selection.send_replace(Some(vin.to_string()));
        tracing::info!("selected vehicle {}", vin);
    }

    pub async fn focus(&self) {
        let mut pending = self.inner.pending.lock().await;
        pending.cancel_blur();
        self.inner.state.send_modify(|s| s.open = true);
    }

    /// Close the list after the grace delay so a click on a result still lands
    pub async fn blur(&self) {
        let inner = &self.inner;
        let mut pending = inner.pending.lock().await;
        pending.cancel_blur();

        let grace = inner.settings.blur_grace;
        let state = inner.state.clone();
        pending.blur = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            state.send_modify(|s| s.open = false);
        }));
    }

    pub async fn set_status_filter(&self, filter: StatusFilter) {
        let inner = &self.inner;
        let _pending = inner.pending.lock().await;
        inner.state.send_modify(|s| {
            s.status_filter = filter;
            if inner.settings.mode == SearchMode::Local && !s.query.trim().is_empty() {
                s.results = inner.filter_locally(&s.query, filter);
            }
        });
    }

    /// Catalog listing for a status filter, independent of the typed query
    pub fn browse(&self, filter: StatusFilter) -> Vec<SearchHit> {
        self.inner.filter_locally("", filter)
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<Option<String>> {
        self.inner.selection.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::FakeBackend;
    use tokio::time::sleep;

    fn search_with(backend: Arc<FakeBackend>, mode: SearchMode) -> (VinSearch, Notifier) {
        let notifier = Notifier::new();
        let settings = SearchSettings {
            mode,
            ..SearchSettings::default()
        };
        let search = VinSearch::new(backend, Arc::new(VehicleCatalog::default()), settings, notifier.clone());
        (search, notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_run_one_search_with_final_query() {
        let backend = Arc::new(FakeBackend::new());
        let (search, _) = search_with(backend.clone(), SearchMode::Remote);

        search.input("1FA").await;
        sleep(Duration::from_millis(100)).await;
        search.input("1FAD").await;
        sleep(Duration::from_millis(100)).await;
        search.input("1FADP").await;
        sleep(Duration::from_millis(400)).await;

        assert_eq!(backend.calls("search"), vec!["1FADP".to_string()]);
        let state = search.state();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].vin, "1FADP3F22EL123456");
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::new());
        let (search, _) = search_with(backend.clone(), SearchMode::Remote);

        search.input("5Y").await;
        sleep(Duration::from_millis(500)).await;
        search.input("  5Y ").await;
        sleep(Duration::from_millis(500)).await;

        assert_eq!(backend.count("search"), 0);
        assert!(search.state().results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_search_cancels_request_in_flight() {
        let backend = Arc::new(FakeBackend::new());
        backend.delay("search", "ford", Duration::from_millis(500));
        let (search, _) = search_with(backend.clone(), SearchMode::Remote);

        search.input("ford").await;
        sleep(Duration::from_millis(350)).await;
        assert!(search.state().loading);

        search.input("honda").await;
        sleep(Duration::from_millis(1000)).await;

        assert_eq!(backend.calls("search"), vec!["ford".to_string(), "honda".to_string()]);
        let state = search.state();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].vin, "1HGCM82633A004352");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shortening_query_drops_request_in_flight() {
        let backend = Arc::new(FakeBackend::new());
        backend.delay("search", "ford", Duration::from_millis(500));
        let (search, _) = search_with(backend.clone(), SearchMode::Remote);

        search.input("ford").await;
        sleep(Duration::from_millis(350)).await;
        search.input("fo").await;
        sleep(Duration::from_millis(1000)).await;

        let state = search.state();
        assert!(state.results.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_publishes_vin_and_clears_results() {
        let backend = Arc::new(FakeBackend::new());
        let (search, _) = search_with(backend.clone(), SearchMode::Remote);
        let selection = search.subscribe_selection();

        search.input("5YJ3").await;
        sleep(Duration::from_millis(400)).await;
        assert_eq!(search.state().results.len(), 1);

        search.select("5YJ3E1EA7KF317000").await;
        sleep(Duration::from_millis(1000)).await;

        let state = search.state();
        assert_eq!(state.query, "5YJ3E1EA7KF317000");
        assert!(state.results.is_empty());
        assert!(!state.open);
        assert_eq!(selection.borrow().as_deref(), Some("5YJ3E1EA7KF317000"));
        assert_eq!(backend.count("search"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_cancels_pending_debounce() {
        let backend = Arc::new(FakeBackend::new());
        let (search, _) = search_with(backend.clone(), SearchMode::Remote);

        search.input("5YJ3E").await;
        sleep(Duration::from_millis(100)).await;
        search.select("5YJ3E1EA7KF317000").await;
        sleep(Duration::from_millis(1000)).await;

        assert_eq!(backend.count("search"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_failure_notifies_and_keeps_results() {
        let backend = Arc::new(FakeBackend::new());
        let (search, notifier) = search_with(backend.clone(), SearchMode::Remote);

        search.input("toyota").await;
        sleep(Duration::from_millis(400)).await;
        assert_eq!(search.state().results.len(), 1);

        backend.fail("search");
        search.input("toyot").await;
        sleep(Duration::from_millis(400)).await;

        let notices = notifier.active().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Search failed");
        assert_eq!(search.state().results.len(), 1);

        backend.recover("search");
        search.input("honda").await;
        sleep(Duration::from_millis(400)).await;
        assert_eq!(search.state().results[0].vin, "1HGCM82633A004352");
        assert_eq!(notifier.active().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_mode_filters_catalog_without_backend() {
        let backend = Arc::new(FakeBackend::new());
        let (search, _) = search_with(backend.clone(), SearchMode::Local);

        search.input("1").await;
        sleep(Duration::from_millis(400)).await;
        assert_eq!(search.state().results.len(), 10);

        search.set_status_filter(StatusFilter::Critical).await;
        let state = search.state();
        assert_eq!(state.results.len(), 2);
        assert!(state.results.iter().all(|h| h.label.is_some()));
        assert_eq!(backend.count("search"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blur_closes_after_grace_and_focus_cancels() {
        let backend = Arc::new(FakeBackend::new());
        let (search, _) = search_with(backend, SearchMode::Local);

        search.input("ford").await;
        sleep(Duration::from_millis(400)).await;
        assert!(search.state().open);

        search.blur().await;
        sleep(Duration::from_millis(100)).await;
        assert!(search.state().open);
        sleep(Duration::from_millis(100)).await;
        assert!(!search.state().open);

        search.focus().await;
        search.blur().await;
        sleep(Duration::from_millis(50)).await;
        search.focus().await;
        sleep(Duration::from_millis(500)).await;
        assert!(search.state().open);
    }

    #[test]
    fn test_browse_by_status() {
        let backend = Arc::new(FakeBackend::new());
        let (search, _) = search_with(backend, SearchMode::Remote);
        assert_eq!(search.browse(StatusFilter::Warning).len(), 3);
        assert_eq!(search.browse(StatusFilter::All).len(), 10);
    }
}
