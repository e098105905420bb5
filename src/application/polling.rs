// Polling data source - fetch on activation, refetch on an interval, fall back on failure
use crate::application::notifications::Notifier;
use crate::application::vehicle_backend::BackendResult;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

pub type FetchFn<K, T> = Arc<dyn Fn(K) -> BoxFuture<'static, BackendResult<T>> + Send + Sync>;
pub type FallbackFn<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Wrap an async closure as a fetch operation
pub fn fetcher<K, T, F, Fut>(f: F) -> FetchFn<K, T>
where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = BackendResult<T>> + Send + 'static,
{
    Arc::new(move |key| -> BoxFuture<'static, BackendResult<T>> { Box::pin(f(key)) })
}

/// Fallback that hands out the same value on every failure
pub fn constant<T: Clone + Send + Sync + 'static>(value: T) -> FallbackFn<T> {
    Arc::new(move || value.clone())
}

/// What a panel currently shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelState<K, T> {
    pub key: Option<K>,
    pub data: Option<T>,
    /// Set when `data` is fallback content
    pub error: bool,
    pub loading: bool,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    epoch: u64,
    #[serde(skip)]
    seq: u64,
}

impl<K, T> PanelState<K, T> {
    fn idle() -> Self {
        Self {
            key: None,
            data: None,
            error: false,
            loading: false,
            updated_at: None,
            epoch: 0,
            seq: 0,
        }
    }
}

struct Schedule<K> {
    key: K,
    handle: JoinHandle<()>,
}

struct Core<K, T> {
    name: &'static str,
    failure_title: String,
    fetch: FetchFn<K, T>,
    fallback: FallbackFn<T>,
    notifier: Notifier,
    state: watch::Sender<PanelState<K, T>>,
    next_seq: AtomicU64,
    requests: Mutex<JoinSet<()>>,
}

impl<K, T> Core<K, T>
where
    K: Clone + Send + Sync + std::fmt::Debug + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Start a fetch for `key` on behalf of activation `epoch`
    async fn begin(self: &Arc<Self>, key: K, epoch: u64) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_if_modified(|s| {
            if s.epoch == epoch && !s.loading {
                s.loading = true;
                true
            } else {
                false
            }
        });

        tracing::debug!("{}: fetch #{} for {:?}", self.name, seq, key);
        let request = (self.fetch)(key.clone());
        let core = Arc::clone(self);

        let mut requests = self.requests.lock().await;
        while requests.try_join_next().is_some() {}
        requests.spawn(async move {
            let result = request.await;
            core.settle(key, epoch, seq, result).await;
        });
    }

    /// Publish a fetch outcome unless a newer fetch or a teardown got there first
    async fn settle(&self, key: K, epoch: u64, seq: u64, result: BackendResult<T>) {
        let (data, failure) = match result {
            Ok(data) => (data, None),
            Err(e) => ((self.fallback)(), Some(e)),
        };
        let error = failure.is_some();

        let accepted = self.state.send_if_modified(|s| {
            if s.epoch != epoch || seq <= s.seq {
                return false;
            }
            s.seq = seq;
            s.data = Some(data);
            s.error = error;
            s.loading = false;
            s.updated_at = Some(Utc::now());
            true
        });

        if !accepted {
            tracing::debug!("{}: discarding stale fetch #{} for {:?}", self.name, seq, key);
            return;
        }

        if let Some(e) = failure {
            tracing::warn!("{}: fetch for {:?} failed, showing fallback data: {}", self.name, key, e);
            self.notifier.error(self.failure_title.clone(), e.to_string()).await;
        }
    }

    /// Drop in-flight work and start a new epoch, returning its number
    async fn reset(&self, key: Option<K>) -> u64 {
        self.requests.lock().await.abort_all();

        let mut epoch = 0;
        self.state.send_modify(|s| {
            s.epoch += 1;
            epoch = s.epoch;
            s.key = key;
            s.data = None;
            s.error = false;
            s.loading = false;
            s.updated_at = None;
        });
        epoch
    }
}

/// A fetch operation kept fresh on an interval while someone is interested.
///
/// The source is keyed: activating with a different key tears down the current
/// schedule and starts over with an immediate fetch. Only the most recently
/// started fetch of the current activation may publish; anything older that
/// resolves late is dropped.
pub struct PollingSource<K, T> {
    interval: Duration,
    core: Arc<Core<K, T>>,
    schedule: Mutex<Option<Schedule<K>>>,
}

impl<K, T> PollingSource<K, T>
where
    K: Clone + PartialEq + Send + Sync + std::fmt::Debug + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        name: &'static str,
        failure_title: impl Into<String>,
        interval: Duration,
        fetch: FetchFn<K, T>,
        fallback: FallbackFn<T>,
        notifier: Notifier,
    ) -> Self {
        let (state, _) = watch::channel(PanelState::idle());
        Self {
            interval,
            core: Arc::new(Core {
                name,
                failure_title: failure_title.into(),
                fetch,
                fallback,
                notifier,
                state,
                next_seq: AtomicU64::new(0),
                requests: Mutex::new(JoinSet::new()),
            }),
            schedule: Mutex::new(None),
        }
    }

    /// Start polling for `key`; a no-op if already polling for it
    pub async fn activate(&self, key: K) {
        let mut schedule = self.schedule.lock().await;
        if schedule.as_ref().is_some_and(|s| s.key == key) {
            return;
        }
        if let Some(old) = schedule.take() {
            old.handle.abort();
        }

        let epoch = self.core.reset(Some(key.clone())).await;
        tracing::debug!("{}: activated for {:?} (epoch {})", self.core.name, key, epoch);

        let core = Arc::clone(&self.core);
        let interval = self.interval;
        let polled_key = key.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately
                ticker.tick().await;
                core.begin(polled_key.clone(), epoch).await;
            }
        });

        *schedule = Some(Schedule { key, handle });
    }

    pub async fn deactivate(&self) {
        let mut schedule = self.schedule.lock().await;
        if let Some(old) = schedule.take() {
            old.handle.abort();
            self.core.reset(None).await;
            tracing::debug!("{}: deactivated", self.core.name);
        }
    }

    /// Fetch now in addition to the schedule. Returns false when inactive.
    pub async fn refresh(&self) -> bool {
        let schedule = self.schedule.lock().await;
        let Some(current) = schedule.as_ref() else {
            return false;
        };
        let epoch = self.core.state.borrow().epoch;
        self.core.begin(current.key.clone(), epoch).await;
        true
    }

    pub fn state(&self) -> PanelState<K, T> {
        self.core.state.borrow().clone()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<PanelState<K, T>> {
        self.core.state.subscribe()
    }
}

impl<K, T> Drop for PollingSource<K, T> {
    fn drop(&mut self) {
        if let Some(schedule) = self.schedule.get_mut().take() {
            schedule.handle.abort();
        }
        if let Ok(mut requests) = self.core.requests.try_lock() {
            requests.abort_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::vehicle_backend::BackendError;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn source(
        fetch: FetchFn<String, String>,
        notifier: &Notifier,
        interval: Duration,
    ) -> PollingSource<String, String> {
        PollingSource::new(
            "test",
            "Failed to fetch test panel",
            interval,
            fetch,
            constant("fallback".to_string()),
            notifier.clone(),
        )
    }

    fn counting_ok(calls: Arc<AtomicUsize>) -> FetchFn<String, String> {
        fetcher(move |vin: String| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(format!("{vin}#{n}")) }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_publishes_data() {
        let notifier = Notifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let panel = source(counting_ok(calls.clone()), &notifier, Duration::from_secs(10));

        panel.activate("VIN1".to_string()).await;
        sleep(Duration::from_millis(1)).await;

        let state = panel.state();
        assert_eq!(state.data.as_deref(), Some("VIN1#1"));
        assert_eq!(state.key.as_deref(), Some("VIN1"));
        assert!(!state.error);
        assert!(!state.loading);
        assert!(notifier.active().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_publishes_fallback_and_notifies_once() {
        let notifier = Notifier::new();
        let fetch = fetcher(|_vin: String| async { Err(BackendError::Decode("bad json".to_string())) });
        let panel = source(fetch, &notifier, Duration::from_secs(10));

        panel.activate("VIN1".to_string()).await;
        sleep(Duration::from_millis(1)).await;

        let state = panel.state();
        assert_eq!(state.data.as_deref(), Some("fallback"));
        assert!(state.error);
        let notices = notifier.active().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Failed to fetch test panel");

        // The interval is the retry cadence: one more failure, one more notice
        sleep(Duration::from_secs(10)).await;
        assert_eq!(notifier.active().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_clears_error_flag() {
        let notifier = Notifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetch = fetcher(move |_vin: String| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(BackendError::Decode("down".to_string()))
                } else {
                    Ok("live".to_string())
                }
            }
        });
        let panel = source(fetch, &notifier, Duration::from_secs(10));

        panel.activate("VIN1".to_string()).await;
        sleep(Duration::from_millis(1)).await;
        assert!(panel.state().error);

        sleep(Duration::from_secs(10)).await;
        let state = panel.state();
        assert!(!state.error);
        assert_eq!(state.data.as_deref(), Some("live"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_older_response_does_not_overwrite_newer() {
        let notifier = Notifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        // First fetch is slow, second is fast
        let fetch = fetcher(move |_vin: String| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    sleep(Duration::from_millis(300)).await;
                    Ok("first".to_string())
                } else {
                    sleep(Duration::from_millis(50)).await;
                    Ok("second".to_string())
                }
            }
        });
        let panel = source(fetch, &notifier, Duration::from_secs(60));

        panel.activate("VIN1".to_string()).await;
        sleep(Duration::from_millis(1)).await;
        assert!(panel.refresh().await);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(panel.state().data.as_deref(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_failure_is_dropped_silently() {
        let notifier = Notifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetch = fetcher(move |_vin: String| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    sleep(Duration::from_millis(300)).await;
                    Err(BackendError::Decode("late".to_string()))
                } else {
                    Ok("fresh".to_string())
                }
            }
        });
        let panel = source(fetch, &notifier, Duration::from_secs(60));

        panel.activate("VIN1".to_string()).await;
        sleep(Duration::from_millis(1)).await;
        panel.refresh().await;
        sleep(Duration::from_millis(500)).await;

        let state = panel.state();
        assert_eq!(state.data.as_deref(), Some("fresh"));
        assert!(!state.error);
        assert!(notifier.active().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_change_discards_previous_key() {
        let notifier = Notifier::new();
        let fetch = fetcher(|vin: String| async move {
            let delay = if vin == "OLD" { 300 } else { 10 };
            sleep(Duration::from_millis(delay)).await;
            Ok(format!("{vin} status"))
        });
        let panel = source(fetch, &notifier, Duration::from_secs(60));

        panel.activate("OLD".to_string()).await;
        sleep(Duration::from_millis(1)).await;
        panel.activate("NEW".to_string()).await;
        sleep(Duration::from_millis(500)).await;

        let state = panel.state();
        assert_eq!(state.key.as_deref(), Some("NEW"));
        assert_eq!(state.data.as_deref(), Some("NEW status"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_polling_stops_on_deactivate() {
        let notifier = Notifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let panel = source(counting_ok(calls.clone()), &notifier, Duration::from_secs(10));

        panel.activate("VIN1".to_string()).await;
        sleep(Duration::from_secs(25)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        panel.deactivate().await;
        let state = panel.state();
        assert!(state.key.is_none());
        assert!(state.data.is_none());

        sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!panel.refresh().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_activation_is_noop() {
        let notifier = Notifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let panel = source(counting_ok(calls.clone()), &notifier, Duration::from_secs(10));

        panel.activate("VIN1".to_string()).await;
        sleep(Duration::from_millis(1)).await;
        panel.activate("VIN1".to_string()).await;
        sleep(Duration::from_millis(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_updates() {
        let notifier = Notifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let panel = source(counting_ok(calls), &notifier, Duration::from_secs(10));
        let mut rx = panel.subscribe();

        panel.activate("VIN9".to_string()).await;
        loop {
            rx.changed().await.unwrap();
            if rx.borrow().data.is_some() {
                break;
            }
        }
        assert_eq!(rx.borrow().data.as_deref(), Some("VIN9#1"));
    }
}
