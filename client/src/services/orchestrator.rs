//! Fetch orchestration: retries, supersession and polling
//!
//! One orchestrator owns at most one outstanding request. Starting a new load
//! cancels the previous one, and a generation counter keeps a superseded
//! result from ever reaching the observable state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use vitisguard_shared::{WeatherLocation, WeatherOptions, WeatherResponse};

use crate::external::{WeatherApiError, WeatherFetcher};

// ============================================================================
// Policy and State
// ============================================================================

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Retry and polling knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Attempts per load, including the first; zero behaves as one
    pub retry_attempts: u32,
    /// Pause between failed attempts
    pub retry_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::Idle => write!(f, "idle"),
            FetchStatus::Loading => write!(f, "loading"),
            FetchStatus::Success => write!(f, "success"),
            FetchStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Observable orchestrator state
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    pub status: FetchStatus,
    /// Last successful payload; kept across later failures
    pub data: Option<WeatherResponse>,
    /// Error of the last attempt of the last failed load
    pub error: Option<WeatherApiError>,
}

/// Per-instance bookkeeping, never held across an await
#[derive(Default)]
struct Control {
    generation: u64,
    in_flight: Option<Arc<Notify>>,
    poller: Option<JoinHandle<()>>,
    last_request: Option<(WeatherLocation, WeatherOptions)>,
}

struct Inner<F> {
    fetcher: F,
    policy: FetchPolicy,
    control: Mutex<Control>,
    state: watch::Sender<FetchState>,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Loads forecasts through a [`WeatherFetcher`] and tracks the outcome
pub struct WeatherOrchestrator<F: WeatherFetcher> {
    inner: Arc<Inner<F>>,
}

impl<F: WeatherFetcher> WeatherOrchestrator<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_policy(fetcher, FetchPolicy::default())
    }

    pub fn with_policy(fetcher: F, policy: FetchPolicy) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            inner: Arc::new(Inner {
                fetcher,
                policy,
                control: Mutex::new(Control::default()),
                state,
            }),
        }
    }

    pub fn policy(&self) -> FetchPolicy {
        self.inner.policy
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    /// Load a forecast, superseding any request already in flight.
    ///
    /// Returns the payload on success. Failures and supersession return
    /// `None`; the error is reported through the state instead.
    pub async fn load(
        &self,
        location: WeatherLocation,
        options: WeatherOptions,
    ) -> Option<WeatherResponse> {
        self.inner.load(location, options).await
    }

    /// Abort the in-flight request, if any, without starting another
    pub fn cancel(&self) {
        let mut control = self.inner.lock();
        if let Some(token) = control.in_flight.take() {
            token.notify_one();
            control.generation += 1;
            self.inner.state.send_modify(settle_abandoned);
            tracing::info!("Cancelled in-flight forecast request");
        }
    }

    /// Reload the last request every poll interval.
    ///
    /// Returns false when already polling or when nothing was loaded yet.
    pub fn start_polling(&self) -> bool {
        let mut control = self.inner.lock();
        if control.poller.as_ref().is_some_and(|poller| !poller.is_finished()) {
            tracing::debug!("Polling already active");
            return false;
        }
        if control.last_request.is_none() {
            tracing::debug!("No previous request to poll");
            return false;
        }

        let period = self.inner.policy.poll_interval;
        let weak = Arc::downgrade(&self.inner);
        control.poller = Some(tokio::spawn(poll(weak, period)));
        tracing::info!(interval_secs = period.as_secs_f64(), "Polling started");
        true
    }

    pub fn stop_polling(&self) {
        if let Some(poller) = self.inner.lock().poller.take() {
            poller.abort();
            tracing::info!("Polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.inner
            .lock()
            .poller
            .as_ref()
            .is_some_and(|poller| !poller.is_finished())
    }

    /// Reset data and error; an in-flight request keeps running
    pub fn clear(&self) {
        self.inner.state.send_modify(|state| {
            state.data = None;
            state.error = None;
            if state.status != FetchStatus::Loading {
                state.status = FetchStatus::Idle;
            }
        });
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> FetchState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.inner.state.borrow().status
    }

    pub fn weather(&self) -> Option<WeatherResponse> {
        self.inner.state.borrow().data.clone()
    }

    pub fn error(&self) -> Option<WeatherApiError> {
        self.inner.state.borrow().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.status() == FetchStatus::Loading
    }

    pub fn has_data(&self) -> bool {
        self.inner.state.borrow().data.is_some()
    }

    pub fn is_error(&self) -> bool {
        self.inner.state.borrow().error.is_some()
    }
}

impl<F: WeatherFetcher> Drop for WeatherOrchestrator<F> {
    fn drop(&mut self) {
        let mut control = self.inner.lock();
        if let Some(poller) = control.poller.take() {
            poller.abort();
        }
        if let Some(token) = control.in_flight.take() {
            token.notify_one();
            control.generation += 1;
        }
    }
}

impl<F: WeatherFetcher> Inner<F> {
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn load(&self, location: WeatherLocation, options: WeatherOptions) -> Option<WeatherResponse> {
        let (generation, cancelled) = {
            let mut control = self.lock();
            if let Some(previous) = control.in_flight.take() {
                previous.notify_one();
                tracing::info!(%location, "Superseding in-flight forecast request");
            }
            control.generation += 1;
            let token = Arc::new(Notify::new());
            control.in_flight = Some(token.clone());
            control.last_request = Some((location, options.clone()));
            self.state.send_modify(|state| {
                state.status = FetchStatus::Loading;
                state.error = None;
            });
            (control.generation, token)
        };
        // Declared before the lock below so it is released first
        let _abandoned = AbandonGuard {
            inner: self,
            generation,
        };

        let outcome = tokio::select! {
            result = self.fetch_with_retry(&location, &options) => result,
            _ = cancelled.notified() => return None,
        };

        let mut control = self.lock();
        if control.generation != generation {
            return None;
        }
        control.in_flight = None;

        match outcome {
            Ok(data) => {
                self.state.send_modify(|state| {
                    state.status = FetchStatus::Success;
                    state.data = Some(data.clone());
                    state.error = None;
                });
                Some(data)
            }
            Err(error) => {
                tracing::warn!(%location, %error, "Forecast load failed");
                self.state.send_modify(|state| {
                    state.status = FetchStatus::Failed;
                    state.error = Some(error);
                });
                None
            }
        }
    }

    async fn fetch_with_retry(
        &self,
        location: &WeatherLocation,
        options: &WeatherOptions,
    ) -> Result<WeatherResponse, WeatherApiError> {
        let attempts = self.policy.retry_attempts.max(1);
        let mut attempt = 1;
        loop {
            tracing::debug!(attempt, attempts, %location, "Fetching forecast");
            match self.fetcher.fetch_weather(location, options).await {
                Ok(data) => return Ok(data),
                Err(error) if attempt >= attempts => return Err(error),
                Err(error) => {
                    tracing::warn!(attempt, attempts, %error, "Forecast attempt failed, retrying");
                    sleep(self.policy.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Leave `Loading` for the last known state
fn settle_abandoned(state: &mut FetchState) {
    if state.status == FetchStatus::Loading {
        state.status = if state.data.is_some() {
            FetchStatus::Success
        } else {
            FetchStatus::Idle
        };
    }
}

/// Settles the state when a load future is dropped before it completes.
///
/// A no-op once the load finished or was superseded: completion clears
/// `in_flight`, supersession bumps the generation.
struct AbandonGuard<'a, F> {
    inner: &'a Inner<F>,
    generation: u64,
}

impl<F> Drop for AbandonGuard<'_, F> {
    fn drop(&mut self) {
        let mut control = self
            .inner
            .control
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if control.generation != self.generation || control.in_flight.is_none() {
            return;
        }
        control.in_flight = None;
        control.generation += 1;
        self.inner.state.send_modify(settle_abandoned);
        tracing::debug!("Forecast load dropped before completion");
    }
}

/// Polling loop; ends once the orchestrator is gone
async fn poll<F: WeatherFetcher>(weak: Weak<Inner<F>>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(inner) = weak.upgrade() else {
            break;
        };
        let request = inner.lock().last_request.clone();
        let Some((location, options)) = request else {
            continue;
        };
        tracing::debug!(%location, "Polling tick");
        tokio::spawn(async move {
            inner.load(location, options).await;
        });
    }
}
