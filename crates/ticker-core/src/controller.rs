//! Cycle controller.
//!
//! A [`TickerWidget`] owns the settings, the current batch with its cursor,
//! and at most one repeating timer. Each update advances the cursor,
//! fetching a new batch once the current one is exhausted, and hands the
//! selected ticker to the surface.
//!
//! Running and paused are independent: a paused widget keeps its timer but
//! skips the ticks. `stop` cancels the timer only; a fetch or fade sequence
//! already in flight still completes and emits `updated`.
//!
//! Must be used from within a tokio runtime: the timer, fetches and fades
//! run on spawned tasks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::events::{EventBus, Listener, TickerEvent};
use crate::fetch::{HttpFetcher, TickerSource};
use crate::model::Ticker;
use crate::presenter::{Surface, render};
use crate::settings::{Settings, SettingsError};

/// Shortest period the repeating timer accepts.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Mutable per-instance state.
struct State {
    settings: Settings,
    initialized: bool,
    paused: bool,
    /// Cursor into `tickers`; `0` while the batch is empty.
    ticker_idx: usize,
    tickers: Vec<Ticker>,
    timer: Option<AbortHandle>,
}

struct Inner {
    state: Mutex<State>,
    bus: EventBus,
    surface: Arc<dyn Surface>,
    source: Arc<dyn TickerSource>,
    /// Held for a whole update sequence so fades never interleave.
    presenting: AsyncMutex<()>,
}

/// Builds a [`TickerWidget`].
///
/// Listeners and subscriptions made on the builder observe the events
/// emitted while the widget auto-starts.
pub struct TickerBuilder {
    settings: Settings,
    surface: Arc<dyn Surface>,
    source: Option<Arc<dyn TickerSource>>,
    bus: EventBus,
}

impl TickerBuilder {
    pub fn new(settings: Settings, surface: Arc<dyn Surface>) -> Self {
        Self {
            settings,
            surface,
            source: None,
            bus: EventBus::new(),
        }
    }

    /// Replaces the default HTTP source.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn TickerSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Registers a synchronous listener.
    #[must_use]
    pub fn on<F>(self, listener: F) -> Self
    where
        F: Fn(&TickerWidget, &TickerEvent) + Send + Sync + 'static,
    {
        self.bus.add_listener(Arc::new(listener));
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TickerEvent> {
        self.bus.subscribe()
    }

    /// Creates the widget, installs the interval listeners and starts it
    /// when `autoStart` is set.
    pub fn build(self) -> TickerWidget {
        let widget = TickerWidget {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    settings: self.settings,
                    initialized: false,
                    paused: false,
                    ticker_idx: 0,
                    tickers: Vec::new(),
                    timer: None,
                }),
                bus: self.bus,
                surface: self.surface,
                source: self
                    .source
                    .unwrap_or_else(|| Arc::new(HttpFetcher::new())),
                presenting: AsyncMutex::new(()),
            }),
        };
        widget.init();
        widget
    }
}

/// Handle to one ticker instance. Clones share the same instance.
#[derive(Clone)]
pub struct TickerWidget {
    inner: Arc<Inner>,
}

impl TickerWidget {
    /// Creates and initializes a widget with the default HTTP source.
    pub fn new(settings: Settings, surface: Arc<dyn Surface>) -> Self {
        TickerBuilder::new(settings, surface).build()
    }

    pub fn builder(settings: Settings, surface: Arc<dyn Surface>) -> TickerBuilder {
        TickerBuilder::new(settings, surface)
    }

    fn init(&self) {
        {
            let mut state = self.lock();
            if state.initialized {
                return;
            }
            state.initialized = true;
        }

        self.on(|widget, event| {
            if let TickerEvent::SettingsChanged { old, new } = event
                && old.interval != new.interval
            {
                widget.emit(TickerEvent::IntervalChanged {
                    old: old.interval,
                    new: new.interval,
                });
            }
        });
        self.on(|widget, event| {
            if matches!(event, TickerEvent::IntervalChanged { .. }) {
                widget.restart();
            }
        });

        if self.lock().settings.auto_start {
            self.start();
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: TickerEvent) {
        self.inner.bus.emit(self, event);
    }

    /// Registers a synchronous listener for every event of this instance.
    pub fn on<F>(&self, listener: F)
    where
        F: Fn(&TickerWidget, &TickerEvent) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.inner.bus.add_listener(listener);
    }

    /// Subscribes to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TickerEvent> {
        self.inner.bus.subscribe()
    }

    /// Ticker under the cursor, if a batch is loaded.
    pub fn current_ticker(&self) -> Option<Ticker> {
        let state = self.lock();
        state.tickers.get(state.ticker_idx).cloned()
    }

    /// Whether a repeating timer is installed.
    pub fn is_running(&self) -> bool {
        self.lock().timer.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Settings {
        self.lock().settings.clone()
    }

    /// Value of the named setting, `None` if no such setting exists.
    pub fn setting(&self, name: &str) -> Option<Value> {
        self.lock().settings.get(name)
    }

    /// Replaces all settings and emits `settingsChanged`.
    pub fn set_settings(&self, settings: Settings) {
        let old = std::mem::replace(&mut self.lock().settings, settings.clone());
        self.emit(TickerEvent::SettingsChanged {
            old: Box::new(old),
            new: Box::new(settings),
        });
    }

    /// Sets one setting by name.
    ///
    /// # Errors
    /// Returns an error for unknown names or ill-typed values; nothing is
    /// emitted in that case.
    pub fn set_setting(&self, name: &str, value: Value) -> Result<(), SettingsError> {
        let settings = self.settings().with_value(name, value)?;
        self.set_settings(settings);
        Ok(())
    }

    /// Deep-merges a partial settings object into the current settings.
    ///
    /// # Errors
    /// Returns an error if `partial` does not describe valid settings.
    pub fn merge_settings(&self, partial: &Value) -> Result<(), SettingsError> {
        let settings = self.settings().merged(partial)?;
        self.set_settings(settings);
        Ok(())
    }

    /// Installs the repeating timer. No-op while running.
    pub fn start(&self) {
        if self.is_running() {
            return;
        }

        self.emit(TickerEvent::Starting);

        let (instant_start, interval) = {
            let state = self.lock();
            (state.settings.instant_start, state.settings.interval)
        };
        if instant_start {
            self.update();
        }

        let timer = self.spawn_timer(interval);
        if let Some(previous) = self.lock().timer.replace(timer) {
            previous.abort();
        }
        tracing::info!(interval_ms = interval.as_millis() as u64, "ticker started");

        self.emit(TickerEvent::Started);
    }

    /// Cancels the repeating timer. No-op while stopped.
    pub fn stop(&self) {
        if !self.is_running() {
            return;
        }

        self.emit(TickerEvent::Stopping);

        let timer = self.lock().timer.take();
        if let Some(timer) = timer {
            timer.abort();
        }
        tracing::info!("ticker stopped");

        self.emit(TickerEvent::Stopped);
    }

    pub fn restart(&self) {
        self.stop();
        self.start();
    }

    /// Skips timer ticks until `resume`. Announces only the first call.
    pub fn pause(&self) {
        if !self.is_paused() {
            self.emit(TickerEvent::Paused);
        }
        self.lock().paused = true;
    }

    /// Undoes `pause`. Announces only when actually paused.
    pub fn resume(&self) {
        if self.is_paused() {
            self.emit(TickerEvent::Resumed);
        }
        self.lock().paused = false;
    }

    /// Shows the next ticker, fetching a new batch when the current one is exhausted.
    pub fn update(&self) {
        self.emit(TickerEvent::Updating);

        // The ticker is picked now; a later update must not change what this one shows.
        let selected = {
            let mut state = self.lock();
            let new_idx = state.ticker_idx + 1;
            let selected = state.tickers.get(new_idx).cloned();
            if selected.is_some() {
                state.ticker_idx = new_idx;
            }
            selected
        };

        let widget = self.clone();
        tokio::spawn(async move {
            let _turn = widget.inner.presenting.lock().await;
            let ticker = match selected {
                Some(ticker) => ticker,
                None => match widget.load_tickers().await {
                    Some(ticker) => ticker,
                    None => return,
                },
            };
            widget.present(ticker).await;
        });
    }

    /// Replaces the batch with a freshly fetched one and resets the cursor.
    ///
    /// Returns the first ticker of the new batch. Returns `None` if the batch
    /// is empty, or if the fetch failed; the state is left untouched then.
    async fn load_tickers(&self) -> Option<Ticker> {
        let url = self.lock().settings.ticker_url.clone();
        match self.inner.source.fetch(&url).await {
            Ok(batch) => {
                let mut state = self.lock();
                state.tickers = batch.tickers;
                state.ticker_idx = 0;
                let first = state.tickers.first().cloned();
                if first.is_none() {
                    tracing::debug!("empty batch, nothing to show");
                }
                first
            }
            Err(err) => {
                tracing::warn!(
                    url = %url,
                    kind = %err.kind,
                    error = %err,
                    "ticker fetch failed; retrying on next tick"
                );
                None
            }
        }
    }

    /// Fades out, swaps the content, fades in, then announces `updated`.
    async fn present(&self, ticker: Ticker) {
        let fade_out = self.lock().settings.fade_out_time;
        self.inner.surface.fade_out(fade_out).await;

        // Read after the fade so setting changes made meanwhile apply.
        let (content, fade_in) = {
            let state = self.lock();
            let settings = &state.settings;
            (
                render(&settings.format, &ticker, settings.show_links),
                settings.fade_in_time,
            )
        };
        self.inner.surface.set_content(content);
        self.inner.surface.fade_in(fade_in).await;

        tracing::debug!(short = %ticker.short, "ticker updated");
        self.emit(TickerEvent::Updated { ticker });
    }

    fn spawn_timer(&self, interval: Duration) -> AbortHandle {
        let period = interval.max(MIN_INTERVAL);
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let widget = TickerWidget { inner };
                if widget.is_paused() {
                    continue;
                }
                widget.update();
            }
        });
        task.abort_handle()
    }
}
