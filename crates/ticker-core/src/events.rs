//! Ticker notifications and the per-instance event bus.
//!
//! Every state transition of a [`TickerWidget`](crate::TickerWidget) is
//! announced as a [`TickerEvent`]. Two kinds of consumers exist:
//! - synchronous listeners registered with `on`, called in registration
//!   order on the thread that caused the transition (they may call back
//!   into the instance)
//! - broadcast subscribers, for consumers running on other tasks

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::controller::TickerWidget;
use crate::model::Ticker;
use crate::settings::Settings;

/// Namespace appended to every event name (`"started.ticker"`).
pub const NAMESPACE: &str = "ticker";

/// Broadcast channel capacity.
/// Lagging subscribers skip the oldest events.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notifications emitted by a ticker instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TickerEvent {
    /// The `interval` setting changed.
    IntervalChanged {
        #[serde(with = "crate::settings::millis")]
        old: Duration,
        #[serde(with = "crate::settings::millis")]
        new: Duration,
    },
    /// The updater went from active to paused.
    Paused,
    /// The updater went from paused to active.
    Resumed,
    /// The settings object was replaced.
    SettingsChanged {
        old: Box<Settings>,
        new: Box<Settings>,
    },
    /// The repeating timer is installed.
    Started,
    /// The updater is about to start.
    Starting,
    /// The repeating timer is cancelled.
    Stopped,
    /// The updater is about to stop.
    Stopping,
    /// A ticker finished fading in.
    Updated { ticker: Ticker },
    /// An update cycle began.
    Updating,
}

impl TickerEvent {
    /// Short event name (`"intervalChanged"`).
    pub fn name(&self) -> &'static str {
        match self {
            TickerEvent::IntervalChanged { .. } => "intervalChanged",
            TickerEvent::Paused => "paused",
            TickerEvent::Resumed => "resumed",
            TickerEvent::SettingsChanged { .. } => "settingsChanged",
            TickerEvent::Started => "started",
            TickerEvent::Starting => "starting",
            TickerEvent::Stopped => "stopped",
            TickerEvent::Stopping => "stopping",
            TickerEvent::Updated { .. } => "updated",
            TickerEvent::Updating => "updating",
        }
    }

    /// Namespaced event name (`"intervalChanged.ticker"`).
    pub fn qualified_name(&self) -> String {
        format!("{}.{NAMESPACE}", self.name())
    }
}

/// Synchronous event listener.
pub type Listener = Arc<dyn Fn(&TickerWidget, &TickerEvent) + Send + Sync>;

pub(crate) struct EventBus {
    listeners: Mutex<Vec<Listener>>,
    tx: broadcast::Sender<TickerEvent>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            listeners: Mutex::new(Vec::new()),
            tx,
        }
    }

    pub(crate) fn add_listener(&self, listener: Listener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<TickerEvent> {
        self.tx.subscribe()
    }

    /// Publishes `event` to subscribers, then runs listeners.
    ///
    /// The listener list is copied first so listeners can register further
    /// listeners or emit nested events without deadlocking.
    pub(crate) fn emit(&self, widget: &TickerWidget, event: TickerEvent) {
        tracing::trace!(event = event.name(), "emit");

        // No receivers is not an error.
        let _ = self.tx.send(event.clone());

        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            listener(widget, &event);
        }
    }
}
