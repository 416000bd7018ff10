//! TUI state.

use std::collections::VecDeque;
use std::time::Duration;

use ticker_core::{Settings, TickerEvent};

use crate::surface::Display;

/// Number of recent event names kept for the status line.
pub const RECENT_EVENTS: usize = 4;

#[derive(Debug, Clone)]
pub struct AppState {
    pub display: Display,
    pub running: bool,
    pub paused: bool,
    pub interval: Duration,
    pub show_links: bool,
    /// Most recent event names, newest last.
    pub recent: VecDeque<&'static str>,
    /// Last failed command, cleared by the next shown ticker.
    pub error: Option<String>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(settings: &Settings, running: bool, paused: bool) -> Self {
        Self {
            display: Display::default(),
            running,
            paused,
            interval: settings.interval,
            show_links: settings.show_links,
            recent: VecDeque::with_capacity(RECENT_EVENTS),
            error: None,
            should_quit: false,
        }
    }

    /// Mirrors a widget event into the view state.
    pub fn apply_event(&mut self, event: &TickerEvent) {
        match event {
            TickerEvent::Started => self.running = true,
            TickerEvent::Stopped => self.running = false,
            TickerEvent::Paused => self.paused = true,
            TickerEvent::Resumed => self.paused = false,
            TickerEvent::SettingsChanged { new, .. } => {
                self.interval = new.interval;
                self.show_links = new.show_links;
            }
            TickerEvent::Updated { .. } => self.error = None,
            TickerEvent::IntervalChanged { .. }
            | TickerEvent::Starting
            | TickerEvent::Stopping
            | TickerEvent::Updating => {}
        }

        if self.recent.len() == RECENT_EVENTS {
            self.recent.pop_front();
        }
        self.recent.push_back(event.name());
    }
}

#[cfg(test)]
mod tests {
    use ticker_core::Ticker;

    use super::*;

    #[test]
    fn test_apply_event_tracks_lifecycle() {
        let mut state = AppState::new(&Settings::default(), false, false);

        state.apply_event(&TickerEvent::Starting);
        state.apply_event(&TickerEvent::Started);
        state.apply_event(&TickerEvent::Paused);

        assert!(state.running);
        assert!(state.paused);
        assert_eq!(state.recent, ["starting", "started", "paused"]);
    }

    #[test]
    fn test_apply_event_follows_settings() {
        let mut state = AppState::new(&Settings::default(), true, false);
        let new = Settings {
            interval: Duration::from_secs(20),
            show_links: false,
            ..Default::default()
        };

        state.apply_event(&TickerEvent::SettingsChanged {
            old: Box::new(Settings::default()),
            new: Box::new(new),
        });

        assert_eq!(state.interval, Duration::from_secs(20));
        assert!(!state.show_links);
    }

    #[test]
    fn test_recent_events_are_bounded() {
        let mut state = AppState::new(&Settings::default(), true, false);
        state.error = Some("boom".to_string());
        for _ in 0..10 {
            state.apply_event(&TickerEvent::Updating);
        }
        state.apply_event(&TickerEvent::Updated {
            ticker: Ticker::new("t", "s"),
        });

        assert_eq!(state.recent.len(), RECENT_EVENTS);
        assert_eq!(state.recent.back(), Some(&"updated"));
        assert_eq!(state.error, None);
    }
}
