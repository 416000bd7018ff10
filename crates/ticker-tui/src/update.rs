//! TUI reducer.
//!
//! The runtime feeds every event through `update` and executes the returned
//! effects against the widget.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde_json::json;
use ticker_core::TickerEvent;
use ticker_core::command::Command;

use crate::state::AppState;
use crate::surface::Display;

/// Step used by the interval keys, in milliseconds.
pub const INTERVAL_STEP_MS: u64 = 5_000;

#[derive(Debug)]
pub enum UiEvent {
    Terminal(Event),
    Ticker(TickerEvent),
    Display(Display),
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    Command(Command),
}

pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Terminal(Event::Key(key)) => handle_key(state, key),
        UiEvent::Terminal(_) => vec![],
        UiEvent::Ticker(event) => {
            state.apply_event(&event);
            vec![]
        }
        UiEvent::Display(display) => {
            state.display = display;
            vec![]
        }
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.kind != KeyEventKind::Press {
        return vec![];
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (ctrl && key.code == KeyCode::Char('c'))
    {
        state.should_quit = true;
        return vec![];
    }

    let command = match key.code {
        KeyCode::Char(' ') if state.paused => Command::Resume,
        KeyCode::Char(' ') => Command::Pause,
        KeyCode::Char('n') => Command::Update,
        KeyCode::Char('s') if state.running => Command::Stop,
        KeyCode::Char('s') => Command::Start,
        KeyCode::Char('r') => Command::Restart,
        KeyCode::Char('+') => {
            let ms = interval_ms(state).saturating_add(INTERVAL_STEP_MS);
            Command::SetSetting("interval".to_string(), json!(ms))
        }
        KeyCode::Char('-') => {
            let current = interval_ms(state);
            let ms = current.saturating_sub(INTERVAL_STEP_MS).max(INTERVAL_STEP_MS);
            if ms == current {
                return vec![];
            }
            Command::SetSetting("interval".to_string(), json!(ms))
        }
        KeyCode::Char('l') => {
            Command::SetSetting("showLinks".to_string(), json!(!state.show_links))
        }
        _ => return vec![],
    };
    vec![UiEffect::Command(command)]
}

fn interval_ms(state: &AppState) -> u64 {
    u64::try_from(state.interval.as_millis()).unwrap_or(u64::MAX)
}
