//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! Each frame the loop collects terminal input, drains the widget's event
//! receiver, and picks up surface changes. Everything goes through the
//! reducer; the resulting commands are applied to the widget here.

use std::io::Stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ticker_core::interrupt;
use ticker_core::{TickerEvent, TickerWidget};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::state::AppState;
use crate::surface::TerminalSurface;
use crate::update::{UiEffect, UiEvent};
use crate::{render, terminal, update};

/// Poll timeout for terminal input (about 60 fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

pub struct TickerRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: AppState,
    widget: TickerWidget,
    surface: TerminalSurface,
    events: broadcast::Receiver<TickerEvent>,
    last_revision: u64,
}

impl TickerRuntime {
    /// Takes over the terminal.
    ///
    /// `events` should be subscribed before the widget was built so the
    /// auto-start events are seen.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(
        widget: TickerWidget,
        surface: TerminalSurface,
        events: broadcast::Receiver<TickerEvent>,
    ) -> Result<Self> {
        terminal::install_panic_hook();
        interrupt::set_restore_hook(|| {
            let _ = terminal::restore_terminal();
        });
        interrupt::reset();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let state = AppState::new(&widget.settings(), widget.is_running(), widget.is_paused());

        Ok(Self {
            terminal,
            state,
            widget,
            surface,
            events,
            last_revision: 0,
        })
    }

    /// Runs until the user quits or an interrupt arrives.
    ///
    /// # Errors
    /// Returns an error if reading input or drawing fails.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            if interrupt::is_interrupted() {
                tracing::info!("interrupted, leaving ticker view");
                break;
            }

            let events = self.collect_events()?;
            for event in events {
                dirty = true;
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        if event::poll(FRAME_DURATION)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        loop {
            match self.events.try_recv() {
                Ok(event) => events.push(UiEvent::Ticker(event)),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "ticker view fell behind on events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        let display = self.surface.snapshot();
        if display.revision != self.last_revision {
            self.last_revision = display.revision;
            events.push(UiEvent::Display(display));
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            match effect {
                UiEffect::Command(command) => {
                    tracing::debug!(?command, "applying command");
                    if let Err(err) = command.apply(&self.widget) {
                        tracing::warn!(error = %err, "command rejected");
                        self.state.error = Some(err.to_string());
                    }
                }
            }
        }
    }
}

impl Drop for TickerRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
