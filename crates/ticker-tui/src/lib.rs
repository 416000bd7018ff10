//! Full-screen terminal view for a ticker widget.

pub mod render;
pub mod runtime;
pub mod state;
pub mod surface;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
pub use runtime::TickerRuntime;
pub use surface::TerminalSurface;
use ticker_core::{TickerEvent, TickerWidget};
use tokio::sync::broadcast;

/// Shows the widget full-screen until the user quits.
///
/// Must run on a multi-threaded tokio runtime: the event loop blocks its
/// thread while the widget's tasks keep running on the others.
///
/// # Errors
/// Returns an error if stdout is not a terminal or the terminal fails.
pub async fn run(
    widget: TickerWidget,
    surface: TerminalSurface,
    events: broadcast::Receiver<TickerEvent>,
) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The ticker view requires a terminal.\n\
             Use `ticker stream` for line output."
        );
    }

    tokio::task::block_in_place(move || {
        let mut runtime = TickerRuntime::new(widget, surface, events)?;
        runtime.run()
    })
}
