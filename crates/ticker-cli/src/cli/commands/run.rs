//! Full-screen view.

use std::sync::Arc;

use anyhow::Result;
use ticker_core::{Settings, TickerWidget};
use ticker_tui::TerminalSurface;

pub async fn run(settings: Settings) -> Result<()> {
    let surface = TerminalSurface::new();
    let builder = TickerWidget::builder(settings, Arc::new(surface.clone()));
    let events = builder.subscribe();
    let widget = builder.build();

    let result = ticker_tui::run(widget.clone(), surface, events).await;
    widget.stop();
    result
}
