//! Line mode.
//!
//! Prints each shown ticker as a line and reads method-name commands from
//! stdin (`pause`, `setSetting interval 5000`, ...). Command results are
//! printed as JSON, rejected commands go to stderr.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use ticker_core::command::{Command, CommandError};
use ticker_core::presenter::{Rendered, Surface};
use ticker_core::{Settings, TickerEvent, TickerWidget, interrupt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamOptions {
    /// Exit after the first `updated`.
    pub once: bool,
    /// Print notifications as JSON lines.
    pub events: bool,
}

/// Surface that forwards content to the output loop; fades just wait.
struct LineSurface {
    content_tx: mpsc::UnboundedSender<Rendered>,
}

impl Surface for LineSurface {
    fn fade_out(&self, duration: Duration) -> BoxFuture<'_, ()> {
        tokio::time::sleep(duration).boxed()
    }

    fn set_content(&self, content: Rendered) {
        let _ = self.content_tx.send(content);
    }

    fn fade_in(&self, duration: Duration) -> BoxFuture<'_, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

pub async fn run(settings: Settings, options: StreamOptions) -> Result<()> {
    let (content_tx, mut content_rx) = mpsc::unbounded_channel();
    let builder = TickerWidget::builder(settings, Arc::new(LineSurface { content_tx }));
    let mut events = builder.subscribe();
    let widget = builder.build();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            () = interrupt::wait_for_interrupt() => {
                tracing::info!("interrupted, leaving stream");
                break;
            }
            Some(content) = content_rx.recv() => print_content(&content),
            event = events.recv() => match event {
                Ok(event) => {
                    if options.events {
                        println!("{}", serde_json::to_string(&event)?);
                    }
                    if options.once && matches!(event, TickerEvent::Updated { .. }) {
                        // Content is handed over before `updated` is emitted.
                        while let Ok(content) = content_rx.try_recv() {
                            print_content(&content);
                        }
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "stream fell behind on events");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if stdin_open => {
                match line.context("read stdin")? {
                    Some(line) => handle_line(&widget, &line)?,
                    None => stdin_open = false,
                }
            }
        }
    }

    widget.stop();
    Ok(())
}

fn print_content(content: &Rendered) {
    match content.link() {
        Some(href) => println!("{content} <{href}>"),
        None => println!("{content}"),
    }
}

fn handle_line(widget: &TickerWidget, line: &str) -> Result<()> {
    let result = line
        .parse::<Command>()
        .and_then(|command| command.apply(widget));
    match result {
        Ok(value) => println!("{}", serde_json::to_string(&value)?),
        Err(CommandError::Empty) => {}
        Err(err) => {
            tracing::debug!(line, error = %err, "command rejected");
            eprintln!("{err}");
        }
    }
    Ok(())
}
