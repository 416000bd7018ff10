//! Core ticker library (settings, fetcher, presenter, cycle controller, config).

pub mod command;
pub mod config;
pub mod controller;
pub mod events;
pub mod fetch;
pub mod interrupt;
pub mod logging;
pub mod model;
pub mod presenter;
pub mod settings;

pub use controller::{TickerBuilder, TickerWidget};
pub use events::TickerEvent;
pub use model::{Ticker, TickerBatch};
pub use settings::Settings;
