//! Command handlers.

pub mod config;
pub mod fetch;
pub mod run;
pub mod stream;
