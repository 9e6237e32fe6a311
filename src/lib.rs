//! Library entrypoint for live-match-alerts.
//!
//! Exposes all modules so integration tests can import them.

pub mod alerts;
pub mod api;
pub mod config;
pub mod data;
pub mod notify;
pub mod state;
