//! Telegram bot for a single GPS tracking device.
//!
//! The hard part lives in [`module::gps`]: a session-authenticated
//! client for an undocumented tracking web backend. Everything else
//! (Telegram glue, Google Maps enrichment, localization) is thin.

pub mod config;
pub mod frontend;
pub mod lang;
pub mod logging;
pub mod module;
