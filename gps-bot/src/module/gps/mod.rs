//! Session-authenticated client for the GPS tracking backend.
//!
//! The backend is an undocumented third-party web UI; this module
//! keeps a login session alive, triggers location updates, and
//! recovers structured device data from its pseudo-JSON responses.

pub mod client;
pub mod error;
pub mod parser;
pub mod session;
pub mod types;

pub use client::TrackingClient;
pub use error::GpsError;
pub use session::SessionManager;
pub use types::{VehicleActivity, VehicleSnapshot};

/// Fixed user-agent sent on every request, matching what the
/// backend's own web UI sends.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.6367.118 Safari/537.36";
