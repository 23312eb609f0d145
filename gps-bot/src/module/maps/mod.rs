//! Google Maps integration (directions home + static map).

pub mod client;
pub mod format;

pub use client::MapsClient;
