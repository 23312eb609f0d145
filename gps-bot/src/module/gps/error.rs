//! Failure taxonomy for the tracking backend.
//!
//! The backend offers no structured error reporting, so every failure
//! the core can hit is folded into this closed set. The convenience
//! wrappers on [`TrackingClient`](super::TrackingClient) absorb these
//! into `bool`/`Option` results; the `try_*` methods expose them.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpsError {
    /// Login has never succeeded, so there is no session cookie to send.
    #[error("no session available; login has not succeeded yet")]
    NoSession,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    /// The device-table response does not contain the opening
    /// `customer_info_list` marker.
    #[error("customer_info_list marker not found in response")]
    MarkerNotFound,

    /// The opening marker is present but the closing `aaData` marker
    /// never follows it.
    #[error("malformed payload: no closing marker after customer_info_list")]
    MalformedPayload,

    /// The reconstructed fragment is not valid JSON.
    #[error("payload decode failure: {0}")]
    Decode(#[from] serde_json::Error),

    /// The device table parsed but lists no devices.
    #[error("device table contains no devices")]
    NoDeviceData,
}
