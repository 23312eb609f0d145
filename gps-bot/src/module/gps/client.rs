//! Tracking backend client.
//!
//! Talks to the two device endpoints: the "send location" trigger and
//! the device-table listing. The backend has no real API; both
//! endpoints are the AJAX calls of its web UI, so the requests mimic
//! a browser XHR and the responses need ad hoc recovery. The
//! device-table body in particular is a BOM-prefixed JavaScript
//! fragment with one well-formed JSON object buried inside it, which
//! is cut out by exact string markers.

use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use reqwest::Client;
use tokio::time::Duration;
use tracing::{error, info, warn};

use crate::config::GpsConfig;

use super::error::GpsError;
use super::parser;
use super::session::SessionManager;
use super::types::VehicleSnapshot;

const UPDATE_PATH: &str = "post_submit_sendloc.php";
const DEVICE_TABLE_PATH: &str = "post_device_table_list.php";

// Exact contract points with the backend; the offsets in
// extract_device_json depend on these byte-for-byte.
const TABLE_OPEN_MARKER: &str = r#"{"customer_info_list":[{"#;
const TABLE_CLOSE_MARKER: &str = r#"}],"aaData":["#;

/// Client for the GPS tracking backend's device endpoints.
pub struct TrackingClient {
    client: Client,
    session: Arc<SessionManager>,
    base_url: String,
    imei: String,
    retry_count: u32,
    retry_delay: Duration,
    display_tz: FixedOffset,
}

impl TrackingClient {
    pub fn new(
        config: &GpsConfig,
        client: Client,
        session: Arc<SessionManager>,
        display_tz: FixedOffset,
    ) -> Self {
        Self {
            client,
            session,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            imei: config.imei.clone(),
            retry_count: config.update_retry_count.max(1),
            retry_delay: Duration::from_secs_f64(config.update_retry_delay),
            display_tz,
        }
    }

    /// Ask the device to report a fresh location.
    ///
    /// Applies the configured retry policy: up to `update_retry_count`
    /// attempts separated by `update_retry_delay`. Failures are logged
    /// and absorbed; the caller only sees success or not.
    pub async fn request_update(&self) -> bool {
        for attempt in 1..=self.retry_count {
            match self.try_request_update().await {
                Ok(true) => return true,
                Ok(false) => {
                    warn!("Location update not acknowledged (attempt {attempt}/{})", self.retry_count);
                }
                Err(e) => {
                    error!("Error requesting location update (attempt {attempt}/{}): {e}", self.retry_count);
                }
            }
            if attempt < self.retry_count {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
        false
    }

    /// One update-trigger attempt, surfacing the failure reason.
    ///
    /// `Ok(true)` only when the backend answers 200 with its ad hoc
    /// success marker: a body containing `1` or `Y`. There is no
    /// structured success field to parse.
    pub async fn try_request_update(&self) -> Result<bool, GpsError> {
        let token = self.session.get_token().await?;
        let url = format!("{}/{}", self.base_url, UPDATE_PATH);

        let response = self
            .client
            .post(&url)
            .header("Cookie", format!("PHPSESSID={token}"))
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Origin", &self.base_url)
            .header("Referer", format!("{}/map.php", self.base_url))
            .form(&[("imei", self.imei.as_str())])
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(GpsError::Status(response.status()));
        }

        let body = response.text().await?;
        info!("Location update response: {}", body.trim());
        Ok(is_update_acknowledged(&body))
    }

    /// Fetch the device table and parse it into a snapshot.
    ///
    /// Convenience wrapper: any failure is logged with its specific
    /// cause and collapsed into `None`.
    pub async fn fetch_status(&self) -> Option<VehicleSnapshot> {
        match self.try_fetch_status().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                error!("Error fetching device data: {}", e);
                None
            }
        }
    }

    /// One device-table fetch, surfacing the failure reason.
    pub async fn try_fetch_status(&self) -> Result<VehicleSnapshot, GpsError> {
        let token = self.session.get_token().await?;
        let timestamp = Utc::now().timestamp_millis().to_string();
        let url = format!("{}/{}", self.base_url, DEVICE_TABLE_PATH);

        let response = self
            .client
            .post(&url)
            .query(&[("_nocache", timestamp.as_str())])
            .header("Cookie", format!("PHPSESSID={token}"))
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
            .header("Expires", "0")
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Origin", &self.base_url)
            .header("Referer", format!("{}/map.php", self.base_url))
            .form(&[("imei", self.imei.as_str()), ("_", timestamp.as_str())])
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(GpsError::Status(response.status()));
        }

        let body = response.text().await?;
        // The backend prefixes a UTF-8 BOM that breaks marker search.
        let body = body.strip_prefix('\u{feff}').unwrap_or(&body);

        let json = extract_device_json(body)?;
        parser::parse_device_json(&json, self.display_tz)
    }
}

/// The backend signals a successful update trigger with a body that
/// contains the literal character `1` or `Y`.
fn is_update_acknowledged(body: &str) -> bool {
    body.contains('1') || body.contains('Y')
}

/// Recover the embedded device-table JSON object from the pseudo-JSON
/// response body.
///
/// The body is a JavaScript expression wrapping one object of
/// interest. The object starts at the first `{"customer_info_list":[{`
/// and its inner array ends at the `}]` opening the first
/// `}],"aaData":[` found after it; appending a final `}` closes the
/// outer object again.
fn extract_device_json(body: &str) -> Result<String, GpsError> {
    let start = body.find(TABLE_OPEN_MARKER).ok_or(GpsError::MarkerNotFound)?;
    let close = body[start..]
        .find(TABLE_CLOSE_MARKER)
        .map(|offset| start + offset)
        .ok_or(GpsError::MalformedPayload)?;

    let mut json = body[start..close + 2].to_string();
    json.push('}');
    Ok(json)
}
