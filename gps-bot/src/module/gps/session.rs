//! Session lifecycle for the tracking backend.
//!
//! The backend is a plain PHP site: authentication is a form login
//! that hands back a `PHPSESSID` cookie, and that cookie ages out
//! server-side. The manager caches the cookie and re-logs-in once it
//! is older than the configured refresh interval. Refresh failures
//! are logged and keep the previous cookie in place; downstream calls
//! then fail on their own terms.

use reqwest::Client;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{error, info};

use crate::config::GpsConfig;

use super::error::GpsError;

const LOGIN_PATH: &str = "npost_login.php";

#[derive(Default)]
struct SessionState {
    token: Option<String>,
    fetched_at: Option<Instant>,
}

/// Owns the authenticated session token and its refresh schedule.
pub struct SessionManager {
    client: Client,
    base_url: String,
    imei: String,
    password: String,
    refresh_interval: Duration,
    // Held across the whole refresh so concurrent callers coalesce
    // into a single in-flight login.
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(config: &GpsConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            imei: config.imei.clone(),
            password: config.password.clone(),
            refresh_interval: Duration::from_secs(config.session_refresh_interval),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Return a currently-valid session token, logging in first if no
    /// token exists or the cached one has outlived the refresh
    /// interval. Callers arriving while a refresh is in flight wait on
    /// the lock and reuse its result instead of starting their own.
    pub async fn get_token(&self) -> Result<String, GpsError> {
        let mut state = self.state.lock().await;

        let expired = match (&state.token, state.fetched_at) {
            (Some(_), Some(at)) => at.elapsed() >= self.refresh_interval,
            _ => true,
        };
        if expired {
            self.refresh_locked(&mut state).await;
        }

        state.token.clone().ok_or(GpsError::NoSession)
    }

    /// Force a login handshake regardless of token age.
    pub async fn refresh(&self) {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await;
    }

    /// Perform the login POST and store the resulting `PHPSESSID`.
    ///
    /// Best effort: every failure path logs and leaves the previous
    /// token (if any) untouched.
    async fn refresh_locked(&self, state: &mut SessionState) {
        let url = format!("{}/{}", self.base_url, LOGIN_PATH);
        let form = [
            ("demo", "F"),
            ("username", self.imei.as_str()),
            ("password", self.password.as_str()),
            ("save_pwd", "1"),
            ("form_type", "0"),
        ];

        let result = self
            .client
            .post(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Accept", "text/plain, */*; q=0.01")
            .header("Origin", &self.base_url)
            .header("Referer", format!("{}/login.php", self.base_url))
            .form(&form)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                error!("Error refreshing session: {}", e);
                return;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            error!("Failed to refresh session. Status: {}", response.status());
            return;
        }

        match response.cookies().find(|c| c.name() == "PHPSESSID") {
            Some(cookie) => {
                state.token = Some(cookie.value().to_string());
                state.fetched_at = Some(Instant::now());
                info!("Successfully refreshed session");
            }
            None => {
                error!("Login response did not set a PHPSESSID cookie");
            }
        }
    }
}
