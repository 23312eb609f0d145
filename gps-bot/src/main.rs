use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use gps_bot::config;
use gps_bot::frontend::telegram::TelegramClient;
use gps_bot::module::gps::{BROWSER_USER_AGENT, SessionManager, TrackingClient};
use gps_bot::module::handler::BotHandler;
use gps_bot::module::maps::MapsClient;

#[tokio::main]
async fn main() -> Result<()> {
    config::read_config()?;
    let config = config::CONFIG.get().unwrap();

    let _logging_guard =
        gps_bot::logging::init_logging("logs", "gps-bot", &config.app.log_level);

    tracing::info!("GPS bot starting...");
    let display_tz = config.display_timezone()?;

    // One pooled client for the whole process, dropped on shutdown.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    // The tracking backend optionally gets its own client so that
    // disabling certificate checks never touches Telegram or Maps
    // traffic.
    let tracking_http = if config.gps.accept_invalid_certs {
        tracing::warn!("TLS certificate verification is disabled for the tracking backend");
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(BROWSER_USER_AGENT)
            .danger_accept_invalid_certs(true)
            .build()
            .context("Failed to build tracking HTTP client")?
    } else {
        client.clone()
    };

    let session = Arc::new(SessionManager::new(&config.gps, tracking_http.clone()));

    // Prime the session once at startup; a failure here is tolerated,
    // the next user action will retry the login.
    if let Err(e) = session.get_token().await {
        tracing::warn!("Initial login failed: {}", e);
    }

    let gps = TrackingClient::new(&config.gps, tracking_http, session, display_tz);
    let maps = MapsClient::new(&config.maps, client.clone());
    let telegram = TelegramClient::new(&config.telegram.bot_token, client);

    BotHandler::new(telegram, gps, maps).run().await
}
