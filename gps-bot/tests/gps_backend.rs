//! Integration tests for the tracking backend client, run against a
//! wiremock stand-in for the PHP backend.

use std::sync::Arc;

use chrono::FixedOffset;
use gps_bot::config::GpsConfig;
use gps_bot::module::gps::{GpsError, SessionManager, TrackingClient, VehicleActivity};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMEI: &str = "860000000000001";

fn gps_config(base_url: &str, refresh_interval: u64) -> GpsConfig {
    GpsConfig {
        base_url: base_url.to_string(),
        imei: IMEI.to_string(),
        password: "secret".to_string(),
        accept_invalid_certs: false,
        session_refresh_interval: refresh_interval,
        update_retry_count: 1,
        update_retry_delay: 0.0,
    }
}

fn login_success() -> ResponseTemplate {
    ResponseTemplate::new(200).insert_header("set-cookie", "PHPSESSID=abc123; path=/")
}

fn riga_winter() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

fn tracking_client(config: &GpsConfig) -> TrackingClient {
    let http = reqwest::Client::new();
    let session = Arc::new(SessionManager::new(config, http.clone()));
    TrackingClient::new(config, http, session, riga_winter())
}

#[tokio::test]
async fn concurrent_get_token_coalesces_into_one_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .and(body_string_contains(IMEI))
        .respond_with(login_success().set_delay(std::time::Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;

    let config = gps_config(&server.uri(), 3600);
    let session = Arc::new(SessionManager::new(&config, reqwest::Client::new()));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let session = session.clone();
        tasks.push(tokio::spawn(async move { session.get_token().await }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), "abc123");
    }
    // expect(1) is verified when the server drops
}

#[tokio::test]
async fn token_is_reused_within_refresh_interval() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(login_success())
        .expect(1)
        .mount(&server)
        .await;

    let config = gps_config(&server.uri(), 3600);
    let session = SessionManager::new(&config, reqwest::Client::new());

    assert_eq!(session.get_token().await.unwrap(), "abc123");
    assert_eq!(session.get_token().await.unwrap(), "abc123");
}

#[tokio::test]
async fn token_is_refreshed_once_interval_elapses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(login_success())
        .expect(2)
        .mount(&server)
        .await;

    // Zero interval: every get_token call finds the token expired.
    let config = gps_config(&server.uri(), 0);
    let session = SessionManager::new(&config, reqwest::Client::new());

    session.get_token().await.unwrap();
    session.get_token().await.unwrap();
}

#[tokio::test]
async fn failed_refresh_keeps_previous_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(login_success())
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = gps_config(&server.uri(), 0);
    let session = SessionManager::new(&config, reqwest::Client::new());

    assert_eq!(session.get_token().await.unwrap(), "abc123");
    // Second call triggers a refresh that fails; the stale token is
    // still handed out rather than an error.
    assert_eq!(session.get_token().await.unwrap(), "abc123");
}

#[tokio::test]
async fn get_token_without_any_login_is_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = gps_config(&server.uri(), 3600);
    let session = SessionManager::new(&config, reqwest::Client::new());

    assert!(matches!(session.get_token().await, Err(GpsError::NoSession)));
}

#[tokio::test]
async fn login_without_session_cookie_is_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("wrong password"))
        .mount(&server)
        .await;

    let config = gps_config(&server.uri(), 3600);
    let session = SessionManager::new(&config, reqwest::Client::new());

    assert!(matches!(session.get_token().await, Err(GpsError::NoSession)));
}

async fn update_result(status: u16, body: &str) -> bool {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(login_success())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/post_submit_sendloc.php"))
        .and(header("Cookie", "PHPSESSID=abc123"))
        .and(body_string_contains(IMEI))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;

    let config = gps_config(&server.uri(), 3600);
    tracking_client(&config).request_update().await
}

#[tokio::test]
async fn request_update_success_markers() {
    assert!(update_result(200, "...1...").await);
    assert!(update_result(200, "...Y...").await);
    assert!(!update_result(200, "0").await);
    assert!(!update_result(200, "N").await);
    assert!(!update_result(200, "").await);
}

#[tokio::test]
async fn request_update_non_200_is_false_regardless_of_body() {
    assert!(!update_result(500, "1").await);
    assert!(!update_result(404, "Y").await);
}

#[tokio::test]
async fn request_update_retries_up_to_configured_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(login_success())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/post_submit_sendloc.php"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = gps_config(&server.uri(), 3600);
    config.update_retry_count = 3;
    config.update_retry_delay = 0.0;

    assert!(!tracking_client(&config).request_update().await);
}

/// A realistic device-table body: BOM-prefixed JavaScript with the
/// one interesting JSON object buried inside it.
fn device_table_body() -> String {
    format!(
        "\u{feff}var table = {{\"sEcho\":1,\"iTotalRecords\":1,\
         {open}\"name\":\"My Car\",\"imei\":\"{IMEI}\",\
         \"updatetime\":\"2026-03-01 10:00:00\",\
         \"gpstime\":\"2026-03-01 09:59:30\",\
         \"speed\":\"42.7\",\"online_status\":\"Static15m\",\
         \"bat\":\"88\",\"lat_google\":\"56.9496\",\"lng_google\":\"24.1052\"\
         {close}[\"1\",\"My Car\"]]}};",
        open = "{\"customer_info_list\":[{",
        close = "}],\"aaData\":[",
    )
}

#[tokio::test]
async fn fetch_status_recovers_snapshot_from_pseudo_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(login_success())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/post_device_table_list.php"))
        .and(header("Cookie", "PHPSESSID=abc123"))
        .and(body_string_contains(IMEI))
        .respond_with(ResponseTemplate::new(200).set_body_string(device_table_body()))
        .mount(&server)
        .await;

    let config = gps_config(&server.uri(), 3600);
    let snapshot = tracking_client(&config)
        .fetch_status()
        .await
        .expect("snapshot");

    assert_eq!(snapshot.name, "My Car");
    assert_eq!(snapshot.imei, IMEI);
    assert_eq!(snapshot.speed, 42);
    assert_eq!(snapshot.battery, 88);
    assert_eq!(snapshot.lat, 56.9496);
    assert_eq!(snapshot.lng, 24.1052);
    assert_eq!(snapshot.activity, VehicleActivity::Stationary { minutes: 15 });
    // 10:00 UTC shifted into the +02:00 display zone
    assert_eq!(
        snapshot.update_time.format("%d.%m.%Y %H:%M").to_string(),
        "01.03.2026 12:00"
    );
}

#[tokio::test]
async fn fetch_status_reports_marker_failures_distinctly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(login_success())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/post_device_table_list.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login expired</html>"))
        .mount(&server)
        .await;

    let config = gps_config(&server.uri(), 3600);
    let client = tracking_client(&config);

    assert!(matches!(
        client.try_fetch_status().await,
        Err(GpsError::MarkerNotFound)
    ));
    assert!(client.fetch_status().await.is_none());
}

#[tokio::test]
async fn fetch_status_without_session_is_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/npost_login.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = gps_config(&server.uri(), 3600);
    let client = tracking_client(&config);

    assert!(matches!(
        client.try_fetch_status().await,
        Err(GpsError::NoSession)
    ));
    assert!(client.fetch_status().await.is_none());
}
