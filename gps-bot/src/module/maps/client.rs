//! Google Maps client: travel time home and static map images.

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::MapsConfig;

use super::format::duration_ru;

const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    duration: TextValue,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

/// Client for the directions and static-map endpoints.
pub struct MapsClient {
    client: Client,
    api_key: String,
    home_coords: String,
}

impl MapsClient {
    pub fn new(config: &MapsConfig, client: Client) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            home_coords: config.home_coords.clone(),
        }
    }

    /// Driving time from the device's position to home, localized to
    /// Russian. `None` on any failure (logged).
    pub async fn travel_time_home(&self, lat: f64, lng: f64) -> Option<String> {
        match self.try_travel_time(lat, lng).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Error getting travel time: {:#}", e);
                None
            }
        }
    }

    async fn try_travel_time(&self, lat: f64, lng: f64) -> Result<String> {
        let timestamp = Utc::now().timestamp_millis().to_string();
        let response = self
            .client
            .get(DIRECTIONS_URL)
            .query(&[
                ("origin", format!("{lat},{lng}").as_str()),
                ("destination", self.home_coords.as_str()),
                ("mode", "driving"),
                ("key", self.api_key.as_str()),
                ("_", timestamp.as_str()),
            ])
            .send()
            .await
            .context("Failed to GET directions")?;

        let directions: DirectionsResponse = response
            .json()
            .await
            .context("Failed to decode directions response")?;

        if directions.status != "OK" {
            anyhow::bail!("Directions API returned status {}", directions.status);
        }

        let duration = directions
            .routes
            .first()
            .and_then(|r| r.legs.first())
            .map(|l| l.duration.text.as_str())
            .context("Directions response has no routes")?;

        Ok(duration_ru(duration))
    }

    /// Static map image centered on the device, as raw PNG bytes.
    /// `None` on any failure (logged).
    pub async fn static_map(&self, lat: f64, lng: f64) -> Option<Vec<u8>> {
        match self.try_static_map(lat, lng).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Error fetching static map: {:#}", e);
                None
            }
        }
    }

    async fn try_static_map(&self, lat: f64, lng: f64) -> Result<Vec<u8>> {
        let position = format!("{lat},{lng}");
        let response = self
            .client
            .get(STATIC_MAP_URL)
            .query(&[
                ("center", position.as_str()),
                ("zoom", "15"),
                ("size", "600x400"),
                ("markers", format!("color:red|{position}").as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Failed to GET static map")?;

        if !response.status().is_success() {
            anyhow::bail!("Static map returned HTTP {}", response.status());
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read static map body")?;
        Ok(bytes.to_vec())
    }
}
