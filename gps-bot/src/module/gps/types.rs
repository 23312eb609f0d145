//! Vehicle status data types.

use chrono::{DateTime, FixedOffset};

/// What the tracker reports the vehicle to be doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleActivity {
    /// The backend sent an empty status string.
    Unknown,
    /// Recognized `Static<N>m` status: stationary for N minutes.
    Stationary { minutes: u32 },
    /// Anything else is passed through verbatim, untranslated.
    Raw(String),
}

/// One immutable reading of the device's current reported state.
///
/// Built fresh from each device-table fetch and discarded after being
/// rendered; nothing is persisted across fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    pub name: String,
    pub imei: String,
    /// Last update time, shifted into the configured display timezone.
    pub update_time: DateTime<FixedOffset>,
    /// Last GPS fix time, shifted into the configured display timezone.
    pub gps_time: DateTime<FixedOffset>,
    /// Speed in km/h, truncated to whole units.
    pub speed: u32,
    /// Battery percentage as reported (0–100 nominal, not validated).
    pub battery: u8,
    /// WGS84 degrees.
    pub lat: f64,
    pub lng: f64,
    pub activity: VehicleActivity,
}
