//! Device table parser.
//!
//! Turns the JSON fragment recovered from the device-table response
//! into a [`VehicleSnapshot`]. Pure transformation, no I/O. The
//! backend is sloppy about types (numbers arrive as strings or as
//! numbers depending on the field and firmware), so every numeric
//! field is parsed leniently with a default of zero.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::error::GpsError;
use super::types::{VehicleActivity, VehicleSnapshot};

/// Server timestamps are `YYYY-MM-DD HH:MM:SS` in UTC.
const SERVER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct DeviceTable {
    #[serde(default)]
    customer_info_list: Vec<RawDeviceInfo>,
}

/// Raw device record as the backend sends it.
#[derive(Debug, Default, Deserialize)]
struct RawDeviceInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    imei: Option<String>,
    #[serde(default)]
    updatetime: Option<String>,
    #[serde(default)]
    gpstime: Option<String>,
    #[serde(default)]
    speed: Option<Value>,
    #[serde(default)]
    online_status: Option<String>,
    #[serde(default)]
    bat: Option<Value>,
    #[serde(default)]
    lat_google: Option<Value>,
    #[serde(default)]
    lng_google: Option<Value>,
}

/// Parse the reconstructed device-table JSON into a snapshot.
///
/// Fails with [`GpsError::Decode`] when the fragment is not valid JSON
/// and [`GpsError::NoDeviceData`] when `customer_info_list` is empty;
/// missing or malformed fields inside the record fall back to defaults
/// instead of failing the whole parse.
pub fn parse_device_json(json: &str, tz: FixedOffset) -> Result<VehicleSnapshot, GpsError> {
    let table: DeviceTable = serde_json::from_str(json)?;
    let info = table
        .customer_info_list
        .into_iter()
        .next()
        .ok_or(GpsError::NoDeviceData)?;

    Ok(VehicleSnapshot {
        name: info.name.unwrap_or_else(|| "Unknown".to_string()),
        imei: info.imei.unwrap_or_else(|| "Unknown".to_string()),
        update_time: parse_server_time(info.updatetime.as_deref(), tz),
        gps_time: parse_server_time(info.gpstime.as_deref(), tz),
        speed: numeric_f64(info.speed.as_ref()).map(|f| f as u32).unwrap_or(0),
        battery: numeric_f64(info.bat.as_ref()).map(|f| f as u8).unwrap_or(0),
        lat: numeric_f64(info.lat_google.as_ref()).unwrap_or(0.0),
        lng: numeric_f64(info.lng_google.as_ref()).unwrap_or(0.0),
        activity: parse_activity(info.online_status.as_deref().unwrap_or("")),
    })
}

/// Parse a server UTC timestamp and shift it into the display zone.
/// A missing or malformed timestamp becomes "now" in the display zone.
fn parse_server_time(raw: Option<&str>, tz: FixedOffset) -> DateTime<FixedOffset> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(s.trim(), SERVER_TIME_FORMAT).ok())
        .map(|dt| dt.and_utc().with_timezone(&tz))
        .unwrap_or_else(|| Utc::now().with_timezone(&tz))
}

/// Accept a numeric field sent either as a JSON number or as a string.
fn numeric_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn static_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^Static(\d+)m").expect("valid regex"))
}

/// Map the raw `online_status` string to a [`VehicleActivity`].
pub(crate) fn parse_activity(raw: &str) -> VehicleActivity {
    if raw.is_empty() {
        return VehicleActivity::Unknown;
    }
    if let Some(caps) = static_pattern().captures(raw) {
        if let Ok(minutes) = caps[1].parse() {
            return VehicleActivity::Stationary { minutes };
        }
    }
    VehicleActivity::Raw(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn riga_winter() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn test_parse_full_record() {
        let json = r#"{"customer_info_list":[{
            "name":"My Car",
            "imei":"860000000000001",
            "updatetime":"2026-03-01 10:00:00",
            "gpstime":"2026-03-01 09:59:30",
            "speed":"42.7",
            "online_status":"Static15m",
            "bat":"88",
            "lat_google":"56.9496",
            "lng_google":24.1052
        }]}"#;

        let snapshot = parse_device_json(json, riga_winter()).unwrap();
        assert_eq!(snapshot.name, "My Car");
        assert_eq!(snapshot.imei, "860000000000001");
        assert_eq!(snapshot.speed, 42);
        assert_eq!(snapshot.battery, 88);
        assert_eq!(snapshot.lat, 56.9496);
        assert_eq!(snapshot.lng, 24.1052);
        assert_eq!(snapshot.activity, VehicleActivity::Stationary { minutes: 15 });
        // 10:00 UTC is 12:00 in Riga winter time
        assert_eq!(
            snapshot.update_time.format("%Y-%m-%d %H:%M:%S %z").to_string(),
            "2026-03-01 12:00:00 +0200"
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let json = r#"{"customer_info_list":[{}]}"#;
        let snapshot = parse_device_json(json, riga_winter()).unwrap();
        assert_eq!(snapshot.name, "Unknown");
        assert_eq!(snapshot.speed, 0);
        assert_eq!(snapshot.battery, 0);
        assert_eq!(snapshot.lat, 0.0);
        assert_eq!(snapshot.lng, 0.0);
        assert_eq!(snapshot.activity, VehicleActivity::Unknown);
    }

    #[test]
    fn test_empty_device_list_is_error() {
        let json = r#"{"customer_info_list":[]}"#;
        assert!(matches!(
            parse_device_json(json, riga_winter()),
            Err(GpsError::NoDeviceData)
        ));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        assert!(matches!(
            parse_device_json("{not json", riga_winter()),
            Err(GpsError::Decode(_))
        ));
    }

    #[test]
    fn test_malformed_timestamp_falls_back_to_now() {
        let tz = riga_winter();
        let json = r#"{"customer_info_list":[{"updatetime":"yesterday-ish"}]}"#;
        let snapshot = parse_device_json(json, tz).unwrap();
        // The fallback must carry the display zone and be roughly "now".
        assert_eq!(snapshot.update_time.offset(), &tz);
        let age = Utc::now().signed_duration_since(snapshot.update_time.with_timezone(&Utc));
        assert!(age.num_seconds().abs() < 60);
    }

    #[test]
    fn test_activity_parsing() {
        assert_eq!(parse_activity(""), VehicleActivity::Unknown);
        assert_eq!(
            parse_activity("Static12m"),
            VehicleActivity::Stationary { minutes: 12 }
        );
        assert_eq!(
            parse_activity("Moving"),
            VehicleActivity::Raw("Moving".to_string())
        );
        // Digits that do not fit the pattern pass through verbatim
        assert_eq!(
            parse_activity("Staticm"),
            VehicleActivity::Raw("Staticm".to_string())
        );
    }

    #[test]
    fn test_numeric_field_tolerates_both_shapes() {
        assert_eq!(numeric_f64(Some(&Value::from(12.5))), Some(12.5));
        assert_eq!(numeric_f64(Some(&Value::from("12.5"))), Some(12.5));
        assert_eq!(numeric_f64(Some(&Value::from(" 7 "))), Some(7.0));
        assert_eq!(numeric_f64(Some(&Value::Null)), None);
        assert_eq!(numeric_f64(None), None);
    }
}
