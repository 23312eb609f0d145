//! Russian localization of Google Directions duration strings.
//!
//! The Directions API only returns English duration text
//! ("5 mins", "1 hour 12 mins"); this rewrites it with properly
//! declined Russian time units.

use crate::lang;

/// Localize an English duration string.
///
/// Unrecognized input is passed through verbatim.
pub fn duration_ru(text: &str) -> String {
    let parts: Vec<&str> = text.split_whitespace().collect();

    if text.contains("hour") {
        let hours: u64 = parts.first().and_then(|p| p.parse().ok()).unwrap_or(0);
        // "1 hour 12 mins" puts the minute count in the third token
        let minutes: u64 = parts.get(2).and_then(|p| p.parse().ok()).unwrap_or(0);

        let mut out = format!("{} {}", hours, hour_word(hours));
        if minutes > 0 {
            out.push_str(&format!(" {} {}", minutes, minute_word(minutes)));
        }
        out
    } else if text.contains("min") {
        let minutes: u64 = parts.first().and_then(|p| p.parse().ok()).unwrap_or(0);
        format!("{} {}", minutes, minute_word(minutes))
    } else {
        text.to_string()
    }
}

fn minute_word(n: u64) -> &'static str {
    if n % 10 == 1 && n % 100 != 11 {
        lang::MINUTE_1
    } else if (2..=4).contains(&(n % 10)) && !(12..=14).contains(&(n % 100)) {
        lang::MINUTE_2_4
    } else {
        lang::MINUTE_5_20
    }
}

fn hour_word(n: u64) -> &'static str {
    if n % 10 == 1 && n % 100 != 11 {
        lang::HOUR_1
    } else if (2..=4).contains(&(n % 10)) && !(12..=14).contains(&(n % 100)) {
        lang::HOUR_2_4
    } else {
        lang::HOUR_5_20
    }
}
