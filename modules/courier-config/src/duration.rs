//! Parses short-form durations (`5m`, `2s`, `24h`, compound forms like
//! `1h30m`) as they appear in config files, without pulling in a
//! dedicated duration crate for four unit suffixes.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Parse a duration string made of one or more `<number><unit>` pairs
/// back to back (e.g. `"5m"`, `"1h30m"`, `"24h"`). A bare number with
/// no unit is treated as whole seconds. Recognized units: `s`
/// (seconds), `m` (minutes), `h` (hours), `d` (days).
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ConfigError::InvalidDuration(input.to_string()));
    }

    if let Ok(seconds) = input.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let mut total = Duration::ZERO;
    let mut digits = String::new();
    let mut saw_component = false;

    for ch in input.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        if digits.is_empty() {
            return Err(ConfigError::InvalidDuration(input.to_string()));
        }

        let amount: u64 = digits
            .parse()
            .map_err(|_| ConfigError::InvalidDuration(input.to_string()))?;
        digits.clear();

        let unit_seconds = match ch {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return Err(ConfigError::InvalidDuration(input.to_string())),
        };

        total += Duration::from_secs(amount * unit_seconds);
        saw_component = true;
    }

    if !digits.is_empty() || !saw_component {
        return Err(ConfigError::InvalidDuration(input.to_string()));
    }

    Ok(total)
}

pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}
