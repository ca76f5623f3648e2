use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::observer::error::LocationError;
use crate::observer::observer::ObserverState;

const NUMBER: &str = r"[+-]?\d+(?:\.\d+)?";

/// `lat, lon[, elev]` in signed decimal degrees.
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({n})\s*(?:,\s*|\s+)({n})(?:\s*(?:,\s*|\s+)({n})\s*m?)?$",
        n = NUMBER
    ))
    .expect("decimal coordinate pattern")
});

/// Degrees with optional minutes and seconds, then the hemisphere letter.
fn hemisphere_coordinate(hemispheres: &str) -> String {
    let part = r"(\d+(?:\.\d+)?)";
    format!(
        concat!(
            r"{p}(?:\s*[°:d]\s*{p}",
            r"(?:\s*['′:m]\s*{p}\s*(?:[\x22″s]|'')?)?\s*['′]?)?",
            r"\s*([{h}])"
        ),
        p = part,
        h = hemispheres
    )
}

static SEXAGESIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^{}\s*(?:,\s*|\s+)?{}(?:\s*(?:,\s*|\s+)({})\s*m?)?$",
        hemisphere_coordinate("NS"),
        hemisphere_coordinate("EW"),
        NUMBER
    ))
    .expect("sexagesimal coordinate pattern")
});

/// Free-text observer input, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Coordinates(ObserverState),
    Place(String),
}

/// Accepts `lat, lon[, elev]` in decimal degrees, sexagesimal with
/// hemisphere letters (`32:26:54N 99:44:01W`, `32°26'54"N 99°44'1"W`) or
/// decimal with hemisphere letters. Anything else is a place name.
pub fn parse_location(input: &str) -> Result<LocationInput, LocationError> {
    let input = input.trim();

    if let Some(caps) = DECIMAL.captures(input) {
        let lat = number(&caps, 1);
        let lon = number(&caps, 2);
        let elevation = caps.get(3).map(|m| parse_f64(m.as_str())).unwrap_or(0.0);
        return Ok(LocationInput::Coordinates(checked(lat, lon, elevation, input)?));
    }

    if let Some(caps) = SEXAGESIMAL.captures(input) {
        let lat = dms(&caps, 1)?;
        let lon = dms(&caps, 5)?;
        let elevation = caps.get(9).map(|m| parse_f64(m.as_str())).unwrap_or(0.0);
        return Ok(LocationInput::Coordinates(checked(lat, lon, elevation, input)?));
    }

    if input.is_empty() {
        return Err(LocationError::NotFound(String::new()));
    }
    Ok(LocationInput::Place(input.to_string()))
}

/// Degrees, minutes, seconds and hemisphere starting at capture `first`.
fn dms(caps: &Captures, first: usize) -> Result<f64, LocationError> {
    let degrees = number(caps, first);
    let minutes = caps.get(first + 1).map(|m| parse_f64(m.as_str())).unwrap_or(0.0);
    let seconds = caps.get(first + 2).map(|m| parse_f64(m.as_str())).unwrap_or(0.0);
    if minutes >= 60.0 || seconds >= 60.0 {
        return Err(LocationError::Coordinates(caps[0].to_string()));
    }
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    let hemisphere = caps
        .get(first + 3)
        .map(|m| m.as_str().to_ascii_uppercase())
        .unwrap_or_default();
    Ok(match hemisphere.as_str() {
        "S" | "W" => -value,
        _ => value,
    })
}

fn number(caps: &Captures, idx: usize) -> f64 {
    caps.get(idx).map(|m| parse_f64(m.as_str())).unwrap_or(0.0)
}

fn parse_f64(s: &str) -> f64 {
    s.parse().unwrap_or(0.0)
}

fn checked(
    lat: f64,
    lon: f64,
    elevation: f64,
    input: &str,
) -> Result<ObserverState, LocationError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(LocationError::Coordinates(input.to_string()));
    }
    Ok(ObserverState::new(lat, lon, elevation))
}
