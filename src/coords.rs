//! UNLOCODE coordinate notation.
//!
//! The `coordinates` column holds `DDMMH DDDMMH`, e.g. `5155N 00430E`:
//! degrees, two digits of minutes, then the hemisphere letter.

use crate::geocode::Position;

/// Parse `"5155N 00430E"` into decimal degrees. Malformed input gives `None`.
pub fn parse_unlocode_coordinates(text: &str) -> Option<Position> {
    let mut tokens = text.split_whitespace();
    let lat = parse_component(tokens.next()?, 'N', 'S', 90.0)?;
    let lng = parse_component(tokens.next()?, 'E', 'W', 180.0)?;
    Some(Position::new(lat, lng))
}

/// One `DDMMH` / `DDDMMH` token.
fn parse_component(token: &str, positive: char, negative: char, limit: f64) -> Option<f64> {
    if !token.is_ascii() || token.len() < 4 {
        return None;
    }
    let (digits, hemisphere) = token.split_at(token.len() - 1);
    let (degrees, minutes) = digits.split_at(digits.len() - 2);
    if !degrees.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let degrees: f64 = degrees.parse().ok()?;
    let minutes: f64 = minutes.parse().ok()?;
    if minutes >= 60.0 {
        return None;
    }
    let value = degrees + minutes / 60.0;
    if value > limit {
        return None;
    }

    match hemisphere.chars().next()?.to_ascii_uppercase() {
        c if c == positive => Some(value),
        c if c == negative => Some(-value),
        _ => None,
    }
}

/// Render a position as `"lat lng"` with four decimals.
pub fn format_position(pos: Position) -> String {
    format!("{:.4} {:.4}", pos.lat, pos.lng)
}
