//! Route normalization.
//!
//! Rosters write routes as `DXB-ZAG`, `DXB → ZAG`, or a flat list such as
//! `["DXB", "ZAG", "DXB"]`. All of them reduce to the same ordered list of
//! [`Sector`]s so that classification and pairing never see the format.

use crate::error::RowError;
use crate::models::{Sector, is_airport_code};

fn is_route_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '-' | '–' | '—' | '→' | '>' | ',' | '/' | '[' | ']' | '"' | '\''
        )
}

/// Normalizes a route string into consecutive airport-pair sectors.
///
/// Consecutive repeats of the same airport collapse, so
/// `DXB-ZAG/ZAG-DXB` is the round trip `DXB-ZAG, ZAG-DXB`. Blank input is
/// an empty route, not an error.
///
/// # Errors
///
/// Returns [`RowError::MalformedSector`] if a piece is not a three-letter
/// airport code or the route names only one airport.
///
/// # Example
///
/// ```
/// use crew_pay_engine::calculation::normalize_sectors;
///
/// let dashed = normalize_sectors("DXB-ZAG").unwrap();
/// let arrow = normalize_sectors("DXB → ZAG").unwrap();
/// let listed = normalize_sectors(r#"["DXB","ZAG"]"#).unwrap();
/// assert_eq!(dashed, arrow);
/// assert_eq!(dashed, listed);
/// assert_eq!(dashed[0].to_string(), "DXB-ZAG");
/// ```
pub fn normalize_sectors(text: &str) -> Result<Vec<Sector>, RowError> {
    let mut airports: Vec<String> = Vec::new();

    for piece in text.split(is_route_separator).filter(|p| !p.is_empty()) {
        if !is_airport_code(piece) {
            return Err(RowError::MalformedSector {
                text: text.to_string(),
                reason: format!("'{}' is not an airport code", piece),
            });
        }
        let code = piece.to_ascii_uppercase();
        if airports.last() != Some(&code) {
            airports.push(code);
        }
    }

    match airports.len() {
        0 => Ok(Vec::new()),
        1 => Err(RowError::MalformedSector {
            text: text.to_string(),
            reason: "a route needs at least two airports".to_string(),
        }),
        _ => Ok(airports
            .windows(2)
            .filter_map(|w| Sector::new(&w[0], &w[1]))
            .collect()),
    }
}
