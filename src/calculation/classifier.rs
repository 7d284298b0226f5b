//! Duty classification.
//!
//! Resolves the free-text duty column of a roster row into a [`DutyType`].
//! Non-flight codes come from the configured duty-code table; anything
//! else must carry flight numbers and a route, and is a turnaround or a
//! layover depending on whether the route returns to the home base.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::{CrewConfig, DutyCode, tokenize};
use crate::error::RowError;
use crate::models::{DutyType, PayPolicy, RawRosterRow, Sector};

use super::sector::normalize_sectors;

/// Two-character airline designator, 1-4 digits, optional suffix letter.
static FLIGHT_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Z]{2}|[A-Z][0-9]|[0-9][A-Z])?[0-9]{1,4}[A-Z]?$")
        .unwrap_or_else(|e| panic!("invalid flight number pattern: {e}"))
});

/// A designator standing alone, as in "EK 201".
static DESIGNATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Z]{2}|[A-Z][0-9]|[0-9][A-Z])$")
        .unwrap_or_else(|e| panic!("invalid designator pattern: {e}"))
});

static FLIGHT_DIGITS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{1,4}[A-Z]?$").unwrap_or_else(|e| panic!("invalid digits pattern: {e}"))
});

/// The outcome of classifying one roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The resolved duty type.
    pub duty_type: DutyType,
    /// The matched duty code, for non-flight duties.
    pub duty_code: Option<String>,
    /// Pay policy of the matched code; standard for flights.
    pub pay_policy: PayPolicy,
    /// Flight numbers in roster order.
    pub flight_numbers: Vec<String>,
    /// Normalized route.
    pub sectors: Vec<Sector>,
}

/// Classifies a roster row.
///
/// Rules are applied in order:
/// 1. A configured duty code whose tokens appear contiguously in the duty
///    text decides the type. Longer codes are tried first.
/// 2. Otherwise the text must contain flight numbers and the row a route.
///    A route of two or more sectors that leaves and returns to the home
///    base is a turnaround; any other flight is a layover leg.
///
/// # Errors
///
/// Returns a [`RowError`] when neither rule yields a type.
///
/// # Example
///
/// ```no_run
/// use crew_pay_engine::calculation::classify_row;
/// use crew_pay_engine::config::ConfigLoader;
/// use crew_pay_engine::models::{DutyType, RawRosterRow};
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/crew").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
///
/// let row = RawRosterRow::new(date, "EK0855/EK0856", "DXB-KWI-DXB");
/// let classification = classify_row(&row, loader.config()).unwrap();
/// assert_eq!(classification.duty_type, DutyType::Turnaround);
/// ```
pub fn classify_row(row: &RawRosterRow, config: &CrewConfig) -> Result<Classification, RowError> {
    let tokens = tokenize(&row.duty_text);

    if let Some(code) = match_duty_code(&tokens, config.duty_codes().codes()) {
        debug!(
            date = %row.date,
            duty_text = %row.duty_text,
            code = %code.code,
            duty_type = %code.duty_type,
            "Classified duty by code"
        );
        return Ok(Classification {
            duty_type: code.duty_type,
            duty_code: Some(code.code.clone()),
            pay_policy: code.pay_policy,
            flight_numbers: Vec::new(),
            // A route on a non-flight row is informational only.
            sectors: normalize_sectors(&row.sector_text).unwrap_or_default(),
        });
    }

    let sectors = normalize_sectors(&row.sector_text)?;
    // Bare digits only count as a flight number on a row with a route.
    let flight_numbers: Vec<String> = extract_flight_numbers(&tokens)
        .into_iter()
        .filter(|flight| !sectors.is_empty() || !FLIGHT_DIGITS.is_match(flight))
        .collect();

    let duty_type = match (flight_numbers.is_empty(), sectors.is_empty()) {
        (false, false) => flight_duty_type(&sectors, config.home_base()),
        (false, true) => {
            return Err(RowError::MissingSector {
                text: row.duty_text.clone(),
            });
        }
        (true, false) => {
            return Err(RowError::MissingFlightNumber {
                text: row.duty_text.clone(),
                sector: row.sector_text.clone(),
            });
        }
        (true, true) => {
            return Err(RowError::UnrecognizedDuty {
                text: row.duty_text.clone(),
            });
        }
    };

    debug!(
        date = %row.date,
        flights = ?flight_numbers,
        sectors = sectors.len(),
        duty_type = %duty_type,
        "Classified flight duty"
    );

    Ok(Classification {
        duty_type,
        duty_code: None,
        pay_policy: PayPolicy::Standard,
        flight_numbers,
        sectors,
    })
}

/// Finds the first code whose tokens occur contiguously in `tokens`.
fn match_duty_code<'a>(tokens: &[String], codes: &'a [DutyCode]) -> Option<&'a DutyCode> {
    codes.iter().find(|code| {
        !code.tokens.is_empty()
            && tokens
                .windows(code.tokens.len())
                .any(|window| window == code.tokens.as_slice())
    })
}

/// Pulls flight numbers out of duty-text tokens.
///
/// A bare designator followed by a digits token ("EK", "201") is joined
/// into one flight number.
fn extract_flight_numbers(tokens: &[String]) -> Vec<String> {
    let mut flights = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let joins_next = DESIGNATOR.is_match(token)
            && token.chars().any(|c| c.is_ascii_alphabetic())
            && tokens.get(i + 1).is_some_and(|next| FLIGHT_DIGITS.is_match(next));

        if joins_next {
            flights.push(format!("{}{}", token, tokens[i + 1]));
            i += 2;
            continue;
        }
        if FLIGHT_NUMBER.is_match(token) {
            flights.push(token.clone());
        }
        i += 1;
    }
    flights
}

/// Turnaround when the route leaves and returns to the home base.
fn flight_duty_type(sectors: &[Sector], home_base: &str) -> DutyType {
    let departs_home = sectors.first().is_some_and(|s| s.origin == home_base);
    let returns_home = sectors.last().is_some_and(|s| s.destination == home_base);
    if sectors.len() >= 2 && departs_home && returns_home {
        DutyType::Turnaround
    } else {
        DutyType::Layover
    }
}
