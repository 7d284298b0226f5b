//! Configuration types for roster interpretation and pay.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, and the immutable
//! [`RateTable`] and [`DutyCodeTable`] built from them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{DutyType, PayPolicy, Position, is_airport_code};

/// Metadata about the airline the rosters belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirlineMetadata {
    /// The airline designator (e.g., "EK").
    pub code: String,
    /// The human-readable airline name.
    pub name: String,
    /// IATA code of the crew base; decides turnaround vs layover.
    pub home_base: String,
    /// Currency all amounts are expressed in.
    pub currency: String,
}

/// One entry of `duty_codes.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyCodeEntry {
    /// The code as written on rosters, possibly several words.
    pub code: String,
    /// The duty type it stands for.
    pub duty_type: DutyType,
    /// How the code is paid.
    #[serde(default)]
    pub pay_policy: PayPolicy,
}

/// Duty codes configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct DutyCodesConfig {
    /// Codes in file order.
    pub codes: Vec<DutyCodeEntry>,
}

/// A duty code prepared for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyCode {
    /// The code as configured.
    pub code: String,
    /// Upper-cased alphanumeric tokens of the code.
    pub tokens: Vec<String>,
    /// The duty type it stands for.
    pub duty_type: DutyType,
    /// How the code is paid.
    pub pay_policy: PayPolicy,
}

/// Splits text into upper-cased alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_uppercase())
        .collect()
}

/// The non-flight duty codes, ordered for matching.
///
/// Codes with more tokens come first so that "TRG ASBY" is tried before
/// "ASBY" and "DAY OFF" before "OFF". Ties keep file order.
#[derive(Debug, Clone, Default)]
pub struct DutyCodeTable {
    codes: Vec<DutyCode>,
}

impl DutyCodeTable {
    /// Builds the table, rejecting empty codes and flight duty types.
    pub fn new(entries: Vec<DutyCodeEntry>) -> EngineResult<Self> {
        let mut codes = Vec::with_capacity(entries.len());
        for entry in entries {
            let tokens = tokenize(&entry.code);
            if tokens.is_empty() {
                return Err(EngineError::InvalidConfig {
                    message: format!("duty code '{}' has no alphanumeric characters", entry.code),
                });
            }
            if entry.duty_type.is_flight() {
                return Err(EngineError::InvalidConfig {
                    message: format!(
                        "duty code '{}' maps to {}, which is classified from flight numbers",
                        entry.code, entry.duty_type
                    ),
                });
            }
            codes.push(DutyCode {
                code: entry.code,
                tokens,
                duty_type: entry.duty_type,
                pay_policy: entry.pay_policy,
            });
        }
        codes.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));
        Ok(Self { codes })
    }

    /// Codes in matching order.
    pub fn codes(&self) -> &[DutyCode] {
        &self.codes
    }
}

/// Pay parameters for one position from one effective date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    /// Pay per duty hour for flight, training and promotion duties.
    pub hourly_flight_rate: Decimal,
    /// Per-diem allowance per layover rest hour.
    pub per_diem_rate_per_hour: Decimal,
    /// Hours credited for an airport standby.
    pub asby_paid_hours: Decimal,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Monthly housing allowance.
    pub housing_allowance: Decimal,
    /// Monthly transport allowance.
    pub transport_allowance: Decimal,
}

impl RateEntry {
    /// Fixed monthly pay: basic plus housing plus transport.
    pub fn fixed_total(&self) -> Decimal {
        self.basic_salary + self.housing_allowance + self.transport_allowance
    }
}

/// Rate configuration for a specific effective date (one `rates/*.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    /// The first date these rates apply to.
    pub effective_from: NaiveDate,
    /// Rates by position.
    pub positions: BTreeMap<Position, RateEntry>,
}

/// Versioned, immutable pay parameters.
///
/// A new effective date adds a version instead of changing an old one, so
/// any historical month recomputes to the same figures.
///
/// # Example
///
/// ```
/// use crew_pay_engine::config::{RateConfig, RateEntry, RateTable};
/// use crew_pay_engine::models::Position;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let entry = RateEntry {
///     hourly_flight_rate: Decimal::new(50, 0),
///     per_diem_rate_per_hour: Decimal::new(882, 2),
///     asby_paid_hours: Decimal::new(4, 0),
///     basic_salary: Decimal::new(3275, 0),
///     housing_allowance: Decimal::new(4000, 0),
///     transport_allowance: Decimal::new(1000, 0),
/// };
/// let table = RateTable::new(vec![RateConfig {
///     effective_from: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
///     positions: BTreeMap::from([(Position::Ccm, entry)]),
/// }]).unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// assert_eq!(table.lookup(Position::Ccm, date).unwrap().hourly_flight_rate, Decimal::new(50, 0));
/// assert!(table.lookup(Position::Sccm, date).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RateTable {
    /// Versions sorted oldest first.
    versions: Vec<RateConfig>,
}

impl RateTable {
    /// Builds the table, sorting versions and rejecting duplicate dates.
    pub fn new(versions: Vec<RateConfig>) -> EngineResult<Self> {
        let mut sorted = versions;
        sorted.sort_by(|a, b| a.effective_from.cmp(&b.effective_from));
        if let Some(pair) = sorted
            .windows(2)
            .find(|w| w[0].effective_from == w[1].effective_from)
        {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "two rate tables share effective date {}",
                    pair[0].effective_from
                ),
            });
        }
        Ok(Self { versions: sorted })
    }

    /// All versions, oldest first.
    pub fn versions(&self) -> &[RateConfig] {
        &self.versions
    }

    /// Finds the version and entry with the latest `effective_from` on or
    /// before `date` that has a row for `position`.
    pub fn lookup_version(
        &self,
        position: Position,
        date: NaiveDate,
    ) -> EngineResult<(NaiveDate, &RateEntry)> {
        self.versions
            .iter()
            .rev()
            .filter(|v| v.effective_from <= date)
            .find_map(|v| v.positions.get(&position).map(|e| (v.effective_from, e)))
            .ok_or(EngineError::RateNotFound { position, date })
    }

    /// Finds the entry applicable to `position` on `date`.
    pub fn lookup(&self, position: Position, date: NaiveDate) -> EngineResult<&RateEntry> {
        self.lookup_version(position, date).map(|(_, entry)| entry)
    }
}

/// The complete configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct CrewConfig {
    /// Airline metadata.
    airline: AirlineMetadata,
    /// Non-flight duty codes.
    duty_codes: DutyCodeTable,
    /// Versioned rates.
    rates: RateTable,
}

impl CrewConfig {
    /// Creates a new CrewConfig from its component parts.
    pub fn new(
        airline: AirlineMetadata,
        duty_codes: DutyCodeTable,
        rates: RateTable,
    ) -> EngineResult<Self> {
        if !is_airport_code(&airline.home_base) {
            return Err(EngineError::InvalidConfig {
                message: format!("home base '{}' is not an IATA code", airline.home_base),
            });
        }
        let mut airline = airline;
        airline.home_base = airline.home_base.to_ascii_uppercase();
        Ok(Self {
            airline,
            duty_codes,
            rates,
        })
    }

    /// Returns the airline metadata.
    pub fn airline(&self) -> &AirlineMetadata {
        &self.airline
    }

    /// Returns the crew base airport.
    pub fn home_base(&self) -> &str {
        &self.airline.home_base
    }

    /// Returns the duty code table.
    pub fn duty_codes(&self) -> &DutyCodeTable {
        &self.duty_codes
    }

    /// Returns the rate table.
    pub fn rates(&self) -> &RateTable {
        &self.rates
    }
}
