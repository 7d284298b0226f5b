//! Calculation logic for the crew pay engine.
//!
//! This module contains the roster pipeline and each of its stages: route
//! normalization, duty classification, duty hour measurement, rate lookup,
//! per-duty pay, layover pairing with per diem, monthly totals, and the
//! display-only allocation of fixed pay across duty types.

mod allocation;
mod classifier;
mod duty_hours;
mod duty_pay;
mod layover_pairing;
mod monthly_totals;
mod pipeline;
mod rate_lookup;
mod rounding;
mod sector;

pub use allocation::allocate_by_duty_type;
pub use classifier::{Classification, classify_row};
pub use duty_hours::{DutySpan, duty_hours_between, measure_duty, parse_roster_time};
pub use duty_pay::{DutyPayInput, DutyPayResult, calculate_duty_pay};
pub use layover_pairing::{PairingOutcome, pair_layovers};
pub use monthly_totals::{MonthPayroll, calculate_monthly_totals, recompute_month};
pub use pipeline::{
    CalculatedDuty, RejectedRow, RosterContext, RosterOutcome, calculate_row,
    process_manual_entry, process_roster, recalculate_edited,
};
pub use rate_lookup::{RateLookupResult, lookup_rate};
pub use rounding::{hours_from_seconds, round_money};
pub use sector::normalize_sectors;
