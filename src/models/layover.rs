//! Layover pairing models.
//!
//! A [`LayoverPair`] is derived from two layover duty records and is never
//! edited on its own. It refers to the duties by id; the duty set keeps
//! ownership of the records.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BucketMonth;

/// An outbound leg bound to its return leg, with the rest between them.
///
/// # Example
///
/// ```
/// use crew_pay_engine::models::{BucketMonth, LayoverPair};
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
/// use std::str::FromStr;
///
/// let pair = LayoverPair {
///     outbound_id: Uuid::new_v4(),
///     inbound_id: Uuid::new_v4(),
///     bucket: BucketMonth::new(3, 2024).unwrap(),
///     layover_station: "ZAG".to_string(),
///     rest_start: NaiveDateTime::parse_from_str("2024-03-04 14:00", "%Y-%m-%d %H:%M").unwrap(),
///     rest_end: NaiveDateTime::parse_from_str("2024-03-05 13:30", "%Y-%m-%d %H:%M").unwrap(),
///     rest_hours: Decimal::from_str("23.5").unwrap(),
///     per_diem_rate: Decimal::from_str("8.82").unwrap(),
///     per_diem_pay: Decimal::from_str("207.27").unwrap(),
/// };
/// assert!(pair.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoverPair {
    /// The leg flying away from the home base.
    pub outbound_id: Uuid,
    /// The leg flying back.
    pub inbound_id: Uuid,
    /// Payroll period of the outbound leg; the pair's per diem counts there.
    pub bucket: BucketMonth,
    /// Where the crew rested.
    pub layover_station: String,
    /// Outbound debrief.
    pub rest_start: NaiveDateTime,
    /// Inbound report.
    pub rest_end: NaiveDateTime,
    /// Rest length in decimal hours.
    pub rest_hours: Decimal,
    /// Per-diem rate per rest hour applied.
    pub per_diem_rate: Decimal,
    /// Per-diem allowance for this rest period.
    pub per_diem_pay: Decimal,
}

impl LayoverPair {
    /// Returns true if the rest period is positive.
    pub fn is_valid(&self) -> bool {
        self.rest_hours > Decimal::ZERO
    }

    /// Returns true if the duty is either leg of this pair.
    pub fn involves(&self, duty_id: Uuid) -> bool {
        self.outbound_id == duty_id || self.inbound_id == duty_id
    }
}

/// Why a layover leg was left without a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnpairedReason {
    /// No later leg returns from this leg's destination.
    NoReturnLeg,
    /// The leg does not fit either side of a pair (for example a return
    /// leg whose outbound is outside the supplied duties).
    NoOutboundLeg,
    /// The nearest return leg gave a non-positive rest and was rejected.
    RejectedRest,
    /// The per-diem rate for the outbound date is missing.
    MissingRate,
}

impl std::fmt::Display for UnpairedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnpairedReason::NoReturnLeg => write!(f, "no pair found: no return leg"),
            UnpairedReason::NoOutboundLeg => write!(f, "no pair found: no outbound leg"),
            UnpairedReason::RejectedRest => {
                write!(f, "no pair found: nearest return leg gives no rest")
            }
            UnpairedReason::MissingRate => write!(f, "no pair found: per-diem rate missing"),
        }
    }
}

/// A layover leg that stays visible in an explicit "no pair found" state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpairedLayover {
    /// The leg.
    pub duty_id: Uuid,
    /// Payroll period of the leg.
    pub bucket: BucketMonth,
    /// Why no pair was formed.
    pub reason: UnpairedReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_pair_involves_both_legs_only() {
        let outbound = Uuid::new_v4();
        let inbound = Uuid::new_v4();
        let pair = LayoverPair {
            outbound_id: outbound,
            inbound_id: inbound,
            bucket: BucketMonth::new(3, 2024).unwrap(),
            layover_station: "ZAG".to_string(),
            rest_start: make_datetime("2024-03-04 14:00"),
            rest_end: make_datetime("2024-03-05 13:30"),
            rest_hours: Decimal::from_str("23.5").unwrap(),
            per_diem_rate: Decimal::from_str("8.82").unwrap(),
            per_diem_pay: Decimal::from_str("207.27").unwrap(),
        };
        assert!(pair.involves(outbound));
        assert!(pair.involves(inbound));
        assert!(!pair.involves(Uuid::new_v4()));
    }

    #[test]
    fn test_unpaired_reason_display_states_no_pair() {
        assert!(UnpairedReason::NoReturnLeg.to_string().starts_with("no pair found"));
        assert_eq!(
            serde_json::to_string(&UnpairedReason::RejectedRest).unwrap(),
            "\"rejected_rest\""
        );
    }
}
