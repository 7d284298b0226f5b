//! Per-duty pay calculation.
//!
//! Each duty type has exactly one pay rule, selected by an exhaustive
//! match so that adding a duty type cannot silently fall through to zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::RateTable;
use crate::error::CalculationError;
use crate::models::{AuditStep, DutyType, PayPolicy, Position};

use super::rate_lookup::lookup_rate;
use super::rounding::round_money;

/// What the pay rule needs to know about a classified, measured duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyPayInput {
    /// Duty date; selects the rate version.
    pub date: NaiveDate,
    /// Crew position; selects the rate row.
    pub position: Position,
    /// The classified duty type.
    pub duty_type: DutyType,
    /// Pay policy of the matched duty code.
    pub pay_policy: PayPolicy,
    /// Measured duty hours.
    pub duty_hours: Decimal,
}

/// The result of a duty pay calculation.
#[derive(Debug, Clone)]
pub struct DutyPayResult {
    /// Pay for this duty, rounded to cents.
    pub flight_pay: Decimal,
    /// Hours the pay was computed on.
    pub paid_hours: Decimal,
    /// Audit steps recording the rate lookup (if any) and the pay rule.
    pub audit_steps: Vec<AuditStep>,
}

enum PayRule {
    Hourly,
    AirportStandby,
    Unpaid,
}

impl PayRule {
    fn for_duty(duty_type: DutyType, pay_policy: PayPolicy) -> Self {
        if pay_policy == PayPolicy::Unpaid {
            return PayRule::Unpaid;
        }
        match duty_type {
            DutyType::Turnaround
            | DutyType::Layover
            | DutyType::Recurrent
            | DutyType::BusinessPromotion => PayRule::Hourly,
            DutyType::Asby => PayRule::AirportStandby,
            DutyType::Sby | DutyType::Off | DutyType::Rest | DutyType::AnnualLeave => {
                PayRule::Unpaid
            }
        }
    }
}

/// Calculates the pay earned by a single duty.
///
/// - Turnaround, layover, recurrent and business promotion: hourly flight
///   rate times duty hours.
/// - Airport standby: hourly flight rate times the configured standby
///   hours, independent of the span.
/// - Home standby, off, rest, annual leave, and any code with the unpaid
///   policy: zero, without a rate lookup.
///
/// # Errors
///
/// Returns [`CalculationError::RateNotFound`] if a paid duty has no rate
/// on its date.
///
/// # Example
///
/// ```no_run
/// use crew_pay_engine::calculation::{DutyPayInput, calculate_duty_pay};
/// use crew_pay_engine::config::ConfigLoader;
/// use crew_pay_engine::models::{DutyType, PayPolicy, Position};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/crew").unwrap();
/// let input = DutyPayInput {
///     date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
///     position: Position::Ccm,
///     duty_type: DutyType::Layover,
///     pay_policy: PayPolicy::Standard,
///     duty_hours: Decimal::new(725, 2),
/// };
/// let result = calculate_duty_pay(&input, loader.config().rates(), 1).unwrap();
/// assert_eq!(result.flight_pay, Decimal::new(36250, 2));
/// ```
pub fn calculate_duty_pay(
    input: &DutyPayInput,
    rates: &RateTable,
    step_number: u32,
) -> Result<DutyPayResult, CalculationError> {
    let rule = PayRule::for_duty(input.duty_type, input.pay_policy);

    let (flight_pay, paid_hours, rate_step, rule_id, reasoning) = match rule {
        PayRule::Hourly => {
            let lookup = lookup_rate(input.position, input.date, rates, step_number)?;
            let rate = lookup.entry.hourly_flight_rate;
            let pay = round_money(input.duty_hours * rate);
            (
                pay,
                input.duty_hours,
                Some(lookup.audit_step),
                "hourly_duty_pay",
                format!(
                    "{} paid {} hours x ${}/hr = ${}",
                    input.duty_type, input.duty_hours, rate, pay
                ),
            )
        }
        PayRule::AirportStandby => {
            let lookup = lookup_rate(input.position, input.date, rates, step_number)?;
            let rate = lookup.entry.hourly_flight_rate;
            let hours = lookup.entry.asby_paid_hours;
            let pay = round_money(hours * rate);
            (
                pay,
                hours,
                Some(lookup.audit_step),
                "asby_pay",
                format!(
                    "Airport standby credited {} hours x ${}/hr = ${}",
                    hours, rate, pay
                ),
            )
        }
        PayRule::Unpaid => (
            Decimal::ZERO,
            Decimal::ZERO,
            None,
            "unpaid_duty",
            format!("{} earns no variable pay", input.duty_type),
        ),
    };

    let pay_step_number = if rate_step.is_some() {
        step_number + 1
    } else {
        step_number
    };

    let pay_step = AuditStep {
        step_number: pay_step_number,
        rule_id: rule_id.to_string(),
        rule_name: "Duty Pay".to_string(),
        input: serde_json::json!({
            "date": input.date.to_string(),
            "duty_type": input.duty_type,
            "pay_policy": input.pay_policy,
            "duty_hours": input.duty_hours.to_string()
        }),
        output: serde_json::json!({
            "paid_hours": paid_hours.to_string(),
            "flight_pay": flight_pay.to_string()
        }),
        reasoning,
    };

    let mut audit_steps: Vec<AuditStep> = rate_step.into_iter().collect();
    audit_steps.push(pay_step);

    Ok(DutyPayResult {
        flight_pay,
        paid_hours,
        audit_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn input(duty_type: DutyType, pay_policy: PayPolicy, hours: &str) -> DutyPayInput {
        DutyPayInput {
            date: make_date("2024-03-04"),
            position: Position::Ccm,
            duty_type,
            pay_policy,
            duty_hours: dec(hours),
        }
    }

    fn rates() -> RateTable {
        ConfigLoader::load("./config/crew")
            .expect("Failed to load config")
            .config()
            .rates()
            .clone()
    }

    #[test]
    fn test_layover_pays_hours_times_rate() {
        let result =
            calculate_duty_pay(&input(DutyType::Layover, PayPolicy::Standard, "7.25"), &rates(), 1)
                .unwrap();
        assert_eq!(result.flight_pay, dec("362.50"));
        assert_eq!(result.paid_hours, dec("7.25"));
        assert_eq!(result.audit_steps.len(), 2);
        assert_eq!(result.audit_steps[0].rule_id, "rate_lookup");
        assert_eq!(result.audit_steps[1].rule_id, "hourly_duty_pay");
        assert_eq!(result.audit_steps[1].step_number, 2);
    }

    #[test]
    fn test_recurrent_and_promotion_paid_hourly() {
        let rates = rates();
        for duty_type in [DutyType::Recurrent, DutyType::BusinessPromotion, DutyType::Turnaround] {
            let result =
                calculate_duty_pay(&input(duty_type, PayPolicy::Standard, "8"), &rates, 1).unwrap();
            assert_eq!(result.flight_pay, dec("400.00"), "{}", duty_type);
        }
    }

    #[test]
    fn test_asby_pays_configured_hours_regardless_of_span() {
        let result =
            calculate_duty_pay(&input(DutyType::Asby, PayPolicy::Standard, "11"), &rates(), 1)
                .unwrap();
        assert_eq!(result.paid_hours, dec("4"));
        assert_eq!(result.flight_pay, dec("200.00"));
    }

    #[test]
    fn test_unpaid_policy_yields_exactly_zero() {
        let result =
            calculate_duty_pay(&input(DutyType::Asby, PayPolicy::Unpaid, "6"), &rates(), 1)
                .unwrap();
        assert_eq!(result.flight_pay, Decimal::ZERO);
        assert_eq!(result.audit_steps.len(), 1);
        assert_eq!(result.audit_steps[0].rule_id, "unpaid_duty");
    }

    #[test]
    fn test_unpaid_types_skip_rate_lookup() {
        let mut before_rates = input(DutyType::Off, PayPolicy::Standard, "0");
        before_rates.date = make_date("2019-01-01");
        for duty_type in [DutyType::Sby, DutyType::Off, DutyType::Rest, DutyType::AnnualLeave] {
            before_rates.duty_type = duty_type;
            let result = calculate_duty_pay(&before_rates, &rates(), 1).unwrap();
            assert_eq!(result.flight_pay, Decimal::ZERO);
        }
    }

    #[test]
    fn test_paid_duty_without_rate_is_error() {
        let mut early = input(DutyType::Layover, PayPolicy::Standard, "5");
        early.date = make_date("2019-01-01");
        let result = calculate_duty_pay(&early, &rates(), 1);
        assert!(matches!(result, Err(CalculationError::RateNotFound { .. })));
    }

    #[test]
    fn test_pay_rounded_to_cents() {
        let third_of_hour = Decimal::from(1) / Decimal::from(3);
        let mut duty = input(DutyType::Layover, PayPolicy::Standard, "0");
        duty.duty_hours = third_of_hour;
        let result = calculate_duty_pay(&duty, &rates(), 1).unwrap();
        assert_eq!(result.flight_pay, dec("16.67"));
    }
}
