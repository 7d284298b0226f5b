//! Display-only breakdown of a month by duty type.
//!
//! Spreads the fixed salary across paid duty types in proportion to their
//! duty hours, to show how much each kind of work "earned". The result is
//! analytics only: [`MonthlyPayrollTotals`] stays the payroll figure.

use rust_decimal::Decimal;

use crate::models::{
    BucketMonth, DutyRecord, DutyType, DutyTypeAllocation, LayoverPair, MonthlyPayrollTotals,
};

use super::monthly_totals::MonthSlice;
use super::rounding::round_money;

/// Allocates the month's fixed salary across the paid duty types.
///
/// Returns one line per paid duty type in [`DutyType::PAID`] order. Each
/// allocated amount is rounded to cents; the rounding remainder goes to
/// the type with the most hours, so the lines sum exactly to
/// `totals.fixed_total`. With no paid hours every allocated amount is
/// zero.
///
/// # Example
///
/// ```no_run
/// use crew_pay_engine::calculation::{allocate_by_duty_type, calculate_monthly_totals};
/// use crew_pay_engine::config::ConfigLoader;
/// use crew_pay_engine::models::{BucketMonth, Position};
///
/// let loader = ConfigLoader::load("./config/crew").unwrap();
/// let march = BucketMonth::new(3, 2024).unwrap();
/// let totals = calculate_monthly_totals("crew_001", Position::Ccm, march, &[], &[], loader.config().rates()).unwrap();
///
/// let lines = allocate_by_duty_type(&totals, &[], &[]);
/// assert!(lines.iter().all(|line| line.allocated_fixed.is_zero()));
/// ```
pub fn allocate_by_duty_type(
    totals: &MonthlyPayrollTotals,
    duties: &[DutyRecord],
    pairs: &[LayoverPair],
) -> Vec<DutyTypeAllocation> {
    let Some(bucket) = BucketMonth::new(totals.month, totals.year) else {
        return Vec::new();
    };
    let slice = MonthSlice::select(&totals.user_id, bucket, duties, pairs);
    let counts = slice.duty_counts();

    let hours_by_type: Vec<(DutyType, Decimal)> = DutyType::PAID
        .iter()
        .map(|&duty_type| {
            let hours = slice
                .duties
                .iter()
                .filter(|d| d.duty_type == duty_type)
                .map(|d| d.duty_hours)
                .sum();
            (duty_type, hours)
        })
        .collect();
    let total_hours: Decimal = hours_by_type.iter().map(|(_, h)| *h).sum();

    let mut lines: Vec<DutyTypeAllocation> = hours_by_type
        .iter()
        .map(|&(duty_type, duty_hours)| {
            let mut variable_pay: Decimal = slice
                .duties
                .iter()
                .filter(|d| d.duty_type == duty_type)
                .map(|d| d.flight_pay)
                .sum();
            if duty_type == DutyType::Layover {
                variable_pay += slice.pairs.iter().map(|p| p.per_diem_pay).sum::<Decimal>();
            }

            let (hours_share, allocated_fixed) = if total_hours.is_zero() {
                (Decimal::ZERO, Decimal::ZERO)
            } else {
                let share = duty_hours / total_hours;
                (
                    round_money(share * Decimal::ONE_HUNDRED),
                    round_money(totals.fixed_total * share),
                )
            };

            DutyTypeAllocation {
                duty_type,
                duty_count: counts.get(&duty_type).copied().unwrap_or(0),
                duty_hours,
                hours_share,
                variable_pay,
                allocated_fixed,
                effective_contribution: variable_pay + allocated_fixed,
            }
        })
        .collect();

    if !total_hours.is_zero() {
        let allocated: Decimal = lines.iter().map(|l| l.allocated_fixed).sum();
        let remainder = totals.fixed_total - allocated;
        if !remainder.is_zero() {
            // First of the largest wins ties.
            let largest = lines
                .iter()
                .enumerate()
                .fold(None::<(usize, Decimal)>, |best, (i, line)| match best {
                    Some((_, hours)) if hours >= line.duty_hours => best,
                    _ => Some((i, line.duty_hours)),
                });
            if let Some((i, _)) = largest {
                lines[i].allocated_fixed += remainder;
                lines[i].effective_contribution += remainder;
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::calculate_monthly_totals;
    use crate::config::ConfigLoader;
    use crate::models::{BucketSource, DataSource, PayPolicy, Position};
    use chrono::NaiveDate;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_duty(date: &str, duty_type: DutyType, hours: &str, pay: &str) -> DutyRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        DutyRecord {
            id: Uuid::new_v4(),
            user_id: "crew_001".to_string(),
            date,
            bucket: BucketMonth::from_date(date),
            bucket_source: BucketSource::Derived,
            duty_type,
            duty_code: None,
            pay_policy: PayPolicy::Standard,
            flight_numbers: Vec::new(),
            sectors: Vec::new(),
            report_time: None,
            debrief_time: None,
            is_cross_day: false,
            duty_hours: dec(hours),
            flight_pay: dec(pay),
            data_source: DataSource::Imported,
        }
    }

    fn totals_for(duties: &[DutyRecord]) -> MonthlyPayrollTotals {
        let loader = ConfigLoader::load("./config/crew").expect("Failed to load config");
        calculate_monthly_totals(
            "crew_001",
            Position::Ccm,
            BucketMonth::new(3, 2024).unwrap(),
            duties,
            &[],
            loader.config().rates(),
        )
        .unwrap()
    }

    fn line(lines: &[DutyTypeAllocation], duty_type: DutyType) -> &DutyTypeAllocation {
        lines.iter().find(|l| l.duty_type == duty_type).unwrap()
    }

    #[test]
    fn test_fixed_split_by_hour_share() {
        let duties = vec![
            make_duty("2024-03-02", DutyType::Turnaround, "30", "1500.00"),
            make_duty("2024-03-05", DutyType::Recurrent, "10", "500.00"),
        ];
        let totals = totals_for(&duties);
        let lines = allocate_by_duty_type(&totals, &duties, &[]);

        assert_eq!(lines.len(), DutyType::PAID.len());
        let turnaround = line(&lines, DutyType::Turnaround);
        assert_eq!(turnaround.hours_share, dec("75.00"));
        assert_eq!(turnaround.allocated_fixed, dec("6206.25"));
        assert_eq!(turnaround.effective_contribution, dec("7706.25"));
        assert_eq!(turnaround.duty_count, 1);

        let recurrent = line(&lines, DutyType::Recurrent);
        assert_eq!(recurrent.allocated_fixed, dec("2068.75"));
    }

    #[test]
    fn test_rounding_remainder_goes_to_largest_type() {
        let duties = vec![
            make_duty("2024-03-02", DutyType::Turnaround, "1", "50.00"),
            make_duty("2024-03-03", DutyType::Recurrent, "1", "50.00"),
            make_duty("2024-03-04", DutyType::BusinessPromotion, "1.5", "75.00"),
        ];
        let totals = totals_for(&duties);
        let lines = allocate_by_duty_type(&totals, &duties, &[]);

        let allocated: Decimal = lines.iter().map(|l| l.allocated_fixed).sum();
        assert_eq!(allocated, totals.fixed_total);
        // 2364.29 + 2364.29 + 3546.43 overshoots by one cent.
        assert_eq!(line(&lines, DutyType::Turnaround).allocated_fixed, dec("2364.29"));
        assert_eq!(line(&lines, DutyType::Recurrent).allocated_fixed, dec("2364.29"));
        assert_eq!(line(&lines, DutyType::BusinessPromotion).allocated_fixed, dec("3546.42"));
    }

    #[test]
    fn test_zero_paid_hours_allocates_nothing() {
        let duties = vec![
            make_duty("2024-03-02", DutyType::Off, "0", "0"),
            make_duty("2024-03-03", DutyType::Asby, "0", "200.00"),
        ];
        let totals = totals_for(&duties);
        let lines = allocate_by_duty_type(&totals, &duties, &[]);

        assert!(lines.iter().all(|l| l.allocated_fixed.is_zero() && l.hours_share.is_zero()));
        assert_eq!(line(&lines, DutyType::Asby).variable_pay, dec("200.00"));
        assert_eq!(line(&lines, DutyType::Asby).effective_contribution, dec("200.00"));
    }

    #[test]
    fn test_unpaid_types_not_listed() {
        let totals = totals_for(&[]);
        let lines = allocate_by_duty_type(&totals, &[], &[]);
        assert!(lines.iter().all(|l| l.duty_type.is_paid()));
    }
}
