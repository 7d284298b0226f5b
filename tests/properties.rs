//! Property tests for the duty and payroll calculations.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime, Timelike};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crew_pay_engine::calculation::{
    RosterContext, calculate_monthly_totals, duty_hours_between, normalize_sectors, process_roster,
};
use crew_pay_engine::config::{ConfigLoader, CrewConfig};
use crew_pay_engine::models::{BucketMonth, Position, RawRosterRow};

fn config() -> CrewConfig {
    ConfigLoader::load("./config/crew")
        .expect("Failed to load config")
        .config()
        .clone()
}

fn time_strategy() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

fn airport_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["DXB", "ZAG", "KWI", "JFK", "LHR", "BOM"])
}

fn separator_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["-", " ", " - ", "→", " > ", "/", ",", "–"])
}

/// One layover leg: day of March, outbound or inbound, report hour, length.
fn leg_strategy() -> impl Strategy<Value = (u32, bool, u32, u32)> {
    (1u32..29, any::<bool>(), 0u32..19, 1u32..5)
}

fn leg_row((day, outbound, hour, length): (u32, bool, u32, u32)) -> RawRosterRow {
    let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
    let (flight, route) = if outbound {
        ("EK0129", "DXB-ZAG")
    } else {
        ("EK0130", "ZAG-DXB")
    };
    RawRosterRow::new(date, flight, route).with_times(
        format!("{:02}:00", hour),
        format!("{:02}:30", hour + length),
    )
}

proptest! {
    #[test]
    fn duty_hours_follow_clock_difference(report in time_strategy(), debrief in time_strategy()) {
        let report_min = i64::from(report.hour() * 60 + report.minute());
        let debrief_min = i64::from(debrief.hour() * 60 + debrief.minute());

        match duty_hours_between(report, debrief) {
            Ok((hours, cross_day)) => {
                let expected_min = if cross_day {
                    debrief_min - report_min + 24 * 60
                } else {
                    debrief_min - report_min
                };
                prop_assert_eq!(cross_day, debrief_min < report_min);
                prop_assert_eq!((hours * Decimal::from(60)).round_dp(6), Decimal::from(expected_min));
                prop_assert!(hours > Decimal::ZERO && hours < Decimal::from(24));
            }
            Err(_) => prop_assert_eq!(report_min, debrief_min),
        }
    }

    #[test]
    fn sectors_independent_of_separator(
        airports in prop::collection::vec(airport_strategy(), 2..5),
        separator in separator_strategy(),
    ) {
        let dashed = normalize_sectors(&airports.join("-"));
        let other = normalize_sectors(&airports.join(separator));

        match (dashed, other) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            (a, b) => prop_assert!(false, "Formats disagree: {:?} vs {:?}", a, b),
        }
    }

    #[test]
    fn each_leg_pairs_at_most_once(legs in prop::collection::vec(leg_strategy(), 0..12)) {
        let config = config();
        let rows: Vec<RawRosterRow> = legs.into_iter().map(leg_row).collect();
        let ctx = RosterContext::new("crew_001", Position::Ccm);
        let outcome = process_roster(&rows, &ctx, &config);

        let mut seen = HashSet::new();
        for pair in &outcome.pairs {
            prop_assert!(pair.rest_hours > Decimal::ZERO);
            prop_assert!(seen.insert(pair.outbound_id));
            prop_assert!(seen.insert(pair.inbound_id));
        }
        for unpaired in &outcome.unpaired {
            prop_assert!(!seen.contains(&unpaired.duty_id));
        }
        prop_assert_eq!(outcome.pairs.len() * 2 + outcome.unpaired.len(), outcome.duties.len());
    }

    #[test]
    fn totals_are_idempotent_and_balanced(legs in prop::collection::vec(leg_strategy(), 0..12)) {
        let config = config();
        let rows: Vec<RawRosterRow> = legs.into_iter().map(leg_row).collect();
        let ctx = RosterContext::new("crew_001", Position::Sccm);
        let outcome = process_roster(&rows, &ctx, &config);
        let march = BucketMonth::new(3, 2024).unwrap();

        let first = calculate_monthly_totals(
            "crew_001", Position::Sccm, march, &outcome.duties, &outcome.pairs, config.rates(),
        ).unwrap();
        let second = calculate_monthly_totals(
            "crew_001", Position::Sccm, march, &outcome.duties, &outcome.pairs, config.rates(),
        ).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.total_salary, first.fixed_total + first.variable_total);
        prop_assert_eq!(
            first.variable_total,
            first.flight_pay + first.asby_pay + first.per_diem_pay
        );
        prop_assert_eq!(first.layover_pair_count as usize, outcome.pairs.len());
    }
}
