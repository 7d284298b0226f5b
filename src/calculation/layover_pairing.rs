//! Layover pairing.
//!
//! Binds each outbound layover leg to the nearest later leg that flies
//! back from the same station to the home base, and pays a per-diem
//! allowance on the rest between them. Legs are considered in
//! `(date, report time, input position)` order, so the same duty list
//! always pairs the same way.

use rust_decimal::Decimal;
use tracing::warn;

use crate::config::CrewConfig;
use crate::error::{CalculationError, PairingError};
use crate::models::{
    AuditStep, Diagnostic, DiagnosticKind, DutyRecord, LayoverPair, Position, Severity,
    UnpairedLayover, UnpairedReason,
};

use super::rounding::{hours_from_seconds, round_money};

/// Pairs, unpaired legs and the problems found while pairing.
#[derive(Debug, Clone, Default)]
pub struct PairingOutcome {
    /// Accepted pairs, each with positive rest.
    pub pairs: Vec<LayoverPair>,
    /// Legs left without a partner.
    pub unpaired: Vec<UnpairedLayover>,
    /// One diagnostic per rejected candidate, missing rate and unpaired leg.
    pub diagnostics: Vec<Diagnostic>,
    /// One audit step per accepted pair.
    pub audit_steps: Vec<AuditStep>,
}

/// Pairs the layover legs among `duties`.
///
/// Non-layover duties are ignored. For each unconsumed outbound leg (one
/// whose destination is not the home base), only the nearest later
/// unconsumed leg from that destination back to the home base is
/// examined:
///
/// - positive rest forms a pair and consumes both legs;
/// - non-positive rest is a pairing error, the outbound stays unpaired and
///   the return leg remains available to later outbounds;
/// - a missing per-diem rate on the outbound date leaves the outbound
///   unpaired with a calculation diagnostic.
///
/// Every leg ends up in exactly one pair or in the unpaired list.
///
/// # Example
///
/// ```no_run
/// use crew_pay_engine::calculation::{pair_layovers, process_roster, RosterContext};
/// use crew_pay_engine::config::ConfigLoader;
/// use crew_pay_engine::models::{Position, RawRosterRow};
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/crew").unwrap();
/// let rows = vec![
///     RawRosterRow::new(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), "EK0129", "DXB-ZAG")
///         .with_times("06:00", "14:00"),
///     RawRosterRow::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), "EK0130", "ZAG-DXB")
///         .with_times("13:30", "19:45"),
/// ];
/// let outcome = process_roster(&rows, &RosterContext::new("crew_001", Position::Ccm), loader.config());
///
/// let repaired = pair_layovers(&outcome.duties, Position::Ccm, loader.config(), 1);
/// assert_eq!(repaired.pairs.len(), 1);
/// ```
pub fn pair_layovers(
    duties: &[DutyRecord],
    position: Position,
    config: &CrewConfig,
    step_number: u32,
) -> PairingOutcome {
    let home_base = config.home_base();

    let mut legs: Vec<&DutyRecord> = duties.iter().filter(|d| d.is_layover()).collect();
    // Stable sort keeps input order among equal keys.
    legs.sort_by_key(|d| (d.date, d.report_time));

    let mut consumed = vec![false; legs.len()];
    let mut reasons: Vec<Option<UnpairedReason>> = vec![None; legs.len()];
    let mut outcome = PairingOutcome::default();
    let mut next_step = step_number;

    for i in 0..legs.len() {
        if consumed[i] {
            continue;
        }
        let outbound = legs[i];
        let Some(station) = outbound.destination() else {
            continue;
        };
        if station == home_base {
            continue;
        }

        let candidate = (i + 1..legs.len()).find(|&j| {
            !consumed[j]
                && legs[j].user_id == outbound.user_id
                && legs[j].origin() == Some(station)
                && legs[j].destination() == Some(home_base)
        });
        let Some(j) = candidate else {
            reasons[i] = Some(UnpairedReason::NoReturnLeg);
            continue;
        };
        let inbound = legs[j];

        let (Some(rest_start), Some(rest_end)) =
            (outbound.debrief_datetime(), inbound.report_datetime())
        else {
            reasons[i] = Some(UnpairedReason::NoReturnLeg);
            continue;
        };

        let rest_hours = hours_from_seconds((rest_end - rest_start).num_seconds());
        if rest_hours <= Decimal::ZERO {
            let error = PairingError::NonPositiveRest {
                outbound_id: outbound.id,
                inbound_id: inbound.id,
                rest_hours,
            };
            warn!(
                outbound_id = %outbound.id,
                inbound_id = %inbound.id,
                rest_hours = %rest_hours,
                "Rejected layover pairing with non-positive rest"
            );
            outcome.diagnostics.push(Diagnostic {
                row_index: None,
                duty_id: Some(outbound.id),
                kind: DiagnosticKind::PairingError,
                code: "NON_POSITIVE_REST".to_string(),
                severity: Severity::Error,
                message: error.to_string(),
            });
            reasons[i] = Some(UnpairedReason::RejectedRest);
            continue;
        }

        let per_diem_rate = match config.rates().lookup(position, outbound.date) {
            Ok(entry) => entry.per_diem_rate_per_hour,
            Err(_) => {
                let error = CalculationError::RateNotFound {
                    position,
                    date: outbound.date,
                };
                warn!(
                    outbound_id = %outbound.id,
                    date = %outbound.date,
                    "No per-diem rate for layover outbound date"
                );
                outcome.diagnostics.push(Diagnostic {
                    row_index: None,
                    duty_id: Some(outbound.id),
                    kind: DiagnosticKind::CalculationError,
                    code: error.code().to_string(),
                    severity: Severity::Error,
                    message: error.to_string(),
                });
                reasons[i] = Some(UnpairedReason::MissingRate);
                continue;
            }
        };

        let per_diem_pay = round_money(rest_hours * per_diem_rate);

        outcome.audit_steps.push(AuditStep {
            step_number: next_step,
            rule_id: "layover_per_diem".to_string(),
            rule_name: "Layover Per Diem".to_string(),
            input: serde_json::json!({
                "outbound_id": outbound.id.to_string(),
                "inbound_id": inbound.id.to_string(),
                "station": station,
                "rest_start": rest_start.to_string(),
                "rest_end": rest_end.to_string(),
                "per_diem_rate_per_hour": per_diem_rate.to_string()
            }),
            output: serde_json::json!({
                "rest_hours": rest_hours.to_string(),
                "per_diem_pay": per_diem_pay.to_string()
            }),
            reasoning: format!(
                "Rest at {} from {} to {}: {} hours x ${}/hr = ${}",
                station, rest_start, rest_end, rest_hours, per_diem_rate, per_diem_pay
            ),
        });
        next_step += 1;

        outcome.pairs.push(LayoverPair {
            outbound_id: outbound.id,
            inbound_id: inbound.id,
            bucket: outbound.bucket,
            layover_station: station.to_string(),
            rest_start,
            rest_end,
            rest_hours,
            per_diem_rate,
            per_diem_pay,
        });
        consumed[i] = true;
        consumed[j] = true;
    }

    for (i, leg) in legs.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        let reason = reasons[i].unwrap_or(UnpairedReason::NoOutboundLeg);
        warn!(
            duty_id = %leg.id,
            date = %leg.date,
            route = %leg.route(),
            reason = ?reason,
            "Layover leg left unpaired"
        );
        outcome.diagnostics.push(Diagnostic {
            row_index: None,
            duty_id: Some(leg.id),
            kind: DiagnosticKind::PairingWarning,
            code: "UNPAIRED_LAYOVER".to_string(),
            severity: Severity::Warning,
            message: format!("Layover {} on {}: {}", leg.route(), leg.date, reason),
        });
        outcome.unpaired.push(UnpairedLayover {
            duty_id: leg.id,
            bucket: leg.bucket,
            reason,
        });
    }

    outcome
}
