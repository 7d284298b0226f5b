//! Money and hour conversions shared by the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a money amount to cents, midpoint away from zero.
///
/// # Example
///
/// ```
/// use crew_pay_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("207.265").unwrap()), Decimal::from_str("207.27").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a whole number of seconds to decimal hours.
pub fn hours_from_seconds(seconds: i64) -> Decimal {
    Decimal::from(seconds) / Decimal::from(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(dec("0.125")), dec("0.13"));
        assert_eq!(round_money(dec("-0.125")), dec("-0.13"));
        assert_eq!(round_money(dec("362.5")), dec("362.50"));
    }

    #[test]
    fn test_hours_from_seconds() {
        assert_eq!(hours_from_seconds(26_100), dec("7.25"));
        assert_eq!(hours_from_seconds(84_600), dec("23.5"));
        assert_eq!(hours_from_seconds(0), Decimal::ZERO);
    }
}
