//! Shared rounding for money values.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 round away from zero, so `-0.005` becomes `-0.01`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use retire_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator * 100`, rounded to cents. `None` when the
/// denominator is zero or the ratio is out of range.
pub fn percent_of(
    numerator: Decimal,
    denominator: Decimal,
) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(round_half_up)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(0.125)), dec!(0.13));
    }

    #[test]
    fn round_half_up_moves_negatives_away_from_zero() {
        assert_eq!(round_half_up(dec!(-12.345)), dec!(-12.35));
    }

    #[test]
    fn round_half_up_carries_into_whole_units() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    #[test]
    fn percent_of_rounds_to_cents() {
        assert_eq!(percent_of(dec!(1), dec!(3)), Some(dec!(33.33)));
        assert_eq!(percent_of(dec!(600), dec!(1000)), Some(dec!(60.00)));
    }

    #[test]
    fn percent_of_zero_denominator_is_none() {
        assert_eq!(percent_of(dec!(5), dec!(0)), None);
    }

    #[test]
    fn percent_of_out_of_range_ratio_is_none() {
        assert_eq!(percent_of(Decimal::MAX, dec!(1)), None);
    }
}
