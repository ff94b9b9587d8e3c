//! Employer contribution math.
//!
//! The contribution rate is a percentage (5.0 means 5%). A contribution is
//! owed only for eligible employees; ineligible employees always contribute 0.

use rust_decimal::Decimal;

use crate::error::EngineError;

/// `total_income * percentage / 100` when eligible, else 0.
///
/// The result is not rounded; callers round at display time.
///
/// # Errors
///
/// [`EngineError::InvalidValue`] when the product does not fit in a
/// `Decimal`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use retire_core::calculations::contribution;
///
/// assert_eq!(contribution(dec!(1000), true, dec!(5.0)), Ok(dec!(50)));
/// assert_eq!(contribution(dec!(1000), false, dec!(5.0)), Ok(dec!(0)));
/// ```
pub fn contribution(
    total_income: Decimal,
    eligible: bool,
    percentage: Decimal,
) -> Result<Decimal, EngineError> {
    if !eligible {
        return Ok(Decimal::ZERO);
    }
    total_income
        .checked_mul(percentage)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| EngineError::out_of_range("contribution"))
}

/// The income that would produce `contribution` at `percentage`.
///
/// Returns `Ok(None)` for a zero rate, where no income produces a non-zero
/// contribution.
///
/// # Errors
///
/// [`EngineError::InvalidValue`] when the implied income does not fit in a
/// `Decimal`.
pub fn implied_income(
    contribution: Decimal,
    percentage: Decimal,
) -> Result<Option<Decimal>, EngineError> {
    if percentage.is_zero() {
        return Ok(None);
    }
    contribution
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(percentage))
        .map(Some)
        .ok_or_else(|| EngineError::out_of_range("implied income"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn eligible_employee_contributes_rate_of_income() {
        assert_eq!(contribution(dec!(40000), true, dec!(5.0)), Ok(dec!(2000)));
    }

    #[test]
    fn ineligible_employee_contributes_nothing() {
        assert_eq!(contribution(dec!(40000), false, dec!(5.0)), Ok(dec!(0)));
    }

    #[test]
    fn zero_rate_yields_zero_contribution() {
        assert_eq!(contribution(dec!(40000), true, dec!(0)), Ok(dec!(0)));
    }

    #[test]
    fn fractional_rate_keeps_full_precision() {
        assert_eq!(contribution(dec!(333.33), true, dec!(3.5)), Ok(dec!(11.66655)));
    }

    #[test]
    fn implied_income_inverts_contribution() {
        assert_eq!(implied_income(dec!(500), dec!(5)), Ok(Some(dec!(10000))));
    }

    #[test]
    fn implied_income_is_undefined_at_zero_rate() {
        assert_eq!(implied_income(dec!(500), dec!(0)), Ok(None));
    }

    #[test]
    fn contribution_out_of_range_is_an_error() {
        assert!(matches!(
            contribution(Decimal::MAX, true, dec!(5)),
            Err(EngineError::InvalidValue(_))
        ));
    }

    #[test]
    fn ineligible_contribution_ignores_huge_income() {
        assert_eq!(contribution(Decimal::MAX, false, dec!(5)), Ok(dec!(0)));
    }

    #[test]
    fn implied_income_out_of_range_is_an_error() {
        assert!(matches!(
            implied_income(dec!(1000000000000000000000000000), dec!(5)),
            Err(EngineError::InvalidValue(_))
        ));
    }
}
