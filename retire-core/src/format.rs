//! Display helpers for money, flags and names.

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;

/// Formats a money value as `$1,234.50`, or `($1,234.50)` when negative.
///
/// Rounds half-up to cents first, so a negative value that rounds to zero
/// renders as `$0.00`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use retire_core::format::format_currency;
///
/// assert_eq!(format_currency(dec!(1234.5)), "$1,234.50");
/// assert_eq!(format_currency(dec!(-12.5)), "($12.50)");
/// ```
pub fn format_currency(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    let mut magnitude = rounded.abs();
    magnitude.rescale(2);

    let text = magnitude.to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    if rounded.is_sign_negative() {
        format!("(${}.{cents})", group_thousands(whole))
    } else {
        format!("${}.{cents}", group_thousands(whole))
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// `"Yes"` or `"No"`.
pub fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Replaces each whitespace-separated part of `name` with as many `*` as it
/// has characters. Parts are rejoined with single spaces.
///
/// ```
/// use retire_core::format::redact_name;
///
/// assert_eq!(redact_name("Jane  Q Doe"), "**** * ***");
/// ```
pub fn redact_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| "*".repeat(part.chars().count()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Redacts `name` only when `privacy` is on.
pub fn display_name(
    name: &str,
    privacy: bool,
) -> String {
    if privacy {
        redact_name(name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn positive_values_get_separators_and_cents() {
        assert_eq!(format_currency(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
    }

    #[test]
    fn small_values_have_no_separator() {
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(999.999)), "$1,000.00");
        assert_eq!(format_currency(dec!(42)), "$42.00");
    }

    #[test]
    fn negative_values_use_parentheses() {
        assert_eq!(format_currency(dec!(-12.5)), "($12.50)");
        assert_eq!(format_currency(dec!(-1000)), "($1,000.00)");
    }

    #[test]
    fn negative_rounding_to_zero_is_plain_zero() {
        assert_eq!(format_currency(dec!(-0.004)), "$0.00");
    }

    #[test]
    fn midpoint_rounds_half_up() {
        assert_eq!(format_currency(dec!(0.125)), "$0.13");
        assert_eq!(format_currency(dec!(-0.125)), "($0.13)");
    }

    #[test]
    fn redact_masks_every_part() {
        assert_eq!(redact_name("Alice Reed"), "***** ****");
        assert_eq!(redact_name(""), "");
    }

    #[test]
    fn redact_counts_characters_not_bytes() {
        assert_eq!(redact_name("José"), "****");
    }

    #[test]
    fn display_name_respects_privacy_flag() {
        assert_eq!(display_name("Alice Reed", false), "Alice Reed");
        assert_eq!(display_name("Alice Reed", true), "***** ****");
    }

    #[test]
    fn yes_no_labels() {
        assert_eq!(yes_no(true), "Yes");
        assert_eq!(yes_no(false), "No");
    }
}
