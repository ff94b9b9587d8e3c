//! Aggregation, overlay and diff working together over in-memory rows.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use retire_core::calculations::{PeriodSummary, SummaryAggregator};
use retire_core::period::{DateWindow, ReportingPeriod};
use retire_core::scenario::{HypotheticalEdit, HypotheticalOverlay, ScenarioDiff};
use retire_core::{Department, Employee, IncomeRecord, IncomeType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(
    y: i32,
    m: u32,
    d: u32,
) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn alice() -> Employee {
    Employee {
        id: 1,
        name: "Alice".to_string(),
        department: Some(Department::Office),
        eligible: true,
    }
}

fn salary(
    id: i64,
    employee_id: i64,
    amount: Decimal,
    on: NaiveDate,
) -> IncomeRecord {
    IncomeRecord {
        id,
        employee_id,
        amount,
        date: on,
        income_type: IncomeType::Salary,
    }
}

fn fiscal_summary(
    employees: &[Employee],
    income: &[IncomeRecord],
) -> PeriodSummary {
    let period = ReportingPeriod::fiscal_year(2025).unwrap();
    SummaryAggregator::new(dec!(5.0))
        .aggregate(period, employees, income, Decimal::ZERO)
        .unwrap()
}

#[test]
fn income_edit_produces_two_change_lines() {
    let actual = fiscal_summary(&[alice()], &[salary(1, 1, dec!(500), date(2025, 4, 1))]);
    let row = &actual.rows[0];
    assert_eq!(
        (row.total_income, row.contribution),
        (dec!(500.00), dec!(25.00))
    );

    let mut overlay = HypotheticalOverlay::new();
    overlay.seed_from(&actual);
    assert!(ScenarioDiff::compute(&actual, &overlay).is_empty());

    overlay
        .apply_edit(1, HypotheticalEdit::Income(dec!(1000)), dec!(5.0))
        .unwrap();

    assert_eq!(
        ScenarioDiff::compute(&actual, &overlay).lines(),
        vec![
            "Alice: Change Total Income from $500.00 to $1,000.00".to_string(),
            "Alice: Change Contribution from $25.00 to $50.00".to_string(),
        ]
    );
}

#[test]
fn day_after_window_end_counts_once_window_moves() {
    let income = [salary(1, 1, dec!(300), date(2026, 3, 1))];

    let fiscal = fiscal_summary(&[alice()], &income);
    let shifted = SummaryAggregator::new(dec!(5.0)).aggregate(
        ReportingPeriod::custom(DateWindow::new(date(2025, 3, 2), date(2026, 3, 1)).unwrap()),
        &[alice()],
        &income,
        Decimal::ZERO,
    )
    .unwrap();

    assert_eq!(fiscal.rows[0].total_income, dec!(0));
    assert_eq!(shifted.rows[0].total_income, dec!(300));
}

#[test]
fn deleted_employee_never_appears_in_diff() {
    let bob = Employee {
        id: 2,
        name: "Bob".to_string(),
        department: None,
        eligible: false,
    };
    let income = [
        salary(1, 1, dec!(500), date(2025, 4, 1)),
        salary(2, 2, dec!(700), date(2025, 4, 1)),
    ];
    let before = fiscal_summary(&[alice(), bob.clone()], &income);
    let mut overlay = HypotheticalOverlay::new();
    overlay.seed_from(&before);
    overlay
        .apply_edit(2, HypotheticalEdit::Eligibility(true), dec!(5.0))
        .unwrap();

    overlay.remove(bob.id);
    let after = fiscal_summary(&[alice()], &income[..1]);
    let diff = ScenarioDiff::compute(&after, &overlay);

    assert!(diff.is_empty());
    assert!(diff.lines().iter().all(|line| !line.contains("Bob")));
}
