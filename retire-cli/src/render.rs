//! Plain-text rendering of records and reports.

use retire_core::calculations::{EmployeeSnapshot, IncomeStatement, PeriodSummary, SummaryRow};
use retire_core::format::{display_name, format_currency, yes_no};
use retire_core::period::display_date;
use retire_core::scenario::ScenarioReport;
use retire_core::{AttendanceRecord, Employee, FiscalSettings, IncomeRecord, Note, TaxableProfit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

use Align::{Left, Right};

/// Column-aligned text table with a dashed rule under the header.
struct Table {
    headers: Vec<(&'static str, Align)>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &[(&'static str, Align)]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    fn push(
        &mut self,
        row: Vec<String>,
    ) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, (header, _))| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: Vec<&str>| {
            cells
                .iter()
                .zip(&self.headers)
                .zip(&widths)
                .map(|((cell, (_, align)), &width)| match align {
                    Align::Left => format!("{cell:<width$}"),
                    Align::Right => format!("{cell:>width$}"),
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(self.headers.iter().map(|(h, _)| *h).collect())];
        out.push("-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
        for row in &self.rows {
            out.push(line(row.iter().map(String::as_str).collect()));
        }
        out.join("\n")
    }
}

fn department(label: Option<retire_core::Department>) -> String {
    label.map(|d| d.to_string()).unwrap_or_default()
}

pub fn employees(
    employees: &[Employee],
    privacy: bool,
) -> String {
    if employees.is_empty() {
        return "No employees.".to_string();
    }
    let mut table = Table::new(&[("ID", Right), ("Name", Left), ("Department", Left), ("Eligible", Left)]);
    for e in employees {
        table.push(vec![
            e.id.to_string(),
            display_name(&e.name, privacy),
            department(e.department),
            yes_no(e.eligible).to_string(),
        ]);
    }
    table.render()
}

pub fn employee(
    employee: &Employee,
    privacy: bool,
) -> String {
    format!(
        "Employee {}: {} ({}), eligible: {}",
        employee.id,
        display_name(&employee.name, privacy),
        employee.department_label(),
        yes_no(employee.eligible)
    )
}

pub fn income(records: &[IncomeRecord]) -> String {
    if records.is_empty() {
        return "No income records.".to_string();
    }
    let mut table = Table::new(&[
        ("ID", Right),
        ("Employee", Right),
        ("Date", Left),
        ("Type", Left),
        ("Amount", Right),
    ]);
    for r in records {
        table.push(vec![
            r.id.to_string(),
            r.employee_id.to_string(),
            display_date(r.date),
            r.income_type.to_string(),
            format_currency(r.amount),
        ]);
    }
    let total = records.iter().map(|r| r.amount).sum();
    format!("{}\nTotal: {}", table.render(), format_currency(total))
}

pub fn notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes.".to_string();
    }
    let mut table = Table::new(&[("ID", Right), ("Date", Left), ("Note", Left)]);
    for n in notes {
        table.push(vec![n.id.to_string(), display_date(n.date), n.text.clone()]);
    }
    table.render()
}

pub fn attendance(records: &[AttendanceRecord]) -> String {
    if records.is_empty() {
        return "No attendance records.".to_string();
    }
    let mut table = Table::new(&[("ID", Right), ("Date", Left), ("Status", Left)]);
    for r in records {
        table.push(vec![r.id.to_string(), display_date(r.date), r.status.to_string()]);
    }
    table.render()
}

pub fn settings(settings: &FiscalSettings) -> String {
    let window = settings
        .fiscal_window()
        .map(|w| format!("{} to {}", display_date(w.start()), display_date(w.end())))
        .unwrap_or_else(|e| e.to_string());
    [
        format!("Contribution percentage: {}%", settings.contribution_percentage),
        format!("Fiscal year: {} ({window})", settings.selected_year),
        format!("Privacy mode: {}", if settings.privacy_mode { "on" } else { "off" }),
    ]
    .join("\n")
}

pub fn profit(profit: &TaxableProfit) -> String {
    format!(
        "Taxable profit for fiscal year {}: {}",
        profit.year,
        format_currency(profit.total_profit)
    )
}

fn summary_table(
    rows: &[&SummaryRow],
    privacy: bool,
) -> String {
    let mut table = Table::new(&[
        ("ID", Right),
        ("Name", Left),
        ("Department", Left),
        ("Total Income", Right),
        ("Contribution", Right),
        ("Eligible", Left),
    ]);
    for row in rows {
        table.push(vec![
            row.employee_id.to_string(),
            display_name(&row.name, privacy),
            department(row.department),
            format_currency(row.total_income),
            format_currency(row.contribution),
            yes_no(row.eligible).to_string(),
        ]);
    }
    table.render()
}

/// `rows` is the filtered view; totals always cover the whole period.
pub fn summary(
    summary: &PeriodSummary,
    rows: &[&SummaryRow],
    privacy: bool,
) -> String {
    let totals = &summary.totals;
    [
        format!("Summary for {}", summary.period.label),
        summary_table(rows, privacy),
        String::new(),
        format!("Total Income:       {}", format_currency(totals.total_income)),
        format!("Total Contribution: {}", format_currency(totals.total_contribution)),
        format!("Taxable Profit:     {}", format_currency(totals.taxable_profit)),
        format!("Net Spend:          {}", format_currency(totals.net_spend)),
    ]
    .join("\n")
}

pub fn scenario(
    report: &ScenarioReport,
    privacy: bool,
) -> String {
    let actual: Vec<&SummaryRow> = report.actual.rows.iter().collect();
    let hypothetical: Vec<&SummaryRow> = report.hypothetical.iter().collect();
    [
        format!("Actual ({})", report.actual.period.label),
        summary_table(&actual, privacy),
        String::new(),
        "Hypothetical".to_string(),
        summary_table(&hypothetical, privacy),
        String::new(),
        report.diff.render(privacy),
    ]
    .join("\n")
}

pub fn comparison(
    first: &EmployeeSnapshot,
    second: &EmployeeSnapshot,
    privacy: bool,
) -> String {
    let mut table = Table::new(&[("", Left), ("First", Right), ("Second", Right)]);
    let mut row = |label: &str, a: String, b: String| table.push(vec![label.to_string(), a, b]);

    row("Name", display_name(&first.name, privacy), display_name(&second.name, privacy));
    row("Department", department(first.department), department(second.department));
    row("Total Income", format_currency(first.total_income), format_currency(second.total_income));
    row("Contribution", format_currency(first.contribution), format_currency(second.contribution));
    row("Eligible", yes_no(first.eligible).into(), yes_no(second.eligible).into());
    row("Absences", first.absences.to_string(), second.absences.to_string());
    row("Tardies", first.tardies.to_string(), second.tardies.to_string());

    table.render()
}

pub fn statement(statement: &IncomeStatement) -> String {
    let mut lines = vec![
        format!("Gross Profit:      {}", format_currency(statement.gross_profit)),
        format!("Operating Profit:  {}", format_currency(statement.operating_profit)),
        format!("Profit Before Tax: {}", format_currency(statement.profit_before_tax)),
        format!("Profit After Tax:  {}", format_currency(statement.profit_after_tax)),
    ];
    let analysis = statement.analysis_lines();
    if !analysis.is_empty() {
        lines.push(String::new());
        lines.push("Analysis:".to_string());
        lines.extend(analysis.into_iter().map(|line| format!("  {line}")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use retire_core::calculations::{IncomeStatementInput, SummaryAggregator};
    use retire_core::period::ReportingPeriod;
    use retire_core::{Department, IncomeType};
    use rust_decimal_macros::dec;

    use super::*;

    fn staff() -> Vec<Employee> {
        vec![
            Employee {
                id: 1,
                name: "Alice Reed".to_string(),
                department: Some(Department::Officer),
                eligible: true,
            },
            Employee {
                id: 2,
                name: "Bob Stone".to_string(),
                department: None,
                eligible: false,
            },
        ]
    }

    #[test]
    fn table_pads_and_right_aligns() {
        let mut table = Table::new(&[("ID", Right), ("Name", Left)]);
        table.push(vec!["7".to_string(), "Al".to_string()]);
        table.push(vec!["12".to_string(), "Bea".to_string()]);

        assert_eq!(table.render(), "ID  Name\n--------\n 7  Al\n12  Bea");
    }

    #[test]
    fn employee_list_redacts_under_privacy() {
        let text = employees(&staff(), true);

        assert!(text.contains("***** ****"), "{text}");
        assert!(!text.contains("Alice"), "{text}");
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(employees(&[], false), "No employees.");
        assert_eq!(income(&[]), "No income records.");
    }

    #[test]
    fn income_lists_total() {
        let records = vec![IncomeRecord {
            id: 4,
            employee_id: 1,
            amount: dec!(1234.5),
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            income_type: IncomeType::Bonus,
        }];

        let text = income(&records);

        assert!(text.contains("03-15-2025"), "{text}");
        assert!(text.ends_with("Total: $1,234.50"), "{text}");
    }

    #[test]
    fn summary_keeps_period_totals_for_filtered_rows() {
        let period = ReportingPeriod::fiscal_year(2025).unwrap();
        let report = SummaryAggregator::new(dec!(5))
            .aggregate(period, &staff(), &[], dec!(100))
            .unwrap();
        let rows = report.filter("alice");

        let text = summary(&report, &rows, false);

        assert!(text.starts_with("Summary for Fiscal Year 2025"), "{text}");
        assert!(!text.contains("Bob"), "{text}");
        assert!(text.contains("Net Spend:          ($100.00)"), "{text}");
    }

    #[test]
    fn statement_lists_analysis() {
        let result = IncomeStatement::calculate(&IncomeStatementInput {
            revenue: dec!(1000),
            cost_of_sales: dec!(400),
            ..IncomeStatementInput::default()
        })
        .unwrap();

        let text = statement(&result);

        assert!(text.contains("Gross Profit:      $600.00"), "{text}");
        assert!(text.contains("  Gross Profit Margin: 60.00%"), "{text}");
    }
}
