use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use retire_core::calculations::SummaryColumn;
use retire_core::period::parse_display_date;
use retire_core::scenario::{HypotheticalEdit, HypotheticalField};
use retire_core::{AttendanceStatus, Department, IncomeType};
use rust_decimal::Decimal;

use crate::session::OverlayEdit;

#[derive(Debug, Parser)]
#[command(
    name = "retire-tracker",
    version,
    about = "Track employee income and employer retirement contributions"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database path or connection string (`:memory:` for a throwaway one)
    #[arg(long, global = true, value_name = "CONN")]
    pub db: Option<String>,

    /// Log filter, e.g. `debug` or `retire_core=trace`
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also append log records to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// No log output on stderr
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage employees
    #[command(subcommand)]
    Employee(EmployeeCommand),

    /// Manage income transactions
    #[command(subcommand)]
    Income(IncomeCommand),

    /// Manage employee notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// Manage absences and tardies
    #[command(subcommand)]
    Attendance(AttendanceCommand),

    /// Show or change fiscal settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Show or record taxable profit
    #[command(subcommand)]
    Profit(ProfitCommand),

    /// Per-employee income and contributions for a period
    Summary(SummaryArgs),

    /// Compare actual figures with hypothetical edits
    Scenario(ScenarioArgs),

    /// Two employees side by side over the selected fiscal year
    Compare { first: i64, second: i64 },

    /// Income statement with optional profit recording
    Statement(StatementArgs),

    /// Read commands from stdin, one per line, in a single session
    ///
    /// Hypothetical edits made with `scenario --set` carry over to later
    /// lines until the rate or fiscal year changes. `exit` or `quit` ends
    /// the session.
    Shell,
}

/// One line typed into `shell`: a command without the program name or
/// global flags.
#[derive(Debug, Parser)]
#[command(name = "retire-tracker", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

/// Splits a shell line into words. Single or double quotes group text
/// containing spaces; the quote characters themselves are dropped.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(open) = quote {
        return Err(format!("unterminated {open} quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

// ─── Records ────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum EmployeeCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_department)]
        department: Option<Department>,
        /// Eligible for employer contributions
        #[arg(long)]
        eligible: bool,
    },
    List,
    /// Flip contribution eligibility
    Toggle { id: i64 },
    /// Delete with all income, notes and attendance
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum IncomeCommand {
    Add {
        #[arg(long)]
        employee: i64,
        #[arg(long, value_parser = parse_amount)]
        amount: Decimal,
        /// MM-DD-YYYY or MMDDYYYY
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long = "type", value_parser = parse_income_type, default_value = "Salary")]
        income_type: IncomeType,
    },
    List {
        #[arg(long)]
        employee: Option<i64>,
        #[command(flatten)]
        range: RangeArgs,
    },
    Edit {
        id: i64,
        #[arg(long, value_parser = parse_amount)]
        amount: Option<Decimal>,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long = "type", value_parser = parse_income_type)]
        income_type: Option<IncomeType>,
    },
    Delete { id: i64 },
    /// Load transactions from a CSV file
    Import { file: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    Add {
        #[arg(long)]
        employee: i64,
        #[arg(long)]
        text: String,
        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    List { employee: i64 },
    Edit {
        employee: i64,
        id: i64,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum AttendanceCommand {
    Add {
        #[arg(long)]
        employee: i64,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long, value_parser = parse_status)]
        status: AttendanceStatus,
    },
    List {
        employee: i64,
        #[command(flatten)]
        range: RangeArgs,
    },
    Edit {
        employee: i64,
        id: i64,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_status)]
        status: Option<AttendanceStatus>,
    },
    Delete { id: i64 },
}

// ─── Settings ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        /// Contribution percentage, e.g. 5 for 5%
        #[arg(long, value_parser = parse_amount)]
        percentage: Option<Decimal>,
        /// Fiscal year starting March 1
        #[arg(long)]
        year: Option<i32>,
        /// on or off
        #[arg(long, value_parser = parse_switch)]
        privacy: Option<bool>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProfitCommand {
    Show {
        #[arg(long)]
        year: Option<i32>,
    },
    Set {
        #[arg(long, value_parser = parse_amount)]
        amount: Decimal,
        #[arg(long)]
        year: Option<i32>,
    },
}

// ─── Reports ────────────────────────────────────────────────────────────────

/// A custom reporting range. Both ends or neither.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    #[arg(long, requires = "end", value_name = "MM-DD-YYYY")]
    pub start: Option<String>,
    #[arg(long, requires = "start", value_name = "MM-DD-YYYY")]
    pub end: Option<String>,
}

impl RangeArgs {
    pub fn range(&self) -> Option<(&str, &str)> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub range: RangeArgs,
    /// Keep rows whose name or department contains this text
    #[arg(long)]
    pub search: Option<String>,
    /// id, name, department, income, contribution or eligible
    #[arg(long, value_parser = parse_column)]
    pub sort: Option<SummaryColumn>,
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

#[derive(Debug, Args)]
pub struct ScenarioArgs {
    #[command(flatten)]
    pub range: RangeArgs,
    /// ID:FIELD=VALUE with FIELD one of income, contribution, eligible
    #[arg(long = "set", value_name = "ID:FIELD=VALUE", value_parser = parse_overlay_edit)]
    pub edits: Vec<OverlayEdit>,
}

#[derive(Debug, Args)]
pub struct StatementArgs {
    #[arg(long, value_parser = parse_amount)]
    pub revenue: Decimal,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub cost_of_sales: Decimal,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub admin_expenses: Decimal,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub other_operating_expenses: Decimal,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub finance_costs: Decimal,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub other_income: Decimal,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub tax: Decimal,
    /// Store profit before tax as the taxable profit
    #[arg(long)]
    pub record: bool,
    /// Year to record under; defaults to the selected fiscal year
    #[arg(long, requires = "record")]
    pub year: Option<i32>,
}

// ─── Value parsers ──────────────────────────────────────────────────────────

/// Accepts `1500`, `1500.25`, `$1,500.25`.
pub fn parse_amount(s: &str) -> Result<Decimal, String> {
    let cleaned: String = s.trim().chars().filter(|c| !matches!(c, '$' | ',')).collect();
    cleaned
        .parse::<Decimal>()
        .map_err(|e| format!("'{s}' is not an amount: {e}"))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_display_date(s).map_err(|e| e.to_string())
}

fn parse_department(s: &str) -> Result<Department, String> {
    Department::parse(s).ok_or_else(|| {
        let names: Vec<_> = Department::all().iter().map(|d| d.as_str()).collect();
        format!("unknown department '{s}' (expected one of {})", names.join(", "))
    })
}

fn parse_income_type(s: &str) -> Result<IncomeType, String> {
    IncomeType::parse(s).ok_or_else(|| format!("unknown income type '{s}' (expected Salary or Bonus)"))
}

fn parse_status(s: &str) -> Result<AttendanceStatus, String> {
    AttendanceStatus::parse(s)
        .ok_or_else(|| format!("unknown status '{s}' (expected Absent or Tardy)"))
}

fn parse_column(s: &str) -> Result<SummaryColumn, String> {
    SummaryColumn::parse(s).ok_or_else(|| format!("cannot sort by '{s}'"))
}

/// `on/off`, `yes/no`, `true/false`.
pub fn parse_switch(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        _ => Err(format!("'{s}' is not on/off")),
    }
}

/// `3:income=52000`, `3:contribution=$2,600`, `3:eligible=no`.
pub fn parse_overlay_edit(s: &str) -> Result<OverlayEdit, String> {
    let (id, rest) = s
        .split_once(':')
        .ok_or_else(|| format!("'{s}' should look like ID:FIELD=VALUE"))?;
    let (field, value) = rest
        .split_once('=')
        .ok_or_else(|| format!("'{s}' should look like ID:FIELD=VALUE"))?;

    let employee_id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("'{id}' is not an employee id"))?;
    let field = HypotheticalField::parse(field)
        .ok_or_else(|| format!("unknown field '{field}' (expected income, contribution or eligible)"))?;
    let edit = match field {
        HypotheticalField::Income => HypotheticalEdit::Income(parse_amount(value)?),
        HypotheticalField::Contribution => HypotheticalEdit::Contribution(parse_amount(value)?),
        HypotheticalField::Eligibility => HypotheticalEdit::Eligibility(parse_switch(value)?),
    };

    Ok(OverlayEdit { employee_id, edit })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("retire-tracker").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
        ShellLine::command().debug_assert();
    }

    // =========================================================================
    // Value parsers
    // =========================================================================

    #[test]
    fn amounts_accept_currency_formatting() {
        assert_eq!(parse_amount("1500"), Ok(dec!(1500)));
        assert_eq!(parse_amount(" $1,500.25 "), Ok(dec!(1500.25)));
        assert!(parse_amount("twelve").is_err());
    }

    #[test]
    fn switches() {
        assert_eq!(parse_switch("On"), Ok(true));
        assert_eq!(parse_switch("no"), Ok(false));
        assert!(parse_switch("maybe").is_err());
    }

    #[test]
    fn overlay_edit_forms() {
        assert_eq!(
            parse_overlay_edit("3:income=52000"),
            Ok(OverlayEdit {
                employee_id: 3,
                edit: HypotheticalEdit::Income(dec!(52000)),
            })
        );
        assert_eq!(
            parse_overlay_edit("3:contribution=$2,600.50"),
            Ok(OverlayEdit {
                employee_id: 3,
                edit: HypotheticalEdit::Contribution(dec!(2600.50)),
            })
        );
        assert_eq!(
            parse_overlay_edit("12:eligible=no"),
            Ok(OverlayEdit {
                employee_id: 12,
                edit: HypotheticalEdit::Eligibility(false),
            })
        );
    }

    #[test]
    fn overlay_edit_errors() {
        assert!(parse_overlay_edit("3income=1").is_err());
        assert!(parse_overlay_edit("3:income").is_err());
        assert!(parse_overlay_edit("x:income=1").is_err());
        assert!(parse_overlay_edit("3:bonus=1").is_err());
        assert!(parse_overlay_edit("3:eligible=perhaps").is_err());
    }

    // =========================================================================
    // Command lines
    // =========================================================================

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["summary", "--db", ":memory:", "--log-level", "debug"]).unwrap();

        assert_eq!(cli.global.db.as_deref(), Some(":memory:"));
        assert_eq!(cli.global.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn income_add_parses_compact_date_and_default_type() {
        let cli = parse(&["income", "add", "--employee", "1", "--amount", "2,000", "--date", "03152025"])
            .unwrap();

        match cli.command {
            Command::Income(IncomeCommand::Add {
                employee,
                amount,
                date,
                income_type,
            }) => {
                assert_eq!(employee, 1);
                assert_eq!(amount, dec!(2000));
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
                assert_eq!(income_type, IncomeType::Salary);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_a_usage_error() {
        let err = parse(&["income", "add", "--employee", "1", "--amount", "1", "--date", "2025-03-15"])
            .unwrap_err();

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn range_needs_both_ends() {
        assert!(parse(&["summary", "--start", "03-01-2025"]).is_err());

        let cli = parse(&["summary", "--start", "03-01-2025", "--end", "03-31-2025"]).unwrap();
        match cli.command {
            Command::Summary(args) => {
                assert_eq!(args.range.range(), Some(("03-01-2025", "03-31-2025")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn scenario_collects_repeated_edits() {
        let cli = parse(&["scenario", "--set", "1:income=100", "--set", "2:eligible=yes"]).unwrap();

        match cli.command {
            Command::Scenario(args) => {
                assert_eq!(args.edits.len(), 2);
                assert_eq!(args.edits[1].edit, HypotheticalEdit::Eligibility(true));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn summary_sort_column() {
        let cli = parse(&["summary", "--sort", "income", "--desc"]).unwrap();

        match cli.command {
            Command::Summary(args) => {
                assert_eq!(args.sort, Some(SummaryColumn::TotalIncome));
                assert!(args.desc);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    // =========================================================================
    // Shell lines
    // =========================================================================

    #[test]
    fn split_line_groups_quoted_words() {
        assert_eq!(
            split_line(r#"employee add --name "Alice Reed" --department 'front office'"#),
            Ok(vec![
                "employee".to_string(),
                "add".to_string(),
                "--name".to_string(),
                "Alice Reed".to_string(),
                "--department".to_string(),
                "front office".to_string(),
            ])
        );
    }

    #[test]
    fn split_line_handles_blank_and_empty_quotes() {
        assert_eq!(split_line("   "), Ok(vec![]));
        assert_eq!(
            split_line(r#"note add 1 """#),
            Ok(vec!["note".to_string(), "add".to_string(), "1".to_string(), String::new()])
        );
    }

    #[test]
    fn split_line_rejects_unterminated_quote() {
        assert!(split_line(r#"employee add --name "Alice"#).is_err());
    }

    #[test]
    fn shell_line_parses_without_program_name() {
        let line = ShellLine::try_parse_from(["scenario", "--set", "1:income=100"]).unwrap();

        assert!(matches!(line.command, Command::Scenario(args) if args.edits.len() == 1));
    }

    #[test]
    fn shell_subcommand_parses() {
        assert!(matches!(parse(&["shell", "--db", ":memory:"]).unwrap().command, Command::Shell));
    }
}
