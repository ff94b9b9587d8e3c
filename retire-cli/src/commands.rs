//! Executes parsed commands against a repository, writing results to `out`.
//!
//! [`run`] handles a single command in a fresh session. [`shell`] keeps one
//! session alive across many input lines, so the hypothetical overlay built
//! by `scenario` persists until settings reset it.

use std::fs::File;
use std::io::Write;

use chrono::Local;
use clap::Parser;
use retire_core::calculations::{IncomeStatement, IncomeStatementInput};
use retire_core::period::DateWindow;
use retire_core::{
    IncomeFilter, NewAttendanceRecord, NewEmployee, NewIncomeRecord, NewNote,
    RetirementRepository, TaxableProfit,
};
use retire_data::IncomeCsvLoader;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::cli::{
    AttendanceCommand, Command, EmployeeCommand, IncomeCommand, NoteCommand, ProfitCommand,
    RangeArgs, ScenarioArgs, SettingsCommand, ShellLine, StatementArgs, SummaryArgs, split_line,
};
use crate::error::AppError;
use crate::render;
use crate::session::Session;

pub async fn run<W: Write>(
    command: Command,
    repo: &dyn RetirementRepository,
    out: &mut W,
) -> Result<(), AppError> {
    let mut session = Session::load(repo).await?;
    let text = execute(command, &mut session, repo).await?;
    writeln!(out, "{text}")?;
    Ok(())
}

/// Runs every line of `input` as a command against one session.
///
/// Blank lines and lines starting with `#` are skipped, and `exit` or `quit`
/// stops reading. A line that fails to parse or run prints its error and
/// the session carries on.
pub async fn shell<R, W>(
    input: R,
    repo: &dyn RetirementRepository,
    out: &mut W,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = Session::load(repo).await?;
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let words = match split_line(line) {
            Ok(words) => words,
            Err(message) => {
                writeln!(out, "error: {message}")?;
                continue;
            }
        };
        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                writeln!(out, "{}", err.to_string().trim_end())?;
                continue;
            }
        };

        match execute(command, &mut session, repo).await {
            Ok(text) => writeln!(out, "{text}")?,
            Err(err) => {
                warn!(line, error = %err, "shell command failed");
                writeln!(out, "error: {err}")?;
            }
        }
    }

    debug!(overlay = session.overlay().len(), "shell session ended");
    Ok(())
}

/// Runs `command` against `session`, returning the text to print.
pub async fn execute(
    command: Command,
    session: &mut Session,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    match command {
        Command::Employee(cmd) => employee(cmd, session, repo).await,
        Command::Income(cmd) => income(cmd, repo).await,
        Command::Note(cmd) => note(cmd, repo).await,
        Command::Attendance(cmd) => attendance(cmd, repo).await,
        Command::Settings(cmd) => settings(cmd, session, repo).await,
        Command::Profit(cmd) => profit(cmd, session, repo).await,
        Command::Summary(args) => summary(args, session, repo).await,
        Command::Scenario(args) => scenario(args, session, repo).await,
        Command::Compare { first, second } => {
            let (a, b) = session.compare(repo, first, second).await?;
            Ok(render::comparison(&a, &b, session.privacy()))
        }
        Command::Statement(args) => statement(args, session, repo).await,
        Command::Shell => Err(AppError::InvalidArgument(
            "shell cannot be started from inside a shell".to_string(),
        )),
    }
}

fn window(range: &RangeArgs) -> Result<Option<DateWindow>, AppError> {
    Ok(range
        .range()
        .map(|(start, end)| DateWindow::from_display(start, end))
        .transpose()?)
}

async fn require_employee(
    repo: &dyn RetirementRepository,
    employee_id: i64,
) -> Result<retire_core::Employee, AppError> {
    repo.get_employee(employee_id)
        .await
        .map_err(AppError::not_found(format!("employee {employee_id}")))
}

// ─── Records ────────────────────────────────────────────────────────────────

async fn employee(
    cmd: EmployeeCommand,
    session: &mut Session,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    match cmd {
        EmployeeCommand::Add {
            name,
            department,
            eligible,
        } => {
            let new = NewEmployee {
                name: name.trim().to_string(),
                department,
                eligible,
            };
            new.validate()?;
            let created = repo.create_employee(new).await?;
            info!(employee_id = created.id, "added employee");
            Ok(format!("Added {}", render::employee(&created, session.privacy())))
        }
        EmployeeCommand::List => {
            let employees = repo.list_employees().await?;
            Ok(render::employees(&employees, session.privacy()))
        }
        EmployeeCommand::Toggle { id } => {
            let mut current = require_employee(repo, id).await?;
            current.eligible = !current.eligible;
            repo.set_employee_eligibility(id, current.eligible).await?;
            Ok(render::employee(&current, session.privacy()))
        }
        EmployeeCommand::Delete { id } => {
            session.delete_employee(repo, id).await?;
            info!(employee_id = id, "deleted employee");
            Ok(format!("Deleted employee {id} and all of their records."))
        }
    }
}

async fn income(
    cmd: IncomeCommand,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    match cmd {
        IncomeCommand::Add {
            employee,
            amount,
            date,
            income_type,
        } => {
            let new = NewIncomeRecord {
                employee_id: employee,
                amount,
                date,
                income_type,
            };
            new.validate()?;
            require_employee(repo, employee).await?;
            let created = repo.create_income(new).await?;
            Ok(format!("Added income record {}.", created.id))
        }
        IncomeCommand::List { employee, range } => {
            let filter = IncomeFilter {
                employee_id: employee,
                window: window(&range)?,
            };
            Ok(render::income(&repo.list_income(filter).await?))
        }
        IncomeCommand::Edit {
            id,
            amount,
            date,
            income_type,
        } => {
            let mut record = repo
                .get_income(id)
                .await
                .map_err(AppError::not_found(format!("income record {id}")))?;
            if amount.is_none() && date.is_none() && income_type.is_none() {
                return Err(AppError::InvalidArgument(
                    "give at least one of --amount, --date, --type".to_string(),
                ));
            }
            record.amount = amount.unwrap_or(record.amount);
            record.date = date.unwrap_or(record.date);
            record.income_type = income_type.unwrap_or(record.income_type);
            record.validate()?;
            repo.update_income(&record).await?;
            Ok(format!("Updated income record {id}."))
        }
        IncomeCommand::Delete { id } => {
            repo.delete_income(id)
                .await
                .map_err(AppError::not_found(format!("income record {id}")))?;
            Ok(format!("Deleted income record {id}."))
        }
        IncomeCommand::Import { file } => {
            let reader = File::open(&file).map_err(|e| {
                AppError::InvalidArgument(format!("cannot open '{}': {e}", file.display()))
            })?;
            let records = IncomeCsvLoader::parse(reader)?;
            let inserted = IncomeCsvLoader::load(repo, &records).await?;
            info!(inserted, file = %file.display(), "imported income");
            Ok(format!("Imported {inserted} income records."))
        }
    }
}

async fn note(
    cmd: NoteCommand,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    match cmd {
        NoteCommand::Add {
            employee,
            text,
            date,
        } => {
            let new = NewNote {
                employee_id: employee,
                text: text.trim().to_string(),
                date: date.unwrap_or_else(|| Local::now().date_naive()),
            };
            new.validate()?;
            require_employee(repo, employee).await?;
            let created = repo.create_note(new).await?;
            Ok(format!("Added note {}.", created.id))
        }
        NoteCommand::List { employee } => {
            require_employee(repo, employee).await?;
            Ok(render::notes(&repo.list_notes(employee).await?))
        }
        NoteCommand::Edit {
            employee,
            id,
            text,
            date,
        } => {
            let mut note = repo
                .list_notes(employee)
                .await?
                .into_iter()
                .find(|n| n.id == id)
                .ok_or_else(|| AppError::NotFound(format!("note {id} of employee {employee}")))?;
            if let Some(text) = text {
                note.text = text.trim().to_string();
            }
            note.date = date.unwrap_or(note.date);
            note.validate()?;
            repo.update_note(&note).await?;
            Ok(format!("Updated note {id}."))
        }
        NoteCommand::Delete { id } => {
            repo.delete_note(id)
                .await
                .map_err(AppError::not_found(format!("note {id}")))?;
            Ok(format!("Deleted note {id}."))
        }
    }
}

async fn attendance(
    cmd: AttendanceCommand,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    match cmd {
        AttendanceCommand::Add {
            employee,
            date,
            status,
        } => {
            require_employee(repo, employee).await?;
            let created = repo
                .create_attendance(NewAttendanceRecord {
                    employee_id: employee,
                    date,
                    status,
                })
                .await?;
            Ok(format!("Added attendance record {}.", created.id))
        }
        AttendanceCommand::List { employee, range } => {
            require_employee(repo, employee).await?;
            let records = repo.list_attendance(employee, window(&range)?).await?;
            Ok(render::attendance(&records))
        }
        AttendanceCommand::Edit {
            employee,
            id,
            date,
            status,
        } => {
            let mut record = repo
                .list_attendance(employee, None)
                .await?
                .into_iter()
                .find(|r| r.id == id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("attendance record {id} of employee {employee}"))
                })?;
            record.date = date.unwrap_or(record.date);
            record.status = status.unwrap_or(record.status);
            repo.update_attendance(&record).await?;
            Ok(format!("Updated attendance record {id}."))
        }
        AttendanceCommand::Delete { id } => {
            repo.delete_attendance(id)
                .await
                .map_err(AppError::not_found(format!("attendance record {id}")))?;
            Ok(format!("Deleted attendance record {id}."))
        }
    }
}

// ─── Settings ───────────────────────────────────────────────────────────────

async fn settings(
    cmd: SettingsCommand,
    session: &mut Session,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    match cmd {
        SettingsCommand::Show => Ok(render::settings(session.settings())),
        SettingsCommand::Set {
            percentage,
            year,
            privacy,
        } => {
            let mut updated = session.settings().clone();
            if let Some(percentage) = percentage {
                updated.contribution_percentage = percentage;
            }
            if let Some(year) = year {
                updated.selected_year = year;
            }
            if let Some(privacy) = privacy {
                updated.privacy_mode = privacy;
            }
            let reset = session.update_settings(repo, updated).await?;
            let mut text = render::settings(session.settings());
            if reset {
                text.push_str("\nHypothetical scenario cleared.");
            }
            Ok(text)
        }
    }
}

async fn profit(
    cmd: ProfitCommand,
    session: &Session,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    match cmd {
        ProfitCommand::Show { year } => {
            let year = year.unwrap_or(session.settings().selected_year);
            let total_profit = repo.get_taxable_profit(year).await?;
            Ok(render::profit(&TaxableProfit { year, total_profit }))
        }
        ProfitCommand::Set { amount, year } => {
            let recorded = session.record_profit(repo, year, amount).await?;
            Ok(render::profit(&recorded))
        }
    }
}

// ─── Reports ────────────────────────────────────────────────────────────────

async fn summary(
    args: SummaryArgs,
    session: &Session,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    let mut report = session.summary(repo, args.range.range()).await?;
    if let Some(column) = args.sort {
        report.sort_by(column, args.desc);
    }
    let rows = report.filter(args.search.as_deref().unwrap_or(""));
    Ok(render::summary(&report, &rows, session.privacy()))
}

async fn scenario(
    args: ScenarioArgs,
    session: &mut Session,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    let report = session
        .scenario(repo, args.range.range(), &args.edits)
        .await?;
    Ok(render::scenario(&report, session.privacy()))
}

async fn statement(
    args: StatementArgs,
    session: &Session,
    repo: &dyn RetirementRepository,
) -> Result<String, AppError> {
    let input = IncomeStatementInput {
        revenue: args.revenue,
        cost_of_sales: args.cost_of_sales,
        admin_expenses: args.admin_expenses,
        other_operating_expenses: args.other_operating_expenses,
        finance_costs: args.finance_costs,
        other_income: args.other_income,
        tax: args.tax,
    };
    let result = IncomeStatement::calculate(&input)?;
    let mut text = render::statement(&result);

    if args.record {
        let recorded = session
            .record_profit(repo, args.year, result.profit_before_tax)
            .await?;
        text.push_str(&format!(
            "\n\nRecorded {} as taxable profit for fiscal year {}.",
            retire_core::format::format_currency(recorded.total_profit),
            recorded.year
        ));
    }
    Ok(text)
}
