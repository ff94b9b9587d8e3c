use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use retire_data::IncomeCsvLoader;
use retire_db_sqlite::{SqliteRepository, connection_url};

/// Import income transactions from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - employee_id: id of an existing employee
/// - amount: positive amount paid (e.g., 1500.00)
/// - date: MM-DD-YYYY or MMDDYYYY
/// - type: Salary or Bonus
#[derive(Parser, Debug)]
#[command(name = "retire-income-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing income transactions
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database file (created if missing)
    #[arg(short, long, default_value = "retirement.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let url = connection_url(&args.database);

    let repo = SqliteRepository::new(&url)
        .await
        .with_context(|| format!("Failed to connect to database: {url}"))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = IncomeCsvLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} income records from {}", records.len(), args.file.display());

    let inserted = IncomeCsvLoader::load(&repo, &records)
        .await
        .context("Failed to load income records into database")?;

    println!("Successfully imported {inserted} income records.");

    Ok(())
}
