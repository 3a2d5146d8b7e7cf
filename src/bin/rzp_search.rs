//! RZP search CLI
//!
//! Usage:
//!   cargo run --features cli --bin rzp-search -- person "Jan Novák" --min-age 18
//!   cargo run --features cli --bin rzp-search -- --json subject --ico 01895541
//!
//! Registry settings come from `RZP_*` environment variables (or `.env`).

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use rzp_aggregator::search::{born_after_for_max_age, born_before_for_min_age};
use rzp_aggregator::{
    AggregatedPerson, Aggregator, BirthDateBounds, DetailRecord, RzpClient, SearchConfig,
    SubjectKey,
};

#[derive(Parser)]
#[command(name = "rzp-search")]
#[command(version = "0.1.0")]
#[command(about = "Search people and economic subjects in the Czech trade register")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print debug logs to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search people by name and list the subjects they are linked to
    Person {
        /// Full name, surname last (e.g. "Jan Novák")
        name: String,

        /// Born on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        born_after: Option<NaiveDate>,

        /// Born on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, conflicts_with = "min_age")]
        born_before: Option<NaiveDate>,

        /// Minimum age today
        #[arg(long)]
        min_age: Option<u32>,

        /// Maximum age today
        #[arg(long, conflicts_with = "born_after")]
        max_age: Option<u32>,
    },

    /// Search economic subjects by name or identifier
    Subject(SubjectArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SubjectArgs {
    /// Business name
    #[arg(long)]
    name: Option<String>,

    /// Identification number (IČO, 8 digits)
    #[arg(long)]
    ico: Option<String>,
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("'{}' is not a YYYY-MM-DD date: {}", raw, e))
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Search failed");
            if cli.json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, json: bool) -> Result<()> {
    let config = SearchConfig::from_env().context("Invalid registry configuration")?;
    let client = RzpClient::connect(&config)
        .await
        .context("Failed to connect to the registry")?;
    let aggregator = Aggregator::new(Arc::new(client), config);

    match command {
        Commands::Person {
            name,
            born_after,
            born_before,
            min_age,
            max_age,
        } => {
            let today = Local::now().date_naive();
            let born_before = match min_age {
                Some(age) => Some(born_before_for_min_age(age, today)?),
                None => born_before,
            };
            let born_after = match max_age {
                Some(age) => Some(born_after_for_max_age(age, today)?),
                None => born_after,
            };
            let bounds = BirthDateBounds::new(born_after, born_before)?;

            let people = aggregator.search_people(&name, bounds).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&people)?);
            } else {
                print_people(&people);
            }
        }
        Commands::Subject(args) => {
            let key = match (args.name, args.ico) {
                (_, Some(ico)) => SubjectKey::ico(&ico)?,
                (Some(name), None) => SubjectKey::name(name)?,
                (None, None) => anyhow::bail!("either --name or --ico is required"),
            };

            let records = aggregator.search_subjects(key).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_subjects(&records);
            }
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

fn print_people(people: &[AggregatedPerson]) {
    if people.is_empty() {
        println!("{}", "No matching people".yellow());
        return;
    }

    for person in people {
        let born = person
            .birth_date
            .map(|d| d.format("%d.%m.%Y").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("{} (born {})", person.full_name.cyan().bold(), born);
        if let Some(ref citizenship) = person.citizenship {
            println!("  Citizenship: {}", citizenship);
        }
        if let Some(ref address) = person.address {
            println!("  Address: {}", address);
        }
        for subject in &person.subjects {
            println!(
                "  {} {} ({})",
                subject.ico.as_str().green(),
                subject.name,
                subject.address
            );
        }
        if !person.same_address_subjects.is_empty() {
            println!("  Same address: {}", person.same_address_subjects.join(", "));
        }
        println!();
    }
}

fn print_subjects(records: &[DetailRecord]) {
    if records.is_empty() {
        println!("{}", "No matching subjects".yellow());
        return;
    }

    for record in records {
        println!("{} {}", record.ico.as_str().green().bold(), record.full_name.cyan());
        if !record.address.is_empty() {
            println!("  Address: {}", record.address);
        }
        for trade in &record.trades {
            println!(
                "  - {} (since {}, {})",
                trade.trade_type,
                trade.date_of_origin.format("%d.%m.%Y"),
                trade.license_validity
            );
        }
        println!();
    }
}
