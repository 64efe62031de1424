//! `concord` binary: one-shot reconciliation runs from the command line.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use concord_cli::export;
use concord_engine::{reconcile, ReconConfig, ReconReport};
use concord_ingest::{ingest_document, load_document, parse_statement, BankParseOptions};

#[derive(Parser)]
#[command(name = "concord", version, about = "Bank/broker statement reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a reconciliation and export the result sets
    Run {
        /// Bank statement text dump
        #[arg(long)]
        bank: PathBuf,

        /// Broker ledger extraction (JSON tables)
        #[arg(long)]
        broker: PathBuf,

        /// Run configuration; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for the CSV result sets
        #[arg(long, default_value = "recon-out")]
        out: PathBuf,

        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Validate a run configuration without reconciling
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Run {
            bank,
            broker,
            config,
            out,
            json,
        } => run(bank, broker, config, out, json),
        Command::Validate { config } => validate(config),
    }
}

fn run(
    bank: PathBuf,
    broker: PathBuf,
    config: Option<PathBuf>,
    out: PathBuf,
    json: bool,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => {
            ReconConfig::load(&path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => ReconConfig::default(),
    };

    let statement_text = fs::read_to_string(&bank)
        .with_context(|| format!("reading bank statement {}", bank.display()))?;
    let statement = parse_statement(&statement_text, &BankParseOptions::default());
    info!(
        rows = statement.transactions.len(),
        exceptions = statement.exceptions.len(),
        "bank statement ingested"
    );

    let document = load_document(&broker)
        .with_context(|| format!("reading broker extraction {}", broker.display()))?;
    let ledger = ingest_document(&document).context("mapping broker ledger rows")?;
    info!(rows = ledger.len(), "broker ledger ingested");

    // An empty side is a valid run, but rarely an intended one.
    if statement.transactions.is_empty() {
        warn!("bank statement yielded no transactions");
    }
    if ledger.is_empty() {
        warn!("broker ledger yielded no rows");
    }

    let report = reconcile(statement.transactions, ledger, statement.exceptions, &config);
    export::write_report(&report, &out)
        .with_context(|| format!("writing result sets to {}", out.display()))?;
    info!(out = %out.display(), "result sets written");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn validate(path: PathBuf) -> anyhow::Result<()> {
    let config =
        ReconConfig::load(&path).with_context(|| format!("loading config {}", path.display()))?;
    println!(
        "ok: window {} days, similarity {} (threshold {})",
        config.date_window_days,
        if config.similarity_enabled { "on" } else { "off" },
        config.similarity_threshold
    );
    Ok(())
}

fn print_summary(report: &ReconReport) {
    let s = &report.summary;
    println!("bank rows    {}", s.bank_total);
    println!("broker rows  {}", s.broker_total);
    println!("matched      {}", s.matched);
    println!("partial      {}", s.partial);
    println!("unmatched    {} bank / {} broker", s.unmatched_bank, s.unmatched_broker);
    println!("exceptions   {}", s.exceptions);
}
