use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
mod testutil;

mod categories;
mod comment;
mod config;
mod filespec;
mod fixture;
mod ledger;
mod matching;
mod money;
mod ocr;
mod receipt;
mod tags;

#[derive(Debug, Parser)]
/// Turns OCR scans of paper receipts into Ledger transactions and matches
/// them with recorded card transactions.
struct Command {
    /// Logs more detail to stderr. Repeat for more. RUST_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Debug, Subcommand)]
enum SubCommand {
    /// Parses OCR output of receipts and writes them as Ledger transactions.
    Scan(receipt::cmd::Command),
    /// Parses receipts and matches them with the transactions in Ledger
    /// journals, writing a report.
    Match(matching::cmd::Command),
    /// Checks a parsed receipt against an expectation document. Exits
    /// non-zero on any mismatch.
    Check(fixture::cmd::Command),
    /// Shows the account that the category rules pick for item descriptions.
    Categorize(categories::cmd::Command),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cmd = Command::parse();
    init_logging(cmd.verbose);
    use SubCommand::*;
    match cmd.subcmd {
        Scan(cmd) => cmd.run(),
        Match(cmd) => cmd.run(),
        Check(cmd) => cmd.run(),
        Categorize(cmd) => cmd.run(),
    }
}
