use anyhow::{Context, Result};
use clap::Args;
use itertools::Itertools;

use crate::config::PipelineArgs;
use crate::filespec::{self, FileSpec};
use crate::ledger::journal::transactions_from_ledger;
use crate::matching::{match_receipts, MatchResult, MatchStatus};
use crate::ocr::InputFormat;
use crate::receipt::cmd::scan_inputs;

#[derive(Debug, Args)]
pub struct Command {
    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Format of the OCR inputs. Guessed from each file name when absent.
    #[arg(long = "format", value_enum)]
    format: Option<InputFormat>,

    /// Ledger journal holding the recorded card/bank transactions. May be
    /// given more than once.
    #[arg(short = 'j', long = "journal", required = true)]
    journals: Vec<FileSpec>,

    /// Write the report as JSON instead of text.
    #[arg(long = "json")]
    json: bool,

    /// The file to write the report to. "-" writes to stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: FileSpec,

    /// OCR output files of the receipts to match.
    #[arg(required = true)]
    inputs: Vec<FileSpec>,
}

impl Command {
    pub fn run(&self) -> Result<()> {
        let config = self.pipeline.config()?;
        let parser = self.pipeline.parser(&config)?;
        let receipts = scan_inputs(&parser, &self.inputs, self.format)?;

        let mut txns = Vec::new();
        for journal in &self.journals {
            let ledger = filespec::read_ledger_file(journal)?;
            txns.extend(transactions_from_ledger(&ledger, &journal.name()));
        }

        let results = match_receipts(&receipts, &txns, &config.matching)?;
        let report = if self.json {
            let mut s =
                serde_json::to_string_pretty(&results).context("serializing match results")?;
            s.push('\n');
            s
        } else {
            format_report(&results)
        };
        filespec::write_file(&self.output, &report)
    }
}

/// One line per receipt, followed by the candidates of ambiguous receipts.
pub fn format_report(results: &[MatchResult]) -> String {
    let width = results
        .iter()
        .map(|r| r.receipt_id.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for r in results {
        out.push_str(&format!(
            "{:<width$}  {:<9}  {:<6}  {}\n",
            r.receipt_id,
            r.status.to_string(),
            r.score.to_string(),
            r.transaction_id.as_deref().unwrap_or("-"),
            width = width
        ));
        if r.status == MatchStatus::Ambiguous {
            let ids = r.candidates.iter().map(|c| c.transaction_id.as_str()).join(", ");
            out.push_str(&format!("    candidates: {}\n", ids));
        }
    }
    out
}
