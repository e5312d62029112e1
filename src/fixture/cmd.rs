use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use crate::config::PipelineArgs;
use crate::filespec::FileSpec;
use crate::fixture::Expectation;
use crate::ocr::InputFormat;
use crate::receipt::cmd::scan_inputs;

#[derive(Debug, Args)]
pub struct Command {
    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Format of the OCR input. Guessed from the file name when absent.
    #[arg(long = "format", value_enum)]
    format: Option<InputFormat>,

    /// OCR output of the receipt. "-" reads stdin.
    input: FileSpec,

    /// JSON expectation document for the receipt.
    expected: FileSpec,
}

impl Command {
    pub fn run(&self) -> Result<()> {
        let config = self.pipeline.config()?;
        let parser = self.pipeline.parser(&config)?;
        let want = Expectation::load(&self.expected)?;

        let scanned = scan_inputs(&parser, std::slice::from_ref(&self.input), self.format)?;
        let mut mismatches = Vec::new();
        for r in &scanned {
            mismatches.extend(want.check(&r.receipt));
        }

        if !mismatches.is_empty() {
            for m in &mismatches {
                eprintln!("{}: {}", self.input, m);
            }
            bail!("{} does not meet {}: {} mismatch(es)", self.input, self.expected, mismatches.len());
        }
        info!(input = %self.input, "receipt meets expectations");
        println!("{}: ok", self.input);
        Ok(())
    }
}
