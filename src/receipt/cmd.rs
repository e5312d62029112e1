use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;
use tracing::debug;

use crate::config::PipelineArgs;
use crate::filespec::{self, FileSpec};
use crate::ledger::format::format_receipt;
use crate::matching::ScannedReceipt;
use crate::ocr::{read_boxes, InputFormat, OcrBox};
use crate::receipt::ReceiptParser;

#[derive(Debug, Args)]
pub struct Command {
    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Format of the OCR inputs. Guessed from each file name when absent.
    #[arg(long = "format", value_enum)]
    format: Option<InputFormat>,

    /// The ledger file to write to (overwrites any existing file). "-" writes
    /// to stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: FileSpec,

    /// OCR output files to read. "-" reads stdin.
    #[arg(required = true)]
    inputs: Vec<FileSpec>,
}

impl Command {
    pub fn run(&self) -> Result<()> {
        let config = self.pipeline.config()?;
        let parser = self.pipeline.parser(&config)?;
        let receipts = scan_inputs(&parser, &self.inputs, self.format)?;
        let text = receipts
            .iter()
            .map(|r| format_receipt(&r.receipt, Some(&r.id), &config.format))
            .collect::<Vec<_>>()
            .join("\n");
        filespec::write_file(&self.output, &text)
    }
}

/// Reads and parses each input. Receipts are identified by their path as
/// given.
pub fn scan_inputs(
    parser: &ReceiptParser,
    inputs: &[FileSpec],
    format: Option<InputFormat>,
) -> Result<Vec<ScannedReceipt>> {
    let mut loaded: Vec<(String, Vec<OcrBox>)> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let id = input.name();
        let format = format.unwrap_or_else(|| InputFormat::from_file_name(&id));
        let boxes = read_boxes(input.reader()?, format)
            .with_context(|| format!("reading OCR boxes from {}", input))?;
        debug!(input = %input, boxes = boxes.len(), "read OCR boxes");
        loaded.push((id, boxes));
    }

    loaded
        .into_par_iter()
        .map(|(id, boxes)| -> Result<ScannedReceipt> {
            let receipt = parser
                .parse(&boxes)
                .with_context(|| format!("parsing receipt {}", id))?;
            Ok(ScannedReceipt { id, receipt })
        })
        .collect()
}
