use anyhow::Result;
use clap::Args;

use crate::categories::CategoryRules;
use crate::config::PipelineArgs;
use crate::filespec::{self, FileSpec};

#[derive(Debug, Args)]
pub struct Command {
    #[command(flatten)]
    pipeline: PipelineArgs,

    /// The file to write to. "-" writes to stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: FileSpec,

    /// Item descriptions to categorize, as printed on a receipt.
    #[arg(required = true)]
    descriptions: Vec<String>,
}

impl Command {
    pub fn run(&self) -> Result<()> {
        let rules = self.pipeline.categories()?;
        filespec::write_file(&self.output, &explain(&rules, &self.descriptions))
    }
}

/// One line per description naming the chosen account and the rule that
/// chose it.
fn explain(rules: &CategoryRules, descriptions: &[String]) -> String {
    let mut out = String::new();
    for description in descriptions {
        let line = match rules.find(description) {
            Some((index, rule)) => format!("{}\t{}\trule {}\n", description, rule.account, index + 1),
            None => format!("{}\t{}\tneeds review\n", description, rules.needs_review()),
        };
        out.push_str(&line);
    }
    out
}
