//! Tunable settings, read from an optional RON file.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::categories::{self, CategoryRules};
use crate::ledger::format::FormatConfig;
use crate::matching::MatchConfig;
use crate::ocr::cluster::ClusterConfig;
use crate::receipt::assemble::AssemblyConfig;
use crate::receipt::classify::ClassifyConfig;
use crate::receipt::ReceiptParser;

/// All settings. Missing sections and fields take their defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    pub cluster: ClusterConfig,
    pub classify: ClassifyConfig,
    pub assembly: AssemblyConfig,
    pub format: FormatConfig,
    pub matching: MatchConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config = ron::de::from_reader(
            File::open(path).with_context(|| format!("opening {:?} for reading", path))?,
        )
        .with_context(|| format!("parsing {:?}", path))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Options shared by the commands that parse receipts.
#[derive(Debug, Args)]
pub struct PipelineArgs {
    /// RON file with settings overriding the defaults.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// RON file of category rules. Without it every item needs review.
    #[arg(long = "categories")]
    categories: Option<PathBuf>,
}

impl PipelineArgs {
    pub fn config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load(path),
            None => Ok(Config::default()),
        }
    }

    pub fn categories(&self) -> Result<CategoryRules> {
        match &self.categories {
            Some(path) => categories::source::load_from_path(path),
            None => Ok(CategoryRules::default()),
        }
    }

    pub fn parser(&self, config: &Config) -> Result<ReceiptParser> {
        ReceiptParser::new(config, self.categories()?).context("compiling keyword patterns")
    }
}

#[cfg(test)]
mod tests {
    use crate::money::Cents;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = ron::de::from_str(
            r#"(
                assembly: (balance_tolerance: 5),
                format: (currency: "USD", payment_account: "Liabilities:Amex"),
                matching: (date_window_days: 3),
            )"#,
        )
        .unwrap();
        assert_eq!(Cents(5), config.assembly.balance_tolerance);
        assert_eq!(0.6, config.assembly.min_item_confidence);
        assert_eq!("USD", config.format.currency);
        assert_eq!("Liabilities:Amex", config.format.payment_account);
        assert_eq!("Expenses:Tax:HST", config.format.tax_account);
        assert_eq!(3, config.matching.date_window_days);
        assert_eq!(MatchConfig::default().min_score, config.matching.min_score);
        assert_eq!(ClusterConfig::default(), config.cluster);
    }

    #[test]
    fn example_config_loads() {
        let config = Config::load(Path::new("testdata/config.ron")).unwrap();
        assert_eq!(Cents(10), config.matching.amount_soft_band);
        assert!(config
            .classify
            .known_merchants
            .iter()
            .any(|m| m == "LOBLAW"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load(Path::new("testdata/no-such-config.ron")).unwrap_err();
        assert!(format!("{:#}", err).contains("no-such-config.ron"));
    }
}
