//! Functions to read and write text files. Allows use of "-" as a way to
//! specify stdin or stdout.

use std::convert::Infallible;
use std::fmt;
use std::fs::File;
use std::io::{stdin, stdout, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use ledger_parser::Ledger;

/// Specifies a file to read from to write to (depending on context).
#[derive(Clone, Debug, PartialEq)]
pub enum FileSpec {
    /// Read from stdin or write to stdout.
    Stdio,
    /// Read from or write to the file at the given path.
    Path(PathBuf),
}

impl fmt::Display for FileSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use FileSpec::*;
        match self {
            Stdio => f.write_str("<stdio>"),
            Path(path) => write!(f, "{:?}", path),
        }
    }
}

impl FileSpec {
    pub fn reader(&self) -> Result<Box<dyn Read>> {
        use FileSpec::*;
        Ok(match self {
            Stdio => Box::new(stdin()),
            Path(path) => Box::new(
                File::open(path).with_context(|| format!("opening {:?} for reading", path))?,
            ),
        })
    }

    pub fn writer(&self) -> Result<Box<dyn Write>> {
        use FileSpec::*;
        Ok(match self {
            Stdio => Box::new(stdout()),
            Path(path) => Box::new(
                File::create(path).with_context(|| format!("opening {:?} for writing", path))?,
            ),
        })
    }

    /// The path as given, used to identify receipts and journals in output.
    pub fn name(&self) -> String {
        use FileSpec::*;
        match self {
            Stdio => "-".to_string(),
            Path(path) => path.display().to_string(),
        }
    }
}

impl FromStr for FileSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use FileSpec::*;
        if s == "-" {
            Ok(Stdio)
        } else {
            Ok(Path(s.into()))
        }
    }
}

pub fn read_file(file_spec: &FileSpec) -> Result<String> {
    let mut f = file_spec.reader()?;
    let mut content = String::new();
    f.read_to_string(&mut content)
        .with_context(|| format!("reading {}", file_spec))?;
    Ok(content)
}

pub fn read_ledger_file(file_spec: &FileSpec) -> Result<Ledger> {
    let content: String = read_file(file_spec)?;
    ledger_parser::parse(&content).map_err(|e| anyhow!("parsing {}: {}", file_spec, e))
}

pub fn write_file(file_spec: &FileSpec, content: &str) -> Result<()> {
    let mut f = file_spec.writer()?;
    f.write_all(content.as_bytes())
        .with_context(|| format!("writing {}", file_spec))?;
    Ok(())
}
