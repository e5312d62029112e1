//! Loads category rules from RON files.
//!
//! A rules file is a list of entries:
//!
//! ```ron
//! [
//!     Include("accounts.ron"),
//!     Accounts({"alcoholic_beverage": "Expenses:Food:AlcoholicBeverage"}),
//!     Rule(Keywords(["COORS"]), "alcoholic_beverage"),
//!     Rule(Words(["BEER"]), "Expenses:Food:AlcoholicBeverage"),
//!     Rule(Fuzzy(["EGGS"]), "Expenses:Food:Grocery:Dairy"),
//!     ExactOnly(["TEA", "HAM"]),
//!     NeedsReview("Expenses:FIXME"),
//! ]
//! ```
//!
//! Rule targets containing `:` are accounts, anything else is a key looked up
//! in the `Accounts` mappings. `ExactOnly` keywords never match fuzzily in any
//! `Fuzzy` rule, wherever the rule appears. Included files are read relative to the
//! including file, once each, and their rules take the position of the
//! `Include` entry.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde_derive::Deserialize;

use crate::categories::{CategoryRules, Matcher, Rule, DEFAULT_NEEDS_REVIEW};

pub fn load_from_path(path: &Path) -> Result<CategoryRules> {
    let sf = SourceFile::from_path(path)?;
    sf.load()
}

#[cfg(test)]
pub fn load_from_str(s: &str) -> Result<CategoryRules> {
    let sf = SourceFile::from_str(s)?;
    sf.load()
}

#[derive(Debug)]
struct SourceFile {
    source: Option<PathBuf>,
    entries: Vec<SourceEntry>,
}

/// Everything collected from a file and its includes, before targets are
/// resolved.
#[derive(Default)]
struct Collected {
    rules: Vec<(Matcher, String)>,
    accounts: HashMap<String, String>,
    exact_only: HashSet<String>,
    needs_review: Option<String>,
}

impl SourceFile {
    fn from_path(path: &Path) -> Result<Self> {
        let entries: Vec<SourceEntry> = ron::de::from_reader(
            File::open(path).with_context(|| format!("opening {:?} for reading", path))?,
        )
        .with_context(|| format!("parsing {:?}", path))?;
        Ok(SourceFile {
            source: Some(path.to_owned()),
            entries,
        })
    }

    #[cfg(test)]
    fn from_str(s: &str) -> Result<Self> {
        let entries: Vec<SourceEntry> = ron::de::from_str(s)?;
        Ok(Self {
            source: None,
            entries,
        })
    }

    fn load(self) -> Result<CategoryRules> {
        let mut collected = Collected::default();
        let mut seen_paths = HashSet::new();
        self.load_into(&mut collected, &mut seen_paths)?;

        let Collected {
            rules,
            accounts,
            exact_only,
            needs_review,
        } = collected;
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(i, (mut matcher, target))| -> Result<Rule> {
                matcher.mark_exact(&exact_only);
                if let Some(problem) = matcher.problem() {
                    bail!("rule #{} ({:?}): {}", i + 1, matcher, problem);
                }
                let account = resolve_target(&target, &accounts)
                    .with_context(|| format!("rule #{} ({:?})", i + 1, matcher))?;
                Ok(Rule { matcher, account })
            })
            .collect::<Result<Vec<_>>>()?;

        let needs_review = needs_review.unwrap_or_else(|| DEFAULT_NEEDS_REVIEW.to_string());
        if !is_account(&needs_review) {
            bail!("NeedsReview({:?}) is not an account name", needs_review);
        }
        Ok(CategoryRules::new(rules, needs_review))
    }

    fn load_into(
        self,
        collected: &mut Collected,
        seen_paths: &mut HashSet<Option<PathBuf>>,
    ) -> Result<()> {
        let self_path = self
            .source
            .as_ref()
            .map(std::fs::canonicalize)
            .transpose()
            .with_context(|| format!("canonicalizing path {:?}", self.source))?;
        if !seen_paths.insert(self_path.clone()) {
            // Already loaded.
            return Ok(());
        }

        for entry in self.entries {
            match entry {
                SourceEntry::Include(include_path) => {
                    let include_path = match self_path {
                        Some(ref self_path) => {
                            let parent_dir = self_path.parent().ok_or_else(|| {
                                anyhow!(
                                    "unexpected missing parent directory for path {:?}",
                                    self_path
                                )
                            })?;
                            parent_dir.join(include_path)
                        }
                        None => include_path,
                    };

                    let included_file = Self::from_path(&include_path)?;
                    included_file
                        .load_into(collected, seen_paths)
                        .with_context(|| format!("when including from {:?}", include_path))?;
                }
                SourceEntry::Accounts(mapping) => {
                    use std::collections::hash_map::Entry::*;
                    for (key, account) in mapping {
                        if !is_account(&account) {
                            bail!("key {:?} maps to {:?}, which is not an account name", key, account);
                        }
                        match collected.accounts.entry(key) {
                            Occupied(entry) if entry.get() != &account => {
                                bail!(
                                    "found conflicting accounts {:?} and {:?} for key {:?}",
                                    entry.get(),
                                    account,
                                    entry.key()
                                );
                            }
                            Occupied(_) => {}
                            Vacant(entry) => {
                                entry.insert(account);
                            }
                        }
                    }
                }
                SourceEntry::Rule(matcher, target) => {
                    collected.rules.push((matcher, target));
                }
                SourceEntry::ExactOnly(keywords) => {
                    collected
                        .exact_only
                        .extend(keywords.iter().map(|k| k.trim().to_uppercase()));
                }
                SourceEntry::NeedsReview(account) => {
                    if let Some(existing) = &collected.needs_review {
                        bail!(
                            "found duplicate NeedsReview entries {:?} and {:?}",
                            existing,
                            account
                        );
                    }
                    collected.needs_review = Some(account);
                }
            }
        }

        Ok(())
    }
}

fn is_account(s: &str) -> bool {
    s.contains(':') && s.split(':').all(|part| !part.trim().is_empty())
}

fn resolve_target(target: &str, accounts: &HashMap<String, String>) -> Result<String> {
    if is_account(target) {
        return Ok(target.to_string());
    }
    accounts
        .get(target)
        .cloned()
        .ok_or_else(|| anyhow!("unknown category key {:?}", target))
}

#[derive(Debug, Deserialize)]
enum SourceEntry {
    Include(PathBuf),
    Accounts(BTreeMap<String, String>),
    Rule(Matcher, String),
    ExactOnly(Vec<String>),
    NeedsReview(String),
}
