//! Maps item descriptions to ledger expense accounts with an ordered rule
//! list loaded from RON files.

use std::collections::HashSet;
use std::fmt;

use serde::de;
use serde_derive::Deserialize;

pub mod cmd;
pub mod fuzzy;
pub mod source;

use fuzzy::FuzzyKeyword;

/// Account for items that no rule matches.
pub const DEFAULT_NEEDS_REVIEW: &str = "Expenses:FIXME";

/// Matches an item description. All matching ignores case.
#[derive(Debug, Deserialize)]
pub enum Matcher {
    /// Every keyword must occur somewhere in the description.
    Keywords(Vec<String>),
    /// Every word must occur as a whole word.
    Words(Vec<String>),
    /// Every keyword must occur, allowing for OCR misreads.
    Fuzzy(Vec<FuzzyKeyword>),
    Matches(Regex),
    Any(Vec<Matcher>),
}

impl Matcher {
    pub fn is_match(&self, description: &str) -> bool {
        use Matcher::*;
        match self {
            Keywords(keywords) => {
                let upper = description.to_uppercase();
                keywords
                    .iter()
                    .all(|k| upper.contains(k.trim().to_uppercase().as_str()))
            }
            Words(words) => {
                let upper = description.to_uppercase();
                let desc_words: Vec<&str> = upper
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|w| !w.is_empty())
                    .collect();
                words.iter().all(|w| {
                    let w = w.trim().to_uppercase();
                    desc_words.iter().any(|dw| *dw == w)
                })
            }
            Fuzzy(keywords) => keywords.iter().all(|k| k.is_match(description)),
            Matches(regex) => regex.0.is_match(description),
            Any(matchers) => matchers.iter().any(|m| m.is_match(description)),
        }
    }

    /// Restricts the listed fuzzy keywords to exact matches.
    pub fn mark_exact(&mut self, exact_only: &HashSet<String>) {
        use Matcher::*;
        match self {
            Fuzzy(keywords) => {
                for k in keywords {
                    k.exact = exact_only.contains(&k.text);
                }
            }
            Any(matchers) => {
                for m in matchers {
                    m.mark_exact(exact_only);
                }
            }
            Keywords(_) | Words(_) | Matches(_) => {}
        }
    }

    /// Describes why the matcher cannot ever be useful, if so.
    fn problem(&self) -> Option<&'static str> {
        use Matcher::*;
        match self {
            Keywords(list) | Words(list) if list.is_empty() => Some("empty keyword list"),
            Keywords(list) | Words(list) if list.iter().any(|k| k.trim().is_empty()) => {
                Some("blank keyword")
            }
            Fuzzy(list) if list.is_empty() => Some("empty keyword list"),
            Fuzzy(list) if list.iter().any(|k| k.text.is_empty()) => Some("blank keyword"),
            Any(matchers) if matchers.is_empty() => Some("empty Any list"),
            Any(matchers) => matchers.iter().find_map(Matcher::problem),
            _ => None,
        }
    }
}

/// A case-insensitive regular expression deserialized from a string.
#[derive(Debug)]
pub struct Regex(regex::Regex);

impl<'de> de::Deserialize<'de> for Regex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(RegexVisitor)
    }
}

struct RegexVisitor;

impl<'de> de::Visitor<'de> for RegexVisitor {
    type Value = Regex;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a string containing a regular expression")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        regex::RegexBuilder::new(v)
            .case_insensitive(true)
            .build()
            .map(Regex)
            .map_err(|e| E::custom(format!("{}", e)))
    }
}

/// A rule whose target has been resolved to an account.
#[derive(Debug)]
pub struct Rule {
    pub matcher: Matcher,
    pub account: String,
}

/// The ordered rule list. The first matching rule decides the account.
#[derive(Debug)]
pub struct CategoryRules {
    rules: Vec<Rule>,
    needs_review: String,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_NEEDS_REVIEW.to_string())
    }
}

impl CategoryRules {
    pub fn new(rules: Vec<Rule>, needs_review: String) -> Self {
        Self {
            rules,
            needs_review,
        }
    }

    /// Returns the account for an item description.
    pub fn categorize(&self, description: &str) -> &str {
        self.find(description)
            .map(|(_, rule)| rule.account.as_str())
            .unwrap_or(&self.needs_review)
    }

    /// Returns the index and rule that matched, if any.
    pub fn find(&self, description: &str) -> Option<(usize, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matcher.is_match(description))
    }

    pub fn needs_review(&self) -> &str {
        &self.needs_review
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn matcher(s: &str) -> Matcher {
        ron::de::from_str(s).unwrap()
    }

    #[test_case(r#"Keywords(["COORS"])"#, "COORS LIGHT 6 PK" => true)]
    #[test_case(r#"Keywords(["coors"])"#, "COORS LIGHT 6 PK" => true; "ignores case")]
    #[test_case(r#"Keywords(["COORS", "LIGHT"])"#, "COORS LIGHT" => true; "all keywords present")]
    #[test_case(r#"Keywords(["COORS", "BANQUET"])"#, "COORS LIGHT" => false; "one keyword missing")]
    #[test_case(r#"Keywords(["EGG"])"#, "EGGPLANT" => true; "substring")]
    #[test_case(r#"Words(["EGG"])"#, "EGGPLANT" => false; "whole word only")]
    #[test_case(r#"Words(["EGG"])"#, "LARGE EGG 12" => true; "whole word present")]
    #[test_case(r#"Fuzzy(["EGGS"])"#, "LARGE EGOS" => true; "fuzzy misread")]
    #[test_case(r#"Fuzzy(["MILK"])"#, "M1LK 2L" => true; "fuzzy digit for letter")]
    #[test_case(r#"Fuzzy(["MILK", "CHOC"])"#, "M1LK 2L" => false; "fuzzy needs every keyword")]
    #[test_case(r#"Words(["EGGS"])"#, "LARGE EGOS" => false; "words are exact")]
    #[test_case(r#"Matches("^LYS(OL)?\\b")"#, "lysol bath" => true; "regex ignores case")]
    #[test_case(r#"Any([Keywords(["BEER"]), Keywords(["COORS"])])"#, "COORS" => true)]
    fn matches(m: &str, description: &str) -> bool {
        matcher(m).is_match(description)
    }

    #[test_case(r#"Keywords([])"# => Some("empty keyword list"))]
    #[test_case(r#"Words(["BEER", " "])"# => Some("blank keyword"))]
    #[test_case(r#"Any([Keywords([])])"# => Some("empty keyword list"); "nested")]
    #[test_case(r#"Fuzzy([])"# => Some("empty keyword list"); "empty fuzzy")]
    #[test_case(r#"Fuzzy(["  "])"# => Some("blank keyword"); "blank fuzzy")]
    #[test_case(r#"Keywords(["BEER"])"# => None)]
    fn problems(m: &str) -> Option<&'static str> {
        matcher(m).problem()
    }

    #[test]
    fn first_match_wins() {
        let rules = CategoryRules::new(
            vec![
                Rule {
                    matcher: matcher(r#"Keywords(["COORS"])"#),
                    account: "Expenses:Food:AlcoholicBeverage".to_string(),
                },
                Rule {
                    matcher: matcher(r#"Keywords(["LIGHT"])"#),
                    account: "Expenses:Home:Lighting".to_string(),
                },
            ],
            DEFAULT_NEEDS_REVIEW.to_string(),
        );
        assert_eq!(
            "Expenses:Food:AlcoholicBeverage",
            rules.categorize("COORS LIGHT")
        );
        assert_eq!("Expenses:Home:Lighting", rules.categorize("LED LIGHT"));
        assert_eq!("Expenses:FIXME", rules.categorize("MYSTERY ITEM"));
        assert_eq!("Expenses:FIXME", rules.categorize(""));
    }

    #[test]
    fn fuzzy_rule_keeps_rule_order() {
        let rules = CategoryRules::new(
            vec![
                Rule {
                    matcher: matcher(r#"Words(["EGOS"])"#),
                    account: "Expenses:Misc".to_string(),
                },
                Rule {
                    matcher: matcher(r#"Fuzzy(["EGGS"])"#),
                    account: "Expenses:Food:Grocery:Dairy".to_string(),
                },
            ],
            DEFAULT_NEEDS_REVIEW.to_string(),
        );
        assert_eq!("Expenses:Misc", rules.categorize("LARGE EGOS"));
        assert_eq!("Expenses:Food:Grocery:Dairy", rules.categorize("LARGE EG6S"));
    }

    #[test]
    fn mark_exact_reaches_nested_fuzzy() {
        let mut m = matcher(r#"Any([Fuzzy(["EGGS"]), Fuzzy(["MILK"])])"#);
        m.mark_exact(&["EGGS".to_string()].into_iter().collect());
        assert!(!m.is_match("LARGE EGOS"));
        assert!(m.is_match("M1LK"));
    }
}
