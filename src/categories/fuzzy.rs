//! Keyword matching that tolerates OCR misreads such as `EGOS` for `EGGS`
//! or `M1LK` for `MILK`.

use std::collections::BTreeSet;

use serde_derive::Deserialize;

/// Keywords this short (ignoring spaces) only match as whole words, so that
/// `TEA` does not match inside `STEAK`.
const WHOLE_WORD_MAX_LEN: usize = 3;
/// Keywords this short are compared letter by letter against single words.
const SHORT_MAX_LEN: usize = 4;
const SHORT_THRESHOLD: f64 = 0.75;
const MEDIUM_MAX_LEN: usize = 6;
const MEDIUM_THRESHOLD: f64 = 0.80;
const LONG_THRESHOLD: f64 = 0.70;

/// An uppercased keyword. `exact` keywords skip the similarity search.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "String")]
pub struct FuzzyKeyword {
    pub text: String,
    pub exact: bool,
}

impl From<String> for FuzzyKeyword {
    fn from(s: String) -> Self {
        Self {
            text: s.trim().to_uppercase(),
            exact: false,
        }
    }
}

impl FuzzyKeyword {
    pub fn is_match(&self, description: &str) -> bool {
        let desc = description.to_uppercase();
        let keyword = compact(&self.text);
        let len = keyword.chars().count();

        if len <= WHOLE_WORD_MAX_LEN {
            let want: Vec<&str> = self.text.split_whitespace().collect();
            let have = words(&desc);
            return !want.is_empty() && have.windows(want.len()).any(|w| w == want.as_slice());
        }

        let desc_compact = compact(&desc);
        if desc_compact.contains(&keyword) {
            return true;
        }
        if self.exact {
            return false;
        }

        let keyword: Vec<char> = fold_confusables(&keyword).chars().collect();
        let folded = fold_confusables(&desc_compact);
        if folded.contains(&keyword.iter().collect::<String>()) {
            return true;
        }

        if len <= SHORT_MAX_LEN {
            words(&desc).iter().any(|word| {
                let word: Vec<char> = fold_confusables(word).chars().collect();
                word.len() == keyword.len()
                    && word.first() == keyword.first()
                    && positional_similarity(&keyword, &word) >= SHORT_THRESHOLD
            })
        } else {
            let threshold = if len <= MEDIUM_MAX_LEN {
                MEDIUM_THRESHOLD
            } else {
                LONG_THRESHOLD
            };
            let desc: Vec<char> = folded.chars().collect();
            // Windows one longer than the keyword allow for an inserted
            // character.
            let starts = (desc.len() + 2).saturating_sub(len);
            (0..starts).any(|start| {
                let end = (start + len + 1).min(desc.len());
                bigram_similarity(&keyword, &desc[start..end]) >= threshold
            })
        }
    }
}

fn compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn words(s: &str) -> Vec<&str> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Replaces digits that OCR commonly reads in place of letters.
fn fold_confusables(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0' => 'O',
            '1' => 'I',
            c => c,
        })
        .collect()
}

/// Share of the keyword's positions holding the same character.
fn positional_similarity(keyword: &[char], word: &[char]) -> f64 {
    let same = keyword.iter().zip(word).filter(|(a, b)| a == b).count();
    same as f64 / keyword.len() as f64
}

/// Share of the keyword's distinct bigrams present in `window`.
fn bigram_similarity(keyword: &[char], window: &[char]) -> f64 {
    let bigrams = |s: &[char]| -> BTreeSet<(char, char)> {
        s.windows(2).map(|w| (w[0], w[1])).collect()
    };
    let want = bigrams(keyword);
    if want.is_empty() {
        return 0.0;
    }
    let have = bigrams(window);
    want.intersection(&have).count() as f64 / want.len() as f64
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn keyword(s: &str) -> FuzzyKeyword {
        FuzzyKeyword::from(s.to_string())
    }

    #[test_case("EGGS", "LARGE EGOS" => true; "misread letter")]
    #[test_case("MILK", "M1LK 2L" => true; "digit for letter")]
    #[test_case("MILK", "2% MILK" => true; "exact")]
    #[test_case("EGGS", "CHICKEN LEGS" => false; "different first letter")]
    #[test_case("BEER", "BREAD" => false; "different length")]
    #[test_case("TEA", "STEAK" => false; "short keyword inside word")]
    #[test_case("TEA", "GREEN TEA" => true; "short keyword as word")]
    #[test_case("TEA", "GREEN T3A" => false; "short keyword is never fuzzy")]
    #[test_case("CHICKEN", "CHIC KEN THIGHS" => true; "split by a space")]
    #[test_case("BANANA", "BANAMAS" => true; "medium keyword")]
    #[test_case("YOGURT", "Y0GURT" => true; "zero for O")]
    #[test_case("TOOTHPASTE", "COLGATE TOOTHPASTF" => true; "long keyword")]
    #[test_case("TOOTHPASTE", "TOOTHBRUSH" => false)]
    #[test_case("cheese", "CHEDDAR CHEESE" => true; "keyword case ignored")]
    fn matches(kw: &str, description: &str) -> bool {
        keyword(kw).is_match(description)
    }

    #[test]
    fn exact_keyword_skips_similarity() {
        let mut kw = keyword("EGGS");
        kw.exact = true;
        assert!(!kw.is_match("LARGE EGOS"));
        assert!(kw.is_match("LARGE EGGS"));
        assert!(kw.is_match("LARGE E GGS"));
    }
}
