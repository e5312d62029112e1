//! Parsing of the tags held in Ledger comments.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::tags;

/// The value tags of a Ledger comment, e.g. `fp-visa: 1234` or `id: T-2`.
/// Other comment text is ignored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Comment {
    pub value_tags: BTreeMap<String, String>,
}

impl Comment {
    pub fn from_opt_string(comment: &Option<String>) -> Self {
        Self::from_opt_comment(comment.as_deref())
    }

    /// Parses the given string into a `Comment`.
    pub fn from_opt_comment(comment: Option<&str>) -> Self {
        lazy_static! {
            static ref VALUE_TAG_RX: Regex = Regex::new(r"^[ ]*([^: ]+):(?:[ ]+(.+))?$").unwrap();
        }

        let value_tags = comment
            .into_iter()
            .flat_map(|c| c.split('\n'))
            .filter_map(|line| VALUE_TAG_RX.captures(line))
            .map(|kv_parts| {
                let key = kv_parts.get(1).map_or("", |c| c.as_str());
                let value = kv_parts.get(2).map_or("", |c| c.as_str());
                (key.to_string(), value.trim().to_string())
            })
            .collect();
        Comment { value_tags }
    }

    /// The first fingerprint value tag (`fp-*`), in key order, as
    /// `key:value`.
    pub fn fingerprint(&self) -> Option<String> {
        self.value_tags
            .iter()
            .find(|(k, v)| k.starts_with(tags::FINGERPRINT_PREFIX) && !v.is_empty())
            .map(|(k, v)| format!("{}:{}", k, v))
    }

    /// The value of the `id` tag, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.value_tags
            .get(tags::ID_KEY)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}
