//! Discard configuration.
//!
//! Lists tags that should never be uploaded. The JSON asset looks like:
//!
//! ```json
//! { "created_by": true, "attribution": { "https://example.com": true } }
//! ```
//!
//! A `true` entry drops the key whatever its value; a nested map drops the key
//! only for the listed values. Tags with an empty value are always dropped.

use super::Tags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiscardRule {
    All(bool),
    Values(BTreeMap<String, bool>),
}

impl DiscardRule {
    pub fn discards(&self, value: &str) -> bool {
        match self {
            DiscardRule::All(all) => *all,
            DiscardRule::Values(values) => values.get(value).copied().unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscardConfig {
    rules: BTreeMap<String, DiscardRule>,
}

impl DiscardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops `key` whatever its value.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.rules.insert(key.into(), DiscardRule::All(true));
        self
    }

    /// Drops `key` when it holds `value`.
    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let entry = self
            .rules
            .entry(key.into())
            .or_insert_with(|| DiscardRule::Values(BTreeMap::new()));
        match entry {
            DiscardRule::Values(values) => {
                values.insert(value.into(), true);
            }
            DiscardRule::All(false) => {
                *entry = DiscardRule::Values(BTreeMap::from([(value.into(), true)]));
            }
            DiscardRule::All(true) => {}
        }
        self
    }

    pub fn rule(&self, key: &str) -> Option<&DiscardRule> {
        self.rules.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn should_discard(&self, key: &str, value: &str) -> bool {
        value.is_empty() || self.rule(key).is_some_and(|rule| rule.discards(value))
    }

    /// The surviving tags, or `None` when nothing would be discarded.
    pub fn filter(&self, tags: &Tags) -> Option<Tags> {
        let kept: Tags = tags
            .iter()
            .filter(|(k, v)| !self.should_discard(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        (kept.len() != tags.len()).then_some(kept)
    }
}
