//! Deprecated tag matching.
//!
//! A rule table is an ordered list of [`DeprecationRule`]s, usually loaded
//! from the editor's JSON asset (see [`crate::data::load_deprecated`]). The
//! matcher never stops at the first hit: every rule that applies is returned,
//! in table order, and every rule is evaluated against the same input tags.
//!
//! A rule is skipped outright when applying its replacement would overwrite a
//! value the mapper already set on a key the rule does not consume.

use super::{split_values, Tags, WILDCARD};
use log::debug;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the deprecation table.
///
/// `old` values are literals or `*`; `replace` values are literals, `*`
/// (keep or default to `yes`) or `$1` (the value captured by a wildcard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationRule {
    pub old: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<Tags>,
}

impl DeprecationRule {
    pub fn new(old: Tags, replace: Option<Tags>) -> Self {
        Self { old, replace }
    }

    /// True when the rule would overwrite a value the mapper set on a key
    /// outside `old`.
    fn collides_with(&self, tags: &Tags) -> bool {
        let Some(replace) = &self.replace else {
            return false;
        };
        replace.iter().any(|(key, replace_value)| {
            let Some(current) = tags.get(key).filter(|v| !v.is_empty()) else {
                return false;
            };
            !self.old.contains_key(key) && replace_value != WILDCARD && replace_value != current
        })
    }

    fn matches_key(&self, tags: &Tags, key: &str, old_value: &str) -> bool {
        let Some(current) = tags.get(key).filter(|v| !v.is_empty()) else {
            return false;
        };
        if old_value == WILDCARD || old_value == current {
            return true;
        }

        match split_values(current).as_slice() {
            [] => false,
            [single] => *single == old_value && !self.is_already_upgraded(tags, key),
            several => several.contains(&old_value),
        }
    }

    /// A same-value passthrough rule whose other replacements are all in
    /// place has already been applied.
    fn is_already_upgraded(&self, tags: &Tags, key: &str) -> bool {
        let Some(replace) = &self.replace else {
            return false;
        };
        if replace.get(key) != self.old.get(key) {
            return false;
        }
        replace
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .all(|(k, v)| tags.get(k) == Some(v))
    }

    pub fn matches(&self, tags: &Tags) -> bool {
        !self.collides_with(tags)
            && self
                .old
                .iter()
                .all(|(key, value)| self.matches_key(tags, key, value))
    }
}

/// Returns the rules from `rules` that apply to `tags`, in table order.
///
/// ```
/// use osmedit::tags::{from_pairs, get_deprecated_tags, DeprecationRule};
///
/// let rules = vec![DeprecationRule::new(from_pairs([("highway", "no")]), None)];
/// let found = get_deprecated_tags(&from_pairs([("highway", "no")]), &rules);
/// assert_eq!(found, rules);
/// ```
pub fn get_deprecated_tags(tags: &Tags, rules: &[DeprecationRule]) -> Vec<DeprecationRule> {
    if tags.is_empty() {
        return Vec::new();
    }
    rules
        .iter()
        .filter(|rule| rule.matches(tags))
        .cloned()
        .collect()
}

/// Deprecated values of single-key, non-wildcard rules, grouped by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprecatedValues {
    by_key: BTreeMap<String, Vec<String>>,
}

impl DeprecatedValues {
    pub fn build(rules: &[DeprecationRule]) -> Self {
        let mut by_key: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for rule in rules {
            if rule.old.len() != 1 {
                continue;
            }
            if let Some((key, value)) = rule.old.iter().next() {
                if value != WILDCARD {
                    by_key.entry(key.clone()).or_default().push(value.clone());
                }
            }
        }
        Self { by_key }
    }

    pub fn values_for(&self, key: &str) -> &[String] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_deprecated(&self, key: &str, value: &str) -> bool {
        self.values_for(key).iter().any(|v| v == value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

static DEPRECATED_VALUES: OnceCell<DeprecatedValues> = OnceCell::new();

/// Process-wide [`DeprecatedValues`], built from the first table passed in.
///
/// Later calls return the same index whatever `rules` they pass. Prefer
/// [`DeprecatedValues::build`] when the table can change at runtime.
pub fn deprecated_tag_values_by_key(rules: &[DeprecationRule]) -> &'static DeprecatedValues {
    DEPRECATED_VALUES.get_or_init(|| {
        debug!(rules = rules.len(); "Building deprecated value index");
        DeprecatedValues::build(rules)
    })
}
