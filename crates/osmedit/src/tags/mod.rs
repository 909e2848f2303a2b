//! Tag handling.
//!
//! Tags are plain `key=value` strings. A map from key to value is a [`Tags`];
//! it is ordered by key so that everything derived from it (diffs, merges,
//! serialized output) is deterministic.
//!
//! ## Multi-values
//!
//! A value may hold several entries separated by `;` (`cuisine=pizza;kebab`).
//! Merging and deprecation matching both look inside these lists, with
//! slightly different splitting rules:
//! - [`merge`] splits on `;` followed by optional whitespace and keeps empty
//!   entries, matching how values are rejoined.
//! - [`deprecated`] and [`upgrade`] split on `;`, trim each entry and drop the
//!   empty ones.
//!
//! ## Submodules
//!
//! - [`merge`]: reconcile two tag sets on conflict
//! - [`diff`]: ordered add/remove list between two tag sets
//! - [`deprecated`]: match tags against a deprecation rule table
//! - [`upgrade`]: apply one deprecation rule
//! - [`discard`]: configuration for stripping tags at save time

pub mod deprecated;
pub mod diff;
pub mod discard;
pub mod merge;
pub mod upgrade;

use std::collections::BTreeMap;

pub use deprecated::{get_deprecated_tags, DeprecatedValues, DeprecationRule};
pub use diff::{apply_tag_diff, tag_diff, tag_diff_with_context, TagDiffEntry, TagDiffKind};
pub use discard::{DiscardConfig, DiscardRule};
pub use merge::merge_tags;
pub use upgrade::upgrade_tags;

pub type Tags = BTreeMap<String, String>;

/// Upstream limit on the length of a tag value, in code points.
pub const MAX_TAG_VALUE_CHARS: usize = 255;

/// Wildcard value in deprecation rules.
pub const WILDCARD: &str = "*";

/// Builds [`Tags`] from string pairs.
///
/// ```
/// use osmedit::tags::from_pairs;
///
/// let tags = from_pairs([("amenity", "cafe"), ("name", "Blue Door")]);
/// assert_eq!(tags["amenity"], "cafe");
/// ```
pub fn from_pairs<I, K, V>(pairs: I) -> Tags
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Whether a key carries meaning beyond bookkeeping.
///
/// Attribution, editor and source keys are not interesting.
pub fn is_interesting_tag(key: &str) -> bool {
    key != "attribution"
        && key != "created_by"
        && key != "source"
        && key != "odbl"
        && !key.starts_with("source:")
        && !key.starts_with("source_ref")
        && !key.starts_with("tiger:")
}

/// Splits a multi-value on `;`, trimming entries and dropping empty ones.
pub(crate) fn split_values(value: &str) -> Vec<&str> {
    value
        .split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect()
}

/// Truncates `value` to at most `limit` Unicode scalar values.
pub(crate) fn truncate_chars(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}
