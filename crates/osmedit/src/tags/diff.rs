//! Tag diffs.
//!
//! A diff is an ordered list of entries over the union of keys, sorted by
//! UTF-16 code units (the order issue hashes are computed over). For a
//! key whose value changed, the `Removed` entry comes before the `Added` one,
//! so replaying the list in order ([`apply_tag_diff`]) always ends with the new
//! value in place. Empty-string values count as present.

use super::Tags;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TagDiffKind {
    #[serde(rename = "+")]
    Added,
    #[serde(rename = "-")]
    Removed,
    #[serde(rename = " ")]
    Unchanged,
}

impl TagDiffKind {
    fn marker(self) -> char {
        match self {
            TagDiffKind::Added => '+',
            TagDiffKind::Removed => '-',
            TagDiffKind::Unchanged => ' ',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDiffEntry {
    #[serde(rename = "type")]
    pub kind: TagDiffKind,
    pub key: String,
    #[serde(rename = "oldVal", skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(rename = "newVal", skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub display: String,
}

impl TagDiffEntry {
    fn new(kind: TagDiffKind, key: &str, old_value: Option<&String>, new_value: Option<&String>) -> Self {
        let shown = match kind {
            TagDiffKind::Removed => old_value,
            TagDiffKind::Added | TagDiffKind::Unchanged => new_value,
        };
        Self {
            kind,
            key: key.to_string(),
            old_value: old_value.cloned(),
            new_value: new_value.cloned(),
            display: format!(
                "{} {}={}",
                kind.marker(),
                key,
                shown.map(String::as_str).unwrap_or_default()
            ),
        }
    }
}

/// Computes the changes turning `old` into `new`.
///
/// ```
/// use osmedit::tags::{from_pairs, tag_diff, TagDiffKind};
///
/// let diff = tag_diff(
///     &from_pairs([("amenity", "toilet")]),
///     &from_pairs([("amenity", "toilets")]),
/// );
/// assert_eq!(diff.len(), 2);
/// assert_eq!(diff[0].kind, TagDiffKind::Removed);
/// assert_eq!(diff[0].display, "- amenity=toilet");
/// assert_eq!(diff[1].display, "+ amenity=toilets");
/// ```
pub fn tag_diff(old: &Tags, new: &Tags) -> Vec<TagDiffEntry> {
    diff_entries(old, new, false)
}

/// Like [`tag_diff`], with `Unchanged` entries for keys equal in both maps.
pub fn tag_diff_with_context(old: &Tags, new: &Tags) -> Vec<TagDiffEntry> {
    diff_entries(old, new, true)
}

fn diff_entries(old: &Tags, new: &Tags, with_context: bool) -> Vec<TagDiffEntry> {
    let mut keys: Vec<&String> = old.keys().chain(new.keys()).collect();
    keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));
    keys.dedup();
    let mut entries = Vec::new();

    for key in keys {
        let old_value = old.get(key);
        let new_value = new.get(key);

        if old_value == new_value {
            if with_context {
                entries.push(TagDiffEntry::new(TagDiffKind::Unchanged, key, old_value, new_value));
            }
            continue;
        }
        if old_value.is_some() {
            entries.push(TagDiffEntry::new(TagDiffKind::Removed, key, old_value, new_value));
        }
        if new_value.is_some() {
            entries.push(TagDiffEntry::new(TagDiffKind::Added, key, old_value, new_value));
        }
    }

    entries
}

/// Replays `diff` on top of `tags`.
///
/// `Removed` deletes the key, `Added` writes the new value, `Unchanged` is
/// ignored. The diff does not need to have been computed against `tags`.
pub fn apply_tag_diff(tags: &Tags, diff: &[TagDiffEntry]) -> Tags {
    let mut result = tags.clone();
    for entry in diff {
        match entry.kind {
            TagDiffKind::Removed => {
                result.remove(&entry.key);
            }
            TagDiffKind::Added => {
                if let Some(value) = &entry.new_value {
                    result.insert(entry.key.clone(), value.clone());
                }
            }
            TagDiffKind::Unchanged => {}
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::from_pairs;

    #[test]
    fn test_identical_maps_have_empty_diff() {
        let tags = from_pairs([("a", "1"), ("b", "2")]);
        assert!(tag_diff(&tags, &tags).is_empty());
    }

    #[test]
    fn test_added_and_removed_keys() {
        let old = from_pairs([("a", "1"), ("b", "2")]);
        let new = from_pairs([("b", "2"), ("c", "3")]);
        let diff = tag_diff(&old, &new);

        assert_eq!(diff.len(), 2);
        assert_eq!(diff[0].kind, TagDiffKind::Removed);
        assert_eq!(diff[0].key, "a");
        assert_eq!(diff[0].old_value.as_deref(), Some("1"));
        assert_eq!(diff[0].new_value, None);
        assert_eq!(diff[0].display, "- a=1");
        assert_eq!(diff[1].kind, TagDiffKind::Added);
        assert_eq!(diff[1].key, "c");
        assert_eq!(diff[1].display, "+ c=3");
    }

    #[test]
    fn test_changed_value_removes_then_adds() {
        let diff = tag_diff(&from_pairs([("k", "old")]), &from_pairs([("k", "new")]));
        let kinds: Vec<TagDiffKind> = diff.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![TagDiffKind::Removed, TagDiffKind::Added]);
        assert_eq!(diff[0].new_value.as_deref(), Some("new"));
        assert_eq!(diff[1].old_value.as_deref(), Some("old"));
    }

    #[test]
    fn test_keys_are_sorted() {
        let old = from_pairs([("z", "1"), ("a", "1")]);
        let new = from_pairs([("m", "1")]);
        let diff = tag_diff(&old, &new);
        let keys: Vec<&str> = diff.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_keys_sort_by_utf16_units() {
        // U+1F600 is a surrogate pair (0xD83D ...), which sorts before U+FF01.
        let old = from_pairs([("\u{FF01}", "1"), ("\u{1F600}", "1")]);
        let diff = tag_diff(&old, &Tags::new());
        let keys: Vec<&str> = diff.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["\u{1F600}", "\u{FF01}"]);
    }

    #[test]
    fn test_empty_values_count_as_present() {
        let diff = tag_diff(&from_pairs([("k", "")]), &Tags::new());
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].display, "- k=");

        let diff = tag_diff(&Tags::new(), &from_pairs([("k", "")]));
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].kind, TagDiffKind::Added);
    }

    #[test]
    fn test_with_context_includes_unchanged() {
        let old = from_pairs([("a", "1"), ("b", "2")]);
        let new = from_pairs([("a", "1"), ("b", "3")]);
        let diff = tag_diff_with_context(&old, &new);
        assert_eq!(diff.len(), 3);
        assert_eq!(diff[0].kind, TagDiffKind::Unchanged);
        assert_eq!(diff[0].display, "  a=1");
    }

    #[test]
    fn test_apply_reproduces_new_tags() {
        let old = from_pairs([("a", "1"), ("b", "2"), ("c", "3")]);
        let new = from_pairs([("b", "20"), ("c", "3"), ("d", "4")]);
        let diff = tag_diff(&old, &new);
        assert_eq!(apply_tag_diff(&old, &diff), new);
    }

    #[test]
    fn test_apply_on_drifted_tags_only_touches_diffed_keys() {
        let old = from_pairs([("highway", "ford")]);
        let new = from_pairs([("ford", "yes")]);
        let diff = tag_diff(&old, &new);

        let current = from_pairs([("highway", "ford"), ("brand", "X")]);
        let applied = apply_tag_diff(&current, &diff);
        assert_eq!(applied, from_pairs([("brand", "X"), ("ford", "yes")]));
    }

    #[test]
    fn test_serializes_with_short_markers() {
        let diff = tag_diff(&Tags::new(), &from_pairs([("a", "1")]));
        let json = serde_json::to_value(&diff[0]).unwrap();
        assert_eq!(json["type"], "+");
        assert_eq!(json["newVal"], "1");
        assert!(json.get("oldVal").is_none());
    }
}
