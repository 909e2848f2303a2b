//! Tag merging.
//!
//! Used whenever two tag sets must be reconciled: merging features, pasting
//! tags, combining entities. For each incoming key:
//!
//! - target lacks the key (or holds an empty value): take the incoming value
//! - target holds a different value: union both `;`-lists, target entries
//!   first, then truncate to the upstream length limit
//! - key is in `forced`: skipped here, overwritten from `forced` afterwards
//!
//! A key counts as changed only if its final value differs from the target's.
//! When nothing changed, the caller gets the very same entity back, so no
//! revision is spent on a no-op.

use super::{truncate_chars, Tags, MAX_TAG_VALUE_CHARS};
use crate::entity::Entity;
use std::borrow::Cow;
use std::sync::Arc;

/// Merges `incoming` (and `forced`) into `target`'s tags.
///
/// Returns a clone of `target` itself when nothing changed.
pub fn merge_tags(target: &Arc<Entity>, incoming: &Tags, forced: &Tags) -> Arc<Entity> {
    merge_tags_with_limit(target, incoming, forced, MAX_TAG_VALUE_CHARS)
}

/// [`merge_tags`] with an explicit value length limit, in code points.
pub fn merge_tags_with_limit(
    target: &Arc<Entity>,
    incoming: &Tags,
    forced: &Tags,
    limit: usize,
) -> Arc<Entity> {
    match merge_entity_tags(target, incoming, forced, limit) {
        Cow::Borrowed(_) => Arc::clone(target),
        Cow::Owned(merged) => Arc::new(merged),
    }
}

pub(crate) fn merge_entity_tags<'a>(
    entity: &'a Entity,
    incoming: &Tags,
    forced: &Tags,
    limit: usize,
) -> Cow<'a, Entity> {
    match merge_tag_maps(entity.tags(), incoming, forced, limit) {
        Some(merged) => Cow::Owned(entity.with_tags(merged)),
        None => Cow::Borrowed(entity),
    }
}

/// Merges tag maps. `None` means the result would equal `current`.
pub fn merge_tag_maps(
    current: &Tags,
    incoming: &Tags,
    forced: &Tags,
    limit: usize,
) -> Option<Tags> {
    let mut merged = current.clone();
    let mut changed = false;

    for (key, theirs) in incoming {
        if forced.contains_key(key) {
            continue;
        }
        let value = match current.get(key) {
            Some(ours) if !ours.is_empty() => {
                if ours == theirs {
                    continue;
                }
                truncate_chars(&union_values(ours, theirs), limit)
            }
            _ => theirs.clone(),
        };
        if current.get(key) != Some(&value) {
            merged.insert(key.clone(), value);
            changed = true;
        }
    }

    for (key, value) in forced {
        if current.get(key) != Some(value) {
            merged.insert(key.clone(), value.clone());
            changed = true;
        }
    }

    changed.then_some(merged)
}

/// Splits on `;` plus any whitespace that follows it.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(';')
        .enumerate()
        .map(|(i, part)| if i == 0 { part } else { part.trim_start() })
}

fn union_values(ours: &str, theirs: &str) -> String {
    let mut values: Vec<&str> = Vec::new();
    for value in split_list(ours).chain(split_list(theirs)) {
        if !values.contains(&value) {
            values.push(value);
        }
    }
    values.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityAttrs;
    use crate::tags::from_pairs;

    fn entity(pairs: &[(&str, &str)]) -> Arc<Entity> {
        Arc::new(Entity::node(
            EntityAttrs::new().id("n1").tags(from_pairs(pairs.iter().copied())),
        ))
    }

    #[test]
    fn test_adds_missing_tags() {
        let a = entity(&[("a", "a")]);
        let merged = merge_tags(&a, &from_pairs([("b", "b")]), &Tags::new());
        assert_eq!(merged.tags(), &from_pairs([("a", "a"), ("b", "b")]));
        assert_eq!(merged.version(), a.version() + 1);
    }

    #[test]
    fn test_unions_conflicting_values() {
        let a = entity(&[("a", "a")]);
        let merged = merge_tags(&a, &from_pairs([("a", "b")]), &Tags::new());
        assert_eq!(merged.tag("a"), Some("a;b"));
    }

    #[test]
    fn test_union_keeps_target_order_and_dedups() {
        let a = entity(&[("cuisine", "pizza;kebab")]);
        let merged = merge_tags(&a, &from_pairs([("cuisine", "kebab; burger")]), &Tags::new());
        assert_eq!(merged.tag("cuisine"), Some("pizza;kebab;burger"));
    }

    #[test]
    fn test_whitespace_after_semicolon_is_dropped() {
        let a = entity(&[("a", "x; y")]);
        let merged = merge_tags(&a, &from_pairs([("a", "z")]), &Tags::new());
        assert_eq!(merged.tag("a"), Some("x;y;z"));
    }

    #[test]
    fn test_empty_target_value_is_replaced() {
        let a = entity(&[("a", "")]);
        let merged = merge_tags(&a, &from_pairs([("a", "b")]), &Tags::new());
        assert_eq!(merged.tag("a"), Some("b"));
    }

    #[test]
    fn test_noop_returns_same_entity() {
        let a = entity(&[("foo", "bar")]);
        let merged = merge_tags(&a, &from_pairs([("foo", "bar")]), &Tags::new());
        assert!(Arc::ptr_eq(&a, &merged));
        assert_eq!(merged.version(), a.version());
    }

    #[test]
    fn test_noop_when_incoming_already_in_list() {
        let a = entity(&[("foo", "bar;baz")]);
        let merged = merge_tags(&a, &from_pairs([("foo", "baz")]), &Tags::new());
        assert!(Arc::ptr_eq(&a, &merged));
    }

    #[test]
    fn test_is_idempotent() {
        let a = entity(&[("a", "a"), ("c", "c")]);
        let incoming = from_pairs([("a", "b"), ("d", "d")]);
        let once = merge_tags(&a, &incoming, &Tags::new());
        let twice = merge_tags(&once, &incoming, &Tags::new());
        assert_eq!(once.tags(), twice.tags());
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn test_forced_tags_overwrite() {
        let a = entity(&[("a", "a"), ("b", "b")]);
        let merged = merge_tags(
            &a,
            &from_pairs([("a", "x"), ("b", "y")]),
            &from_pairs([("a", "forced")]),
        );
        assert_eq!(merged.tag("a"), Some("forced"));
        assert_eq!(merged.tag("b"), Some("b;y"));
    }

    #[test]
    fn test_forced_tags_equal_to_current_are_noop() {
        let a = entity(&[("a", "a")]);
        let merged = merge_tags(&a, &Tags::new(), &from_pairs([("a", "a")]));
        assert!(Arc::ptr_eq(&a, &merged));
    }

    #[test]
    fn test_truncates_to_limit() {
        let a = entity(&[("k", "a".repeat(200).as_str())]);
        let merged = merge_tags(&a, &from_pairs([("k", "b".repeat(200))]), &Tags::new());
        let value = merged.tag("k").unwrap();
        assert_eq!(value.chars().count(), MAX_TAG_VALUE_CHARS);
        assert!(value.starts_with(&"a".repeat(200)));
    }

    #[test]
    fn test_truncation_counts_code_points() {
        let ours = "😀".repeat(200);
        let theirs = "🎉".repeat(100);
        let a = entity(&[("k", ours.as_str())]);
        let merged = merge_tags(&a, &from_pairs([("k", theirs)]), &Tags::new());
        let value = merged.tag("k").unwrap();
        assert_eq!(value.chars().count(), MAX_TAG_VALUE_CHARS);
        // 200 emoji, the separator, then 54 of the incoming emoji.
        assert!(value.ends_with('🎉'));
    }

    #[test]
    fn test_custom_limit() {
        let a = entity(&[("k", "abc")]);
        let merged = merge_tags_with_limit(&a, &from_pairs([("k", "def")]), &Tags::new(), 5);
        assert_eq!(merged.tag("k"), Some("abc;d"));
    }

    #[test]
    fn test_entity_method_borrows_on_noop() {
        let a = entity(&[("foo", "bar")]);
        let result = a.merge_tags(&from_pairs([("foo", "bar")]), &Tags::new());
        assert!(matches!(result, Cow::Borrowed(_)));
        let result = a.merge_tags(&from_pairs([("foo", "baz")]), &Tags::new());
        assert!(matches!(result, Cow::Owned(_)));
    }
}
