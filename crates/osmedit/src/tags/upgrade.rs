//! Applying a deprecation rule.
//!
//! Every `old` key present in the tags is removed, with one exception: when
//! the value is a `;` list and the deprecated value is only one of several
//! entries, just that entry goes away. The `replace` side is then written:
//!
//! | replace value | effect |
//! |---------------|--------|
//! | `*` | keep an existing value unless it is `no`, else set `yes` |
//! | `$1` | the value captured by a wildcard `old` entry (removed if none) |
//! | literal | set it; inside an edited list, insert at the old entry's position |

use super::{split_values, Tags, WILDCARD};

const CAPTURED: &str = "$1";

/// Returns `tags` with the rule `old` → `replace` applied.
///
/// ```
/// use osmedit::tags::{from_pairs, upgrade_tags};
///
/// let upgraded = upgrade_tags(
///     &from_pairs([("speedlimit", "50")]),
///     &from_pairs([("speedlimit", "*")]),
///     Some(&from_pairs([("maxspeed", "$1")])),
/// );
/// assert_eq!(upgraded, from_pairs([("maxspeed", "50")]));
/// ```
pub fn upgrade_tags(tags: &Tags, old: &Tags, replace: Option<&Tags>) -> Tags {
    let mut result = tags.clone();
    let mut captured: Option<String> = None;
    let mut list_position: Option<usize> = None;

    for (key, old_value) in old {
        let Some(current) = result.get(key) else {
            continue;
        };

        if old_value == WILDCARD {
            captured = result.remove(key);
        } else if old_value == current {
            result.remove(key);
        } else {
            let mut values = split_values(current);
            match values.iter().position(|v| v == old_value) {
                Some(index) if values.len() > 1 => {
                    if replace.is_some_and(|r| r.contains_key(key)) {
                        list_position = Some(index);
                    }
                    values.remove(index);
                    let joined = values.join(";");
                    result.insert(key.clone(), joined);
                }
                _ => {
                    result.remove(key);
                }
            }
        }
    }

    let Some(replace) = replace else {
        return result;
    };

    for (key, value) in replace {
        if value == WILDCARD {
            let keep = result
                .get(key)
                .is_some_and(|current| !current.is_empty() && current != "no");
            if !keep {
                result.insert(key.clone(), "yes".to_string());
            }
        } else if value == CAPTURED {
            match &captured {
                Some(captured) => {
                    result.insert(key.clone(), captured.clone());
                }
                None => {
                    result.remove(key);
                }
            }
        } else {
            let existing = result
                .get(key)
                .filter(|v| !v.is_empty() && old.contains_key(key));
            match (existing, list_position) {
                (Some(existing), Some(index)) => {
                    let mut values = split_values(existing);
                    if !values.contains(&value.as_str()) {
                        values.insert(index.min(values.len()), value.as_str());
                        let joined = values.join(";");
                        result.insert(key.clone(), joined);
                    }
                }
                _ => {
                    result.insert(key.clone(), value.clone());
                }
            }
        }
    }

    result
}
