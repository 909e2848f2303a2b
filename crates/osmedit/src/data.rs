//! Rule table assets.
//!
//! Both tables ship as JSON files in the editor's asset format. The core
//! never validates them beyond their shape: a rule with an empty `old` map
//! simply matches everything.

use crate::error::Result;
use crate::tags::{DeprecationRule, DiscardConfig};
use log::debug;
use std::fs;
use std::path::Path;

/// Reads a deprecation table: `[{"old": {...}, "replace": {...}}, ...]`.
pub fn load_deprecated(path: &Path) -> Result<Vec<DeprecationRule>> {
    let content = fs::read_to_string(path)?;
    let rules: Vec<DeprecationRule> = serde_json::from_str(&content)?;
    debug!(path = path.display().to_string().as_str(), rules = rules.len(); "Loaded deprecation table");
    Ok(rules)
}

/// Reads a discard configuration: `{"key": true, "key": {"value": true}}`.
pub fn load_discard(path: &Path) -> Result<DiscardConfig> {
    let content = fs::read_to_string(path)?;
    let config: DiscardConfig = serde_json::from_str(&content)?;
    debug!(path = path.display().to_string().as_str(); "Loaded discard configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OsmError;
    use crate::tags::from_pairs;

    #[test]
    fn test_load_deprecated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deprecated.json");
        fs::write(
            &path,
            r#"[
                {"old": {"highway": "no"}},
                {"old": {"speedlimit": "*"}, "replace": {"maxspeed": "$1"}}
            ]"#,
        )
        .unwrap();

        let rules = load_deprecated(&path).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].replace, None);
        assert_eq!(rules[1].replace, Some(from_pairs([("maxspeed", "$1")])));
    }

    #[test]
    fn test_load_discard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discard.json");
        fs::write(
            &path,
            r#"{"created_by": true, "attribution": {"https://example.com": true}}"#,
        )
        .unwrap();

        let config = load_discard(&path).unwrap();
        assert!(config.should_discard("created_by", "iD"));
        assert!(config.should_discard("attribution", "https://example.com"));
        assert!(!config.should_discard("attribution", "survey"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_deprecated(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(OsmError::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discard.json");
        fs::write(&path, r#"{"created_by": "yes please"}"#).unwrap();
        assert!(matches!(load_discard(&path), Err(OsmError::Serialization(_))));
    }
}
