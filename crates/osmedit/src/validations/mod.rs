//! # Validations
//!
//! Checks run over the entities an edit touched. A validation looks at one
//! entity in the context of the current graph and returns zero or more
//! [`ValidationIssue`]s. Issues are plain data: a machine-readable type and
//! subtype, the entities involved, an optional tag diff, and the fixes that
//! can resolve them. Presenting them is up to the caller.
//!
//! ## Provisional results
//!
//! Some validations depend on data that may still be loading (the deprecation
//! table, canonical brand names). They still run, but mark their output
//! [`Issues::provisional`] so the caller knows to revalidate later.
//!
//! ## Validations
//!
//! - [`outdated_tags`]: deprecated, incomplete and non-canonical tagging
//! - [`api_limits`]: limits the upstream API enforces on upload

pub mod api_limits;
pub mod outdated_tags;

pub use api_limits::ApiLimits;
pub use outdated_tags::{CanonicalMatch, CanonicalMatcher, MatchedItem, OutdatedTags};

use crate::entity::{Entity, EntityId};
use crate::graph::{Difference, Graph};
use crate::tags::TagDiffEntry;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A way to resolve an issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueFix {
    /// Replay a tag diff on the entity's current tags.
    UpgradeTags { diff: Vec<TagDiffEntry> },
    /// Record that the entity is *not* the matched brand.
    TagAsNot { item: MatchedItem },
    /// Split the way at these vertices.
    SplitWay { vertices: Vec<EntityId> },
}

impl IssueFix {
    /// Applies the fix to entity `id` in `graph`.
    ///
    /// `None` for fixes that need a geometry operation (splitting) that the
    /// caller has to carry out.
    pub fn apply(&self, graph: &Graph, id: &EntityId) -> Option<Graph> {
        match self {
            IssueFix::UpgradeTags { diff } => Some(outdated_tags::upgrade(graph, id, diff)),
            IssueFix::TagAsNot { item } => Some(outdated_tags::add_not_tag(graph, id, item)),
            IssueFix::SplitWay { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: &'static str,
    pub subtype: &'static str,
    pub severity: Severity,
    pub entity_ids: Vec<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_diff: Vec<TagDiffEntry>,
    /// Changes whenever the issue's content does, so stale dismissals can be
    /// told apart from current ones.
    pub hash: i32,
    #[serde(skip)]
    pub fixes: Vec<IssueFix>,
}

impl ValidationIssue {
    /// Identifier stable across revalidations of the same problem.
    pub fn id(&self) -> String {
        let ids: Vec<&str> = self.entity_ids.iter().map(EntityId::as_str).collect();
        format!(
            "{}-{}-{}-{}",
            self.issue_type,
            self.subtype,
            ids.join(","),
            self.hash
        )
    }
}

/// The issues one validation found for one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Issues {
    pub issues: Vec<ValidationIssue>,
    pub provisional: bool,
}

impl Issues {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }
}

pub trait Validation {
    fn issue_type(&self) -> &'static str;

    fn validate(&self, entity: &Entity, graph: &Graph) -> Issues;
}

/// Runs `validation` over every modified and created entity of `difference`.
pub fn validate_changes<V>(validation: &V, difference: &Difference, graph: &Graph) -> Issues
where
    V: Validation + ?Sized,
{
    let mut result = Issues::default();
    for entity in difference.touched() {
        let found = validation.validate(entity, graph);
        result.provisional |= found.provisional;
        result.issues.extend(found.issues);
    }
    result
}

/// 32-bit string hash over UTF-16 code units (`h * 31 + c`, wrapping).
pub fn hash_code(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        })
}

/// Hash of a tag diff's JSON form.
pub(crate) fn diff_hash(diff: &[TagDiffEntry]) -> i32 {
    serde_json::to_string(diff)
        .map(|json| hash_code(&json))
        .unwrap_or_default()
}
