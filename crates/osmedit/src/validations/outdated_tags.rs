//! Outdated tagging.
//!
//! Flags entities whose tags a deprecation rule would change, and entities a
//! [`CanonicalMatcher`] knows a better tagging for (typically brand names
//! missing their wikidata link). The two findings are separate issues so
//! they can be fixed independently.

use super::{diff_hash, Issues, IssueFix, Severity, Validation, ValidationIssue};
use crate::actions;
use crate::entity::{Entity, EntityId, EntityType, Loc};
use crate::graph::{Graph, Resolver};
use crate::tags::{apply_tag_diff, tag_diff, DeprecationRule, TagDiffEntry, TagDiffKind, Tags};
use log::{debug, trace};
use serde::Serialize;

const ISSUE_TYPE: &str = "outdated_tags";

/// The canonical record a matcher resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedItem {
    pub display_name: String,
    /// Key holding the record's wikidata id, e.g. `brand:wikidata`.
    pub main_tag: String,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalMatch {
    pub matched: MatchedItem,
    pub new_tags: Tags,
}

/// Suggests canonical tags for a feature.
pub trait CanonicalMatcher {
    /// True while the matcher's data is not ready yet.
    fn is_loading(&self) -> bool {
        false
    }

    /// The canonical tagging for `tags` at `loc`, if it differs.
    fn upgrade_tags(&self, tags: &Tags, loc: Option<Loc>) -> Option<CanonicalMatch>;
}

#[derive(Debug, Clone, Default)]
enum RuleTable {
    #[default]
    Loading,
    Loaded(Vec<DeprecationRule>),
    Unavailable,
}

#[derive(Default)]
pub struct OutdatedTags {
    rules: RuleTable,
    matcher: Option<Box<dyn CanonicalMatcher>>,
}

impl OutdatedTags {
    /// A validation still waiting for its rule table.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: Vec<DeprecationRule>) -> Self {
        self.set_rules(Some(rules));
        self
    }

    pub fn with_matcher(mut self, matcher: impl CanonicalMatcher + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    /// Installs the loaded rule table; `None` records that loading failed.
    pub fn set_rules(&mut self, rules: Option<Vec<DeprecationRule>>) {
        self.rules = match rules {
            Some(rules) => {
                debug!(rules = rules.len(); "Deprecation rules installed");
                RuleTable::Loaded(rules)
            }
            None => RuleTable::Unavailable,
        };
    }

    fn rules(&self) -> &[DeprecationRule] {
        match &self.rules {
            RuleTable::Loaded(rules) => rules,
            RuleTable::Loading | RuleTable::Unavailable => &[],
        }
    }

    /// Tags `entity` would have after every applicable upgrade.
    fn upgraded_tags(&self, entity: &Entity, graph: &Graph) -> Tags {
        if matches!(self.rules, RuleTable::Loading | RuleTable::Unavailable) {
            return entity.tags().clone();
        }

        let mut rules = entity.deprecated_tags(self.rules());
        if entity.entity_type() == Some(EntityType::Way)
            && entity.is_closed()
            && entity.tag("traffic_calming") == Some("island")
            && entity.tag("highway").map_or(true, str::is_empty)
        {
            rules.push(DeprecationRule::new(
                Tags::from([("traffic_calming".to_string(), "island".to_string())]),
                Some(Tags::from([(
                    "area:highway".to_string(),
                    "traffic_island".to_string(),
                )])),
            ));
        }
        if rules.is_empty() {
            return entity.tags().clone();
        }

        let id = entity.id();
        let mut scratch = graph.replace(entity.clone());
        for rule in &rules {
            scratch = actions::upgrade_tags(&scratch, id, &rule.old, rule.replace.as_ref());
        }
        scratch
            .has_entity(id)
            .map(|e| e.tags().clone())
            .unwrap_or_else(|| entity.tags().clone())
    }

    fn issue(entity: &Entity, subtype: &'static str, diff: Vec<TagDiffEntry>, fixes: Vec<IssueFix>) -> ValidationIssue {
        ValidationIssue {
            issue_type: ISSUE_TYPE,
            subtype,
            severity: Severity::Warning,
            entity_ids: vec![entity.id().clone()],
            hash: diff_hash(&diff),
            tag_diff: diff,
            fixes,
        }
    }
}

impl Validation for OutdatedTags {
    fn issue_type(&self) -> &'static str {
        ISSUE_TYPE
    }

    fn validate(&self, entity: &Entity, graph: &Graph) -> Issues {
        if !entity.has_interesting_tags() {
            return Issues::default();
        }

        let old_tags = entity.tags();
        let deprecation_diff = tag_diff(old_tags, &self.upgraded_tags(entity, graph));

        let mut waiting_for_matcher = false;
        let suggestion = match &self.matcher {
            Some(matcher) if matcher.is_loading() => {
                waiting_for_matcher = true;
                None
            }
            Some(matcher) => matcher.upgrade_tags(old_tags, center(entity, graph)),
            None => None,
        };

        let mut issues = Issues {
            issues: Vec::new(),
            provisional: matches!(self.rules, RuleTable::Loading) || waiting_for_matcher,
        };

        if !deprecation_diff.is_empty() {
            let only_adding = deprecation_diff
                .iter()
                .all(|d| d.kind == TagDiffKind::Added);
            let subtype = if only_adding {
                "incomplete_tags"
            } else {
                "deprecated_tags"
            };
            let fixes = vec![IssueFix::UpgradeTags {
                diff: deprecation_diff.clone(),
            }];
            issues
                .issues
                .push(Self::issue(entity, subtype, deprecation_diff, fixes));
        }

        if let Some(suggestion) = suggestion {
            let brand_diff = tag_diff(old_tags, &suggestion.new_tags);
            if !brand_diff.is_empty() {
                let fixes = vec![
                    IssueFix::UpgradeTags {
                        diff: brand_diff.clone(),
                    },
                    IssueFix::TagAsNot {
                        item: suggestion.matched,
                    },
                ];
                issues
                    .issues
                    .push(Self::issue(entity, "noncanonical_brand", brand_diff, fixes));
            }
        }

        trace!(entity = entity.id().as_str(), issues = issues.len(); "Checked outdated tags");
        issues
    }
}

/// Replays `diff` on the current tags of entity `id`.
///
/// The diff may be stale; only the keys it names are touched. A missing
/// entity leaves the graph as it is.
pub fn upgrade(graph: &Graph, id: &EntityId, diff: &[TagDiffEntry]) -> Graph {
    let Some(current) = graph.has_entity(id) else {
        return graph.clone();
    };
    let tags = apply_tag_diff(current.tags(), diff);
    graph.replace(current.with_tags(tags))
}

/// Tags entity `id` as explicitly *not* being `item`.
///
/// Writes `not:<main_tag>=<qid>`. When the entity carried that same qid, the
/// `main_tag` and its matching wikipedia key are removed.
pub fn add_not_tag(graph: &Graph, id: &EntityId, item: &MatchedItem) -> Graph {
    let Some(current) = graph.has_entity(id) else {
        return graph.clone();
    };
    let Some(qid) = item.tags.get(&item.main_tag) else {
        return graph.clone();
    };

    let mut tags = current.tags().clone();
    tags.insert(format!("not:{}", item.main_tag), qid.clone());
    if tags.get(&item.main_tag) == Some(qid) {
        tags.remove(&item.main_tag);
        tags.remove(&item.main_tag.replace("wikidata", "wikipedia"));
    }
    graph.replace(current.with_tags(tags))
}

/// Center of the entity's bounding box, from node locations.
fn center(entity: &Entity, graph: &Graph) -> Option<Loc> {
    if let Some(loc) = entity.loc() {
        return Some(loc);
    }
    let locs: Vec<Loc> = entity
        .nodes()
        .iter()
        .filter_map(|id| graph.has_entity(id).and_then(|n| n.loc()))
        .collect();
    let first = locs.first()?;
    let (mut min, mut max) = (*first, *first);
    for loc in &locs[1..] {
        min.lon = min.lon.min(loc.lon);
        min.lat = min.lat.min(loc.lat);
        max.lon = max.lon.max(loc.lon);
        max.lat = max.lat.max(loc.lat);
    }
    Some(Loc {
        lon: (min.lon + max.lon) / 2.0,
        lat: (min.lat + max.lat) / 2.0,
    })
}
