//! Limits enforced by the upstream API.
//!
//! Currently only the maximum number of nodes in a way. An oversized way
//! gets an error-level issue whose fix lists where to split it.

use super::{Issues, IssueFix, Severity, Validation, ValidationIssue};
use crate::config::EditorConfig;
use crate::entity::{Entity, EntityId, EntityType};
use crate::graph::{Graph, Resolver};
use log::debug;

const ISSUE_TYPE: &str = "osm_api_limits";

/// Upstream default for the maximum nodes per way.
pub const DEFAULT_MAX_WAY_NODES: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiLimits {
    max_way_nodes: usize,
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WAY_NODES)
    }
}

impl ApiLimits {
    pub fn new(max_way_nodes: usize) -> Self {
        Self {
            max_way_nodes: max_way_nodes.max(2),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.max_way_nodes)
    }

    pub fn max_way_nodes(&self) -> usize {
        self.max_way_nodes
    }

    /// Vertices at which to split `way` so every part fits the limit.
    ///
    /// With two parts needed, a vertex shared with another way is preferred
    /// (the middle one of those that leave both halves small enough).
    /// Otherwise the way is cut at regular intervals. Closed ways are also
    /// split at their first node.
    pub fn split_vertices(&self, way: &Entity, graph: &Graph) -> Vec<EntityId> {
        let nodes = way.nodes();
        let max = self.max_way_nodes;
        let parts = nodes.len().div_ceil(max);
        if parts < 2 {
            return Vec::new();
        }

        let mut vertices = Vec::new();
        if parts == 2 {
            let intersections: Vec<&EntityId> = nodes
                .iter()
                .filter(|id| graph.has_entity(id).is_some())
                .filter(|id| graph.parent_ways(id).len() > 1)
                .filter(|id| {
                    let index = nodes.iter().position(|n| n == *id).unwrap_or_default();
                    index < max && nodes.len() - index < max
                })
                .collect();
            if !intersections.is_empty() {
                vertices.push(intersections[intersections.len() / 2].clone());
            }
        }

        if vertices.is_empty() {
            vertices = (1..parts)
                .map(|i| nodes[nodes.len() * i / parts].clone())
                .collect();
        }

        if way.is_closed() {
            vertices.push(nodes[0].clone());
        }
        vertices
    }
}

impl Validation for ApiLimits {
    fn issue_type(&self) -> &'static str {
        ISSUE_TYPE
    }

    fn validate(&self, entity: &Entity, graph: &Graph) -> Issues {
        let mut issues = Issues::default();
        if entity.entity_type() != Some(EntityType::Way) || entity.nodes().len() <= self.max_way_nodes {
            return issues;
        }

        debug!(
            entity = entity.id().as_str(),
            nodes = entity.nodes().len(),
            max = self.max_way_nodes;
            "Way exceeds node limit"
        );
        issues.issues.push(ValidationIssue {
            issue_type: ISSUE_TYPE,
            subtype: "exceeded_max_way_nodes",
            severity: Severity::Error,
            entity_ids: vec![entity.id().clone()],
            tag_diff: Vec::new(),
            hash: 0,
            fixes: vec![IssueFix::SplitWay {
                vertices: self.split_vertices(entity, graph),
            }],
        });
        issues
    }
}
