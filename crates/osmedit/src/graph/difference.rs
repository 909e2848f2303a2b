use super::{Graph, Resolver};
use crate::entity::{Entity, EntityId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Entities that differ between a `base` and a `head` graph.
///
/// An entity counts as modified when the two graphs hold different values
/// for its id (pointer identity, so a replaced-but-equal value still counts).
/// All three lists are sorted by id.
#[derive(Debug, Clone, Default)]
pub struct Difference {
    modified: Vec<Arc<Entity>>,
    created: Vec<Arc<Entity>>,
    deleted: Vec<Arc<Entity>>,
}

impl Difference {
    pub fn new(base: &Graph, head: &Graph) -> Self {
        let mut ids: BTreeSet<&EntityId> = BTreeSet::new();
        ids.extend(base.local_ids());
        ids.extend(head.local_ids());
        if !base.shares_base_with(head) {
            ids.extend(base.base_ids());
            ids.extend(head.base_ids());
        }

        let mut diff = Difference::default();
        for id in ids {
            match (base.has_entity(id), head.has_entity(id)) {
                (Some(before), Some(after)) if !Arc::ptr_eq(before, after) => {
                    diff.modified.push(Arc::clone(after));
                }
                (None, Some(after)) => diff.created.push(Arc::clone(after)),
                (Some(before), None) => diff.deleted.push(Arc::clone(before)),
                _ => {}
            }
        }
        diff
    }

    pub fn modified(&self) -> &[Arc<Entity>] {
        &self.modified
    }

    pub fn created(&self) -> &[Arc<Entity>] {
        &self.created
    }

    /// Deleted entities, as they were in the base graph.
    pub fn deleted(&self) -> &[Arc<Entity>] {
        &self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.created.is_empty() && self.deleted.is_empty()
    }

    /// Modified and created entities, the ones a save would upload as
    /// current values.
    pub fn touched(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.modified.iter().chain(self.created.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityAttrs;
    use crate::graph::fixtures::GraphFixture;
    use crate::tags::{from_pairs, Tags};

    fn ids(entities: &[Arc<Entity>]) -> Vec<&str> {
        entities.iter().map(|e| e.id().as_str()).collect()
    }

    #[test]
    fn test_empty_difference() {
        let graph = GraphFixture::new().with_node("n1", Tags::new()).build();
        let diff = Difference::new(&graph, &graph);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_classifies_changes() {
        let base = GraphFixture::new()
            .with_node("n1", Tags::new())
            .with_node("n2", Tags::new())
            .build();
        let n1 = base.entity(&EntityId::from("n1")).unwrap();
        let head = base
            .replace(n1.update(EntityAttrs::new().tag("a", "b")))
            .remove(&EntityId::from("n2"))
            .replace(Entity::node(EntityAttrs::new().id("n-1")));

        let diff = Difference::new(&base, &head);
        assert_eq!(ids(diff.modified()), vec!["n1"]);
        assert_eq!(ids(diff.created()), vec!["n-1"]);
        assert_eq!(ids(diff.deleted()), vec!["n2"]);
        assert_eq!(diff.deleted()[0].version(), 0);
    }

    #[test]
    fn test_created_then_deleted_is_no_change() {
        let base = Graph::default();
        let node = Entity::node(EntityAttrs::new().id("n-1"));
        let head = base.replace(node).remove(&EntityId::from("n-1"));
        assert!(Difference::new(&base, &head).is_empty());
    }

    #[test]
    fn test_sorted_by_id() {
        let base = Graph::default();
        let head = base
            .replace(Entity::node(EntityAttrs::new().id("w-2")))
            .replace(Entity::node(EntityAttrs::new().id("n-2")))
            .replace(Entity::node(EntityAttrs::new().id("n-1")));
        let diff = Difference::new(&base, &head);
        assert_eq!(ids(diff.created()), vec!["n-1", "n-2", "w-2"]);
    }

    #[test]
    fn test_unrelated_graphs_compare_everything() {
        let base = GraphFixture::new()
            .with_node("n1", from_pairs([("a", "1")]))
            .build();
        let head = GraphFixture::new()
            .with_node("n1", from_pairs([("a", "2")]))
            .with_node("n2", Tags::new())
            .build();
        let diff = Difference::new(&base, &head);
        assert_eq!(ids(diff.modified()), vec!["n1"]);
        assert_eq!(ids(diff.created()), vec!["n2"]);
        assert_eq!(diff.touched().count(), 2);
    }
}
