use crate::entity::EntityId;
use crate::error::Result;
use crate::graph::{Graph, Resolver};
use crate::tags::Tags;
use log::trace;

/// Sets the tags of entity `id` to exactly `tags`.
///
/// Returns the same graph when the tags are already equal.
pub fn change_tags(graph: &Graph, id: &EntityId, tags: Tags) -> Result<Graph> {
    let entity = graph.entity(id)?;
    if entity.tags() == &tags {
        return Ok(graph.clone());
    }
    trace!(entity = id.as_str(), tags = tags.len(); "Changing tags");
    Ok(graph.replace(entity.with_tags(tags)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OsmError;
    use crate::graph::fixtures::GraphFixture;
    use crate::graph::Difference;
    use crate::tags::from_pairs;

    #[test]
    fn test_changes_tags() {
        let graph = GraphFixture::new()
            .with_node("n1", from_pairs([("a", "1")]))
            .build();
        let id = EntityId::from("n1");
        let changed = change_tags(&graph, &id, from_pairs([("b", "2")])).unwrap();
        let node = changed.entity(&id).unwrap();
        assert_eq!(node.tags(), &from_pairs([("b", "2")]));
        assert_eq!(node.version(), 1);
    }

    #[test]
    fn test_equal_tags_are_noop() {
        let graph = GraphFixture::new()
            .with_node("n1", from_pairs([("a", "1")]))
            .build();
        let changed = change_tags(&graph, &EntityId::from("n1"), from_pairs([("a", "1")])).unwrap();
        assert!(Difference::new(&graph, &changed).is_empty());
    }

    #[test]
    fn test_missing_entity() {
        let graph = GraphFixture::new().build();
        let result = change_tags(&graph, &EntityId::from("n1"), Tags::new());
        assert!(matches!(result, Err(OsmError::EntityNotFound(_))));
    }
}
