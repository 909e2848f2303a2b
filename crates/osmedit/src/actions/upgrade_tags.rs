use crate::entity::EntityId;
use crate::graph::{Graph, Resolver};
use crate::tags::Tags;
use log::debug;

/// Applies the deprecation rule `old` → `replace` to entity `id`.
///
/// Always installs a new revision, even when the tags come out equal. A
/// missing entity leaves the graph as it is.
pub fn upgrade_tags(graph: &Graph, id: &EntityId, old: &Tags, replace: Option<&Tags>) -> Graph {
    let Some(entity) = graph.has_entity(id) else {
        debug!(entity = id.as_str(); "Skipping upgrade of missing entity");
        return graph.clone();
    };
    let upgraded = entity.upgrade_tags(old, replace);
    debug!(
        entity = id.as_str(),
        version = upgraded.version();
        "Upgraded deprecated tags"
    );
    graph.replace(upgraded)
}
