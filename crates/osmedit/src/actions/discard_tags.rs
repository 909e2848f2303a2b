use crate::graph::{Difference, Graph};
use crate::tags::DiscardConfig;
use log::debug;

/// Strips discardable tags from every modified and created entity in
/// `difference`, installing the results in `graph`.
///
/// Entities with nothing to discard keep their identity.
pub fn discard_tags(graph: &Graph, difference: &Difference, config: &DiscardConfig) -> Graph {
    let mut result = graph.clone();
    let mut discarded = 0usize;
    for entity in difference.touched() {
        if let Some(kept) = config.filter(entity.tags()) {
            result = result.replace(entity.with_tags(kept));
            discarded += 1;
        }
    }
    debug!(entities = discarded; "Discarded tags");
    result
}
