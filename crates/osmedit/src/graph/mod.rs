//! # Graph, Difference and History
//!
//! The working set the editor operates on. A [`Graph`] maps ids to shared
//! entities and is itself persistent: [`Graph::replace`] and
//! [`Graph::remove`] return a new graph, and older graphs keep seeing the
//! entities they had.
//!
//! ## Layout
//!
//! ```text
//! Graph
//! ├── base:  Arc<HashMap<id, Arc<Entity>>>          loaded data, shared by every derived graph
//! └── local: Arc<HashMap<id, Option<Arc<Entity>>>>  edits on top; None marks a deletion
//! ```
//!
//! Deriving a graph clones two `Arc`s; only the overlay is copied on write
//! (`Arc::make_mut`), and only when it is shared.
//!
//! - [`Difference`]: what changed between two graphs with the same base
//! - [`History`]: the undo stack of graphs

mod difference;
mod history;

pub use difference::Difference;
pub use history::{History, HistoryEntry};

use crate::entity::{Entity, EntityId, EntityType};
use crate::error::{OsmError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Looks up the current version of an entity by id.
pub trait Resolver {
    fn has_entity(&self, id: &EntityId) -> Option<&Arc<Entity>>;

    fn entity(&self, id: &EntityId) -> Result<&Arc<Entity>> {
        self.has_entity(id)
            .ok_or_else(|| OsmError::EntityNotFound(id.clone()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    base: Arc<HashMap<EntityId, Arc<Entity>>>,
    local: Arc<HashMap<EntityId, Option<Arc<Entity>>>>,
}

impl Graph {
    /// Builds a graph whose base holds `entities`.
    pub fn new<I>(entities: I) -> Self
    where
        I: IntoIterator<Item = Entity>,
    {
        let base = entities
            .into_iter()
            .map(|e| (e.id().clone(), Arc::new(e)))
            .collect();
        Self {
            base: Arc::new(base),
            local: Arc::default(),
        }
    }

    /// Returns a graph with `entity` installed under its id.
    ///
    /// Installing the entity already present is free and returns an
    /// equivalent graph.
    pub fn replace(&self, entity: impl Into<Arc<Entity>>) -> Graph {
        let entity = entity.into();
        if let Some(current) = self.has_entity(entity.id()) {
            if Arc::ptr_eq(current, &entity) {
                return self.clone();
            }
        }
        let mut graph = self.clone();
        Arc::make_mut(&mut graph.local).insert(entity.id().clone(), Some(entity));
        graph
    }

    /// Returns a graph without the entity `id`.
    pub fn remove(&self, id: &EntityId) -> Graph {
        if self.has_entity(id).is_none() {
            return self.clone();
        }
        let mut graph = self.clone();
        Arc::make_mut(&mut graph.local).insert(id.clone(), None);
        graph
    }

    /// Every entity currently in the graph, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = &Arc<Entity>> {
        let from_base = self
            .base
            .iter()
            .filter(|(id, _)| !self.local.contains_key(*id))
            .map(|(_, e)| e);
        let from_local = self.local.values().flatten();
        from_base.chain(from_local)
    }

    pub fn len(&self) -> usize {
        self.entities().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entities().next().is_none()
    }

    /// Ways whose node list contains `node_id`.
    pub fn parent_ways(&self, node_id: &EntityId) -> Vec<&Arc<Entity>> {
        let mut parents: Vec<&Arc<Entity>> = self
            .entities()
            .filter(|e| e.entity_type() == Some(EntityType::Way))
            .filter(|e| e.nodes().contains(node_id))
            .collect();
        parents.sort_by(|a, b| a.id().cmp(b.id()));
        parents
    }

    /// Ids touched since the base, including deletions.
    pub(crate) fn local_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.local.keys()
    }

    pub(crate) fn shares_base_with(&self, other: &Graph) -> bool {
        Arc::ptr_eq(&self.base, &other.base)
    }

    pub(crate) fn base_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.base.keys()
    }
}

impl Resolver for Graph {
    fn has_entity(&self, id: &EntityId) -> Option<&Arc<Entity>> {
        match self.local.get(id) {
            Some(local) => local.as_ref(),
            None => self.base.get(id),
        }
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::entity::{EntityAttrs, Member};
    use crate::tags::Tags;

    /// Builds small graphs for tests. Entities added here land in the base.
    #[derive(Default)]
    pub struct GraphFixture {
        entities: Vec<Entity>,
    }

    impl GraphFixture {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_node(mut self, id: &str, tags: Tags) -> Self {
            self.entities
                .push(Entity::node(EntityAttrs::new().id(id).tags(tags)));
            self
        }

        pub fn with_way(mut self, id: &str, nodes: &[&str], tags: Tags) -> Self {
            self.entities.push(Entity::way(
                EntityAttrs::new()
                    .id(id)
                    .nodes(nodes.iter().copied())
                    .tags(tags),
            ));
            self
        }

        /// A closed way over `count` fresh untagged nodes named `n{id}{i}`.
        pub fn with_closed_way(mut self, id: &str, count: usize, tags: Tags) -> Self {
            let mut nodes: Vec<String> = (0..count).map(|i| format!("n{}{}", id, i)).collect();
            for node in &nodes {
                self.entities
                    .push(Entity::node(EntityAttrs::new().id(node.as_str())));
            }
            if let Some(first) = nodes.first().cloned() {
                nodes.push(first);
            }
            self.entities.push(Entity::way(
                EntityAttrs::new().id(id).nodes(nodes).tags(tags),
            ));
            self
        }

        pub fn with_relation(mut self, id: &str, members: Vec<Member>, tags: Tags) -> Self {
            self.entities.push(Entity::relation(
                EntityAttrs::new().id(id).members(members).tags(tags),
            ));
            self
        }

        pub fn with_entity(mut self, entity: Entity) -> Self {
            self.entities.push(entity);
            self
        }

        pub fn build(self) -> Graph {
            Graph::new(self.entities)
        }
    }
}
