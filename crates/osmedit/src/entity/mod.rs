//! # Entities: Versioned Nodes, Ways and Relations
//!
//! An [`Entity`] is an immutable value. Nothing in this crate hands out a
//! mutable reference to an entity's tags or geometry; every change goes through
//! [`Entity::update`], which returns a new value with the same id and a bumped
//! revision. Older values stay valid, so graphs and history snapshots can share
//! them freely (they are stored behind `Arc`).
//!
//! ## Shape
//!
//! | Variant | Id prefix | Geometry |
//! |---------|-----------|----------|
//! | `Node` | `n` | optional `loc` |
//! | `Way` | `w` | ordered node ids (first == last when closed) |
//! | `Relation` | `r` | ordered members `{id, role, type}` |
//! | `Changeset` | `c` | none |
//! | `Generic` | none | none, only for tests and internal scratch values |
//!
//! ## Identity
//!
//! - `id` never changes along an update chain.
//! - Entities created locally get a negative id from a per-type counter
//!   (see [`EntityId::next`]); [`Entity::is_new`] tells them apart.
//! - The revision (`version()`) starts at 0 and grows by one per update.
//!   It is unrelated to the upstream `version` attribute.

mod attrs;
mod id;

pub use attrs::{Attr, EntityAttrs};
pub use id::{EntityId, EntityType};

use crate::error::Result;
use crate::graph::Resolver;
use crate::tags::deprecated::{get_deprecated_tags, DeprecationRule};
use crate::tags::merge::merge_entity_tags;
use crate::tags::upgrade;
use crate::tags::{is_interesting_tag, Tags, MAX_TAG_VALUE_CHARS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Copies made during one copy operation, keyed by source id.
pub type CopyMap = HashMap<EntityId, Arc<Entity>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Loc {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: EntityId,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub member_type: Option<EntityType>,
}

impl Member {
    /// Builds a member whose type is taken from the id prefix.
    pub fn new(id: impl Into<EntityId>, role: impl Into<String>) -> Self {
        let id = id.into();
        let member_type = id.entity_type();
        Self {
            id,
            role: role.into(),
            member_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntityKind {
    Generic,
    Changeset,
    Node {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loc: Option<Loc>,
    },
    Way {
        #[serde(default)]
        nodes: Vec<EntityId>,
    },
    Relation {
        #[serde(default)]
        members: Vec<Member>,
    },
}

impl EntityKind {
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            EntityKind::Generic => None,
            EntityKind::Changeset => Some(EntityType::Changeset),
            EntityKind::Node { .. } => Some(EntityType::Node),
            EntityKind::Way { .. } => Some(EntityType::Way),
            EntityKind::Relation { .. } => Some(EntityType::Relation),
        }
    }
}

/// Upstream bookkeeping attached to an entity. Cleared (in part) by copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changeset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    #[serde(flatten)]
    kind: EntityKind,
    #[serde(default)]
    tags: Tags,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    v: u64,
    #[serde(flatten)]
    meta: UpstreamMeta,
}

fn default_visible() -> bool {
    true
}

/// Mutable scratch state used while layering attribute sources.
#[derive(Default)]
struct Draft {
    entity_type: Option<EntityType>,
    infer_type: bool,
    id: Option<EntityId>,
    tags: Option<Tags>,
    visible: Option<bool>,
    loc: Option<Loc>,
    nodes: Option<Vec<EntityId>>,
    members: Option<Vec<Member>>,
    v: Option<u64>,
    version: Option<String>,
    user: Option<String>,
    uid: Option<String>,
    changeset: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl Draft {
    fn from_entity(entity: &Entity) -> Self {
        let (loc, nodes, members) = match &entity.kind {
            EntityKind::Node { loc } => (*loc, None, None),
            EntityKind::Way { nodes } => (None, Some(nodes.clone()), None),
            EntityKind::Relation { members } => (None, None, Some(members.clone())),
            EntityKind::Generic | EntityKind::Changeset => (None, None, None),
        };
        Draft {
            entity_type: entity.entity_type(),
            infer_type: false,
            id: if entity.id.is_empty() {
                None
            } else {
                Some(entity.id.clone())
            },
            tags: Some(entity.tags.clone()),
            visible: Some(entity.visible),
            loc,
            nodes,
            members,
            v: Some(entity.v),
            version: entity.meta.version.clone(),
            user: entity.meta.user.clone(),
            uid: entity.meta.uid.clone(),
            changeset: entity.meta.changeset.clone(),
            timestamp: entity.meta.timestamp,
        }
    }

    fn apply(mut self, attrs: EntityAttrs) -> Self {
        if self.infer_type && attrs.entity_type.is_some() {
            self.entity_type = attrs.entity_type;
        }
        attrs.id.apply(&mut self.id);
        attrs.tags.apply(&mut self.tags);
        attrs.visible.apply(&mut self.visible);
        attrs.loc.apply(&mut self.loc);
        attrs.nodes.apply(&mut self.nodes);
        attrs.members.apply(&mut self.members);
        attrs.version.apply(&mut self.version);
        attrs.user.apply(&mut self.user);
        attrs.uid.apply(&mut self.uid);
        attrs.changeset.apply(&mut self.changeset);
        attrs.timestamp.apply(&mut self.timestamp);
        self
    }

    fn finish(self) -> Entity {
        let entity_type = if self.infer_type {
            self.entity_type
                .or_else(|| self.id.as_ref().and_then(EntityId::entity_type))
        } else {
            self.entity_type
        };

        let id = match (self.id, entity_type) {
            (Some(id), _) => id,
            (None, Some(t)) => EntityId::next(t),
            (None, None) => EntityId::default(),
        };

        let kind = match entity_type {
            None => EntityKind::Generic,
            Some(EntityType::Changeset) => EntityKind::Changeset,
            Some(EntityType::Node) => EntityKind::Node { loc: self.loc },
            Some(EntityType::Way) => EntityKind::Way {
                nodes: self.nodes.unwrap_or_default(),
            },
            Some(EntityType::Relation) => EntityKind::Relation {
                members: self.members.unwrap_or_default(),
            },
        };

        Entity {
            id,
            kind,
            tags: self.tags.unwrap_or_default(),
            visible: self.visible.unwrap_or(true),
            v: self.v.unwrap_or(0),
            meta: UpstreamMeta {
                version: self.version,
                user: self.user,
                uid: self.uid,
                changeset: self.changeset,
                timestamp: self.timestamp,
            },
        }
    }
}

impl Entity {
    /// Builds an entity from a single attribute source.
    ///
    /// The variant comes from `attrs.entity_type`, else from the id prefix.
    /// With neither, the result is a [`EntityKind::Generic`] entity with an
    /// empty id. A typed entity without an id gets the next local id.
    pub fn create(attrs: EntityAttrs) -> Entity {
        let draft = Draft {
            infer_type: true,
            ..Draft::default()
        };
        draft.apply(attrs).finish()
    }

    pub fn node(attrs: EntityAttrs) -> Entity {
        Self::create(attrs.with_type(EntityType::Node))
    }

    pub fn way(attrs: EntityAttrs) -> Entity {
        Self::create(attrs.with_type(EntityType::Way))
    }

    pub fn relation(attrs: EntityAttrs) -> Entity {
        Self::create(attrs.with_type(EntityType::Relation))
    }

    /// Returns a new revision of this entity with `attrs` layered on top.
    ///
    /// The variant is fixed for the lifetime of the identity chain; a type in
    /// `attrs` is ignored. `self` is left untouched.
    pub fn update(&self, attrs: EntityAttrs) -> Entity {
        let mut draft = Draft::from_entity(self).apply(attrs);
        draft.v = Some(self.v + 1);
        draft.finish()
    }

    /// Shorthand for `update` with new tags.
    pub fn with_tags(&self, tags: Tags) -> Entity {
        self.update(EntityAttrs::new().tags(tags))
    }

    /// Duplicates this entity under a fresh local id.
    ///
    /// Authorship (`user`) and the upstream `version` are cleared and the
    /// revision restarts at 0. Ways copy their nodes and relations copy their
    /// members through `resolver`, so a copied way points at copied nodes.
    /// `copies` memoizes by source id: copying the same source twice within
    /// one operation yields the same copy.
    pub fn copy<R>(&self, resolver: &R, copies: &mut CopyMap) -> Result<Arc<Entity>>
    where
        R: Resolver + ?Sized,
    {
        if let Some(existing) = copies.get(&self.id) {
            return Ok(Arc::clone(existing));
        }

        let cleared = EntityAttrs::new().unset_id().unset_user().unset_version();
        let mut draft = Draft::from_entity(self).apply(cleared);
        draft.v = Some(0);
        let base = Arc::new(draft.finish());
        copies.insert(self.id.clone(), Arc::clone(&base));

        let copy = match &self.kind {
            EntityKind::Way { nodes } => {
                let mut copied = Vec::with_capacity(nodes.len());
                for node_id in nodes {
                    let node = resolver.entity(node_id)?;
                    copied.push(node.copy(resolver, copies)?.id().clone());
                }
                Self::fresh_copy(&base, EntityAttrs::new().nodes(copied))
            }
            EntityKind::Relation { members } => {
                let mut copied = Vec::with_capacity(members.len());
                for member in members {
                    let target = resolver.entity(&member.id)?;
                    let new_id = target.copy(resolver, copies)?.id().clone();
                    copied.push(Member {
                        id: new_id,
                        ..member.clone()
                    });
                }
                Self::fresh_copy(&base, EntityAttrs::new().members(copied))
            }
            _ => return Ok(base),
        };

        copies.insert(self.id.clone(), Arc::clone(&copy));
        Ok(copy)
    }

    /// `base` with `attrs` layered on, still at revision 0.
    fn fresh_copy(base: &Entity, attrs: EntityAttrs) -> Arc<Entity> {
        let mut draft = Draft::from_entity(base).apply(attrs);
        draft.v = Some(0);
        Arc::new(draft.finish())
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        self.kind.entity_type()
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Local revision counter. Starts at 0, +1 per [`Entity::update`].
    pub fn version(&self) -> u64 {
        self.v
    }

    pub fn meta(&self) -> &UpstreamMeta {
        &self.meta
    }

    pub fn loc(&self) -> Option<Loc> {
        match &self.kind {
            EntityKind::Node { loc } => *loc,
            _ => None,
        }
    }

    pub fn nodes(&self) -> &[EntityId] {
        match &self.kind {
            EntityKind::Way { nodes } => nodes,
            _ => &[],
        }
    }

    pub fn members(&self) -> &[Member] {
        match &self.kind {
            EntityKind::Relation { members } => members,
            _ => &[],
        }
    }

    /// Numeric id in the upstream scheme, `""` if the id is malformed.
    pub fn osm_id(&self) -> String {
        self.id.osm_id()
    }

    /// True for entities never round-tripped through the upstream store.
    pub fn is_new(&self) -> bool {
        let osm_id = self.osm_id();
        osm_id.is_empty() || osm_id.starts_with('-')
    }

    /// Key that changes whenever the entity does, for keyed rendering.
    pub fn key(&self) -> String {
        format!("{}v{}", self.id, self.v)
    }

    pub fn is_closed(&self) -> bool {
        let nodes = self.nodes();
        nodes.len() > 1 && nodes.first() == nodes.last()
    }

    pub fn has_non_geometry_tags(&self) -> bool {
        self.tags.keys().any(|k| k != "area")
    }

    pub fn has_interesting_tags(&self) -> bool {
        self.tags.keys().any(|k| is_interesting_tag(k))
    }

    /// Merges `incoming` into this entity's tags; see [`crate::tags::merge`].
    ///
    /// Borrows `self` back when nothing changed.
    pub fn merge_tags(&self, incoming: &Tags, forced: &Tags) -> Cow<'_, Entity> {
        merge_entity_tags(self, incoming, forced, MAX_TAG_VALUE_CHARS)
    }

    /// Deprecation rules from `rules` that apply to this entity's tags.
    pub fn deprecated_tags(&self, rules: &[DeprecationRule]) -> Vec<DeprecationRule> {
        get_deprecated_tags(&self.tags, rules)
    }

    /// Applies one deprecation upgrade; always yields a new revision.
    pub fn upgrade_tags(&self, old: &Tags, replace: Option<&Tags>) -> Entity {
        self.with_tags(upgrade::upgrade_tags(&self.tags, old, replace))
    }
}
