//! Attribute sources for building and updating entities.
//!
//! [`EntityAttrs`] is a layer of changes applied on top of an existing entity
//! (or on top of nothing, for [`Entity::create`](super::Entity::create)).
//! Each field is an [`Attr`]: leave it alone, set it, or delete it.

use super::{EntityId, EntityType, Loc, Member};
use crate::tags::Tags;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Attr<T> {
    #[default]
    Keep,
    Set(T),
    Unset,
}

impl<T> Attr<T> {
    pub(crate) fn apply(self, slot: &mut Option<T>) {
        match self {
            Attr::Keep => {}
            Attr::Set(value) => *slot = Some(value),
            Attr::Unset => *slot = None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityAttrs {
    pub entity_type: Option<EntityType>,
    pub id: Attr<EntityId>,
    pub tags: Attr<Tags>,
    pub visible: Attr<bool>,
    pub loc: Attr<Loc>,
    pub nodes: Attr<Vec<EntityId>>,
    pub members: Attr<Vec<Member>>,
    /// Upstream version string, as reported by the data store.
    pub version: Attr<String>,
    pub user: Attr<String>,
    pub uid: Attr<String>,
    pub changeset: Attr<String>,
    pub timestamp: Attr<DateTime<Utc>>,
}

impl EntityAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node() -> Self {
        Self::new().with_type(EntityType::Node)
    }

    pub fn way() -> Self {
        Self::new().with_type(EntityType::Way)
    }

    pub fn relation() -> Self {
        Self::new().with_type(EntityType::Relation)
    }

    pub fn with_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = Attr::Set(id.into());
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = Attr::Set(tags);
        self
    }

    /// Adds a single tag to the tags being set.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut tags = match self.tags {
            Attr::Set(tags) => tags,
            _ => Tags::new(),
        };
        tags.insert(key.into(), value.into());
        self.tags = Attr::Set(tags);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Attr::Set(visible);
        self
    }

    pub fn loc(mut self, lon: f64, lat: f64) -> Self {
        self.loc = Attr::Set(Loc { lon, lat });
        self
    }

    pub fn nodes<I, T>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntityId>,
    {
        self.nodes = Attr::Set(nodes.into_iter().map(Into::into).collect());
        self
    }

    pub fn members(mut self, members: Vec<Member>) -> Self {
        self.members = Attr::Set(members);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Attr::Set(version.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Attr::Set(user.into());
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Attr::Set(uid.into());
        self
    }

    pub fn changeset(mut self, changeset: impl Into<String>) -> Self {
        self.changeset = Attr::Set(changeset.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Attr::Set(timestamp);
        self
    }

    pub fn unset_id(mut self) -> Self {
        self.id = Attr::Unset;
        self
    }

    pub fn unset_loc(mut self) -> Self {
        self.loc = Attr::Unset;
        self
    }

    pub fn unset_version(mut self) -> Self {
        self.version = Attr::Unset;
        self
    }

    pub fn unset_user(mut self) -> Self {
        self.user = Attr::Unset;
        self
    }
}
