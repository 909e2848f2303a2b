//! Entity identifiers.
//!
//! Every entity is addressed by a prefixed string: `n123`, `w-4`, `r7`, `c1`.
//! The prefix is the type discriminator, the rest is the numeric id used by
//! the upstream store. Entities that were never uploaded carry a negative
//! number allocated locally.
//!
//! The string form is the wire contract: [`EntityId::to_osm`] accepts exactly
//! `^[cnwr](-?[0-9]+)$` and answers `""` for anything else.

use crate::error::{OsmError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

static OSM_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[cnwr](-?[0-9]+)$").unwrap());

static NEXT_CHANGESET: AtomicI64 = AtomicI64::new(-1);
static NEXT_NODE: AtomicI64 = AtomicI64::new(-1);
static NEXT_WAY: AtomicI64 = AtomicI64::new(-1);
static NEXT_RELATION: AtomicI64 = AtomicI64::new(-1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Changeset,
    Node,
    Way,
    Relation,
}

impl EntityType {
    pub fn prefix(self) -> char {
        match self {
            EntityType::Changeset => 'c',
            EntityType::Node => 'n',
            EntityType::Way => 'w',
            EntityType::Relation => 'r',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            'c' => Some(EntityType::Changeset),
            'n' => Some(EntityType::Node),
            'w' => Some(EntityType::Way),
            'r' => Some(EntityType::Relation),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Changeset => "changeset",
            EntityType::Node => "node",
            EntityType::Way => "way",
            EntityType::Relation => "relation",
        }
    }

    fn counter(self) -> &'static AtomicI64 {
        match self {
            EntityType::Changeset => &NEXT_CHANGESET,
            EntityType::Node => &NEXT_NODE,
            EntityType::Way => &NEXT_WAY,
            EntityType::Relation => &NEXT_RELATION,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal identifier of an entity.
///
/// Construction through [`From`] does not validate, since local fixtures and
/// generic entities use free-form ids. Use [`EntityId::from_str`] when the
/// input comes from outside and must follow the wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Allocates the next local id for `entity_type`.
    ///
    /// Each type has its own counter, starting at -1 and decreasing.
    pub fn next(entity_type: EntityType) -> Self {
        let n = entity_type.counter().fetch_sub(1, Ordering::Relaxed);
        Self::from_osm(entity_type, n)
    }

    pub fn from_osm(entity_type: EntityType, n: i64) -> Self {
        EntityId(format!("{}{}", entity_type.prefix(), n))
    }

    /// Returns the upstream numeric id carried by `id`, or an empty string
    /// when `id` does not follow the `^[cnwr](-?[0-9]+)$` format.
    ///
    /// # Examples
    /// ```
    /// use osmedit::entity::EntityId;
    ///
    /// assert_eq!(EntityId::to_osm("n-5"), "-5");
    /// assert_eq!(EntityId::to_osm("w42"), "42");
    /// assert_eq!(EntityId::to_osm("garbage"), "");
    /// ```
    pub fn to_osm(id: &str) -> String {
        OSM_ID
            .captures(id)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn osm_id(&self) -> String {
        Self::to_osm(&self.0)
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        self.0.chars().next().and_then(EntityType::from_prefix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = OsmError;

    fn from_str(s: &str) -> Result<Self> {
        if OSM_ID.is_match(s) {
            Ok(EntityId(s.to_string()))
        } else {
            Err(OsmError::InvalidId(s.to_string()))
        }
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId(value)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
