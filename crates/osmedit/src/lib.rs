//! # osmedit Architecture
//!
//! osmedit is the **data core of a map editor**: versioned OpenStreetMap
//! entities, the tag logic that runs on them, and the working graph they live
//! in. It draws nothing, fetches nothing and asks nobody anything. Rule
//! tables and canonical-name data arrive as plain values from the caller.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Validations (validations/)                                 │
//! │  - Outdated tags, API limits                                │
//! │  - Return issues + fixes as data                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Actions (actions/)                                         │
//! │  - Graph → Graph edits: change, upgrade, discard tags       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Graph (graph/)                                             │
//! │  - Persistent id → entity map, Difference, History          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (entity/, tags/)                                      │
//! │  - Immutable entities, merge, diff, deprecation matching    │
//! │  - Pure functions over values                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Entities Never Change
//!
//! An [`entity::Entity`] is never modified after construction. Every edit
//! produces a new value with a bumped revision; operations that turn out to
//! change nothing hand back the input itself (same `Arc`), so callers can
//! detect no-ops by identity.
//!
//! ## Testing Strategy
//!
//! 1. **Core** (`entity/`, `tags/`): exhaustive unit tests of the tag rules.
//!    This is where most of the testing lives.
//! 2. **Graph and actions**: unit tests built on
//!    [`graph::fixtures::GraphFixture`].
//! 3. **Flows** (`tests/`): edit, validate, fix, discard, undo, end to end.
//!
//! ## Module Overview
//!
//! - [`entity`]: ids, entity values, create/update/copy
//! - [`tags`]: merge, diff, deprecation matcher, upgrade, discard config
//! - [`graph`]: graph, difference, history
//! - [`actions`]: graph edits
//! - [`validations`]: issue detection and fixes
//! - [`config`]: editor settings
//! - [`data`]: rule table loading
//! - [`error`]: error types

pub mod actions;
pub mod config;
pub mod data;
pub mod entity;
pub mod error;
pub mod graph;
pub mod tags;
pub mod validations;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use entity::{Entity, EntityAttrs, EntityId, EntityType};
pub use error::{OsmError, Result};
pub use graph::{Difference, Graph, History, Resolver};
pub use tags::Tags;
