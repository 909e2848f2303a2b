//! # Actions
//!
//! Graph-to-graph edits. Each action takes the current [`Graph`] and returns
//! the next one; the input graph is never touched, so callers can hand
//! actions straight to [`History::perform`](crate::graph::History::perform).
//!
//! Actions hold no UI concerns: no annotations, no messages. Entities that
//! vanished between scheduling an action and running it are skipped rather
//! than reported, except in [`change_tags`] where the caller names the id
//! directly.
//!
//! - [`change_tags`]: replace an entity's tags
//! - [`upgrade_tags`]: apply one deprecation rule
//! - [`discard_tags`]: strip discardable tags from everything touched
//!
//! [`Graph`]: crate::graph::Graph

mod change_tags;
mod discard_tags;
mod upgrade_tags;

pub use change_tags::change_tags;
pub use discard_tags::discard_tags;
pub use upgrade_tags::upgrade_tags;
