//! Domain models for Workboard.
//!
//! # Core Concepts
//!
//! - [`Release`]: A named, optionally dated milestone that tasks are grouped under.
//! - [`FeatureArea`]: A named category orthogonal to releases.
//! - [`Task`]: A unit of work with a status, optional release and feature-area
//!   assignment, and owned subtasks.
//! - [`Document`]: The full set of releases, feature areas and root tasks. This is
//!   the only unit of persistence; the store never sees partial updates.
//!
//! Documents written by older front ends use empty strings and `null` for absent
//! values. Optional fields deserialize both as `None`.

mod document;
mod feature_area;
mod release;
mod task;

pub use document::*;
pub use feature_area::*;
pub use release::*;
pub use task::*;

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating `""` (after trimming) like `null`.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Normalize a user-supplied optional value the same way [`empty_as_none`] does.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
