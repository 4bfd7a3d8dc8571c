use serde::{Deserialize, Serialize};

use super::empty_as_none;

/// A named category of work, orthogonal to releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureArea {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Input for creating or editing a feature area. Same merge rules as
/// [`ReleaseInput`](super::ReleaseInput).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAreaInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
}
