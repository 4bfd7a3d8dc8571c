use serde::{Deserialize, Serialize};

use super::empty_as_none;

/// A named milestone that tasks can be grouped under.
///
/// `name` is the display key and the de-duplication key during CSV import.
/// `date` and `launch_month` are kept as the strings the user entered
/// (`YYYY-MM-DD` and `YYYY-MM` as the board forms write them).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub launch_month: Option<String>,
    /// Explicit display colour. Derived from `name` when absent.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Input for creating or editing a release.
///
/// With `id` set, the fields that are `Some` overwrite the existing release.
/// Without `id`, a new release is created and `name` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub launch_month: Option<String>,
    pub color: Option<String>,
}
