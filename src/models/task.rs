use serde::{Deserialize, Serialize};

use super::empty_as_none;

pub const STATUS_NOT_STARTED: &str = "Not Started";
pub const STATUS_IN_PROGRESS: &str = "In Progress";
pub const STATUS_COMPLETE: &str = "Complete";
pub const STATUS_COMPLETED: &str = "Completed";

/// A unit of work.
///
/// `status` is kept as the raw string from the source (CSV column or form), so
/// unrecognized values such as "Blocked" survive a save/load cycle. Use
/// [`Task::bucket`] to classify it.
///
/// Subtasks are owned exclusively by their parent. The structure is recursive,
/// although imports and forms only ever produce one level of nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Subtasks created by older front ends carry no id; see
    /// [`Document::assign_missing_ids`](super::Document::assign_missing_ids).
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub release_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub feature_area_id: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Task>,
}

fn default_status() -> String {
    STATUS_NOT_STARTED.to_string()
}

impl Task {
    /// A root task with the given id and name and everything else defaulted.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            release_id: None,
            feature_area_id: None,
            status: default_status(),
            due_date: None,
            assignee: None,
            notes: None,
            subtasks: Vec::new(),
        }
    }

    pub fn bucket(&self) -> StatusBucket {
        StatusBucket::of(&self.status)
    }

    pub fn is_complete(&self) -> bool {
        self.bucket() == StatusBucket::Complete
    }

    /// Visit this task and every nested subtask, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Task)) {
        visit(self);
        for subtask in &self.subtasks {
            subtask.walk(visit);
        }
    }
}

/// Status grouping used by the release view.
///
/// - `NotStarted`: "Not Started"
/// - `InProgress`: "In Progress"
/// - `Complete`: "Complete" or "Completed"; both spellings are the same state
/// - `Other`: anything else ("Blocked", typos, custom board columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    NotStarted,
    InProgress,
    Complete,
    Other,
}

impl StatusBucket {
    /// Buckets in display order.
    pub const ALL: [StatusBucket; 4] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Complete,
        Self::Other,
    ];

    pub fn of(status: &str) -> Self {
        match status {
            STATUS_NOT_STARTED => Self::NotStarted,
            STATUS_IN_PROGRESS => Self::InProgress,
            STATUS_COMPLETE | STATUS_COMPLETED => Self::Complete,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => STATUS_NOT_STARTED,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Complete => STATUS_COMPLETE,
            Self::Other => "Other",
        }
    }
}

/// A subtask row from the task form: a name and a done checkbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskInput {
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

/// Input for creating or editing a task.
///
/// With `id` set, the fields that are `Some` overwrite the existing task and
/// `subtasks`, when `Some`, replaces the subtask list. `release_id` and
/// `feature_area_id` set to an empty string unassign the task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub release_id: Option<String>,
    pub feature_area_id: Option<String>,
    pub due_date: Option<String>,
    pub assignee: Option<String>,
    pub notes: Option<String>,
    pub subtasks: Option<Vec<SubtaskInput>>,
}
