//! Single-entity editing on a [`Document`].
//!
//! Each operation takes the document explicitly and mutates it in place. The
//! caller persists the whole document afterwards; nothing here touches
//! storage.

use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, BoardError>;

/// What happens to tasks when the release or feature area they point at is
/// deleted.
///
/// - `Cascade`: the tasks are deleted too (the board's historical behaviour)
/// - `Unassign`: the reference is cleared and the tasks show as "Unassigned"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    #[default]
    Cascade,
    Unassign,
}

impl DeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::Unassign => "unassign",
        }
    }
}

impl FromStr for DeletePolicy {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(Self::Cascade),
            "unassign" => Ok(Self::Unassign),
            other => Err(BoardError::InvalidInput(format!(
                "unknown delete policy '{}', expected 'cascade' or 'unassign'",
                other
            ))),
        }
    }
}

/// Outcome of deleting a release or feature area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub tasks_removed: usize,
    pub tasks_unassigned: usize,
}

/// Generate a time-based id (`{prefix}-{millis}`) not yet used in `taken`.
fn new_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut stamp = Utc::now().timestamp_millis();
    loop {
        let id = format!("{}-{}", prefix, stamp);
        if !taken(&id) {
            return id;
        }
        stamp += 1;
    }
}

fn required_name(name: Option<String>, kind: &str) -> Result<String> {
    non_empty(name)
        .map(|n| n.trim().to_string())
        .ok_or_else(|| BoardError::InvalidInput(format!("{} name is required", kind)))
}

/// Subtask rows with blank names are dropped. Checked rows become "Complete".
fn subtasks_from_input(parent_id: &str, inputs: Vec<SubtaskInput>) -> Vec<Task> {
    inputs
        .into_iter()
        .filter(|st| !st.name.trim().is_empty())
        .enumerate()
        .map(|(i, st)| {
            let mut task = Task::new(format!("{}-sub-{}", parent_id, i + 1), st.name);
            task.status = if st.done {
                STATUS_COMPLETE.to_string()
            } else {
                STATUS_NOT_STARTED.to_string()
            };
            task
        })
        .collect()
}

/// Remove matching tasks at any depth. Returns how many were removed,
/// counting removed subtrees as one per removed task.
fn retain_tasks(tasks: &mut Vec<Task>, remove: &impl Fn(&Task) -> bool) -> usize {
    let mut removed = 0;
    tasks.retain(|t| {
        if remove(t) {
            let mut subtree = 0;
            t.walk(&mut |_| subtree += 1);
            removed += subtree;
            false
        } else {
            true
        }
    });
    for task in tasks.iter_mut() {
        removed += retain_tasks(&mut task.subtasks, remove);
    }
    removed
}

fn for_each_task_mut(tasks: &mut [Task], f: &mut impl FnMut(&mut Task)) {
    for task in tasks {
        f(&mut *task);
        for_each_task_mut(&mut task.subtasks, f);
    }
}

fn find_task_mut<'a>(tasks: &'a mut [Task], id: &str) -> Option<&'a mut Task> {
    for task in tasks {
        if task.id == id {
            return Some(task);
        }
        if let Some(found) = find_task_mut(&mut task.subtasks, id) {
            return Some(found);
        }
    }
    None
}

impl Document {
    // ============================================================
    // Releases
    // ============================================================

    /// Create or edit a release. Returns its id.
    pub fn upsert_release(&mut self, input: ReleaseInput) -> Result<String> {
        match input.id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let release = self
                    .releases
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| BoardError::NotFound {
                        kind: "Release",
                        id: id.clone(),
                    })?;
                if let Some(name) = non_empty(input.name) {
                    release.name = name.trim().to_string();
                }
                if input.date.is_some() {
                    release.date = non_empty(input.date);
                }
                if input.launch_month.is_some() {
                    release.launch_month = non_empty(input.launch_month);
                }
                if input.color.is_some() {
                    release.color = non_empty(input.color);
                }
                tracing::debug!("Updated release {}", id);
                Ok(id)
            }
            None => {
                let name = required_name(input.name, "Release")?;
                let id = new_id("release", |id| self.release(id).is_some());
                self.releases.push(Release {
                    id: id.clone(),
                    name,
                    date: non_empty(input.date),
                    launch_month: non_empty(input.launch_month),
                    color: non_empty(input.color),
                });
                tracing::debug!("Created release {}", id);
                Ok(id)
            }
        }
    }

    pub fn delete_release(&mut self, id: &str, policy: DeletePolicy) -> Result<DeleteReport> {
        let before = self.releases.len();
        self.releases.retain(|r| r.id != id);
        if self.releases.len() == before {
            return Err(BoardError::NotFound {
                kind: "Release",
                id: id.to_string(),
            });
        }
        let report = self.detach_tasks(policy, |t| t.release_id.as_deref() == Some(id), |t| {
            t.release_id = None
        });
        tracing::info!(
            "Deleted release {} ({}: {} removed, {} unassigned)",
            id,
            policy.as_str(),
            report.tasks_removed,
            report.tasks_unassigned
        );
        Ok(report)
    }

    // ============================================================
    // Feature areas
    // ============================================================

    /// Create or edit a feature area. Returns its id.
    pub fn upsert_feature_area(&mut self, input: FeatureAreaInput) -> Result<String> {
        match input.id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let area = self
                    .feature_areas
                    .iter_mut()
                    .find(|f| f.id == id)
                    .ok_or_else(|| BoardError::NotFound {
                        kind: "Feature area",
                        id: id.clone(),
                    })?;
                if let Some(name) = non_empty(input.name) {
                    area.name = name.trim().to_string();
                }
                if input.color.is_some() {
                    area.color = non_empty(input.color);
                }
                tracing::debug!("Updated feature area {}", id);
                Ok(id)
            }
            None => {
                let name = required_name(input.name, "Feature area")?;
                let id = new_id("feature", |id| self.feature_area(id).is_some());
                self.feature_areas.push(FeatureArea {
                    id: id.clone(),
                    name,
                    color: non_empty(input.color),
                });
                tracing::debug!("Created feature area {}", id);
                Ok(id)
            }
        }
    }

    pub fn delete_feature_area(&mut self, id: &str, policy: DeletePolicy) -> Result<DeleteReport> {
        let before = self.feature_areas.len();
        self.feature_areas.retain(|f| f.id != id);
        if self.feature_areas.len() == before {
            return Err(BoardError::NotFound {
                kind: "Feature area",
                id: id.to_string(),
            });
        }
        let report = self.detach_tasks(
            policy,
            |t| t.feature_area_id.as_deref() == Some(id),
            |t| t.feature_area_id = None,
        );
        tracing::info!(
            "Deleted feature area {} ({}: {} removed, {} unassigned)",
            id,
            policy.as_str(),
            report.tasks_removed,
            report.tasks_unassigned
        );
        Ok(report)
    }

    fn detach_tasks(
        &mut self,
        policy: DeletePolicy,
        references: impl Fn(&Task) -> bool,
        mut clear: impl FnMut(&mut Task),
    ) -> DeleteReport {
        match policy {
            DeletePolicy::Cascade => DeleteReport {
                tasks_removed: retain_tasks(&mut self.tasks, &references),
                tasks_unassigned: 0,
            },
            DeletePolicy::Unassign => {
                let mut unassigned = 0;
                for_each_task_mut(&mut self.tasks, &mut |t| {
                    if references(&*t) {
                        clear(t);
                        unassigned += 1;
                    }
                });
                DeleteReport {
                    tasks_removed: 0,
                    tasks_unassigned: unassigned,
                }
            }
        }
    }

    // ============================================================
    // Tasks
    // ============================================================

    /// Create or edit a task. New tasks are added at the root. Returns the id.
    ///
    /// An empty `release_id`/`feature_area_id` unassigns; a non-empty one must
    /// reference an existing entity.
    pub fn upsert_task(&mut self, input: TaskInput) -> Result<String> {
        if let Some(id) = input.release_id.as_deref().filter(|id| !id.is_empty()) {
            if self.release(id).is_none() {
                return Err(BoardError::NotFound {
                    kind: "Release",
                    id: id.to_string(),
                });
            }
        }
        if let Some(id) = input.feature_area_id.as_deref().filter(|id| !id.is_empty()) {
            if self.feature_area(id).is_none() {
                return Err(BoardError::NotFound {
                    kind: "Feature area",
                    id: id.to_string(),
                });
            }
        }

        match input.id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let task = find_task_mut(&mut self.tasks, &id).ok_or_else(|| {
                    BoardError::NotFound {
                        kind: "Task",
                        id: id.clone(),
                    }
                })?;
                if let Some(name) = non_empty(input.name) {
                    task.name = name.trim().to_string();
                }
                if let Some(status) = non_empty(input.status) {
                    task.status = status;
                }
                if input.release_id.is_some() {
                    task.release_id = non_empty(input.release_id);
                }
                if input.feature_area_id.is_some() {
                    task.feature_area_id = non_empty(input.feature_area_id);
                }
                if input.due_date.is_some() {
                    task.due_date = non_empty(input.due_date);
                }
                if input.assignee.is_some() {
                    task.assignee = non_empty(input.assignee);
                }
                if input.notes.is_some() {
                    task.notes = non_empty(input.notes);
                }
                if let Some(subtasks) = input.subtasks {
                    task.subtasks = subtasks_from_input(&id, subtasks);
                }
                tracing::debug!("Updated task {}", id);
                Ok(id)
            }
            None => {
                let name = required_name(input.name, "Task")?;
                let id = new_id("task", |id| self.task(id).is_some());
                let mut task = Task::new(id.clone(), name);
                if let Some(status) = non_empty(input.status) {
                    task.status = status;
                }
                task.release_id = non_empty(input.release_id);
                task.feature_area_id = non_empty(input.feature_area_id);
                task.due_date = non_empty(input.due_date);
                task.assignee = non_empty(input.assignee);
                task.notes = non_empty(input.notes);
                task.subtasks = subtasks_from_input(&id, input.subtasks.unwrap_or_default());
                self.tasks.push(task);
                tracing::debug!("Created task {}", id);
                Ok(id)
            }
        }
    }

    /// Delete a task (root or subtask) together with its subtasks.
    pub fn delete_task(&mut self, id: &str) -> Result<usize> {
        let removed = retain_tasks(&mut self.tasks, &|t: &Task| t.id == id);
        if removed == 0 {
            return Err(BoardError::NotFound {
                kind: "Task",
                id: id.to_string(),
            });
        }
        tracing::debug!("Deleted task {} ({} task(s) removed)", id, removed);
        Ok(removed)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        *self = Document::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Document {
        let mut parent = Task::new("task-1", "Parent");
        parent.release_id = Some("release-1".to_string());
        parent.feature_area_id = Some("feature-1".to_string());
        let mut child = Task::new("task-2", "Child");
        child.release_id = Some("release-2".to_string());
        parent.subtasks.push(child);

        let mut other = Task::new("task-3", "Other");
        other.release_id = Some("release-2".to_string());
        other.feature_area_id = Some("feature-1".to_string());

        Document {
            releases: vec![
                Release {
                    id: "release-1".to_string(),
                    name: "R1".to_string(),
                    date: Some("2024-01-01".to_string()),
                    launch_month: None,
                    color: None,
                },
                Release {
                    id: "release-2".to_string(),
                    name: "R2".to_string(),
                    date: None,
                    launch_month: None,
                    color: None,
                },
            ],
            feature_areas: vec![FeatureArea {
                id: "feature-1".to_string(),
                name: "Core".to_string(),
                color: None,
            }],
            tasks: vec![parent, other],
        }
    }

    #[test]
    fn creates_release_with_time_based_id() {
        let mut doc = Document::empty();
        let id = doc
            .upsert_release(ReleaseInput {
                name: Some("Spring".to_string()),
                date: Some("".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(id.starts_with("release-"));
        let release = doc.release(&id).unwrap();
        assert_eq!(release.name, "Spring");
        assert_eq!(release.date, None);
    }

    #[test]
    fn new_ids_do_not_collide() {
        let mut doc = Document::empty();
        let a = doc
            .upsert_feature_area(FeatureAreaInput {
                name: Some("A".to_string()),
                ..Default::default()
            })
            .unwrap();
        let b = doc
            .upsert_feature_area(FeatureAreaInput {
                name: Some("B".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn create_requires_a_name() {
        let mut doc = Document::empty();
        let err = doc.upsert_task(TaskInput::default()).unwrap_err();
        assert!(matches!(err, BoardError::InvalidInput(_)));
    }

    #[test]
    fn editing_unknown_id_is_not_found() {
        let mut doc = board();
        let err = doc
            .upsert_release(ReleaseInput {
                id: Some("release-404".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(
            err,
            BoardError::NotFound {
                kind: "Release",
                id: "release-404".to_string()
            }
        );
    }

    #[test]
    fn edit_merges_fields_and_replaces_subtasks() {
        let mut doc = board();
        doc.upsert_task(TaskInput {
            id: Some("task-1".to_string()),
            status: Some("In Progress".to_string()),
            release_id: Some("".to_string()),
            subtasks: Some(vec![
                SubtaskInput {
                    name: "Write tests".to_string(),
                    done: true,
                },
                SubtaskInput {
                    name: "  ".to_string(),
                    done: false,
                },
            ]),
            ..Default::default()
        })
        .unwrap();

        let task = doc.task("task-1").unwrap();
        assert_eq!(task.name, "Parent");
        assert_eq!(task.status, "In Progress");
        assert_eq!(task.release_id, None);
        assert_eq!(task.feature_area_id.as_deref(), Some("feature-1"));
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.subtasks[0].id, "task-1-sub-1");
        assert_eq!(task.subtasks[0].status, "Complete");
    }

    #[test]
    fn task_references_must_exist() {
        let mut doc = board();
        let err = doc
            .upsert_task(TaskInput {
                name: Some("New".to_string()),
                feature_area_id: Some("feature-404".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, BoardError::NotFound { kind: "Feature area", .. }));
    }

    #[test]
    fn cascade_delete_removes_referencing_tasks_at_any_depth() {
        let mut doc = board();
        let report = doc.delete_release("release-2", DeletePolicy::Cascade).unwrap();
        assert_eq!(report.tasks_removed, 2);
        assert_eq!(doc.tasks.len(), 1);
        assert!(doc.tasks[0].subtasks.is_empty());
    }

    #[test]
    fn cascade_delete_counts_removed_subtrees() {
        let mut doc = board();
        let report = doc.delete_release("release-1", DeletePolicy::Cascade).unwrap();
        assert_eq!(report.tasks_removed, 2);
        assert_eq!(doc.task_count(), 1);
    }

    #[test]
    fn unassign_delete_keeps_tasks() {
        let mut doc = board();
        let report = doc
            .delete_feature_area("feature-1", DeletePolicy::Unassign)
            .unwrap();
        assert_eq!(report.tasks_unassigned, 2);
        assert_eq!(doc.task_count(), 3);
        assert!(doc.tasks.iter().all(|t| t.feature_area_id.is_none()));
    }

    #[test]
    fn delete_task_finds_subtasks() {
        let mut doc = board();
        assert_eq!(doc.delete_task("task-2").unwrap(), 1);
        assert!(doc.task("task-2").is_none());
        assert!(doc.delete_task("task-2").is_err());
    }

    #[test]
    fn parses_delete_policy() {
        assert_eq!("Unassign".parse::<DeletePolicy>(), Ok(DeletePolicy::Unassign));
        assert_eq!("cascade".parse::<DeletePolicy>(), Ok(DeletePolicy::Cascade));
        assert!("nuke".parse::<DeletePolicy>().is_err());
    }

    #[test]
    fn clear_resets_everything() {
        let mut doc = board();
        doc.clear();
        assert!(doc.is_empty());
    }
}
