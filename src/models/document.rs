use serde::{Deserialize, Serialize};

use super::{FeatureArea, Release, Task};

/// The complete board: every release, feature area and root task.
///
/// Serialized as `{"releases": [], "featureAreas": [], "tasks": []}`. Subtasks
/// live inside their parent's `subtasks`, never in the root list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub feature_areas: Vec<FeatureArea>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Document {
    /// The empty document returned when nothing has been saved yet or a load fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty() && self.feature_areas.is_empty() && self.tasks.is_empty()
    }

    pub fn release(&self, id: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.id == id)
    }

    pub fn feature_area(&self, id: &str) -> Option<&FeatureArea> {
        self.feature_areas.iter().find(|f| f.id == id)
    }

    /// The release a task points at, if the reference resolves.
    pub fn release_of(&self, task: &Task) -> Option<&Release> {
        task.release_id.as_deref().and_then(|id| self.release(id))
    }

    /// The feature area a task points at, if the reference resolves.
    pub fn feature_area_of(&self, task: &Task) -> Option<&FeatureArea> {
        task.feature_area_id.as_deref().and_then(|id| self.feature_area(id))
    }

    /// Find a task by id at any depth.
    pub fn task(&self, id: &str) -> Option<&Task> {
        fn find<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
            tasks.iter().find_map(|t| {
                if t.id == id {
                    Some(t)
                } else {
                    find(&t.subtasks, id)
                }
            })
        }
        find(&self.tasks, id)
    }

    /// Total number of tasks, subtasks included.
    pub fn task_count(&self) -> usize {
        let mut count = 0;
        for task in &self.tasks {
            task.walk(&mut |_| count += 1);
        }
        count
    }

    /// Give every task without an id one derived from its parent's id.
    ///
    /// Returns the number of ids assigned.
    pub fn assign_missing_ids(&mut self) -> usize {
        fn assign(parent_id: &str, tasks: &mut [Task]) -> usize {
            let mut assigned = 0;
            for (index, task) in tasks.iter_mut().enumerate() {
                if task.id.is_empty() {
                    task.id = format!("{}-sub-{}", parent_id, index + 1);
                    assigned += 1;
                }
                assigned += assign(&task.id.clone(), &mut task.subtasks);
            }
            assigned
        }

        let mut assigned = 0;
        for (index, task) in self.tasks.iter_mut().enumerate() {
            if task.id.is_empty() {
                task.id = format!("task-orphan-{}", index + 1);
                assigned += 1;
            }
            assigned += assign(&task.id.clone(), &mut task.subtasks);
        }
        assigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(Document::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "releases": [], "featureAreas": [], "tasks": [] })
        );
    }

    #[test]
    fn deserializes_legacy_empty_strings_and_formless_subtasks() {
        let json = r#"{
            "releases": [{"id": "release-1", "name": "R1", "date": "", "launchMonth": ""}],
            "featureAreas": [{"id": "feature-1", "name": "Core"}],
            "tasks": [{
                "id": "task-1",
                "name": "Parent",
                "releaseId": "release-1",
                "featureAreaId": "",
                "status": "In Progress",
                "assignee": null,
                "type": "task",
                "subtasks": [{"name": "Child", "status": "Complete"}]
            }]
        }"#;

        let mut doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.releases[0].date, None);
        assert_eq!(doc.releases[0].launch_month, None);
        assert_eq!(doc.tasks[0].feature_area_id, None);
        assert_eq!(doc.tasks[0].assignee, None);
        assert_eq!(doc.tasks[0].subtasks[0].id, "");

        assert_eq!(doc.assign_missing_ids(), 1);
        assert_eq!(doc.tasks[0].subtasks[0].id, "task-1-sub-1");
        assert_eq!(doc.task("task-1-sub-1").unwrap().name, "Child");
        assert_eq!(doc.task_count(), 2);
    }

    #[test]
    fn dangling_references_do_not_resolve() {
        let mut task = Task::new("t", "Task");
        task.release_id = Some("release-404".to_string());
        let doc = Document {
            tasks: vec![task.clone()],
            ..Document::default()
        };
        assert!(doc.release_of(&task).is_none());
        assert!(doc.feature_area_of(&task).is_none());
    }
}
