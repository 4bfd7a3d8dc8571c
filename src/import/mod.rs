//! CSV import.
//!
//! Turns a board export (one row per task, release and feature area given by
//! name) into a normalized [`Document`]:
//!
//! 1. [`parser::parse_rows`] splits the text into rows.
//! 2. Rows are keyed by header and mapped onto [`CsvRecord`]s. Rows without a
//!    `Name` are dropped.
//! 3. [`Importer::reconcile`] creates one release per distinct `Release Version`
//!    and one feature area per distinct `Feature Area`, then nests tasks under
//!    the task named in their `Parent task` column.
//!
//! Import is a full replace. Nothing is merged with the current board.

mod export;
mod parser;
mod record;

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

pub use export::{export_csv, ExportError};
pub use parser::parse_rows;
pub use record::*;

use crate::dates::compare_date_strings;
use crate::models::{Document, FeatureArea, Release, Task};

/// Import failures. The current document is left untouched when one occurs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("CSV file appears to be empty or invalid: found {0} row(s), need a header and at least one data row")]
    TooFewRows(usize),
}

/// Parse `text` and reconcile it into a new document, stamping generated task
/// ids with the current time.
pub fn import_csv(text: &str) -> Result<Document, ImportError> {
    Importer::new(Utc::now().timestamp_millis()).import(text)
}

/// Builds documents from CSV. Holds the timestamp used in generated task ids
/// so tests can pin them.
#[derive(Debug, Clone, Copy)]
pub struct Importer {
    stamp: i64,
}

/// A task whose parent has not been resolved yet.
struct PendingTask {
    task: Task,
    parent_name: Option<String>,
}

impl Importer {
    pub fn new(stamp: i64) -> Self {
        Self { stamp }
    }

    pub fn import(&self, text: &str) -> Result<Document, ImportError> {
        let rows = parse_rows(text);
        if rows.len() < 2 {
            return Err(ImportError::TooFewRows(rows.len()));
        }

        let raw = to_raw_records(&rows[0], &rows[1..]);
        let records: Vec<CsvRecord> = raw.iter().filter_map(CsvRecord::from_raw).collect();

        let skipped = raw.len() - records.len();
        if skipped > 0 {
            tracing::debug!("Skipped {} CSV row(s) without a Name", skipped);
        }

        let document = self.reconcile(records);
        tracing::info!(
            "Imported {} release(s), {} feature area(s), {} root task(s) ({} total)",
            document.releases.len(),
            document.feature_areas.len(),
            document.tasks.len(),
            document.task_count()
        );
        Ok(document)
    }

    /// Build releases, feature areas and the task tree from typed records.
    pub fn reconcile(&self, records: Vec<CsvRecord>) -> Document {
        let mut releases: Vec<Release> = Vec::new();
        let mut release_index: HashMap<String, usize> = HashMap::new();
        let mut feature_areas: Vec<FeatureArea> = Vec::new();
        let mut feature_area_index: HashMap<String, usize> = HashMap::new();
        let mut pending: Vec<PendingTask> = Vec::with_capacity(records.len());

        for (position, record) in records.into_iter().enumerate() {
            let release_slot = *release_index
                .entry(record.release_name.clone())
                .or_insert_with(|| {
                    releases.push(Release {
                        id: format!("release-{}", releases.len() + 1),
                        name: record.release_name.clone(),
                        date: record.due_date.clone(),
                        launch_month: None,
                        color: None,
                    });
                    releases.len() - 1
                });
            let release = &mut releases[release_slot];
            if let Some(due) = record.due_date.as_deref() {
                let later = match release.date.as_deref() {
                    Some(current) => compare_date_strings(due, current).is_gt(),
                    None => true,
                };
                if later {
                    release.date = Some(due.to_string());
                }
            }

            let feature_slot = *feature_area_index
                .entry(record.feature_area_name.clone())
                .or_insert_with(|| {
                    feature_areas.push(FeatureArea {
                        id: format!("feature-{}", feature_areas.len() + 1),
                        name: record.feature_area_name.clone(),
                        color: None,
                    });
                    feature_areas.len() - 1
                });

            let id = record
                .task_id
                .unwrap_or_else(|| format!("task-{}-{}", self.stamp, position));

            pending.push(PendingTask {
                task: Task {
                    id,
                    name: record.name,
                    release_id: Some(releases[release_slot].id.clone()),
                    feature_area_id: Some(feature_areas[feature_slot].id.clone()),
                    status: record.status,
                    due_date: record.due_date,
                    assignee: record.assignee,
                    notes: record.notes,
                    subtasks: Vec::new(),
                },
                parent_name: record.parent_task_name,
            });
        }

        Document {
            releases,
            feature_areas,
            tasks: link_subtasks(pending),
        }
    }
}

/// Nest each task under the first other task whose name matches its parent
/// name. Unmatched parents, self references and parent loops leave the task at
/// the root. Row order is preserved at every level.
fn link_subtasks(pending: Vec<PendingTask>) -> Vec<Task> {
    let count = pending.len();

    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, p) in pending.iter().enumerate() {
        by_name.entry(p.task.name.as_str()).or_default().push(i);
    }

    let mut parent: Vec<Option<usize>> = pending
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let name = p.parent_name.as_deref()?;
            let found = by_name
                .get(name)
                .and_then(|candidates| candidates.iter().copied().find(|&j| j != i));
            if found.is_none() {
                tracing::debug!("Parent task {:?} not found for {:?}", name, p.task.name);
            }
            found
        })
        .collect();

    // Break parent loops so every task stays reachable from a root.
    for i in 0..count {
        let mut cursor = parent[i];
        let mut steps = 0;
        while let Some(p) = cursor {
            if p == i {
                tracing::warn!("Parent loop through {:?}; keeping it at root", pending[i].task.name);
                parent[i] = None;
                break;
            }
            steps += 1;
            if steps > count {
                break;
            }
            cursor = parent[p];
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut roots = Vec::new();
    for (i, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let mut slots: Vec<Option<Task>> = pending.into_iter().map(|p| Some(p.task)).collect();
    roots
        .into_iter()
        .filter_map(|i| build_tree(i, &children, &mut slots))
        .collect()
}

fn build_tree(index: usize, children: &[Vec<usize>], slots: &mut [Option<Task>]) -> Option<Task> {
    let mut task = slots[index].take()?;
    task.subtasks = children[index]
        .iter()
        .filter_map(|&child| build_tree(child, children, slots))
        .collect();
    Some(task)
}
