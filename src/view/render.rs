//! Plain-text rendering of task views for the terminal.

use super::{sorted_feature_areas, sorted_releases, sorted_subtasks, TaskRow, TaskView};
use crate::color::color_or_derived;
use crate::models::{Document, Task};

const OPEN: char = '○';
const DONE: char = '●';

pub const EMPTY_STATE: &str =
    "No data found\nImport a CSV file to get started or add items manually.\n";

/// Render a projected task view.
///
/// Example output:
/// ```text
/// Checkout redesign  [In Progress]  Spring (June 2024)  Payments  task-1
/// ├── ○ Wire up API (Not Started)
/// └── ● Mockups (Complete)
/// ```
///
/// A grouped view prints a `== Status ==` header before each bucket.
pub fn render_view(document: &Document, view: &TaskView<'_>) -> String {
    if document.tasks.is_empty() {
        return EMPTY_STATE.to_string();
    }

    let mut output = String::new();
    match view {
        TaskView::List(tasks) => {
            for task in tasks {
                render_task(&mut output, document, task);
            }
        }
        TaskView::Grouped(buckets) => {
            for (i, bucket) in buckets.iter().enumerate() {
                if i > 0 {
                    output.push('\n');
                }
                output.push_str(&format!("== {} ==\n", bucket.status.label()));
                for task in &bucket.tasks {
                    render_task(&mut output, document, task);
                }
            }
        }
    }
    output
}

fn render_task(output: &mut String, document: &Document, task: &Task) {
    let row = TaskRow::of(document, task);
    let when = row
        .release_month
        .as_deref()
        .map(|m| format!(" ({})", m))
        .unwrap_or_default();

    output.push_str(&format!(
        "{}  [{}]  {}{}  {}  {}\n",
        row.name, row.status, row.release, when, row.feature_area, row.id
    ));

    let subtasks = sorted_subtasks(task);
    for (i, subtask) in subtasks.iter().enumerate() {
        let branch = if i == subtasks.len() - 1 { "└── " } else { "├── " };
        let symbol = if subtask.is_complete() { DONE } else { OPEN };
        output.push_str(&format!(
            "{}{} {} ({})\n",
            branch, symbol, subtask.name, subtask.status
        ));
    }
}

/// One line per release, by date: name, date, launch month, colour, id.
pub fn render_releases(document: &Document) -> String {
    let mut output = String::new();
    for release in sorted_releases(document) {
        output.push_str(&format!(
            "{}  {}  {}  {}  {}\n",
            release.name,
            release.date.as_deref().unwrap_or("-"),
            release.launch_month.as_deref().unwrap_or("-"),
            color_or_derived(release.color.as_deref(), &release.name),
            release.id
        ));
    }
    output
}

/// One line per feature area, by name: name, colour, id.
pub fn render_feature_areas(document: &Document) -> String {
    let mut output = String::new();
    for area in sorted_feature_areas(document) {
        output.push_str(&format!(
            "{}  {}  {}\n",
            area.name,
            color_or_derived(area.color.as_deref(), &area.name),
            area.id
        ));
    }
    output
}
