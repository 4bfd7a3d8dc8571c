//! Regenerate import-compatible CSV from a document.

use csv::{Terminator, Writer, WriterBuilder};
use thiserror::Error;

use super::record::{
    COL_ASSIGNEE, COL_DUE_DATE, COL_FEATURE_AREA, COL_NAME, COL_PARENT, COL_RELEASE, COL_STATUS,
    COL_TASK_ID,
};
use crate::models::{Document, Task};

const COL_NOTES: &str = "Notes";

const HEADERS: [&str; 9] = [
    COL_TASK_ID,
    COL_NAME,
    COL_STATUS,
    COL_RELEASE,
    COL_FEATURE_AREA,
    COL_DUE_DATE,
    COL_PARENT,
    COL_ASSIGNEE,
    COL_NOTES,
];

/// Export failures. Writing into memory only fails on a broken record.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Write one row per task, parents before their subtasks.
///
/// Subtasks name their parent in `Parent task`, so feeding the output back into
/// the importer rebuilds the same tree. Dangling release or feature-area
/// references are written as blank cells.
pub fn export_csv(document: &Document) -> Result<String, ExportError> {
    let mut writer = writer();
    writer.write_record(HEADERS)?;
    for task in &document.tasks {
        write_task(&mut writer, document, task, None)?;
    }
    finish(writer)
}

fn writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn write_task(
    writer: &mut Writer<Vec<u8>>,
    document: &Document,
    task: &Task,
    parent: Option<&str>,
) -> Result<(), ExportError> {
    let release = document.release_of(task).map(|r| r.name.as_str());
    let feature_area = document.feature_area_of(task).map(|f| f.name.as_str());

    writer.write_record([
        task.id.as_str(),
        task.name.as_str(),
        task.status.as_str(),
        release.unwrap_or_default(),
        feature_area.unwrap_or_default(),
        task.due_date.as_deref().unwrap_or_default(),
        parent.unwrap_or_default(),
        task.assignee.as_deref().unwrap_or_default(),
        task.notes.as_deref().unwrap_or_default(),
    ])?;

    for subtask in &task.subtasks {
        write_task(writer, document, subtask, Some(&task.name))?;
    }
    Ok(())
}
