//! Mapping raw CSV rows onto the columns the importer understands.

use std::collections::HashMap;

pub const COL_NAME: &str = "Name";
pub const COL_TASK_ID: &str = "Task ID";
pub const COL_RELEASE: &str = "Release Version";
pub const COL_FEATURE_AREA: &str = "Feature Area";
pub const COL_STATUS: &str = "Section/Column";
pub const COL_DUE_DATE: &str = "Due Date";
pub const COL_PARENT: &str = "Parent task";
pub const COL_ASSIGNEE: &str = "Assignee";
pub const COL_NOTES: [&str; 3] = ["Notes", "Comment", "Comments"];

pub const UNASSIGNED_RELEASE: &str = "Unassigned Release";
pub const UNASSIGNED_FEATURE_AREA: &str = "Unassigned Feature Area";

/// One data row keyed by trimmed header name. Missing trailing fields are `""`.
pub type RawRecord = HashMap<String, String>;

/// Spreadsheet exports often start with a byte order mark, which `str::trim`
/// keeps.
const BOM: char = '\u{feff}';

fn clean_header(header: &str) -> &str {
    header.trim_matches(|c: char| c.is_whitespace() || c == BOM)
}

/// Pair each data row with the header row.
pub fn to_raw_records(headers: &[String], rows: &[Vec<String>]) -> Vec<RawRecord> {
    let headers: Vec<&str> = headers.iter().map(|h| clean_header(h)).collect();
    rows.iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    (
                        header.to_string(),
                        row.get(i).cloned().unwrap_or_default(),
                    )
                })
                .collect()
        })
        .collect()
}

/// A typed CSV row with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub name: String,
    pub task_id: Option<String>,
    pub release_name: String,
    pub feature_area_name: String,
    pub status: String,
    pub due_date: Option<String>,
    pub parent_task_name: Option<String>,
    pub assignee: Option<String>,
    pub notes: Option<String>,
}

impl CsvRecord {
    /// Map a raw record. Returns `None` when `Name` is missing or empty.
    pub fn from_raw(raw: &RawRecord) -> Option<Self> {
        let get = |key: &str| raw.get(key).map(String::as_str).filter(|v| !v.is_empty());
        let owned = |key: &str| get(key).map(str::to_string);

        let name = owned(COL_NAME)?;

        let notes: Vec<&str> = COL_NOTES.iter().filter_map(|key| get(*key)).collect();
        let notes = if notes.is_empty() {
            None
        } else {
            Some(notes.join("\n\n"))
        };

        Some(Self {
            name,
            task_id: owned(COL_TASK_ID),
            release_name: owned(COL_RELEASE).unwrap_or_else(|| UNASSIGNED_RELEASE.to_string()),
            feature_area_name: owned(COL_FEATURE_AREA)
                .unwrap_or_else(|| UNASSIGNED_FEATURE_AREA.to_string()),
            status: owned(COL_STATUS)
                .unwrap_or_else(|| crate::models::STATUS_NOT_STARTED.to_string()),
            due_date: owned(COL_DUE_DATE),
            parent_task_name: owned(COL_PARENT),
            assignee: owned(COL_ASSIGNEE),
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn headers_are_trimmed_and_short_rows_padded() {
        let headers = vec![" Name ".to_string(), "Assignee".to_string()];
        let rows = vec![vec!["Write docs".to_string()]];
        let records = to_raw_records(&headers, &rows);
        assert_eq!(records[0]["Name"], "Write docs");
        assert_eq!(records[0]["Assignee"], "");
    }

    #[test]
    fn byte_order_mark_is_stripped_from_headers() {
        let headers = vec!["\u{feff}Name".to_string(), "Release Version \u{feff}".to_string()];
        let rows = vec![vec!["Alpha".to_string(), "R1".to_string()]];
        let records = to_raw_records(&headers, &rows);
        assert_eq!(records[0]["Name"], "Alpha");
        assert_eq!(records[0]["Release Version"], "R1");
    }

    #[test]
    fn applies_defaults() {
        let record = CsvRecord::from_raw(&raw(&[("Name", "Task")])).unwrap();
        assert_eq!(record.release_name, UNASSIGNED_RELEASE);
        assert_eq!(record.feature_area_name, UNASSIGNED_FEATURE_AREA);
        assert_eq!(record.status, "Not Started");
        assert_eq!(record.task_id, None);
        assert_eq!(record.notes, None);
    }

    #[test]
    fn joins_notes_columns_in_order() {
        let record = CsvRecord::from_raw(&raw(&[
            ("Name", "Task"),
            ("Comments", "third"),
            ("Notes", "first"),
            ("Comment", ""),
        ]))
        .unwrap();
        assert_eq!(record.notes.as_deref(), Some("first\n\nthird"));
    }

    #[test]
    fn missing_name_is_rejected() {
        assert!(CsvRecord::from_raw(&raw(&[("Name", ""), ("Assignee", "sam")])).is_none());
        assert!(CsvRecord::from_raw(&raw(&[("Assignee", "sam")])).is_none());
    }
}
