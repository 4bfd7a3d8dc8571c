//! Filtered, sorted and grouped projections of the root task list.
//!
//! Everything here is a pure function of a [`Document`] and a [`ViewQuery`].
//! Subtasks are never filtered on their own; they travel with their parent.

mod render;

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use render::*;

use crate::color::color_or_derived;
use crate::dates::{format_month_year, parse_date};
use crate::models::*;

/// Label shown for a missing or dangling release/feature-area reference.
pub const UNASSIGNED: &str = "Unassigned";

/// Which dimension the task list is filtered on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    All,
    ByFeatureArea,
    ByRelease,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ByFeatureArea => "byFeatureArea",
            Self::ByRelease => "byRelease",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "byFeatureArea" | "featureArea" | "feature-area" => Ok(Self::ByFeatureArea),
            "byRelease" | "release" => Ok(Self::ByRelease),
            _ => Err(format!(
                "unknown view '{}', expected all, byFeatureArea or byRelease",
                s
            )),
        }
    }
}

/// Task ordering.
///
/// - `ReleaseDate`: release date ascending, then feature-area name
/// - `FeatureArea`: feature-area name ascending, then release date
///
/// Undated releases and unassigned feature areas always sort last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    #[default]
    ReleaseDate,
    FeatureArea,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReleaseDate => "releaseDate",
            Self::FeatureArea => "featureArea",
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "releaseDate" | "release-date" | "date" => Ok(Self::ReleaseDate),
            "featureArea" | "feature-area" => Ok(Self::FeatureArea),
            _ => Err(format!(
                "unknown sort '{}', expected releaseDate or featureArea",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub view: ViewMode,
    pub sort: SortMode,
    /// Release or feature-area id, depending on `view`. Ignored for `All`.
    pub filter: Option<String>,
}

impl ViewQuery {
    pub fn new(view: ViewMode, sort: SortMode, filter: Option<String>) -> Self {
        Self { view, sort, filter }
    }

    fn active_filter(&self) -> Option<&str> {
        match self.view {
            ViewMode::All => None,
            _ => self.filter.as_deref().filter(|f| !f.is_empty()),
        }
    }
}

/// Tasks sharing one status bucket, in sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket<'a> {
    pub status: StatusBucket,
    pub tasks: Vec<&'a Task>,
}

/// The result of applying a [`ViewQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskView<'a> {
    /// Plain sorted list.
    List(Vec<&'a Task>),
    /// Status buckets, only produced for a filtered release view. Empty buckets
    /// are omitted.
    Grouped(Vec<Bucket<'a>>),
}

impl<'a> TaskView<'a> {
    /// All tasks in display order, flattening buckets.
    pub fn tasks(&self) -> Vec<&'a Task> {
        match self {
            Self::List(tasks) => tasks.clone(),
            Self::Grouped(buckets) => buckets.iter().flat_map(|b| b.tasks.iter().copied()).collect(),
        }
    }
}

/// Root tasks that pass the query's filter, in document order.
pub fn filter_tasks<'a>(document: &'a Document, query: &ViewQuery) -> Vec<&'a Task> {
    let Some(filter) = query.active_filter() else {
        return document.tasks.iter().collect();
    };
    document
        .tasks
        .iter()
        .filter(|task| {
            let reference = match query.view {
                ViewMode::ByFeatureArea => task.feature_area_id.as_deref(),
                ViewMode::ByRelease => task.release_id.as_deref(),
                ViewMode::All => return true,
            };
            reference == Some(filter)
        })
        .collect()
}

/// Stable sort of `tasks` by `sort`.
pub fn sort_tasks(document: &Document, tasks: &mut Vec<&Task>, sort: SortMode) {
    let mut keyed: Vec<(SortKey, &Task)> = tasks
        .iter()
        .map(|task| (SortKey::of(document, task), *task))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match sort {
        SortMode::ReleaseDate => {
            cmp_dates(a.release_date, b.release_date)
                .then_with(|| cmp_names(a.feature_area, b.feature_area))
        }
        SortMode::FeatureArea => {
            cmp_names(a.feature_area, b.feature_area)
                .then_with(|| cmp_dates(a.release_date, b.release_date))
        }
    });

    *tasks = keyed.into_iter().map(|(_, task)| task).collect();
}

struct SortKey<'a> {
    release_date: Option<NaiveDate>,
    feature_area: Option<&'a str>,
}

impl<'a> SortKey<'a> {
    fn of(document: &'a Document, task: &Task) -> Self {
        Self {
            release_date: document
                .release_of(task)
                .and_then(|r| r.date.as_deref())
                .and_then(parse_date),
            feature_area: document.feature_area_of(task).map(|f| f.name.as_str()),
        }
    }
}

/// Present values ascending, absent ones last.
fn cmp_present_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    cmp_present_first(a, b)
}

fn cmp_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp_name(a, b),
        _ => cmp_present_first(a, b),
    }
}

/// Case-insensitive name order, byte order between names that differ only in
/// case.
fn cmp_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Partition tasks into status buckets in display order, dropping empty ones.
pub fn group_by_status<'a>(tasks: &[&'a Task]) -> Vec<Bucket<'a>> {
    StatusBucket::ALL
        .iter()
        .map(|&status| Bucket {
            status,
            tasks: tasks.iter().copied().filter(|t| t.bucket() == status).collect(),
        })
        .filter(|bucket| !bucket.tasks.is_empty())
        .collect()
}

/// Filter, sort and (for a filtered release view) group the root tasks.
pub fn project<'a>(document: &'a Document, query: &ViewQuery) -> TaskView<'a> {
    let mut tasks = filter_tasks(document, query);
    sort_tasks(document, &mut tasks, query.sort);

    if query.view == ViewMode::ByRelease && query.active_filter().is_some() {
        TaskView::Grouped(group_by_status(&tasks))
    } else {
        TaskView::List(tasks)
    }
}

/// Subtasks for display: incomplete first, otherwise in stored order.
pub fn sorted_subtasks(task: &Task) -> Vec<&Task> {
    let mut subtasks: Vec<&Task> = task.subtasks.iter().collect();
    subtasks.sort_by_key(|t| t.is_complete());
    subtasks
}

/// Releases by date ascending, undated last.
pub fn sorted_releases(document: &Document) -> Vec<&Release> {
    let mut releases: Vec<&Release> = document.releases.iter().collect();
    releases.sort_by(|a, b| {
        cmp_dates(
            a.date.as_deref().and_then(parse_date),
            b.date.as_deref().and_then(parse_date),
        )
    });
    releases
}

/// Feature areas by name ascending, ignoring case.
pub fn sorted_feature_areas(document: &Document) -> Vec<&FeatureArea> {
    let mut areas: Vec<&FeatureArea> = document.feature_areas.iter().collect();
    areas.sort_by(|a, b| cmp_name(&a.name, &b.name));
    areas
}

/// Everything needed to display one task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub status: &'a str,
    pub release: &'a str,
    pub release_color: &'a str,
    /// Release date as "Month Year", when the release has a parseable date.
    pub release_month: Option<String>,
    pub launch_month: Option<&'a str>,
    pub feature_area: &'a str,
    pub feature_area_color: &'a str,
}

impl<'a> TaskRow<'a> {
    pub fn of(document: &'a Document, task: &'a Task) -> Self {
        let release = document.release_of(task);
        let feature_area = document.feature_area_of(task);

        let release_name = release.map_or(UNASSIGNED, |r| r.name.as_str());
        let feature_area_name = feature_area.map_or(UNASSIGNED, |f| f.name.as_str());

        Self {
            id: &task.id,
            name: &task.name,
            status: &task.status,
            release: release_name,
            release_color: color_or_derived(release.and_then(|r| r.color.as_deref()), release_name),
            release_month: release
                .and_then(|r| r.date.as_deref())
                .and_then(format_month_year),
            launch_month: release.and_then(|r| r.launch_month.as_deref()),
            feature_area: feature_area_name,
            feature_area_color: color_or_derived(
                feature_area.and_then(|f| f.color.as_deref()),
                feature_area_name,
            ),
        }
    }
}
