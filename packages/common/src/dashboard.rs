//! Read-side filtering of items and stored records for list views.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::analysis::ResultCategory;
use crate::item::UploadItem;
use crate::record::StoredAnalysisRecord;

/// Something a dashboard can list.
pub trait Listable {
    fn entry_id(&self) -> String;

    /// Optional display name, also matched by search.
    fn entry_name(&self) -> Option<&str> {
        None
    }

    /// `None` when the entry has no result yet.
    fn category(&self) -> Option<ResultCategory>;
}

impl Listable for UploadItem {
    fn entry_id(&self) -> String {
        self.id().to_string()
    }

    fn entry_name(&self) -> Option<&str> {
        Some(self.name())
    }

    fn category(&self) -> Option<ResultCategory> {
        self.result().map(|r| r.category())
    }
}

impl Listable for StoredAnalysisRecord {
    fn entry_id(&self) -> String {
        self.id.to_string()
    }

    fn category(&self) -> Option<ResultCategory> {
        Some(StoredAnalysisRecord::category(self))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Benign,
    Malignant,
}

impl CategoryFilter {
    fn admits(&self, category: Option<ResultCategory>) -> bool {
        match self {
            Self::All => true,
            Self::Benign => category == Some(ResultCategory::Benign),
            Self::Malignant => category == Some(ResultCategory::Malignant),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Benign => "benign",
            Self::Malignant => "malignant",
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "benign" => Ok(Self::Benign),
            "malignant" => Ok(Self::Malignant),
            _ => Err(format!(
                "Invalid filter '{s}'. Valid values: all, benign, malignant"
            )),
        }
    }
}

/// Category filter plus free-text search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardQuery {
    pub category: CategoryFilter,
    /// Case-insensitive substring of the id (so an id prefix works) or the name.
    pub search: String,
}

impl DashboardQuery {
    pub fn new(category: CategoryFilter, search: impl Into<String>) -> Self {
        Self {
            category,
            search: search.into(),
        }
    }

    fn matches<T: Listable>(&self, entry: &T, needle: &str) -> bool {
        if !self.category.admits(entry.category()) {
            return false;
        }
        if needle.is_empty() {
            return true;
        }
        entry.entry_id().to_lowercase().contains(needle)
            || entry
                .entry_name()
                .is_some_and(|name| name.to_lowercase().contains(needle))
    }
}

/// Result of filtering, keeping "nothing at all" apart from "nothing matches".
#[derive(Debug)]
pub enum DashboardView<'a, T> {
    NoEntries,
    NoMatches { total: usize },
    Matches(Vec<&'a T>),
}

impl<'a, T> DashboardView<'a, T> {
    pub fn entries(&self) -> &[&'a T] {
        match self {
            Self::Matches(entries) => entries,
            _ => &[],
        }
    }
}

/// Filter `entries` by `query`, preserving their order.
pub fn filter<'a, T: Listable>(
    entries: &'a [T],
    query: &DashboardQuery,
) -> DashboardView<'a, T> {
    if entries.is_empty() {
        return DashboardView::NoEntries;
    }

    let needle = query.search.trim().to_lowercase();
    let matched: Vec<&T> = entries
        .iter()
        .filter(|entry| query.matches(*entry, &needle))
        .collect();

    if matched.is_empty() {
        DashboardView::NoMatches {
            total: entries.len(),
        }
    } else {
        DashboardView::Matches(matched)
    }
}
