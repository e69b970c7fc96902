//! Selection State
//!
//! The shared "current view" of the dashboard. Only the controller mutates
//! it; panels receive an immutable [`Snapshot`] taken when a refresh is
//! dispatched.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::month_label;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("no periods available")]
    NoPeriods,
    #[error("'{0}' is not an available period")]
    UnknownPeriod(String),
}

/// A trending date as served by `/api/us/dates` (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A month bucket as served by `/api/us/tags/months` (usually `YYYY-MM-01`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Seven-character calendar month (`2024-03`).
    pub fn label(&self) -> &str {
        month_label(&self.0)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Available periods, newest first, exactly as the backend listed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Periods<K> {
    keys: Vec<K>,
}

impl<K: PartialEq> Periods<K> {
    pub fn new(keys: Vec<K>) -> Self {
        Self { keys }
    }

    /// Most recent period; the default selection.
    pub fn latest(&self) -> Option<&K> {
        self.keys.first()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn position(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Period `step` positions away from `key` (positive = older), clamped.
    pub fn step_from(&self, key: &K, step: isize) -> Option<&K> {
        let idx = self.position(key)? as isize;
        let target = (idx + step).clamp(0, self.keys.len() as isize - 1);
        self.keys.get(target as usize)
    }
}

impl<K> Default for Periods<K> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    Videos,
    Channels,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Videos => "videos",
            SearchType::Channels => "channels",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SearchType::Videos => SearchType::Channels,
            SearchType::Channels => SearchType::Videos,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    #[default]
    Day,
    All,
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::Day => "day",
            SearchScope::All => "all",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SearchScope::Day => SearchScope::All,
            SearchScope::All => SearchScope::Day,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMetric {
    #[default]
    Views,
    Likes,
}

impl TagMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagMetric::Views => "views",
            TagMetric::Likes => "likes",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TagMetric::Views => TagMetric::Likes,
            TagMetric::Likes => TagMetric::Views,
        }
    }
}

/// What caused a refresh; panels use it to decide whether to refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Boot,
    Refresh,
    Date,
    Month,
    TagMetric,
    SearchQuery,
    SearchScope,
    SearchType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_date: Option<DateKey>,
    pub selected_month: Option<MonthKey>,
    pub search_query: String,
    pub search_type: SearchType,
    pub search_scope: SearchScope,
    pub tag_metric: TagMetric,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_date(&mut self, key: DateKey, periods: &Periods<DateKey>) -> Result<Change, StateError> {
        if periods.is_empty() {
            return Err(StateError::NoPeriods);
        }
        if !periods.contains(&key) {
            return Err(StateError::UnknownPeriod(key.0));
        }
        self.selected_date = Some(key);
        Ok(Change::Date)
    }

    pub fn select_month(&mut self, key: MonthKey, periods: &Periods<MonthKey>) -> Result<Change, StateError> {
        if periods.is_empty() {
            return Err(StateError::NoPeriods);
        }
        if !periods.contains(&key) {
            return Err(StateError::UnknownPeriod(key.0));
        }
        self.selected_month = Some(key);
        Ok(Change::Month)
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> Change {
        self.search_query = query.into();
        Change::SearchQuery
    }

    pub fn set_search_type(&mut self, kind: SearchType) -> Change {
        self.search_type = kind;
        Change::SearchType
    }

    pub fn set_search_scope(&mut self, scope: SearchScope) -> Change {
        self.search_scope = scope;
        Change::SearchScope
    }

    pub fn set_tag_metric(&mut self, metric: TagMetric) -> Change {
        self.tag_metric = metric;
        Change::TagMetric
    }

    /// Freeze the current state for one refresh cycle.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(Arc::new(self.clone()))
    }
}

/// Immutable, cheaply clonable copy of [`SelectionState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<SelectionState>);

impl Snapshot {
    /// Trimmed search query.
    pub fn query(&self) -> &str {
        self.0.search_query.trim()
    }
}

impl Deref for Snapshot {
    type Target = SelectionState;

    fn deref(&self) -> &SelectionState {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates() -> Periods<DateKey> {
        Periods::new(vec![
            DateKey::new("2024-03-03"),
            DateKey::new("2024-03-02"),
            DateKey::new("2024-03-01"),
        ])
    }

    #[test]
    fn test_latest_is_first() {
        assert_eq!(dates().latest(), Some(&DateKey::new("2024-03-03")));
        assert_eq!(Periods::<DateKey>::default().latest(), None);
    }

    #[test]
    fn test_select_date_rejects_unknown() {
        let mut state = SelectionState::new();
        let err = state.select_date(DateKey::new("1999-01-01"), &dates()).unwrap_err();
        assert_eq!(err, StateError::UnknownPeriod("1999-01-01".into()));
        assert!(state.selected_date.is_none());

        let change = state.select_date(DateKey::new("2024-03-02"), &dates()).unwrap();
        assert_eq!(change, Change::Date);
        assert_eq!(state.selected_date, Some(DateKey::new("2024-03-02")));
    }

    #[test]
    fn test_select_month_requires_periods() {
        let mut state = SelectionState::new();
        let err = state.select_month(MonthKey::new("2024-03-01"), &Periods::default()).unwrap_err();
        assert_eq!(err, StateError::NoPeriods);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut state = SelectionState::new();
        state.set_query("  cats ");
        let snap = state.snapshot();
        state.set_query("dogs");
        assert_eq!(snap.query(), "cats");
        assert_eq!(state.search_query, "dogs");
    }

    #[test]
    fn test_step_from_clamps() {
        let periods = dates();
        let newest = DateKey::new("2024-03-03");
        assert_eq!(periods.step_from(&newest, 1), Some(&DateKey::new("2024-03-02")));
        assert_eq!(periods.step_from(&newest, -1), Some(&newest));
        assert_eq!(periods.step_from(&newest, 10), Some(&DateKey::new("2024-03-01")));
    }

    #[test]
    fn test_toggles_and_labels() {
        assert_eq!(SearchScope::Day.toggled(), SearchScope::All);
        assert_eq!(SearchType::Videos.toggled().as_str(), "channels");
        assert_eq!(TagMetric::Likes.toggled(), TagMetric::Views);
        assert_eq!(MonthKey::new("2023-11-01").label(), "2023-11");
    }
}
