//! Filter/Sort Engine
//!
//! Filtering and sorting never touch the input slice; both return a fresh
//! `Vec`. The pipeline is always filter first, then a stable sort.

mod collate;

pub use collate::{collation_key, locale_compare};

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::format::{parse_instant, PDF_LABEL};
use crate::merge::SearchResults;
use crate::model::{NormalizedDocument, NormalizedLink, ResultKind, SearchLogView, SearchResultItem};

/// Fields a text query is matched against
pub trait Filterable {
    fn filter_fields(&self) -> Vec<&str>;
}

/// Keys the named comparators read
pub trait Sortable {
    fn title_key(&self) -> &str;

    fn owner_key(&self) -> Option<&str> {
        None
    }

    fn size_key(&self) -> Option<f64> {
        None
    }
}

impl Filterable for NormalizedDocument {
    fn filter_fields(&self) -> Vec<&str> {
        vec![&self.title]
    }
}

impl Sortable for NormalizedDocument {
    fn title_key(&self) -> &str {
        &self.title
    }

    fn owner_key(&self) -> Option<&str> {
        Some(&self.owner)
    }

    fn size_key(&self) -> Option<f64> {
        self.size_bytes
    }
}

impl Filterable for NormalizedLink {
    fn filter_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.host, &self.owner]
    }
}

impl Sortable for NormalizedLink {
    fn title_key(&self) -> &str {
        &self.title
    }

    fn owner_key(&self) -> Option<&str> {
        Some(&self.owner)
    }
}

impl Filterable for SearchResultItem {
    fn filter_fields(&self) -> Vec<&str> {
        vec![self.title(), self.source()]
    }
}

impl Sortable for SearchResultItem {
    fn title_key(&self) -> &str {
        self.title()
    }
}

impl Filterable for SearchLogView {
    fn filter_fields(&self) -> Vec<&str> {
        vec![&self.query]
    }
}

/// Named comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Server order (most recent first)
    #[default]
    Recent,
    Title,
    Owner,
    Size,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Recent => "recent",
            SortKey::Title => "title",
            SortKey::Owner => "owner",
            SortKey::Size => "size",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Recent => "Recently modified",
            SortKey::Title => "Title A-Z",
            SortKey::Owner => "Owner",
            SortKey::Size => "File size",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recent" => Ok(SortKey::Recent),
            "title" => Ok(SortKey::Title),
            "owner" => Ok(SortKey::Owner),
            "size" => Ok(SortKey::Size),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

// Present keys order before missing ones so the order stays total
fn compare_present<K>(a: Option<K>, b: Option<K>, cmp: impl Fn(K, K) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare_by<T: Sortable>(a: &T, b: &T, key: SortKey) -> Ordering {
    match key {
        SortKey::Recent => Ordering::Equal,
        SortKey::Title => locale_compare(a.title_key(), b.title_key()),
        SortKey::Owner => compare_present(a.owner_key(), b.owner_key(), locale_compare),
        SortKey::Size => compare_present(a.size_key(), b.size_key(), |x: f64, y: f64| x.total_cmp(&y)),
    }
}

/// True when any designated field contains `query`, ignoring case
pub fn matches_query<T: Filterable>(item: &T, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    item.filter_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn filter_items<T: Filterable + Clone>(items: &[T], query: &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| matches_query(*item, query))
        .cloned()
        .collect()
}

/// Stable in-place sort; `Recent` leaves server order alone
pub fn sort_in_place<T: Sortable>(items: &mut [T], key: SortKey) {
    if key != SortKey::Recent {
        items.sort_by(|a, b| compare_by(a, b, key));
    }
}

pub fn sort_items<T: Sortable + Clone>(items: &[T], key: SortKey) -> Vec<T> {
    let mut sorted = items.to_vec();
    sort_in_place(&mut sorted, key);
    sorted
}

/// Text query plus comparator, applied as one pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub text: String,
    pub sort: SortKey,
}

impl ViewQuery {
    pub fn new(text: impl Into<String>, sort: SortKey) -> Self {
        Self {
            text: text.into(),
            sort,
        }
    }

    pub fn apply<T: Filterable + Sortable + Clone>(&self, items: &[T]) -> Vec<T> {
        let mut filtered = filter_items(items, &self.text);
        sort_in_place(&mut filtered, self.sort);
        filtered
    }
}

// ============================================================================
// Search-page filters
// ============================================================================

/// Result kind selector on the search page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Documents,
    /// Documents whose type label is PDF
    Pdf,
    Links,
}

impl KindFilter {
    pub fn accepts(&self, item: &SearchResultItem) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Documents => item.kind() == ResultKind::Document,
            KindFilter::Pdf => item.kind() == ResultKind::Document && item.source() == PDF_LABEL,
            KindFilter::Links => item.kind() == ResultKind::Link,
        }
    }
}

/// Creation-date window on the search page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Day,
    Week,
    Month,
}

impl DateRange {
    fn span(&self) -> Option<Duration> {
        match self {
            DateRange::All => None,
            DateRange::Day => Some(Duration::days(1)),
            DateRange::Week => Some(Duration::weeks(1)),
            DateRange::Month => Some(Duration::days(30)),
        }
    }

    /// Items without a parsable timestamp only pass the `All` window
    pub fn contains(&self, created_at: Option<&str>, now: DateTime<Utc>) -> bool {
        let Some(span) = self.span() else {
            return true;
        };
        let cutoff = now - span;
        created_at
            .and_then(parse_instant)
            .map(|ts| ts >= cutoff)
            .unwrap_or(false)
    }
}

/// Narrow merged results by kind and age; order is kept
pub fn filter_results(
    results: &SearchResults,
    kind: KindFilter,
    range: DateRange,
    now: DateTime<Utc>,
) -> SearchResults {
    SearchResults {
        query: results.query.clone(),
        items: results
            .items
            .iter()
            .filter(|item| kind.accepts(item) && range.contains(item.created_at(), now))
            .cloned()
            .collect(),
    }
}
