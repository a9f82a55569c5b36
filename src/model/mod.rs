//! Data model - raw backend records and the display-ready view models
//! derived from them.

mod raw;

pub use raw::{RawDocumentRecord, RawLinkRecord, RawProfile, RawResultRef, RawSearchLogRecord};

use serde::{Deserialize, Serialize};

/// Display-ready document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub id: String,
    pub title: String,
    /// Upper-cased MIME subtype, e.g. "PDF"
    pub file_type: String,
    /// "2.3 MB" or "-"
    pub size: String,
    /// Valid byte count behind `size`, used for numeric ordering
    pub size_bytes: Option<f64>,
    pub owner: String,
    pub last_modified: String,
    /// Unformatted creation timestamp, kept for render-time formatting
    pub created_at: Option<String>,
}

/// Display-ready link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLink {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub host: String,
    pub owner: String,
    pub last_modified: String,
    pub created_at: Option<String>,
}

/// Kind tag of a merged search result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Document,
    Link,
}

impl ResultKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResultKind::Document => "document",
            ResultKind::Link => "link",
        }
    }
}

/// Fields shared by both kinds of search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub id: String,
    pub title: String,
    /// File-type label for documents, raw URL for links
    pub source: String,
    pub created_at: Option<String>,
}

/// One row of a unified result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchResultItem {
    Document(ResultEntry),
    Link(ResultEntry),
}

impl SearchResultItem {
    pub fn kind(&self) -> ResultKind {
        match self {
            SearchResultItem::Document(_) => ResultKind::Document,
            SearchResultItem::Link(_) => ResultKind::Link,
        }
    }

    pub fn entry(&self) -> &ResultEntry {
        match self {
            SearchResultItem::Document(entry) | SearchResultItem::Link(entry) => entry,
        }
    }

    pub fn id(&self) -> &str {
        &self.entry().id
    }

    pub fn title(&self) -> &str {
        &self.entry().title
    }

    pub fn source(&self) -> &str {
        &self.entry().source
    }

    pub fn created_at(&self) -> Option<&str> {
        self.entry().created_at.as_deref()
    }
}

impl From<&NormalizedDocument> for SearchResultItem {
    fn from(doc: &NormalizedDocument) -> Self {
        SearchResultItem::Document(ResultEntry {
            id: doc.id.clone(),
            title: doc.title.clone(),
            source: doc.file_type.clone(),
            created_at: doc.created_at.clone(),
        })
    }
}

impl From<&NormalizedLink> for SearchResultItem {
    fn from(link: &NormalizedLink) -> Self {
        SearchResultItem::Link(ResultEntry {
            id: link.id.clone(),
            title: link.title.clone(),
            source: link
                .url
                .clone()
                .unwrap_or_else(|| crate::format::PLACEHOLDER.to_string()),
            created_at: link.created_at.clone(),
        })
    }
}

/// A logged search, ready for the history list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLogView {
    pub id: String,
    /// Display label; "-" when nothing was typed
    pub query: String,
    /// The query as typed, `None` when blank
    pub searched: Option<String>,
    pub date: String,
    pub created_at: Option<String>,
    pub results: Vec<SearchResultItem>,
}

impl SearchLogView {
    pub fn result_count(&self) -> usize {
        self.results.len()
    }
}
