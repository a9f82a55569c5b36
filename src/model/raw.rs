//! Raw backend records
//!
//! The backend's payloads are loosely typed, so these structs deserialize
//! from *any* JSON value and never fail. Fields that are missing, null, or of
//! the wrong type simply come out as `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Owning profile embedded in a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawProfile {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A document as returned by the documents endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawDocumentRecord {
    pub id: String,
    pub title: Option<String>,
    /// MIME-like string, e.g. "application/pdf"
    pub source: Option<String>,
    pub file_size: Option<f64>,
    pub created_at: Option<String>,
    pub profile_id: Option<String>,
    pub profile: Option<RawProfile>,
}

/// A saved link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawLinkRecord {
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<String>,
    pub profile_id: Option<String>,
    pub profile: Option<RawProfile>,
}

/// Which stub a search-log result carries
#[derive(Debug, Clone, PartialEq)]
pub enum RawResultRef {
    Document(RawDocumentRecord),
    Link(RawLinkRecord),
}

/// One logged search with the results it produced
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct RawSearchLogRecord {
    pub id: String,
    pub query: Option<String>,
    pub created_at: Option<String>,
    pub results: Vec<RawResultRef>,
}

// ============================================================================
// Lenient field access
// ============================================================================

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|v| !v.is_null())
}

fn string_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    match field(obj, names)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number_field(obj: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    match field(obj, names)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn profile_fields(obj: &Map<String, Value>) -> (Option<String>, Option<RawProfile>) {
    let profile_id = string_field(obj, &["profileId", "profile_id"]);
    let profile = field(obj, &["profile"])
        .filter(|v| v.is_object())
        .map(|v| RawProfile::from(v.clone()));
    (profile_id, profile)
}

impl From<Value> for RawProfile {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return RawProfile::default();
        };
        RawProfile {
            id: string_field(&obj, &["id", "_id"]),
            name: string_field(&obj, &["name", "displayName", "display_name"]),
        }
    }
}

impl From<Value> for RawDocumentRecord {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return RawDocumentRecord::default();
        };
        let (profile_id, profile) = profile_fields(&obj);
        RawDocumentRecord {
            id: string_field(&obj, &["id", "_id"]).unwrap_or_default(),
            title: string_field(&obj, &["title"]),
            source: string_field(&obj, &["source", "mimeType", "mime_type"]),
            file_size: number_field(&obj, &["fileSize", "file_size", "size"]),
            created_at: string_field(&obj, &["createdAt", "created_at"]),
            profile_id,
            profile,
        }
    }
}

impl From<Value> for RawLinkRecord {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return RawLinkRecord::default();
        };
        let (profile_id, profile) = profile_fields(&obj);
        RawLinkRecord {
            id: string_field(&obj, &["id", "_id"]).unwrap_or_default(),
            title: string_field(&obj, &["title"]),
            url: string_field(&obj, &["url", "href"]),
            created_at: string_field(&obj, &["createdAt", "created_at"]),
            profile_id,
            profile,
        }
    }
}

impl RawResultRef {
    /// Resolve a result reference; the tag wins when both stubs are present
    fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        let tag = string_field(obj, &["type", "kind", "resultType", "result_type"])
            .map(|t| t.to_lowercase());
        let document = field(obj, &["document"]).filter(|v| v.is_object());
        let link = field(obj, &["link"]).filter(|v| v.is_object());

        match (tag.as_deref(), document, link) {
            (Some("document"), Some(doc), _) => {
                Some(RawResultRef::Document(RawDocumentRecord::from(doc.clone())))
            }
            (Some("link"), _, Some(link)) => Some(RawResultRef::Link(RawLinkRecord::from(link.clone()))),
            (None, Some(doc), None) => Some(RawResultRef::Document(RawDocumentRecord::from(doc.clone()))),
            (None, None, Some(link)) => Some(RawResultRef::Link(RawLinkRecord::from(link.clone()))),
            _ => None,
        }
    }
}

impl From<Value> for RawSearchLogRecord {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return RawSearchLogRecord::default();
        };

        let results = match field(&obj, &["results", "searchResults", "search_results"]) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_object())
                .filter_map(RawResultRef::from_object)
                .collect(),
            _ => Vec::new(),
        };

        RawSearchLogRecord {
            id: string_field(&obj, &["id", "_id"]).unwrap_or_default(),
            query: string_field(&obj, &["query", "q"]),
            created_at: string_field(&obj, &["createdAt", "created_at"]),
            results,
        }
    }
}
