//! Normalizers - raw backend records to display-ready view models
//!
//! Normalization is total: a record carrying nothing but an id still comes
//! out fully populated with placeholders.

use crate::format::{
    extract_hostname, format_byte_size, format_date_in, format_mime_subtype, DateLocale,
    PLACEHOLDER,
};
use crate::model::{
    NormalizedDocument, NormalizedLink, RawDocumentRecord, RawLinkRecord, RawProfile,
    RawResultRef, RawSearchLogRecord, SearchLogView, SearchResultItem,
};

pub const UNTITLED_DOCUMENT: &str = "Untitled document";
pub const UNTITLED_LINK: &str = "Untitled link";
pub const UNKNOWN_OWNER: &str = "N/A";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Owner label: profile name, then profile id, then "N/A"
pub fn resolve_owner(profile: Option<&RawProfile>, profile_id: Option<&str>) -> String {
    non_blank(profile.and_then(|p| p.name.as_deref()))
        .or_else(|| non_blank(profile_id))
        .or_else(|| non_blank(profile.and_then(|p| p.id.as_deref())))
        .unwrap_or(UNKNOWN_OWNER)
        .to_string()
}

/// Turns raw records into view models using one date style
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    locale: DateLocale,
}

impl Normalizer {
    pub fn new(locale: DateLocale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> DateLocale {
        self.locale
    }

    pub fn document(&self, raw: &RawDocumentRecord) -> NormalizedDocument {
        let size_bytes = raw.file_size.filter(|b| b.is_finite() && *b > 0.0);

        NormalizedDocument {
            id: raw.id.clone(),
            title: non_blank(raw.title.as_deref())
                .unwrap_or(UNTITLED_DOCUMENT)
                .to_string(),
            file_type: format_mime_subtype(raw.source.as_deref()),
            size: format_byte_size(raw.file_size),
            size_bytes,
            owner: resolve_owner(raw.profile.as_ref(), raw.profile_id.as_deref()),
            last_modified: format_date_in(raw.created_at.as_deref(), self.locale),
            created_at: raw.created_at.clone(),
        }
    }

    pub fn link(&self, raw: &RawLinkRecord) -> NormalizedLink {
        let title = non_blank(raw.title.as_deref())
            .or_else(|| non_blank(raw.url.as_deref()))
            .unwrap_or(UNTITLED_LINK)
            .to_string();

        NormalizedLink {
            id: raw.id.clone(),
            title,
            url: raw.url.clone(),
            host: extract_hostname(raw.url.as_deref()),
            owner: resolve_owner(raw.profile.as_ref(), raw.profile_id.as_deref()),
            last_modified: format_date_in(raw.created_at.as_deref(), self.locale),
            created_at: raw.created_at.clone(),
        }
    }

    pub fn search_log(&self, raw: &RawSearchLogRecord) -> SearchLogView {
        let results = raw
            .results
            .iter()
            .map(|result| match result {
                RawResultRef::Document(doc) => SearchResultItem::from(&self.document(doc)),
                RawResultRef::Link(link) => SearchResultItem::from(&self.link(link)),
            })
            .collect();

        let searched = non_blank(raw.query.as_deref()).map(str::to_string);
        SearchLogView {
            id: raw.id.clone(),
            query: searched.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
            searched,
            date: format_date_in(raw.created_at.as_deref(), self.locale),
            created_at: raw.created_at.clone(),
            results,
        }
    }

    pub fn documents(&self, raw: &[RawDocumentRecord]) -> Vec<NormalizedDocument> {
        raw.iter().map(|r| self.document(r)).collect()
    }

    pub fn links(&self, raw: &[RawLinkRecord]) -> Vec<NormalizedLink> {
        raw.iter().map(|r| self.link(r)).collect()
    }

    pub fn search_logs(&self, raw: &[RawSearchLogRecord]) -> Vec<SearchLogView> {
        raw.iter().map(|r| self.search_log(r)).collect()
    }
}

pub fn normalize_document(raw: &RawDocumentRecord) -> NormalizedDocument {
    Normalizer::default().document(raw)
}

pub fn normalize_link(raw: &RawLinkRecord) -> NormalizedLink {
    Normalizer::default().link(raw)
}

pub fn normalize_search_log(raw: &RawSearchLogRecord) -> SearchLogView {
    Normalizer::default().search_log(raw)
}
