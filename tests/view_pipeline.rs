//! Raw backend payloads through normalization, filtering, sorting and merging

use chrono::{TimeZone, Utc};
use serde_json::json;

use knowledge_lens::fetch::records_from_envelope;
use knowledge_lens::insights::{library_stats, most_searched};
use knowledge_lens::model::{RawDocumentRecord, RawLinkRecord, RawSearchLogRecord};
use knowledge_lens::prefs::{
    FileStorage, PreferenceStore, RootPresentation, Theme, ACCENT_KEY, PRIMARY_PROPERTY,
};
use knowledge_lens::query::filter_results;
use knowledge_lens::{
    merge_results, DateLocale, DateRange, KindFilter, Normalizer, ResultKind, SortKey, ViewQuery,
};

fn documents_payload() -> serde_json::Value {
    json!({
        "data": [
            {
                "id": "1",
                "title": "Q4 Product Roadmap 2024",
                "source": "application/pdf",
                "fileSize": 2450000,
                "createdAt": "2024-11-15T09:30:00Z",
                "profile": { "id": "p1", "name": "Sarah Chen" }
            },
            {
                "id": "2",
                "title": "Security Policies",
                "source": "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "fileSize": 921600,
                "createdAt": "2024-11-10T12:00:00Z",
                "profileId": "p2"
            },
            {
                "id": "3",
                "source": "text/plain",
                "fileSize": "512",
                "created_at": "2024-11-14T08:00:00Z"
            },
            { "id": "4" }
        ]
    })
}

fn links_payload() -> serde_json::Value {
    json!([
        { "id": "l1", "title": "Roadmap board", "url": "https://www.notion.so/roadmap", "createdAt": "2024-11-14T10:00:00Z" },
        { "id": "l2", "url": "https://github.com/acme/api" },
        { "id": "l3", "title": "Broken", "url": "not a url" }
    ])
}

fn normalizer() -> Normalizer {
    Normalizer::new(DateLocale::EnUs)
}

#[test]
fn library_view_filters_and_sorts() {
    let raw: Vec<RawDocumentRecord> = records_from_envelope(documents_payload()).unwrap();
    let docs = normalizer().documents(&raw);

    assert_eq!(docs[0].size, "2.3 MB");
    assert_eq!(docs[1].file_type, "VND.OPENXMLFORMATS-OFFICEDOCUMENT.WORDPROCESSINGML.DOCUMENT");
    assert_eq!(docs[1].owner, "p2");
    assert_eq!(docs[2].title, "Untitled document");
    assert_eq!(docs[2].size, "512.0 B");
    assert_eq!(docs[3].last_modified, "-");

    let unchanged = ViewQuery::new("", SortKey::Recent).apply(&docs);
    assert_eq!(unchanged, docs);

    let hits = ViewQuery::new("roadmap", SortKey::Recent).apply(&docs);
    let titles: Vec<&str> = hits.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Q4 Product Roadmap 2024"]);

    let by_size = ViewQuery::new("", SortKey::Size).apply(&docs);
    let ids: Vec<&str> = by_size.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2", "1", "4"]);

    let by_title = ViewQuery::new("", SortKey::Title).apply(&docs);
    let ids: Vec<&str> = by_title.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);
}

#[test]
fn link_view_hosts_and_titles() {
    let raw: Vec<RawLinkRecord> = records_from_envelope(links_payload()).unwrap();
    let links = normalizer().links(&raw);

    assert_eq!(links[0].host, "notion.so");
    assert_eq!(links[1].title, "https://github.com/acme/api");
    assert_eq!(links[1].host, "github.com");
    assert_eq!(links[2].host, "not a url");

    let hits = ViewQuery::new("GITHUB", SortKey::Recent).apply(&links);
    assert_eq!(hits.len(), 1);
}

#[test]
fn search_page_merges_then_narrows() {
    let n = normalizer();
    let docs = n.documents(&records_from_envelope::<RawDocumentRecord>(documents_payload()).unwrap());
    let links = n.links(&records_from_envelope::<RawLinkRecord>(links_payload()).unwrap());

    let merged = merge_results("roadmap", &docs[..1], &links[..1]);
    assert_eq!(merged.summary(), "Found 2 results for \"roadmap\"");
    assert_eq!(merged.items[0].kind(), ResultKind::Document);
    assert_eq!(merged.items[1].kind(), ResultKind::Link);

    let now = Utc.with_ymd_and_hms(2024, 11, 15, 18, 0, 0).unwrap();

    let only_links = filter_results(&merged, KindFilter::Links, DateRange::All, now);
    assert_eq!(only_links.len(), 1);
    assert_eq!(only_links.items[0].id(), "l1");

    // l1 is 32 hours old
    let today = filter_results(&merged, KindFilter::All, DateRange::Day, now);
    let ids: Vec<&str> = today.items.iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec!["1"]);

    let pdfs = filter_results(&merged, KindFilter::Pdf, DateRange::All, now);
    assert_eq!(pdfs.items.len(), 1);
    assert_eq!(pdfs.items[0].id(), "1");

    let everything = merge_results("all", &docs, &links);
    let this_week = filter_results(&everything, KindFilter::Documents, DateRange::Week, now);
    let ids: Vec<&str> = this_week.items.iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn dashboard_insights_from_history() {
    let raw: Vec<RawSearchLogRecord> = records_from_envelope(json!([
        { "id": "s1", "query": "onboarding process", "createdAt": "2024-11-15T10:00:00Z",
          "results": [{ "type": "document", "document": { "id": "d1", "title": "Onboarding" } }] },
        { "id": "s2", "query": "API authentication", "createdAt": "2024-11-15T09:00:00Z", "results": [] },
        { "id": "s3", "query": "Onboarding Process", "createdAt": "2024-11-14T09:00:00Z", "results": [] }
    ]))
    .unwrap();
    let logs = normalizer().search_logs(&raw);

    assert_eq!(logs[0].result_count(), 1);
    assert_eq!(logs[0].date, "11/15/2024");

    let top = most_searched(&logs, 5);
    assert_eq!(top[0].query, "onboarding process");
    assert_eq!(top[0].count, 2);
    assert_eq!(top[1].query, "API authentication");

    let docs = normalizer().documents(&records_from_envelope::<RawDocumentRecord>(documents_payload()).unwrap());
    let stats = library_stats(&docs, &[]);
    assert_eq!(stats.documents, 4);
    assert_eq!(stats.total_bytes, 2450000.0 + 921600.0 + 512.0);
}

#[test]
fn preferences_persist_across_stores() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("preferences.toml");

    let first = PreferenceStore::new(Box::new(FileStorage::new(&path)), std::sync::Arc::new(RootPresentation::new()));
    first.initialize();
    first.set_theme(Theme::Light).unwrap();
    first.set_accent("orange").unwrap();

    let root = std::sync::Arc::new(RootPresentation::new());
    let second = PreferenceStore::new(Box::new(FileStorage::new(&path)), root.clone());
    let prefs = second.initialize();

    assert_eq!(prefs.theme, Theme::Light);
    assert_eq!(prefs.accent, "hsl(24, 95%, 53%)");
    assert!(root.has_class("light"));
    assert_eq!(root.property(PRIMARY_PROPERTY).as_deref(), Some("hsl(24, 95%, 53%)"));

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains(ACCENT_KEY));
}

#[test]
fn global_store_installs_once() {
    use knowledge_lens::prefs::{self, MemoryStorage};

    let store = PreferenceStore::new(
        Box::new(MemoryStorage::new().with("theme", "light")),
        std::sync::Arc::new(RootPresentation::new()),
    );
    let installed = prefs::install_global(store).unwrap();
    installed.initialize();

    let global = prefs::global().expect("store installed");
    assert_eq!(global.theme(), Theme::Light);

    let second = PreferenceStore::new(Box::new(MemoryStorage::new()), std::sync::Arc::new(RootPresentation::new()));
    assert!(prefs::install_global(second).is_err());
}
