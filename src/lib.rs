//! Knowledge Lens Library
//!
//! View layer of a knowledge dashboard: turns loosely-typed backend records
//! for documents, links and search history into display-ready view models,
//! and drives the concurrent fetches that produce them.
//!
//! # Features
//!
//! - **Total Normalization**: any subset of missing fields still yields a fully populated record
//! - **Independent Fetch States**: one Idle/Loading/Success/Error slot per collection
//! - **Stale-Result Suppression**: only the latest search writes back; nothing writes after teardown
//! - **Filter & Sort**: case-insensitive text filter plus title/owner/size comparators
//! - **Persisted Preferences**: theme and accent color, guarded until initialized
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use knowledge_lens::config::EndpointConfig;
//! use knowledge_lens::fetch::{HttpTransport, ViewSession};
//! use knowledge_lens::normalize::Normalizer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = Arc::new(HttpTransport::new("http://localhost:8000", None));
//!     let view = ViewSession::new(transport, EndpointConfig::default(), Normalizer::default());
//!
//!     view.activate(Some("roadmap")).await;
//!
//!     if let Some(results) = view.search_results().value() {
//!         println!("{}", results.summary());
//!     }
//!     view.teardown();
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod insights;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod prefs;
pub mod query;

// Re-export commonly used types
pub use config::Config;
pub use error::{FetchError, FetchResult};
pub use fetch::{Completion, FetchState, HttpTransport, Transport, ViewSession};
pub use format::{extract_hostname, format_byte_size, format_date, format_mime_subtype, DateLocale};
pub use merge::{merge_results, SearchResults};
pub use model::{NormalizedDocument, NormalizedLink, ResultKind, SearchLogView, SearchResultItem};
pub use normalize::{normalize_document, normalize_link, normalize_search_log, Normalizer};
pub use prefs::{PreferenceStore, Preferences, Theme};
pub use query::{filter_items, sort_items, DateRange, KindFilter, SortKey, ViewQuery};
