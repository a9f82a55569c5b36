//! Fetch Orchestrator - loads every collection a view needs
//!
//! One [`ViewSession`] per view instance. Activation fires the document,
//! link and search-history loads plus the initial search concurrently; each
//! lands in its own slot, so one failing never blocks the others.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EndpointConfig;
use crate::error::{FetchError, FetchResult};
use crate::merge::{merge_results, SearchResults};
use crate::model::{
    NormalizedDocument, NormalizedLink, RawDocumentRecord, RawLinkRecord, RawSearchLogRecord,
    SearchLogView,
};
use crate::normalize::Normalizer;

use super::state::{Completion, FetchSlot, FetchState, Liveness};
use super::transport::{
    record_from_envelope, records_from_envelope, Method, Transport, UploadFile, UploadForm,
};

/// Point-in-time copy of every slot, for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub documents: FetchState<Vec<NormalizedDocument>>,
    pub links: FetchState<Vec<NormalizedLink>>,
    pub logs: FetchState<Vec<SearchLogView>>,
    pub search: FetchState<SearchResults>,
}

/// Backend-facing state of one view instance
pub struct ViewSession<T: Transport> {
    transport: Arc<T>,
    endpoints: EndpointConfig,
    normalizer: Normalizer,
    liveness: Liveness,
    documents: FetchSlot<Vec<NormalizedDocument>>,
    links: FetchSlot<Vec<NormalizedLink>>,
    logs: FetchSlot<Vec<SearchLogView>>,
    search: FetchSlot<SearchResults>,
    detail: FetchSlot<NormalizedDocument>,
}

impl<T: Transport> ViewSession<T> {
    pub fn new(transport: Arc<T>, endpoints: EndpointConfig, normalizer: Normalizer) -> Self {
        Self {
            transport,
            endpoints,
            normalizer,
            liveness: Liveness::new(),
            documents: FetchSlot::new("documents"),
            links: FetchSlot::new("links"),
            logs: FetchSlot::new("search_logs"),
            search: FetchSlot::new("search"),
            detail: FetchSlot::new("document"),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Load everything the view shows; a non-blank query also runs a search
    pub async fn activate(&self, query: Option<&str>) {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        info!(query = query.unwrap_or(""), "activating view");

        let search = async {
            if let Some(query) = query {
                self.search(query).await;
            }
        };

        let (documents, links, logs, ()) = tokio::join!(
            self.load_documents(),
            self.load_links(),
            self.load_logs(),
            search
        );
        debug!(?documents, ?links, ?logs, "activation loads settled");
    }

    /// Stop accepting results; in-flight loads finish but write nothing
    pub fn teardown(&self) {
        if self.liveness.is_alive() {
            info!("view torn down");
        }
        self.liveness.teardown();
    }

    pub fn is_active(&self) -> bool {
        self.liveness.is_alive()
    }

    // ========================================================================
    // Retrieval
    // ========================================================================

    pub async fn load_documents(&self) -> Completion {
        let ticket = self.documents.begin();
        let result = self
            .fetch_list::<RawDocumentRecord>(&self.endpoints.documents)
            .await
            .map(|raw| self.normalizer.documents(&raw));
        self.documents.complete(ticket, result, &self.liveness)
    }

    pub async fn load_links(&self) -> Completion {
        let ticket = self.links.begin();
        let result = self
            .fetch_list::<RawLinkRecord>(&self.endpoints.links)
            .await
            .map(|raw| self.normalizer.links(&raw));
        self.links.complete(ticket, result, &self.liveness)
    }

    pub async fn load_logs(&self) -> Completion {
        let ticket = self.logs.begin();
        let result = self
            .fetch_list::<RawSearchLogRecord>(&self.endpoints.search_logs)
            .await
            .map(|raw| self.normalizer.search_logs(&raw));
        self.logs.complete(ticket, result, &self.liveness)
    }

    /// Run document and link search together and merge them.
    ///
    /// Either side failing fails the whole search. A blank query clears the
    /// results instead of hitting the backend.
    pub async fn search(&self, query: &str) -> Completion {
        let query = query.trim();
        if query.is_empty() {
            self.search.reset();
            return Completion::Applied;
        }

        let ticket = self.search.begin();
        let documents_path = with_query(&self.endpoints.search_documents, query);
        let links_path = with_query(&self.endpoints.search_links, query);

        let result = tokio::try_join!(
            self.fetch_list::<RawDocumentRecord>(&documents_path),
            self.fetch_list::<RawLinkRecord>(&links_path)
        )
        .map(|(documents, links)| {
            merge_results(
                query,
                &self.normalizer.documents(&documents),
                &self.normalizer.links(&links),
            )
        });

        if let Ok(results) = &result {
            info!(query, results = results.len(), "search finished");
        }
        self.search.complete(ticket, result, &self.liveness)
    }

    /// Start a search on the runtime; a later call supersedes this one
    pub fn spawn_search(self: &Arc<Self>, query: impl Into<String>) -> JoinHandle<Completion> {
        let session = Arc::clone(self);
        let query = query.into();
        tokio::spawn(async move { session.search(&query).await })
    }

    /// Load one document for a detail view
    pub async fn load_document(&self, id: &str) -> Completion {
        let ticket = self.detail.begin();
        let path = self.endpoints.document_detail.replace("{id}", &encode_component(id));
        let result = async {
            let value = self.transport.request(&path, Method::Get, None).await?;
            let raw: RawDocumentRecord = record_from_envelope(value)?;
            Ok::<_, FetchError>(self.normalizer.document(&raw))
        }
        .await;
        self.detail.complete(ticket, result, &self.liveness)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Upload files as one multipart request, then refresh the library
    pub async fn upload_documents(&self, files: Vec<UploadFile>) -> FetchResult<usize> {
        if files.is_empty() {
            return Ok(0);
        }

        let count = files.len();
        let form = files
            .into_iter()
            .fold(UploadForm::new(), |form, file| form.file("files", file));
        info!(files = count, "uploading documents");

        if let Err(err) = self
            .transport
            .upload_request(&self.endpoints.upload_document, form)
            .await
        {
            warn!(kind = err.kind(), "upload failed: {}", err);
            return Err(err);
        }

        self.load_documents().await;
        Ok(count)
    }

    /// Save a link, then refresh the link list
    pub async fn add_link(&self, url: &str, title: Option<&str>) -> FetchResult<()> {
        let url = url.trim();
        if url::Url::parse(url).is_err() {
            return Err(FetchError::malformed(format!("not a valid URL: {}", url)));
        }

        let mut body = json!({ "url": url });
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            body["title"] = json!(title);
        }

        if let Err(err) = self
            .transport
            .request(&self.endpoints.create_link, Method::Post, Some(body))
            .await
        {
            warn!(kind = err.kind(), "saving link failed: {}", err);
            return Err(err);
        }

        self.load_links().await;
        Ok(())
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn documents(&self) -> FetchState<Vec<NormalizedDocument>> {
        self.documents.snapshot()
    }

    pub fn links(&self) -> FetchState<Vec<NormalizedLink>> {
        self.links.snapshot()
    }

    pub fn logs(&self) -> FetchState<Vec<SearchLogView>> {
        self.logs.snapshot()
    }

    pub fn search_results(&self) -> FetchState<SearchResults> {
        self.search.snapshot()
    }

    pub fn document(&self) -> FetchState<NormalizedDocument> {
        self.detail.snapshot()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            documents: self.documents(),
            links: self.links(),
            logs: self.logs(),
            search: self.search_results(),
        }
    }

    async fn fetch_list<R: DeserializeOwned>(&self, path: &str) -> FetchResult<Vec<R>> {
        let value = self.transport.request(path, Method::Get, None).await?;
        records_from_envelope(value)
    }
}

impl<T: Transport> Drop for ViewSession<T> {
    fn drop(&mut self) {
        self.liveness.teardown();
    }
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// `/documents/search` + `roadmap q3` -> `/documents/search?q=roadmap+q3`
fn with_query(path: &str, query: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}q={}", path, separator, encode_component(query))
}
