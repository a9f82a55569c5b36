//! Session behaviour against a scripted backend with controlled latency

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};

use knowledge_lens::config::EndpointConfig;
use knowledge_lens::fetch::{Completion, Method, Transport, UploadForm, ViewSession};
use knowledge_lens::{FetchError, FetchResult, Normalizer};

#[derive(Clone)]
struct Reply {
    delay: Duration,
    body: FetchResult<Value>,
}

fn ok(delay_ms: u64, body: Value) -> Reply {
    Reply {
        delay: Duration::from_millis(delay_ms),
        body: Ok(body),
    }
}

fn fail(delay_ms: u64, err: FetchError) -> Reply {
    Reply {
        delay: Duration::from_millis(delay_ms),
        body: Err(err),
    }
}

/// Replies are consumed in order per path; the last one repeats
#[derive(Default)]
struct ScriptedBackend {
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
}

impl ScriptedBackend {
    fn on(self, path: &str, reply: Reply) -> Self {
        self.script
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    fn next_reply(&self, path: &str) -> Reply {
        let mut script = self.script.lock();
        match script.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => fail(0, FetchError::Status { status: 404, message: path.to_string() }),
        }
    }
}

impl Transport for ScriptedBackend {
    async fn request(&self, path: &str, _method: Method, _body: Option<Value>) -> FetchResult<Value> {
        let reply = self.next_reply(path);
        tokio::time::sleep(reply.delay).await;
        reply.body
    }

    async fn upload_request(&self, path: &str, _form: UploadForm) -> FetchResult<Value> {
        let reply = self.next_reply(path);
        tokio::time::sleep(reply.delay).await;
        reply.body
    }
}

fn session(backend: ScriptedBackend) -> Arc<ViewSession<ScriptedBackend>> {
    Arc::new(ViewSession::new(
        Arc::new(backend),
        EndpointConfig::default(),
        Normalizer::default(),
    ))
}

fn library() -> Value {
    json!([
        { "id": "1", "title": "Q4 Product Roadmap 2024", "source": "application/pdf", "fileSize": 2450000 },
        { "id": "2", "title": "Security Policies", "source": "application/msword" }
    ])
}

#[tokio::test(start_paused = true)]
async fn logs_failure_does_not_affect_search() {
    let backend = ScriptedBackend::default()
        .on("/documents", ok(20, library()))
        .on("/links", ok(30, json!([])))
        .on("/search-logs", fail(5, FetchError::Network("connection reset".into())))
        .on("/documents/search?q=roadmap", ok(40, json!([{ "id": "1", "title": "Q4 Product Roadmap 2024" }])))
        .on("/links/search?q=roadmap", ok(10, json!({ "data": [] })));
    let view = session(backend);

    view.activate(Some("roadmap")).await;

    let logs = view.logs();
    assert!(logs.is_error());
    assert!(logs.items().is_empty());

    let search = view.search_results();
    let results = search.value().expect("search should succeed");
    assert_eq!(results.len(), 1);
    assert_eq!(results.items[0].title(), "Q4 Product Roadmap 2024");
    assert_eq!(view.documents().items().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn late_older_search_does_not_overwrite_newer() {
    let backend = ScriptedBackend::default()
        .on("/documents/search?q=slow", ok(500, json!([{ "id": "old", "title": "Old result" }])))
        .on("/links/search?q=slow", ok(500, json!([])))
        .on("/documents/search?q=fast", ok(10, json!([{ "id": "new", "title": "New result" }])))
        .on("/links/search?q=fast", ok(10, json!([])));
    let view = session(backend);

    let (first, second) = tokio::join!(view.search("slow"), view.search("fast"));

    assert_eq!(first, Completion::Superseded);
    assert_eq!(second, Completion::Applied);

    let state = view.search_results();
    let results = state.value().unwrap();
    assert_eq!(results.query, "fast");
    assert_eq!(results.items[0].id(), "new");
}

#[tokio::test(start_paused = true)]
async fn spawned_search_writes_back() {
    let backend = ScriptedBackend::default()
        .on("/documents/search?q=api", ok(50, json!([{ "id": "d" }])))
        .on("/links/search?q=api", ok(50, json!([{ "id": "l", "url": "https://api.example.com" }])));
    let view = session(backend);

    let handle = view.spawn_search("api");
    assert_eq!(handle.await.unwrap(), Completion::Applied);
    assert_eq!(view.search_results().value().map(|r| r.len()), Some(2));
}

#[tokio::test(start_paused = true)]
async fn results_after_teardown_are_discarded() {
    let backend = ScriptedBackend::default().on("/documents", ok(100, library()));
    let view = session(backend);

    let pending = {
        let view = Arc::clone(&view);
        tokio::spawn(async move { view.load_documents().await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    view.teardown();

    assert_eq!(pending.await.unwrap(), Completion::Detached);
    assert!(view.documents().is_loading());
    assert!(view.documents().items().is_empty());
}

#[tokio::test(start_paused = true)]
async fn error_empties_previously_loaded_collection() {
    let backend = ScriptedBackend::default()
        .on("/documents", ok(5, library()))
        .on("/documents", fail(5, FetchError::Status { status: 500, message: "boom".into() }));
    let view = session(backend);

    view.load_documents().await;
    assert_eq!(view.documents().items().len(), 2);

    view.load_documents().await;
    let state = view.documents();
    assert!(state.items().is_empty());
    assert_eq!(state.error(), Some("backend returned status 500: boom"));
}

#[tokio::test(start_paused = true)]
async fn slow_section_does_not_block_others() {
    let backend = ScriptedBackend::default()
        .on("/documents", ok(5, library()))
        .on("/links", ok(60_000, json!([])))
        .on("/search-logs", ok(5, json!([])));
    let view = session(backend);

    let loading = {
        let view = Arc::clone(&view);
        tokio::spawn(async move { view.activate(None).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(view.documents().is_success());
    assert!(view.logs().is_success());
    assert!(view.links().is_loading());

    loading.await.unwrap();
    assert!(view.links().is_success());
}
