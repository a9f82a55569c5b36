//! Backend transport - the one seam between the view layer and the network
//!
//! [`Transport`] is injected into the orchestrator so tests can script
//! responses. [`HttpTransport`] is the real thing: blocking `ureq` calls run
//! on tokio's blocking pool.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{FetchError, FetchResult};

// ============================================================================
// Transport Trait
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Asynchronous JSON request/response against the backend
pub trait Transport: Send + Sync + 'static {
    /// Send a request to `path` (relative to the base URL) and decode the JSON body
    fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
    ) -> impl Future<Output = FetchResult<Value>> + Send;

    /// Send a multipart form to `path` and decode the JSON body
    fn upload_request(
        &self,
        path: &str,
        form: UploadForm,
    ) -> impl Future<Output = FetchResult<Value>> + Send;
}

// ============================================================================
// Multipart Forms
// ============================================================================

/// One file part of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Content type is guessed from the file name
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// multipart/form-data body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    fields: Vec<(String, String)>,
    files: Vec<(String, UploadFile)>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: UploadFile) -> Self {
        self.files.push((name.into(), file));
        self
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(_, f)| f.file_name.as_str())
    }

    pub fn content_type(boundary: &str) -> String {
        format!("multipart/form-data; boundary={}", boundary)
    }

    pub fn encode(&self, boundary: &str) -> Vec<u8> {
        let mut body = Vec::new();

        for (name, value) in &self.fields {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    escape_quoted(name)
                )
                .as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }

        for (name, file) in &self.files {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    escape_quoted(name),
                    escape_quoted(&file.file_name)
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes());
            body.extend_from_slice(&file.bytes);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        body
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

// ============================================================================
// Response Envelopes
// ============================================================================

/// A list response: a bare array or `{ "data": [...] }`
pub fn records_from_envelope<R: DeserializeOwned>(value: Value) -> FetchResult<Vec<R>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(FetchError::malformed(
                    "expected an array or an object with a `data` array",
                ))
            }
        },
        other => {
            return Err(FetchError::malformed(format!(
                "expected an array, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_object() {
            warn!("skipping non-object record ({})", json_kind(&item));
            continue;
        }
        records.push(serde_json::from_value(item)?);
    }
    Ok(records)
}

/// A single-record response: an object or `{ "data": {...} }`
pub fn record_from_envelope<R: DeserializeOwned>(value: Value) -> FetchResult<R> {
    match value {
        Value::Object(mut object) => {
            let record = match object.remove("data") {
                Some(data @ Value::Object(_)) => data,
                Some(other) => {
                    object.insert("data".to_string(), other);
                    Value::Object(object)
                }
                None => Value::Object(object),
            };
            Ok(serde_json::from_value(record)?)
        }
        other => Err(FetchError::malformed(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// HTTP Transport (ureq)
// ============================================================================

/// Transport over HTTP; base URL and timeout come from `[backend]`
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: builder.build(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    async fn request(&self, path: &str, method: Method, body: Option<Value>) -> FetchResult<Value> {
        let agent = self.agent.clone();
        let url = self.url(path);
        debug!("{} {}", method.as_str(), url);

        tokio::task::spawn_blocking(move || {
            let request = agent
                .request(method.as_str(), &url)
                .set("Accept", "application/json");
            let response = match body {
                Some(body) => request.send_json(body),
                None => request.call(),
            };
            read_json(response)
        })
        .await
        .map_err(|e| FetchError::Network(format!("request task failed: {}", e)))?
    }

    async fn upload_request(&self, path: &str, form: UploadForm) -> FetchResult<Value> {
        let agent = self.agent.clone();
        let url = self.url(path);
        debug!("POST {} ({} file(s))", url, form.file_count());

        tokio::task::spawn_blocking(move || {
            let boundary = format!("----knowledge-lens-{}", uuid::Uuid::new_v4().simple());
            let body = form.encode(&boundary);
            let response = agent
                .post(&url)
                .set("Accept", "application/json")
                .set("Content-Type", &UploadForm::content_type(&boundary))
                .send_bytes(&body);
            read_json(response)
        })
        .await
        .map_err(|e| FetchError::Network(format!("upload task failed: {}", e)))?
    }
}

fn read_json(response: Result<ureq::Response, ureq::Error>) -> FetchResult<Value> {
    match response {
        Ok(response) => {
            let text = response
                .into_string()
                .map_err(|e| FetchError::Network(format!("failed to read body: {}", e)))?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text).map_err(|e| FetchError::malformed(e.to_string()))
        }
        Err(ureq::Error::Status(status, response)) => {
            let text = response.into_string().unwrap_or_default();
            Err(FetchError::Status {
                status,
                message: error_message(&text),
            })
        }
        Err(ureq::Error::Transport(transport)) => Err(FetchError::Network(transport.to_string())),
    }
}

/// Prefer the backend's `message`/`error` field over the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawDocumentRecord;
    use serde_json::json;

    #[test]
    fn test_bare_array_and_data_envelope() {
        let bare: Vec<RawDocumentRecord> =
            records_from_envelope(json!([{ "id": "1" }, { "id": "2" }])).unwrap();
        let wrapped: Vec<RawDocumentRecord> =
            records_from_envelope(json!({ "data": [{ "id": "1" }, { "id": "2" }] })).unwrap();

        assert_eq!(bare, wrapped);
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn test_non_list_is_malformed() {
        let err = records_from_envelope::<RawDocumentRecord>(json!({ "items": [] })).unwrap_err();
        assert_eq!(err.kind(), "malformed");

        let err = records_from_envelope::<RawDocumentRecord>(json!("oops")).unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn test_non_object_elements_skipped() {
        let records: Vec<RawDocumentRecord> =
            records_from_envelope(json!([{ "id": "1" }, 42, null])).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_single_record_envelopes() {
        let plain: RawDocumentRecord = record_from_envelope(json!({ "id": "9", "title": "T" })).unwrap();
        let wrapped: RawDocumentRecord =
            record_from_envelope(json!({ "data": { "id": "9", "title": "T" } })).unwrap();
        assert_eq!(plain, wrapped);

        assert!(record_from_envelope::<RawDocumentRecord>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_multipart_encoding() {
        let form = UploadForm::new()
            .text("folder", "specs")
            .file("files", UploadFile::new("notes.pdf", b"%PDF".to_vec()));

        let body = String::from_utf8(form.encode("XYZ")).unwrap();

        assert!(body.starts_with("--XYZ\r\nContent-Disposition: form-data; name=\"folder\"\r\n\r\nspecs\r\n"));
        assert!(body.contains("name=\"files\"; filename=\"notes.pdf\"\r\nContent-Type: application/pdf\r\n\r\n%PDF\r\n"));
        assert!(body.ends_with("--XYZ--\r\n"));
        assert_eq!(UploadForm::content_type("XYZ"), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let file = UploadFile::new("blob.zzzunknown", vec![0, 1]);
        assert_eq!(file.content_type, "application/octet-stream");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"not found"}"#), "not found");
        assert_eq!(error_message(r#"{"error":"bad query"}"#), "bad query");
        assert_eq!(error_message("  plain text \n"), "plain text");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let transport = HttpTransport::new("http://localhost:8000/", None);
        assert_eq!(transport.url("/documents"), "http://localhost:8000/documents");
    }
}
