use crate::config::BarklensConfig;
use crate::error::{AnalyzeError, extract_api_error};
use crate::report::BreedReport;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tokio::task::JoinHandle;

/// A photo handed to the session for analysis.
pub struct PhotoUpload {
    /// Raw image bytes, sent to the service as-is. No type or size check
    /// is applied here; the producer guarantees whatever it guarantees.
    pub bytes: Vec<u8>,
    /// File name attached to the multipart field, when known.
    pub file_name: Option<String>,
    /// MIME type attached to the multipart field, when known.
    pub content_type: Option<String>,
    /// Display-only reference to a local preview of the photo. Retained
    /// for the presentation layer, never transmitted.
    pub preview: Option<String>,
}

/// Represents the current state of an analysis session.
///
/// `Analyzing` is mutually exclusive with a retained result or error:
/// submitting clears any previous `Succeeded`/`Failed` payload before the
/// network call begins.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisState {
    /// No analysis has been requested yet.
    Idle,
    /// An analysis request is in flight.
    Analyzing,
    /// The last analysis completed with a report.
    Succeeded(BreedReport),
    /// The last analysis failed with a user-facing message.
    Failed(String),
}

impl AnalysisState {
    /// Returns the state as a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Analyzing => "analyzing",
            AnalysisState::Succeeded(_) => "succeeded",
            AnalysisState::Failed(_) => "failed",
        }
    }

    /// True while a request is in flight.
    pub fn is_analyzing(&self) -> bool {
        matches!(self, AnalysisState::Analyzing)
    }

    /// The report of the last analysis, if it succeeded.
    pub fn report(&self) -> Option<&BreedReport> {
        match self {
            AnalysisState::Succeeded(report) => Some(report),
            _ => None,
        }
    }

    /// The failure message of the last analysis, if it failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

struct SharedInner {
    seq: u64,
    state: AnalysisState,
    preview: Option<String>,
}

struct SessionShared {
    inner: Mutex<SharedInner>,
}

impl SessionShared {
    /// Applies the outcome of the exchange tagged `seq`, unless a newer
    /// submission has superseded it.
    fn resolve(&self, seq: u64, outcome: Result<BreedReport, AnalyzeError>) {
        let mut inner = self.inner.lock().unwrap();
        if seq != inner.seq {
            log::debug!("Discarding stale outcome of analysis request {seq}");
            return;
        }
        inner.state = match outcome {
            Ok(report) => AnalysisState::Succeeded(report),
            Err(error) => {
                log::warn!("Analysis request {seq} failed: {error}");
                log::debug!("Analysis request {seq} failure detail: {error:?}");
                AnalysisState::Failed(error.to_string())
            }
        };
    }
}

/// Client-side analysis session for the breed identification service.
///
/// The session drives one request/response cycle at a time and derives a
/// single coherent [`AnalysisState`] from it. Submissions may overlap: each
/// one is tagged with a sequence number taken while the state transitions
/// to `Analyzing`, the previous in-flight exchange is aborted, and a
/// resolving exchange whose tag is stale discards its outcome. The newest
/// submission therefore always wins, regardless of response arrival order.
///
/// There is no retry and no caching; one session is meant to back one view
/// instance, with the state polled (or cloned out) by the presentation
/// layer.
pub struct BarklensSession {
    client: reqwest::Client,
    endpoint: String,
    request_timeout: Option<Duration>,
    shared: Arc<SessionShared>,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl BarklensSession {
    /// Creates a new session against the configured service.
    pub fn new(config: BarklensConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a new session using a caller-supplied HTTP client, e.g. one
    /// shared across sessions or preconfigured with proxy settings.
    pub fn with_client(client: reqwest::Client, config: BarklensConfig) -> Self {
        Self {
            client,
            endpoint: config.analyze_endpoint(),
            request_timeout: config.request_timeout,
            shared: Arc::new(SessionShared {
                inner: Mutex::new(SharedInner {
                    seq: 0,
                    state: AnalysisState::Idle,
                    preview: None,
                }),
            }),
            inflight: Mutex::new(None),
        }
    }

    /// Submits a photo for analysis.
    ///
    /// Transitions the state to `Analyzing` immediately, clearing any
    /// previous result or error, then runs the network exchange as a
    /// spawned task. When called while a previous submission is still in
    /// flight, the previous exchange is superseded and its eventual
    /// outcome discarded.
    ///
    /// Must be called within a Tokio runtime.
    pub fn submit(&self, upload: PhotoUpload) {
        let seq = {
            let mut inner = self.shared.inner.lock().unwrap();
            inner.seq += 1;
            inner.state = AnalysisState::Analyzing;
            inner.preview = upload.preview.clone();
            inner.seq
        };
        log::debug!("Scheduling analysis request {seq}");

        if let Some(previous) = self.inflight.lock().unwrap().take() {
            log::debug!("Aborting superseded analysis request");
            previous.abort();
        }

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let request_timeout = self.request_timeout;
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let outcome = run_exchange(&client, &endpoint, request_timeout, upload).await;
            log::debug!(
                "Analysis request {seq} settled in {:?}",
                started.elapsed()
            );
            shared.resolve(seq, outcome);
        });
        *self.inflight.lock().unwrap() = Some(handle);
    }

    /// Returns the current state of the session.
    pub fn state(&self) -> AnalysisState {
        self.shared.inner.lock().unwrap().state.clone()
    }

    /// Preview reference of the most recent submission, for the
    /// presentation layer.
    pub fn preview(&self) -> Option<String> {
        self.shared.inner.lock().unwrap().preview.clone()
    }

    /// Aborts the in-flight exchange, if any. The state is left as-is; a
    /// later response can no longer arrive.
    pub fn stop(&mut self) {
        if let Some(handle) = self.inflight.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for BarklensSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs one multipart POST against the analysis endpoint and maps the
/// response to a report or an [`AnalyzeError`].
async fn run_exchange(
    client: &reqwest::Client,
    endpoint: &str,
    request_timeout: Option<Duration>,
    upload: PhotoUpload,
) -> Result<BreedReport, AnalyzeError> {
    let mut part = Part::bytes(upload.bytes);
    if let Some(file_name) = upload.file_name {
        part = part.file_name(file_name);
    }
    if let Some(content_type) = upload.content_type.as_deref() {
        part = part.mime_str(content_type).map_err(AnalyzeError::Transport)?;
    }
    let form = Form::new().part("file", part);

    let mut request = client.post(endpoint).multipart(form);
    if let Some(timeout) = request_timeout {
        request = request.timeout(timeout);
    }

    let response = request.send().await.map_err(AnalyzeError::Transport)?;
    let status = response.status();

    if !status.is_success() {
        // An error body that is not JSON still produces the status fallback.
        let body = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| serde_json::json!({}));
        let message = extract_api_error(&body)
            .unwrap_or_else(|| format!("AI server error: {}", status.as_u16()));
        return Err(AnalyzeError::Server { status, message });
    }

    let body = response.json::<Value>().await.map_err(AnalyzeError::Decode)?;
    if let Some(message) = extract_api_error(&body) {
        return Err(AnalyzeError::Api(message));
    }

    Ok(BreedReport::from_body(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> PhotoUpload {
        PhotoUpload {
            bytes: b"not really a jpeg".to_vec(),
            file_name: Some("dog.jpg".to_string()),
            content_type: Some("image/jpeg".to_string()),
            preview: Some("blob:dog-preview".to_string()),
        }
    }

    #[test]
    fn state_as_str() {
        assert_eq!(AnalysisState::Idle.as_str(), "idle");
        assert_eq!(AnalysisState::Analyzing.as_str(), "analyzing");
        assert_eq!(
            AnalysisState::Succeeded(BreedReport::default()).as_str(),
            "succeeded"
        );
        assert_eq!(AnalysisState::Failed("nope".to_string()).as_str(), "failed");
    }

    #[test]
    fn state_accessors() {
        let failed = AnalysisState::Failed("nope".to_string());
        assert_eq!(failed.error(), Some("nope"));
        assert!(failed.report().is_none());
        assert!(!failed.is_analyzing());

        let succeeded = AnalysisState::Succeeded(BreedReport::default());
        assert!(succeeded.report().is_some());
        assert!(succeeded.error().is_none());
    }

    #[test]
    fn new_session_starts_idle() {
        let session = BarklensSession::new(BarklensConfig::default());
        assert_eq!(session.state(), AnalysisState::Idle);
        assert!(session.preview().is_none());
    }

    #[tokio::test]
    async fn submit_transitions_to_analyzing_and_retains_preview() {
        // Nothing listens on this address; the request will fail, but the
        // transition to `Analyzing` happens before the exchange starts.
        let session =
            BarklensSession::new(BarklensConfig::with_base_url("http://127.0.0.1:1"));
        session.submit(upload());
        assert_eq!(session.state(), AnalysisState::Analyzing);
        assert_eq!(session.preview(), Some("blob:dog-preview".to_string()));
    }
}
