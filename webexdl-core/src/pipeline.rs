//! Orchestrates one pipeline run per page session:
//! Watching -> Fired -> Resolving -> {Injected, Aborted}.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::core::events::{EventEmitter, LogEmitter, PipelineState, PipelineUpdate};
use crate::core::messages::{DownloadMessage, FetchRequest, InboundMessage, NO_RESPONSE_SENTINEL};
use crate::error::{PipelineError, PipelineResult};
use crate::models::recording::{PageIdentity, ResolvedDownload, StreamParameters};
use crate::models::settings::WebexSettings;
use crate::page::{DownloadControl, MutationObserver, PageDocument, PageHandle, ReadinessDetector};
use crate::platforms::traits::FetchCollaborator;
use crate::platforms::webex::api::{compose_stream_url, extract_stream_parameters, resolve_download};
use crate::platforms::webex::parser::parse_descriptor_filename;

#[derive(Debug, Default)]
struct SessionContext {
    password: Option<String>,
    api_response: Option<Value>,
    metadata_requested: bool,
}

/// Per-page session context: relayed password and last raw metadata response.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionContext>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionContext> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Entry point for inbound messages. Only `{apiResponse: true}` gets a reply.
    pub fn handle_message(&self, message: InboundMessage) -> Option<Value> {
        if let Some(password) = message.rec_password.as_deref().filter(|p| !p.is_empty()) {
            let mut ctx = self.lock();
            if ctx.metadata_requested {
                tracing::debug!("Password received after the metadata request was sent");
            }
            ctx.password = Some(password.to_string());
        }

        if !message.wants_api_response() {
            return None;
        }
        Some(
            self.api_response()
                .unwrap_or_else(|| Value::from(NO_RESPONSE_SENTINEL)),
        )
    }

    pub fn password(&self) -> Option<String> {
        self.lock().password.clone()
    }

    pub fn api_response(&self) -> Option<Value> {
        self.lock().api_response.clone()
    }

    fn begin_metadata_request(&self) -> Option<String> {
        let mut ctx = self.lock();
        ctx.metadata_requested = true;
        ctx.password.clone()
    }

    fn record_response(&self, response: Value) {
        self.lock().api_response = Some(response);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    Injected,
    AlreadyPresent,
}

pub struct RecordingPipeline<F, P, E = LogEmitter> {
    identity: PageIdentity,
    settings: WebexSettings,
    fetcher: F,
    page: PageHandle<P>,
    session: SessionHandle,
    relay: mpsc::UnboundedSender<DownloadMessage>,
    emitter: E,
    detector: ReadinessDetector,
    state: PipelineState,
    resolved: Option<ResolvedDownload>,
}

impl<F, P, E> RecordingPipeline<F, P, E>
where
    F: FetchCollaborator,
    P: PageDocument,
    E: EventEmitter,
{
    pub fn new(
        identity: PageIdentity,
        settings: WebexSettings,
        fetcher: F,
        page: PageHandle<P>,
        relay: mpsc::UnboundedSender<DownloadMessage>,
        emitter: E,
    ) -> Self {
        let detector = ReadinessDetector::new(&settings.title_class);
        Self {
            identity,
            settings,
            fetcher,
            page,
            session: SessionHandle::new(),
            relay,
            emitter,
            detector,
            state: PipelineState::Watching,
            resolved: None,
        }
    }

    pub fn identity(&self) -> &PageIdentity {
        &self.identity
    }

    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn resolved(&self) -> Option<&ResolvedDownload> {
        self.resolved.as_ref()
    }

    /// Subscribes to page changes. Call before the page starts mounting.
    pub fn attach(&self) -> MutationObserver {
        self.page.observe()
    }

    fn transition(&mut self, state: PipelineState) {
        tracing::info!("[{}] {:?} -> {:?}", self.identity.recording_id, self.state, state);
        self.state = state;
        self.emitter.emit_state(&PipelineUpdate {
            recording_id: self.identity.recording_id.clone(),
            state: self.state.clone(),
        });
    }

    fn abort(&mut self, reason: String) {
        tracing::warn!("[{}] pipeline aborted: {}", self.identity.recording_id, reason);
        self.transition(PipelineState::Aborted { reason });
    }

    /// Runs the pipeline once. Later calls return the settled state untouched.
    pub async fn run(&mut self, observer: MutationObserver) -> PipelineState {
        if self.state != PipelineState::Watching {
            tracing::debug!("Pipeline already left Watching, ignoring run");
            return self.state.clone();
        }

        if !self.detector.wait(&self.page, observer).await {
            self.abort(PipelineError::PageClosed.to_string());
            return self.state.clone();
        }
        self.transition(PipelineState::Fired);
        self.transition(PipelineState::Resolving);

        let (params, filename) = match self.resolve().await {
            Ok(resolved) => resolved,
            Err(e) => {
                self.abort(e.to_string());
                return self.state.clone();
            }
        };

        if self.control_present() {
            self.abort("download control already present".to_string());
            return self.state.clone();
        }

        let outcome = resolve_download(&params, &filename).and_then(|resolved| {
            let outcome = self.inject(&resolved)?;
            self.resolved = Some(resolved);
            Ok(outcome)
        });

        match outcome {
            Ok(InjectOutcome::Injected) => self.transition(PipelineState::Injected),
            Ok(InjectOutcome::AlreadyPresent) => {
                self.abort("download control already present".to_string())
            }
            Err(e) => self.abort(e.to_string()),
        }
        self.state.clone()
    }

    async fn resolve(&self) -> PipelineResult<(StreamParameters, String)> {
        let metadata_url = self.identity.metadata_url();
        let password = self.session.begin_metadata_request();
        tracing::info!(
            "[{}] Requesting recording metadata{}",
            self.identity.recording_id,
            if password.is_some() { " (with password)" } else { "" }
        );

        let response = self
            .fetcher
            .fetch(&FetchRequest::Json {
                url: metadata_url,
                password,
            })
            .await
            .and_then(|reply| reply.into_json())
            .map_err(PipelineError::fetch)?;
        self.session.record_response(response.clone());

        let params = extract_stream_parameters(&response)?;
        let stream_url = compose_stream_url(&params)?;
        tracing::debug!("Stream descriptor: {}", stream_url);

        let descriptor = self
            .fetcher
            .fetch(&FetchRequest::Text {
                url: stream_url.to_string(),
            })
            .await
            .and_then(|reply| reply.into_text())
            .map_err(PipelineError::fetch)?;

        let filename = parse_descriptor_filename(&descriptor)?;
        tracing::debug!("Descriptor filename: {}", filename);
        Ok((params, filename))
    }

    fn control_present(&self) -> bool {
        let marker = &self.settings.control_class;
        self.page.read(|doc| doc.contains_class(marker))
    }

    /// Appends the control unless one is already in the page.
    pub fn inject(&self, resolved: &ResolvedDownload) -> PipelineResult<InjectOutcome> {
        let marker = self.settings.control_class.as_str();
        let container = self.settings.container_class.as_str();
        let control = DownloadControl::new(resolved, marker, self.relay.clone());

        self.page.mutate(|doc| {
            if doc.contains_class(marker) {
                return Ok(InjectOutcome::AlreadyPresent);
            }
            if doc.append_control(container, control) {
                Ok(InjectOutcome::Injected)
            } else {
                Err(PipelineError::ContainerMissing(container.to_string()))
            }
        })
    }
}
