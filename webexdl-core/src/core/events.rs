use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum PipelineState {
    Watching,
    Fired,
    Resolving,
    Aborted { reason: String },
    Injected,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Aborted { .. } | Self::Injected)
    }
}

#[derive(Clone, Serialize)]
pub struct PipelineUpdate {
    pub recording_id: String,
    pub state: PipelineState,
}

#[derive(Clone, Serialize)]
pub struct DownloadProgress {
    pub savepath: String,
    pub percent: f64,
}

pub trait EventEmitter: Send + Sync + Clone + 'static {
    fn emit_state(&self, update: &PipelineUpdate);
    fn emit_progress(&self, progress: &DownloadProgress);
}

#[derive(Clone, Default)]
pub struct LogEmitter;

impl EventEmitter for LogEmitter {
    fn emit_state(&self, update: &PipelineUpdate) {
        tracing::debug!("[{}] state -> {:?}", update.recording_id, update.state);
    }

    fn emit_progress(&self, progress: &DownloadProgress) {
        tracing::trace!("[{}] {:.1}%", progress.savepath, progress.percent);
    }
}
