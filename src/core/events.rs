use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use webexdl_core::core::events::{DownloadProgress, EventEmitter, PipelineState, PipelineUpdate};

const NOTHING_DRAWN: u64 = u64::MAX;

#[derive(Clone)]
pub struct ConsoleEmitter {
    // Last whole percent drawn, to avoid redrawing the same value.
    last_percent: Arc<AtomicU64>,
}

impl Default for ConsoleEmitter {
    fn default() -> Self {
        Self {
            last_percent: Arc::new(AtomicU64::new(NOTHING_DRAWN)),
        }
    }
}

impl ConsoleEmitter {
    fn should_draw(&self, whole: u64) -> bool {
        self.last_percent.swap(whole, Ordering::Relaxed) != whole
    }
}

impl EventEmitter for ConsoleEmitter {
    fn emit_state(&self, update: &PipelineUpdate) {
        match &update.state {
            PipelineState::Aborted { reason } => {
                tracing::error!("[{}] no download available: {}", update.recording_id, reason)
            }
            state => tracing::debug!("[{}] {:?}", update.recording_id, state),
        }
    }

    fn emit_progress(&self, progress: &DownloadProgress) {
        let whole = progress.percent.floor() as u64;
        if !self.should_draw(whole) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{} {:>3}%", progress.savepath, whole);
        if whole >= 100 {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}
