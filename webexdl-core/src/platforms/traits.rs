use std::path::PathBuf;

use async_trait::async_trait;

use crate::core::messages::{DownloadMessage, FetchReply, FetchRequest};

#[async_trait]
pub trait FetchCollaborator: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> anyhow::Result<FetchReply>;
}

#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub file_path: PathBuf,
    pub file_size_bytes: u64,
}

/// Receives `{downloadURL, savepath}` when the injected control is activated.
#[async_trait]
pub trait DownloadCollaborator: Send + Sync {
    async fn download(&self, message: &DownloadMessage) -> anyhow::Result<DownloadResult>;
}
