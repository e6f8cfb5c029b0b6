use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use webexdl_core::core::events::PipelineState;
use webexdl_core::models::settings::AppSettings;
use webexdl_core::page::{Activation, PageDocument};
use webexdl_core::platforms::traits::DownloadCollaborator;

use super::{resolve_page, PageArgs};
use crate::core::direct_downloader::DirectDownloader;
use crate::core::events::ConsoleEmitter;
use crate::core::http_client::build_client;

/// Resolve a recording and save it to disk.
#[derive(Parser, Clone, Debug)]
pub struct DownloadCommand {
    #[command(flatten)]
    pub page: PageArgs,

    /// Directory to save into. Defaults to the configured download directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Download again even if the file already exists.
    #[arg(long)]
    pub force: bool,
}

impl DownloadCommand {
    pub async fn run(self, settings: &AppSettings) -> anyhow::Result<()> {
        let emitter = ConsoleEmitter::default();
        let (relay, mut downloads) = mpsc::unbounded_channel();
        let resolution = resolve_page(settings, &self.page, relay, emitter.clone()).await?;

        if let PipelineState::Aborted { reason } = &resolution.state {
            anyhow::bail!("{}", reason);
        }

        let activated = resolution.page.read(|doc| {
            doc.controls()
                .first()
                .map(|control| control.activate(Activation::Pointer))
                .unwrap_or(false)
        });
        if !activated {
            return Err(anyhow!("No download control in page"));
        }
        let message = downloads
            .recv()
            .await
            .ok_or_else(|| anyhow!("Download control relayed nothing"))?;

        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling download");
                ctrl_c.cancel();
            }
        });

        let downloader = DirectDownloader::new(
            build_client(settings)?,
            self.output
                .unwrap_or_else(|| settings.download.default_output_dir.clone()),
            settings.download.skip_existing && !self.force,
            settings.advanced.max_retries,
            cancel,
            emitter,
        );

        let result = downloader.download(&message).await?;
        println!(
            "{} ({} bytes)",
            result.file_path.display(),
            result.file_size_bytes
        );
        Ok(())
    }
}
