pub mod download;
pub mod resolve;
pub mod settings;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tokio::sync::mpsc;

use webexdl_core::core::events::{EventEmitter, PipelineState};
use webexdl_core::core::messages::{DownloadMessage, InboundMessage};
use webexdl_core::core::url_parser::AddressPattern;
use webexdl_core::models::recording::{PageIdentity, ResolvedDownload};
use webexdl_core::models::settings::AppSettings;
use webexdl_core::page::{MemoryPage, PageHandle};
use webexdl_core::pipeline::{RecordingPipeline, SessionHandle};

use crate::core::html_page::{render_into, PLAYER_SHELL_HTML};
use crate::core::http_client::HttpFetcher;

#[derive(Args, Clone, Debug)]
pub struct PageArgs {
    /// Address of the recording playback page.
    pub url: String,

    /// Recording password, relayed to the metadata request.
    #[arg(short, long)]
    pub password: Option<String>,

    /// Saved copy of the playback page to observe instead of the built-in player shell.
    #[arg(long)]
    pub page_html: Option<PathBuf>,
}

pub struct Resolution {
    pub identity: PageIdentity,
    pub state: PipelineState,
    pub resolved: Option<ResolvedDownload>,
    pub session: SessionHandle,
    pub page: PageHandle<MemoryPage>,
}

/// Runs one pipeline session against the page described by `args`.
pub async fn resolve_page<E: EventEmitter>(
    settings: &AppSettings,
    args: &PageArgs,
    relay: mpsc::UnboundedSender<DownloadMessage>,
    emitter: E,
) -> anyhow::Result<Resolution> {
    let identity = AddressPattern::new(&settings.webex.vendor_domain).parse(&args.url)?;
    tracing::info!(
        "Recording {} on site {} ({})",
        identity.recording_id,
        identity.site_name,
        identity.subdomain
    );

    let html = match &args.page_html {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        None => PLAYER_SHELL_HTML.to_string(),
    };

    let fetcher = HttpFetcher::from_settings(settings)?;
    let page = PageHandle::new(MemoryPage::new());
    let mut pipeline = RecordingPipeline::new(
        identity.clone(),
        settings.webex.clone(),
        fetcher,
        page.clone(),
        relay,
        emitter,
    );

    let session = pipeline.session();
    if let Some(password) = &args.password {
        session.handle_message(InboundMessage::password(password.as_str()));
    }

    let observer = pipeline.attach();
    page.mutate(|doc| render_into(doc, &html));
    // A saved page never changes again.
    page.close();

    let state = pipeline.run(observer).await;
    Ok(Resolution {
        identity,
        state,
        resolved: pipeline.resolved().cloned(),
        session,
        page,
    })
}
