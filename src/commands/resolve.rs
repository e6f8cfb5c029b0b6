use clap::Parser;
use serde::Serialize;
use tokio::sync::mpsc;

use webexdl_core::core::events::PipelineState;
use webexdl_core::core::messages::InboundMessage;
use webexdl_core::models::settings::AppSettings;

use super::{resolve_page, PageArgs};
use crate::core::events::ConsoleEmitter;

/// Resolve the direct download address of a recording.
#[derive(Parser, Clone, Debug)]
pub struct ResolveCommand {
    #[command(flatten)]
    pub page: PageArgs,

    /// Print the raw metadata response, or -1 if none arrived.
    #[arg(long)]
    pub dump_api: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveOutput<'a> {
    recording_id: &'a str,
    #[serde(rename = "downloadURL")]
    download_url: &'a str,
    savename: &'a str,
}

impl ResolveCommand {
    pub async fn run(self, settings: &AppSettings) -> anyhow::Result<()> {
        let (relay, _downloads) = mpsc::unbounded_channel();
        let resolution = resolve_page(settings, &self.page, relay, ConsoleEmitter::default()).await?;

        if self.dump_api {
            let raw = resolution
                .session
                .handle_message(InboundMessage::api_query())
                .unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&raw)?);
        }

        match (resolution.state, resolution.resolved) {
            (PipelineState::Injected, Some(resolved)) => {
                if self.json {
                    let output = ResolveOutput {
                        recording_id: &resolution.identity.recording_id,
                        download_url: &resolved.download_url,
                        savename: &resolved.savename,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    println!("{}", resolved.download_url);
                    println!("{}", resolved.savename);
                }
                Ok(())
            }
            (PipelineState::Aborted { reason }, _) => anyhow::bail!("{}", reason),
            (state, _) => anyhow::bail!("Pipeline ended in unexpected state {:?}", state),
        }
    }
}
