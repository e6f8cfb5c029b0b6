use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub mod commands;
pub mod core;
pub mod storage;

#[derive(Parser, Debug)]
#[command(name = "webexdl", version, about = "Resolve and download Webex meeting recordings")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Resolve(commands::resolve::ResolveCommand),
    Download(commands::download::DownloadCommand),
    Settings(commands::settings::SettingsCommand),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(storage::config::default_settings_path);
    let settings = storage::config::load_settings(&settings_path);

    // The pipeline is single-threaded and cooperative.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match cli.command {
            Command::Resolve(cmd) => cmd.run(&settings).await,
            Command::Download(cmd) => cmd.run(&settings).await,
            Command::Settings(cmd) => cmd.run(&settings_path),
        }
    })
}
