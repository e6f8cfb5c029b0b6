use std::path::Path;

use clap::{Parser, Subcommand};

use webexdl_core::models::settings::AppSettings;

use crate::storage::config::{load_settings, save_settings};

/// Inspect or reset the settings file.
#[derive(Parser, Clone, Debug)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum SettingsAction {
    /// Print the effective settings.
    Show,
    /// Print the settings file location.
    Path,
    /// Overwrite the settings file with defaults.
    Reset,
}

impl SettingsCommand {
    pub fn run(self, path: &Path) -> anyhow::Result<()> {
        match self.action {
            SettingsAction::Show => {
                let settings = load_settings(path);
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            SettingsAction::Path => println!("{}", path.display()),
            SettingsAction::Reset => {
                save_settings(path, &AppSettings::default())?;
                tracing::info!("Settings reset at {}", path.display());
            }
        }
        Ok(())
    }
}
