use std::path::{Path, PathBuf};

use webexdl_core::fs_paths::{AppPaths, DesktopPaths};
use webexdl_core::models::settings::AppSettings;

pub fn default_settings_path() -> PathBuf {
    DesktopPaths.settings_file()
}

pub fn load_settings(path: &Path) -> AppSettings {
    let json = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return AppSettings::default(),
    };

    match serde_json::from_str::<AppSettings>(&json) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Ignoring unreadable settings at {}: {}", path.display(), e);
            AppSettings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("nope.json"));
        assert_eq!(settings.webex.vendor_domain, "webex.com");
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path).schema_version, 1);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = AppSettings::default();
        settings.webex.vendor_domain = "webex.example".into();
        settings.advanced.max_retries = 7;
        save_settings(&path, &settings).unwrap();

        let loaded = load_settings(&path);
        assert_eq!(loaded.webex.vendor_domain, "webex.example");
        assert_eq!(loaded.advanced.max_retries, 7);
    }
}
