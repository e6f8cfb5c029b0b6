use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fs_paths::{AppPaths, DesktopPaths};

pub const DEFAULT_VENDOR_DOMAIN: &str = "webex.com";
pub const DEFAULT_TITLE_CLASS: &str = "recordingTitle";
pub const DEFAULT_CONTAINER_CLASS: &str = "recordingHeader";
pub const DEFAULT_CONTROL_CLASS: &str = "icon-download";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub schema_version: u32,
    #[serde(default)]
    pub webex: WebexSettings,
    #[serde(default)]
    pub download: DownloadSettings,
    #[serde(default)]
    pub advanced: AdvancedSettings,
    #[serde(default)]
    pub proxy: ProxySettings,
}

/// Where the recording lives and which page elements the pipeline keys on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebexSettings {
    #[serde(default = "default_vendor_domain")]
    pub vendor_domain: String,
    #[serde(default = "default_title_class")]
    pub title_class: String,
    #[serde(default = "default_container_class")]
    pub container_class: String,
    #[serde(default = "default_control_class")]
    pub control_class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSettings {
    pub default_output_dir: PathBuf,
    #[serde(default = "default_true")]
    pub skip_existing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedSettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxySettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_proxy_type")]
    pub proxy_type: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn default_true() -> bool {
    true
}

fn default_vendor_domain() -> String {
    DEFAULT_VENDOR_DOMAIN.into()
}

fn default_title_class() -> String {
    DEFAULT_TITLE_CLASS.into()
}

fn default_container_class() -> String {
    DEFAULT_CONTAINER_CLASS.into()
}

fn default_control_class() -> String {
    DEFAULT_CONTROL_CLASS.into()
}

fn default_max_retries() -> u32 {
    3
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".into()
}

fn default_proxy_type() -> String {
    "http".into()
}

fn default_proxy_port() -> u16 {
    8080
}

impl Default for WebexSettings {
    fn default() -> Self {
        Self {
            vendor_domain: default_vendor_domain(),
            title_class: default_title_class(),
            container_class: default_container_class(),
            control_class: default_control_class(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            default_output_dir: DesktopPaths.downloads_dir(),
            skip_existing: true,
        }
    }
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: 1,
            webex: WebexSettings::default(),
            download: DownloadSettings::default(),
            advanced: AdvancedSettings::default(),
            proxy: ProxySettings::default(),
        }
    }
}
