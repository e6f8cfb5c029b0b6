use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageIdentity {
    pub subdomain: String,
    pub site_name: String,
    pub recording_id: String,
    pub auth_params: Option<String>,
    pub vendor_domain: String,
}

impl PageIdentity {
    pub fn metadata_url(&self) -> String {
        format!(
            "https://{}.{}/webappng/api/v1/recordings/{}/stream{}",
            self.subdomain,
            self.vendor_domain,
            self.recording_id,
            self.auth_params.as_deref().unwrap_or("")
        )
    }
}

/// Flat view of the first metadata response. Every field is an opaque
/// backend string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParameters {
    pub host: String,
    pub recording_dir: String,
    pub timestamp: String,
    pub token: String,
    pub xml_name: String,
    pub playback_option: String,
    pub record_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDownload {
    pub download_url: String,
    pub savename: String,
}
