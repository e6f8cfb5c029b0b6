//! Wire shapes exchanged with the privileged collaborators.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

pub const NO_RESPONSE_SENTINEL: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchRequest {
    Json {
        #[serde(rename = "fetchJson")]
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    Text {
        #[serde(rename = "fetchText")]
        url: String,
    },
}

impl FetchRequest {
    pub fn url(&self) -> &str {
        match self {
            Self::Json { url, .. } | Self::Text { url } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchReply {
    Json(serde_json::Value),
    Text(String),
}

impl FetchReply {
    pub fn into_json(self) -> anyhow::Result<serde_json::Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Text(text) => serde_json::from_str(&text)
                .map_err(|e| anyhow!("Expected a JSON reply: {}", e)),
        }
    }

    pub fn into_text(self) -> anyhow::Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Json(value) => Err(anyhow!("Expected a text reply, got JSON: {}", value)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_response: Option<bool>,
}

impl InboundMessage {
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            rec_password: Some(password.into()),
            ..Self::default()
        }
    }

    pub fn api_query() -> Self {
        Self {
            api_response: Some(true),
            ..Self::default()
        }
    }

    pub fn wants_api_response(&self) -> bool {
        self.api_response == Some(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadMessage {
    #[serde(rename = "downloadURL")]
    pub download_url: String,
    pub savepath: String,
}
