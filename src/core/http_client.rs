use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use webexdl_core::core::messages::{FetchReply, FetchRequest};
use webexdl_core::models::settings::{AppSettings, ProxySettings};
use webexdl_core::platforms::traits::FetchCollaborator;

pub const PASSWORD_HEADER: &str = "accessPwd";

pub fn proxy_url(proxy: &ProxySettings) -> Option<String> {
    if !proxy.enabled || proxy.host.is_empty() {
        return None;
    }
    let scheme = match proxy.proxy_type.as_str() {
        "socks5" => "socks5",
        "https" => "https",
        _ => "http",
    };
    if !proxy.username.is_empty() {
        Some(format!(
            "{}://{}:{}@{}:{}",
            scheme, proxy.username, proxy.password, proxy.host, proxy.port
        ))
    } else {
        Some(format!("{}://{}:{}", scheme, proxy.host, proxy.port))
    }
}

pub fn apply_proxy(
    builder: reqwest::ClientBuilder,
    proxy: &ProxySettings,
) -> reqwest::ClientBuilder {
    let Some(proxy_url) = proxy_url(proxy) else {
        return builder;
    };
    match reqwest::Proxy::all(&proxy_url) {
        Ok(p) => builder.proxy(p),
        Err(e) => {
            tracing::warn!("Invalid proxy URL: {}", e);
            builder
        }
    }
}

pub fn build_client(settings: &AppSettings) -> anyhow::Result<reqwest::Client> {
    let builder = reqwest::Client::builder()
        .user_agent(&settings.advanced.user_agent)
        .cookie_store(true)
        .connect_timeout(Duration::from_secs(settings.advanced.request_timeout_secs));
    Ok(apply_proxy(builder, &settings.proxy).build()?)
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_settings(settings: &AppSettings) -> anyhow::Result<Self> {
        Ok(Self::new(
            build_client(settings)?,
            Duration::from_secs(settings.advanced.request_timeout_secs),
        ))
    }

    async fn get(&self, url: &str, password: Option<&str>) -> anyhow::Result<reqwest::Response> {
        let mut request = self.client.get(url).timeout(self.timeout);
        if let Some(pw) = password {
            request = request.header(PASSWORD_HEADER, pw);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP {} fetching {}", status.as_u16(), url));
        }
        Ok(response)
    }
}

#[async_trait]
impl FetchCollaborator for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> anyhow::Result<FetchReply> {
        match request {
            FetchRequest::Json { url, password } => {
                tracing::debug!("[fetch] json {}", url);
                let value: serde_json::Value = self.get(url, password.as_deref()).await?.json().await?;
                Ok(FetchReply::Json(value))
            }
            FetchRequest::Text { url } => {
                tracing::debug!("[fetch] text {}", url);
                Ok(FetchReply::Text(self.get(url, None).await?.text().await?))
            }
        }
    }
}
