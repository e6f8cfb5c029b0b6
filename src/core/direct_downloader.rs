use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use webexdl_core::core::events::{DownloadProgress, EventEmitter};
use webexdl_core::core::messages::DownloadMessage;
use webexdl_core::platforms::traits::{DownloadCollaborator, DownloadResult};

const CHUNK_TIMEOUT: Duration = Duration::from_secs(45);
const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

struct ProbeResult {
    content_length: Option<u64>,
    accept_ranges: bool,
}

pub async fn download_direct(
    client: &reqwest::Client,
    url: &str,
    output: &Path,
    progress_tx: mpsc::Sender<f64>,
    max_retries: u32,
    cancel: Option<&CancellationToken>,
) -> anyhow::Result<u64> {
    let attempts = max_retries.max(1);
    let mut last_err = None;

    for attempt in 0..attempts {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(anyhow!("Download cancelled"));
            }
        }

        if attempt > 0 {
            let base = 1000 * (attempt as u64);
            let jitter = rand::random::<u64>() % (base / 2 + 1);
            tokio::time::sleep(Duration::from_millis(base + jitter)).await;
        }

        match download_attempt(client, url, output, &progress_tx, cancel).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => {
                if is_fatal_error(&e) {
                    let _ = tokio::fs::remove_file(&part_path_for(output)).await;
                    return Err(e);
                }
                tracing::warn!("[direct] attempt {}/{} failed: {}", attempt + 1, attempts, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("Download failed after {} attempts", attempts)))
}

fn part_path_for(output: &Path) -> PathBuf {
    let mut part = output.as_os_str().to_owned();
    part.push(".part");
    PathBuf::from(part)
}

fn is_fatal_error(err: &anyhow::Error) -> bool {
    let msg = err.to_string();
    for code in &[
        "HTTP 400", "HTTP 401", "HTTP 403", "HTTP 404", "HTTP 405", "HTTP 410", "HTTP 451",
    ] {
        if msg.contains(code) {
            return true;
        }
    }
    msg.contains("HTML instead of media") || msg.contains("cancelled")
}

async fn probe_url(client: &reqwest::Client, url: &str) -> ProbeResult {
    match tokio::time::timeout(PROBE_TIMEOUT, client.head(url).send()).await {
        Ok(Ok(resp)) if resp.status().is_success() => {
            let accept_ranges = resp
                .headers()
                .get("accept-ranges")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.contains("bytes"))
                .unwrap_or(false);
            ProbeResult {
                content_length: resp.content_length(),
                accept_ranges,
            }
        }
        _ => ProbeResult {
            content_length: None,
            accept_ranges: false,
        },
    }
}

async fn download_attempt(
    client: &reqwest::Client,
    url: &str,
    output: &Path,
    progress_tx: &mpsc::Sender<f64>,
    cancel: Option<&CancellationToken>,
) -> anyhow::Result<u64> {
    let part_path = part_path_for(output);
    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let probe = probe_url(client, url).await;
    let existing = match tokio::fs::metadata(&part_path).await {
        Ok(m) if m.len() > 0 && probe.accept_ranges => m.len(),
        _ => 0,
    };

    download_single_stream(client, url, &part_path, existing, probe.content_length, progress_tx, cancel)
        .await?;

    if let Some(expected) = probe.content_length {
        let actual = tokio::fs::metadata(&part_path).await?.len();
        if expected > 0 && actual != expected {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(anyhow!(
                "Size mismatch: expected {} bytes, got {}",
                expected,
                actual
            ));
        }
    }

    tokio::fs::rename(&part_path, output).await?;
    let _ = progress_tx.send(100.0).await;

    Ok(tokio::fs::metadata(output).await?.len())
}

async fn download_single_stream(
    client: &reqwest::Client,
    url: &str,
    part_path: &Path,
    existing_bytes: u64,
    total_size: Option<u64>,
    progress_tx: &mpsc::Sender<f64>,
    cancel: Option<&CancellationToken>,
) -> anyhow::Result<()> {
    let mut request = client.get(url);

    if existing_bytes > 0 {
        if let Some(total) = total_size {
            if existing_bytes >= total {
                return Ok(());
            }
        }
        request = request.header("Range", format!("bytes={}-", existing_bytes));
    }

    let response = request.send().await?;

    let mut offset = 0u64;
    if existing_bytes > 0 {
        if response.status() == reqwest::StatusCode::PARTIAL_CONTENT {
            offset = existing_bytes;
        } else if response.status() == reqwest::StatusCode::RANGE_NOT_SATISFIABLE {
            let _ = tokio::fs::remove_file(part_path).await;
            return Err(anyhow!("Range not satisfiable, restarting"));
        } else if !response.status().is_success() {
            return Err(anyhow!("HTTP {} downloading {}", response.status().as_u16(), url));
        }
    } else if !response.status().is_success() {
        return Err(anyhow!("HTTP {} downloading {}", response.status().as_u16(), url));
    }

    if let Some(ct) = response.headers().get("content-type") {
        if ct.to_str().map(|s| s.contains("text/html")).unwrap_or(false) {
            return Err(anyhow!(
                "Server returned HTML instead of media, the link may have expired"
            ));
        }
    }

    let file = if offset > 0 {
        tokio::fs::OpenOptions::new().append(true).open(part_path).await?
    } else {
        tokio::fs::File::create(part_path).await?
    };

    let mut file = tokio::io::BufWriter::with_capacity(256 * 1024, file);
    let mut downloaded = offset;
    let mut stream = response.bytes_stream();

    loop {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                file.flush().await?;
                return Err(anyhow!("Download cancelled"));
            }
        }

        match tokio::time::timeout(CHUNK_TIMEOUT, stream.next()).await {
            Ok(Some(Ok(chunk))) => {
                file.write_all(&chunk)
                    .await
                    .map_err(|e| anyhow!("Write error (disk full?): {}", e))?;
                downloaded += chunk.len() as u64;

                let percent = match total_size {
                    Some(total) if total > 0 => (downloaded as f64 / total as f64) * 100.0,
                    _ => ((downloaded as f64 / (downloaded as f64 + 500_000.0)) * 100.0).min(95.0),
                };
                let _ = progress_tx.send(percent.min(99.9)).await;
            }
            Ok(Some(Err(e))) => {
                file.flush().await?;
                return Err(anyhow!("Download stream error: {}", e));
            }
            Ok(None) => break,
            Err(_) => {
                file.flush().await?;
                return Err(anyhow!(
                    "Download timeout, no data received for {} seconds",
                    CHUNK_TIMEOUT.as_secs()
                ));
            }
        }
    }

    file.flush().await?;
    Ok(())
}

pub struct DirectDownloader<E> {
    client: reqwest::Client,
    output_dir: PathBuf,
    skip_existing: bool,
    max_retries: u32,
    cancel: CancellationToken,
    emitter: E,
}

impl<E: EventEmitter> DirectDownloader<E> {
    pub fn new(
        client: reqwest::Client,
        output_dir: PathBuf,
        skip_existing: bool,
        max_retries: u32,
        cancel: CancellationToken,
        emitter: E,
    ) -> Self {
        Self {
            client,
            output_dir,
            skip_existing,
            max_retries,
            cancel,
            emitter,
        }
    }

    pub fn output_path(&self, savepath: &str) -> PathBuf {
        let mut name = sanitize_filename::sanitize(savepath);
        if name.is_empty() {
            name = "recording.mp4".to_string();
        }
        self.output_dir.join(name)
    }
}

#[async_trait]
impl<E: EventEmitter> DownloadCollaborator for DirectDownloader<E> {
    async fn download(&self, message: &DownloadMessage) -> anyhow::Result<DownloadResult> {
        let output = self.output_path(&message.savepath);

        if self.skip_existing {
            if let Ok(meta) = tokio::fs::metadata(&output).await {
                if meta.len() > 0 {
                    tracing::info!("Skipping existing file {}", output.display());
                    return Ok(DownloadResult {
                        file_path: output,
                        file_size_bytes: meta.len(),
                    });
                }
            }
        }

        tracing::info!("Downloading to {}", output.display());

        let (tx, mut rx) = mpsc::channel::<f64>(64);
        let emitter = self.emitter.clone();
        let savepath = message.savepath.clone();
        let forward = tokio::spawn(async move {
            while let Some(percent) = rx.recv().await {
                emitter.emit_progress(&DownloadProgress {
                    savepath: savepath.clone(),
                    percent,
                });
            }
        });

        let result = download_direct(
            &self.client,
            &message.download_url,
            &output,
            tx,
            self.max_retries,
            Some(&self.cancel),
        )
        .await;
        let _ = forward.await;

        let bytes = result?;
        Ok(DownloadResult {
            file_path: output,
            file_size_bytes: bytes,
        })
    }
}
