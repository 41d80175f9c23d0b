//! Publishing media to a remote upload endpoint.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use reqwest::multipart::{Form, Part};
use url::Url;

use super::{IncomingFile, UploadError};
use crate::config::CloudConfig;

const CHUNK_SIZE: usize = 64 * 1024;

/// Client for the configured cloud endpoint.
///
/// Construction never fails. A missing or unparseable endpoint or token is
/// reported by [`CloudUploader::upload`] before any network activity.
#[derive(Clone)]
pub struct CloudUploader {
    client: reqwest::Client,
    endpoint: Option<Url>,
    token: Option<String>,
}

impl CloudUploader {
    pub fn new(config: &CloudConfig) -> Self {
        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .and_then(|e| match Url::parse(e) {
                Ok(url) => Some(url),
                Err(err) => {
                    tracing::warn!(endpoint = %e, "Ignoring invalid cloud endpoint: {}", err);
                    None
                }
            });
        let token = config.token.clone().filter(|t| !t.trim().is_empty());
        Self {
            client: reqwest::Client::new(),
            endpoint,
            token,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.token.is_some()
    }

    /// POST `file` as multipart field `file` with a bearer token.
    ///
    /// `on_progress` receives whole percentages of the body handed to the
    /// transport. They never decrease, and a successful upload always ends
    /// with 100. A 2xx response body is parsed as JSON; a body that is not
    /// JSON comes back as `{"ok": true, "response": <text>}`.
    pub async fn upload<F>(
        &self,
        file: IncomingFile,
        on_progress: F,
    ) -> Result<serde_json::Value, UploadError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let (Some(endpoint), Some(token)) = (self.endpoint.as_ref(), self.token.as_deref()) else {
            return Err(UploadError::NotConfigured("Missing cloud endpoint or token"));
        };

        let total = file.data.len() as u64;
        let last = Arc::new(AtomicU8::new(0));
        let on_progress = Arc::new(on_progress);

        let body = {
            let last = last.clone();
            let on_progress = on_progress.clone();
            let chunks = split_chunks(file.data.clone());
            let mut sent = 0u64;
            stream::iter(chunks.into_iter().map(move |chunk| {
                sent += chunk.len() as u64;
                let percent = if total == 0 {
                    100
                } else {
                    (sent * 100 / total) as u8
                };
                if percent > last.load(Ordering::SeqCst) {
                    last.store(percent, Ordering::SeqCst);
                    on_progress(percent);
                }
                Ok::<Bytes, std::io::Error>(chunk)
            }))
        };

        let mut part = Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(file.file_name.clone().unwrap_or_else(|| "upload".to_string()));
        part = part
            .mime_str(&file.content_type)
            .map_err(|e| UploadError::Multipart(format!("invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        tracing::debug!(endpoint = %endpoint, bytes = total, "Uploading to cloud");
        let response = self
            .client
            .post(endpoint.clone())
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await;
        if !status.is_success() {
            let text = text.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Cloud upload rejected");
            return Err(UploadError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        let text = text?;

        if last.swap(100, Ordering::SeqCst) < 100 {
            on_progress(100);
        }

        Ok(serde_json::from_str(&text)
            .unwrap_or_else(|_| serde_json::json!({ "ok": true, "response": text })))
    }
}

fn split_chunks(data: Bytes) -> Vec<Bytes> {
    if data.is_empty() {
        return vec![Bytes::new()];
    }
    let mut chunks = Vec::with_capacity(data.len() / CHUNK_SIZE + 1);
    let mut offset = 0;
    while offset < data.len() {
        let end = (offset + CHUNK_SIZE).min(data.len());
        chunks.push(data.slice(offset..end));
        offset = end;
    }
    chunks
}
