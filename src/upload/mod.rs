//! File intake for uploads.
//!
//! Dropped files and files picked through the browser's file input both
//! arrive as `file` fields of a multipart body; [`Dropzone`] funnels them into
//! one list. It only applies the accept filter. Size and type checks that
//! must hold before anything is stored live in [`validate`].

pub mod cloud;
pub mod progress;

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::config::UploadConfig;
use crate::site::model::MediaKind;
use crate::store::Blob;

pub use self::cloud::CloudUploader;
pub use self::progress::{
    simulate_progress, ProgressIndicator, ProgressState, ProgressTracker, Subscription,
};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{0}")]
    NotConfigured(&'static str),

    #[error("Upload failed: {status}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid upload: {0}")]
    Multipart(String),
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        UploadError::Network(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AcceptRule {
    Any,
    TopLevel(String),
    Exact(String),
}

/// A media-type filter in the syntax of the HTML `accept` attribute,
/// e.g. `image/*,video/*` or `video/mp4`. An empty filter accepts everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accept(Vec<AcceptRule>);

impl Accept {
    pub fn parse(filter: &str) -> Self {
        let rules = filter
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .map(|rule| match rule.split_once('/') {
                Some(("*", "*")) => AcceptRule::Any,
                Some((top, "*")) => AcceptRule::TopLevel(top.to_string()),
                _ => AcceptRule::Exact(rule),
            })
            .collect();
        Self(rules)
    }

    pub fn matches(&self, content_type: &str) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let top = essence.split('/').next().unwrap_or_default();
        self.0.iter().any(|rule| match rule {
            AcceptRule::Any => true,
            AcceptRule::TopLevel(t) => t == top,
            AcceptRule::Exact(e) => *e == essence,
        })
    }

    /// The filter in `accept` attribute form.
    pub fn as_attr(&self) -> String {
        self.0
            .iter()
            .map(|rule| match rule {
                AcceptRule::Any => "*/*".to_string(),
                AcceptRule::TopLevel(t) => format!("{}/*", t),
                AcceptRule::Exact(e) => e.clone(),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn into_blob(self) -> Blob {
        Blob::new(self.content_type, self.data)
    }
}

/// Everything a dropzone form submitted: the admitted files plus any text fields.
#[derive(Debug, Default)]
pub struct Submission {
    pub files: Vec<IncomingFile>,
    pub fields: HashMap<String, String>,
}

impl Submission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(IncomingFile::size).sum()
    }

    pub fn first_file(self) -> Option<IncomingFile> {
        self.files.into_iter().next()
    }
}

#[derive(Debug, Clone)]
pub struct Dropzone {
    accept: Accept,
    multiple: bool,
}

impl Dropzone {
    pub fn new(accept: &str) -> Self {
        Self {
            accept: Accept::parse(accept),
            multiple: false,
        }
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn accept(&self) -> &Accept {
        &self.accept
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Apply the accept filter and single-file mode to a selection.
    pub fn admit(&self, files: Vec<IncomingFile>) -> Vec<IncomingFile> {
        let mut admitted: Vec<IncomingFile> = files
            .into_iter()
            .filter(|f| {
                let ok = self.accept.matches(&f.content_type);
                if !ok {
                    tracing::debug!(
                        content_type = %f.content_type,
                        "Dropzone filter skipped file"
                    );
                }
                ok
            })
            .collect();
        if !self.multiple {
            admitted.truncate(1);
        }
        admitted
    }

    /// Read a multipart body: `file` fields become files, other fields text.
    pub async fn collect(&self, multipart: &mut Multipart) -> Result<Submission, UploadError> {
        let mut files = Vec::new();
        let mut fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .or_else(|| {
                        file_name
                            .as_deref()
                            .and_then(|n| mime_guess::from_path(n).first())
                            .map(|m| m.to_string())
                    })
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| UploadError::Multipart(e.to_string()))?;
                if data.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                    // Browsers send an empty part when the picker was left blank.
                    continue;
                }
                files.push(IncomingFile {
                    file_name,
                    content_type,
                    data,
                });
            } else if !name.is_empty() {
                let text = field
                    .text()
                    .await
                    .map_err(|e| UploadError::Multipart(e.to_string()))?;
                fields.insert(name, text);
            }
        }

        Ok(Submission {
            files: self.admit(files),
            fields,
        })
    }
}

/// Check a file before it is committed to storage.
///
/// With `expected` set, the file must be of that kind; otherwise any image
/// or video passes. Returns the detected kind.
pub fn validate(
    file: &IncomingFile,
    expected: Option<MediaKind>,
    limits: &UploadConfig,
) -> Result<MediaKind, String> {
    let kind = MediaKind::from_content_type(&file.content_type);
    let kind = match (expected, kind) {
        (Some(want), Some(got)) if want == got => got,
        (Some(MediaKind::Video), _) => return Err("Please upload a video file.".into()),
        (Some(MediaKind::Image), _) => return Err("Please upload an image file.".into()),
        (None, Some(got)) => got,
        (None, None) => return Err("Please upload an image or video file.".into()),
    };

    let (limit, limit_mb) = match kind {
        MediaKind::Video => (limits.max_video_bytes(), limits.max_video_mb),
        MediaKind::Image => (limits.max_image_bytes(), limits.max_image_mb),
    };
    if file.size() > limit {
        return Err(format!("File size must be less than {}MB.", limit_mb));
    }
    Ok(kind)
}
