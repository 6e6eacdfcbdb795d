//! # Image Ingestion
//!
//! Turns a raw image resource into the base64 string an icon entry embeds.
//!
//! By default any byte sequence is accepted and encoded as-is: the backend
//! decides whether it can draw it. [`Ingestor::validating`] opts into a
//! format check based on the image's magic bytes.
//!
//! ## Example
//!
//! ```no_run
//! use etiket::ingest::{FileSource, Ingestor};
//!
//! # async fn example() -> Result<(), etiket::EtiketError> {
//! let encoded = Ingestor::new().ingest(&FileSource::new("logo.png")).await?;
//! assert!(!encoded.is_empty());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::EtiketError;

/// Anything that can deliver the raw bytes of an image.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Short description for logs and error messages.
    fn describe(&self) -> String;

    /// Read the complete resource.
    async fn read_bytes(&self) -> Result<Vec<u8>, EtiketError>;
}

/// An image file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ImageSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, EtiketError> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            EtiketError::ResourceRead(format!("failed to read {}: {}", self.path.display(), e))
        })
    }
}

/// Bytes already in memory (drag-and-drop, clipboard, tests).
#[derive(Debug, Clone)]
pub struct BytesSource {
    name: String,
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[async_trait]
impl ImageSource for BytesSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, EtiketError> {
        Ok(self.bytes.clone())
    }
}

/// An image downloaded over HTTP(S).
#[derive(Debug, Clone)]
pub struct UrlSource {
    url: String,
    client: reqwest::Client,
}

impl UrlSource {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl ImageSource for UrlSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, EtiketError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| EtiketError::ResourceRead(format!("failed to fetch {}: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(EtiketError::ResourceRead(format!(
                "failed to fetch {}: HTTP {}",
                self.url,
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            EtiketError::ResourceRead(format!("failed to read body of {}: {}", self.url, e))
        })?;
        Ok(bytes.to_vec())
    }
}

/// Pick a source for a user-supplied location: http(s) URLs are
/// downloaded, anything else is treated as a file path.
pub fn source_for(location: &str, client: &reqwest::Client) -> Box<dyn ImageSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(UrlSource::new(location, client.clone()))
    } else {
        Box::new(FileSource::new(location))
    }
}

/// Encodes image resources for embedding in icon entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ingestor {
    validate: bool,
}

impl Ingestor {
    /// Accept any bytes.
    pub fn new() -> Self {
        Self { validate: false }
    }

    /// Reject bytes that no known image format recognises.
    pub fn validating() -> Self {
        Self { validate: true }
    }

    /// Read `source` completely and return its base64 encoding.
    ///
    /// On failure nothing is returned; callers never see partial output.
    pub async fn ingest(&self, source: &dyn ImageSource) -> Result<String, EtiketError> {
        let bytes = source.read_bytes().await?;
        if self.validate {
            check_format(&bytes, &source.describe())?;
        }
        let encoded = STANDARD.encode(&bytes);
        info!(
            source = %source.describe(),
            bytes = bytes.len(),
            "image ingested"
        );
        Ok(encoded)
    }

    /// Accept a `data:` URL (or a bare base64 string) and return the payload.
    ///
    /// Everything up to the first comma is dropped; the rest is used verbatim.
    pub fn ingest_data_url(&self, data_url: &str) -> Result<String, EtiketError> {
        let payload = match data_url.split_once(',') {
            Some((header, rest)) if header.starts_with("data:") => rest,
            _ => data_url,
        }
        .trim();

        if self.validate {
            let bytes = STANDARD.decode(payload).map_err(|e| {
                EtiketError::ResourceRead(format!("data URL is not valid base64: {}", e))
            })?;
            check_format(&bytes, "data URL")?;
        }
        debug!(len = payload.len(), "data URL ingested");
        Ok(payload.to_string())
    }
}

fn check_format(bytes: &[u8], what: &str) -> Result<(), EtiketError> {
    image::guess_format(bytes)
        .map(|format| debug!(?format, source = what, "image format recognised"))
        .map_err(|_| EtiketError::ResourceRead(format!("{}: unrecognised image format", what)))
}
