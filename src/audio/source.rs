use crate::error::FetchError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where an asset's encoded bytes come from.
#[derive(Debug, Clone)]
pub enum AudioSource {
    Bytes(Vec<u8>),
    File(PathBuf),
    Url(String),
}

impl AudioSource {
    /// Lower-cased file extension, used as a decoder hint.
    pub fn extension(&self) -> Option<String> {
        let path = match self {
            AudioSource::Bytes(_) => return None,
            AudioSource::File(path) => path.as_path(),
            AudioSource::Url(url) => Path::new(url.split(['?', '#']).next().unwrap_or(url)),
        };
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    pub fn describe(&self) -> String {
        match self {
            AudioSource::Bytes(bytes) => format!("{} in-memory bytes", bytes.len()),
            AudioSource::File(path) => path.display().to_string(),
            AudioSource::Url(url) => url.clone(),
        }
    }

    pub async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let bytes = match self {
            AudioSource::Bytes(bytes) => bytes.clone(),
            AudioSource::File(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| FetchError::File {
                        path: path.display().to_string(),
                        source,
                    })?
            }
            AudioSource::Url(url) => fetch_url(url).await?,
        };

        if bytes.is_empty() {
            return Err(FetchError::Empty);
        }
        debug!("Fetched {} bytes from {}", bytes.len(), self.describe());
        Ok(bytes)
    }
}

async fn fetch_url(url: &str) -> Result<Vec<u8>, FetchError> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}

impl From<Vec<u8>> for AudioSource {
    fn from(bytes: Vec<u8>) -> Self {
        AudioSource::Bytes(bytes)
    }
}

impl From<PathBuf> for AudioSource {
    fn from(path: PathBuf) -> Self {
        AudioSource::File(path)
    }
}
