//! Download sinks: where a finished export ends up

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::export::ExportData;
use crate::utils::fs::ensure_dir_exists;

/// A file ready to be saved
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub mime_type: String,
    pub data: ExportData,
}

/// Where and how much was saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub location: PathBuf,
    pub bytes: u64,
}

/// Trait for saving downloaded exports
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Save one download
    ///
    /// # Arguments
    /// * `download` - File name, MIME type and payload
    ///
    /// # Returns
    /// * `Result<SavedFile>` - Saved location or error
    async fn save(&self, download: &Download) -> Result<SavedFile>;
}

/// Saves downloads into a directory
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    output_dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path for a suggested file name.
    ///
    /// Only the final component of the suggested name is kept, so a name can
    /// never point outside the output directory.
    pub fn target_path(&self, filename: &str) -> Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                ClientError::DownloadFailed(format!("Invalid file name: {}", filename))
            })?;
        Ok(self.output_dir.join(name))
    }
}

#[async_trait]
impl DownloadSink for FileDownloadSink {
    async fn save(&self, download: &Download) -> Result<SavedFile> {
        let path = self.target_path(&download.filename)?;
        ensure_dir_exists(&self.output_dir)?;

        let bytes = download.data.as_bytes();
        tokio::fs::write(&path, bytes).await.map_err(|err| {
            ClientError::DownloadFailed(format!("{}: {}", path.display(), err))
        })?;

        debug!(
            "Saved {} ({}, {} bytes)",
            path.display(),
            download.mime_type,
            bytes.len()
        );

        Ok(SavedFile {
            location: path,
            bytes: bytes.len() as u64,
        })
    }
}
