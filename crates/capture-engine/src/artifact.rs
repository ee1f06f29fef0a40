//! The finished recording.

use std::path::{Path, PathBuf};

use boardcast_common::error::BoardcastResult;
use chrono::{DateTime, Utc};

use crate::recorder::container_type;

/// One encoded recording, assembled from every non-empty chunk the
/// recorder emitted, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingArtifact {
    /// Container type of the blob (codec parameters stripped).
    pub mime_type: String,

    pub bytes: Vec<u8>,

    /// Suggested file name for downloads.
    pub download_name: String,

    /// Number of chunks concatenated into `bytes`.
    pub chunk_count: usize,

    pub created_at: DateTime<Utc>,
}

impl RecordingArtifact {
    /// Concatenate chunks into one artifact. Empty chunks are skipped.
    pub fn from_chunks(
        chunks: impl IntoIterator<Item = Vec<u8>>,
        mime_type: &str,
        download_name: impl Into<String>,
    ) -> Self {
        let mut bytes = Vec::new();
        let mut chunk_count = 0;
        for chunk in chunks.into_iter().filter(|c| !c.is_empty()) {
            bytes.extend_from_slice(&chunk);
            chunk_count += 1;
        }

        Self {
            mime_type: container_type(mime_type).to_string(),
            bytes,
            download_name: download_name.into(),
            chunk_count,
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the artifact into `dir` under its download name.
    pub fn save_in(&self, dir: &Path) -> BoardcastResult<DownloadLink> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.download_name);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), bytes = self.len(), "Recording saved");
        Ok(DownloadLink { path })
    }
}

/// Where a saved recording can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub path: PathBuf,
}

impl DownloadLink {
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_non_empty_chunks_in_order() {
        let artifact = RecordingArtifact::from_chunks(
            vec![b"ab".to_vec(), Vec::new(), b"cd".to_vec()],
            "video/webm;codecs=vp9",
            "boardcast-recording.webm",
        );
        assert_eq!(artifact.bytes, b"abcd");
        assert_eq!(artifact.chunk_count, 2);
        assert_eq!(artifact.mime_type, "video/webm");
    }

    #[test]
    fn no_chunks_yields_empty_artifact() {
        let artifact = RecordingArtifact::from_chunks(Vec::new(), "video/webm", "x.webm");
        assert!(artifact.is_empty());
        assert_eq!(artifact.chunk_count, 0);
    }

    #[test]
    fn save_in_writes_download_name() {
        let dir = std::env::temp_dir().join(format!("boardcast-artifact-{}", std::process::id()));
        let artifact = RecordingArtifact::from_chunks(vec![vec![1, 2, 3]], "video/webm", "rec.webm");

        let link = artifact.save_in(&dir).unwrap();
        assert_eq!(link.path, dir.join("rec.webm"));
        assert_eq!(std::fs::read(&link.path).unwrap(), vec![1, 2, 3]);
        assert!(link.url().starts_with("file://"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
