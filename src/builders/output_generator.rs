// Output generator - publishes cards.json and sets.json together or not at all
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::classes::{Card, SetInfo};
use crate::error::{ExportError, ExportResult};

pub const CARDS_FILE_NAME: &str = "cards.json";
pub const SETS_FILE_NAME: &str = "sets.json";
pub const TEMP_SUFFIX: &str = ".tmp";

/// Filesystem primitives the generator publishes through
#[async_trait]
pub trait FileOps: Send + Sync {
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    /// Create or truncate `path` and durably write `bytes`
    async fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
    /// Atomically replace `to` with `from`
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    async fn remove_file(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileOps;

#[async_trait]
impl FileOps for TokioFileOps {
    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::rename(from, to).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// Where the artifacts were published, with the SHA-256 of each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifacts {
    pub cards_path: PathBuf,
    pub sets_path: PathBuf,
    pub cards_sha256: String,
    pub sets_sha256: String,
}

#[derive(Debug, Clone)]
pub struct OutputGenerator<O = TokioFileOps> {
    output_dir: PathBuf,
    ops: O,
}

impl OutputGenerator<TokioFileOps> {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_file_ops(output_dir, TokioFileOps)
    }
}

impl<O: FileOps> OutputGenerator<O> {
    pub fn with_file_ops(output_dir: impl Into<PathBuf>, ops: O) -> Self {
        Self {
            output_dir: output_dir.into(),
            ops,
        }
    }

    pub fn cards_path(&self) -> PathBuf {
        self.output_dir.join(CARDS_FILE_NAME)
    }

    pub fn sets_path(&self) -> PathBuf {
        self.output_dir.join(SETS_FILE_NAME)
    }

    /// Publish both collections as pretty-printed JSON.
    ///
    /// Both documents are staged as `.tmp` siblings first and only renamed into
    /// place once both are fully written. On any failure the staged files are
    /// removed and the published files keep their previous content (or stay
    /// absent).
    pub async fn write_all(&self, cards: &[Card], sets: &[SetInfo]) -> ExportResult<PublishedArtifacts> {
        self.ops
            .create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ExportError::persistence(&self.output_dir, e))?;

        let cards_bytes = to_pretty_json(cards)?;
        let sets_bytes = to_pretty_json(sets)?;

        let cards_path = self.cards_path();
        let sets_path = self.sets_path();
        let cards_temp = temp_path(&cards_path);
        let sets_temp = temp_path(&sets_path);

        let mut staged: Vec<&Path> = Vec::with_capacity(2);
        for (temp, bytes) in [(&cards_temp, &cards_bytes), (&sets_temp, &sets_bytes)] {
            // Registered before writing: a failed write may still leave a partial file
            staged.push(temp.as_path());
            if let Err(e) = self.ops.write(temp, bytes).await {
                self.discard(&staged).await;
                return Err(ExportError::persistence(temp.as_path(), e));
            }
        }

        let previous_cards = match self.ops.read(&cards_path).await {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                self.discard(&staged).await;
                return Err(ExportError::persistence(&cards_path, e));
            }
        };

        if let Err(e) = self.ops.rename(&cards_temp, &cards_path).await {
            self.discard(&staged).await;
            return Err(ExportError::persistence(&cards_path, e));
        }

        if let Err(e) = self.ops.rename(&sets_temp, &sets_path).await {
            self.discard(&[sets_temp.as_path()]).await;
            self.restore(&cards_path, &cards_temp, previous_cards).await;
            return Err(ExportError::persistence(&sets_path, e));
        }

        let artifacts = PublishedArtifacts {
            cards_sha256: sha256_hex(&cards_bytes),
            sets_sha256: sha256_hex(&sets_bytes),
            cards_path,
            sets_path,
        };
        log::info!(
            "Published {} cards to {} (sha256 {})",
            cards.len(),
            artifacts.cards_path.display(),
            artifacts.cards_sha256
        );
        log::info!(
            "Published {} sets to {} (sha256 {})",
            sets.len(),
            artifacts.sets_path.display(),
            artifacts.sets_sha256
        );
        Ok(artifacts)
    }

    /// Best-effort removal; failures are logged, never returned
    async fn discard(&self, paths: &[&Path]) {
        for path in paths {
            match self.ops.remove_file(path).await {
                Ok(()) => log::debug!("Removed staged file {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove staged file {}: {}", path.display(), e),
            }
        }
    }

    /// Put the previously published cards back after a later step failed
    async fn restore(&self, cards_path: &Path, cards_temp: &Path, previous: Option<Vec<u8>>) {
        let restored = match previous {
            Some(bytes) => match self.ops.write(cards_temp, &bytes).await {
                Ok(()) => self.ops.rename(cards_temp, cards_path).await,
                Err(e) => Err(e),
            },
            None => self.ops.remove_file(cards_path).await,
        };

        if let Err(e) = restored {
            log::warn!("Failed to restore {}: {}", cards_path.display(), e);
            self.discard(&[cards_temp]).await;
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> ExportResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
