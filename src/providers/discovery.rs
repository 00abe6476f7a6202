use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{ExportError, ExportResult};

/// Lists the files matching a glob pattern
#[async_trait]
pub trait FileDiscovery: Send + Sync {
    async fn discover(&self, pattern: &str) -> ExportResult<Vec<PathBuf>>;
}

/// Filesystem discovery backed by the `glob` crate.
///
/// Only regular files are returned, sorted, so one source tree always yields
/// the same order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobDiscovery;

impl GlobDiscovery {
    pub fn discover_blocking(pattern: &str) -> ExportResult<Vec<PathBuf>> {
        let entries = glob::glob(pattern)
            .map_err(|e| ExportError::DiscoveryError(format!("invalid pattern {}: {}", pattern, e)))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                ExportError::DiscoveryError(format!("cannot read {}: {}", e.path().display(), e.error()))
            })?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        log::debug!("Pattern {} matched {} files", pattern, files.len());
        Ok(files)
    }
}

#[async_trait]
impl FileDiscovery for GlobDiscovery {
    async fn discover(&self, pattern: &str) -> ExportResult<Vec<PathBuf>> {
        let pattern = pattern.to_string();
        tokio::task::spawn_blocking(move || Self::discover_blocking(&pattern))
            .await
            .map_err(|e| ExportError::TaskError(format!("discovery task failed: {}", e)))?
    }
}
