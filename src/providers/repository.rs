use std::path::{Path, PathBuf};

use crate::config::{ExportConfig, ENV_PREFIX};
use crate::error::{ExportError, ExportResult};

/// Validated, canonical root of the source data repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRoot {
    root: PathBuf,
}

impl RepositoryRoot {
    /// Resolve `config.repo_path` against the project directory.
    ///
    /// The reference must be free of control characters, must exist, and its
    /// real path must lie inside the real project directory.
    pub fn resolve(config: &ExportConfig) -> ExportResult<Self> {
        let raw = config.repo_path.as_str();
        let hint = format!(
            "point {}_REPO_PATH at a checkout of the card data repository inside {}",
            ENV_PREFIX,
            config.project_dir.display()
        );

        if raw.contains(['\0', '\r', '\n']) {
            return Err(ExportError::setup(
                format!("repository path {:?} contains control characters", raw),
                hint,
            ));
        }

        let project_dir = std::fs::canonicalize(&config.project_dir).map_err(|e| {
            ExportError::setup(
                format!(
                    "project directory {} is not accessible: {}",
                    config.project_dir.display(),
                    e
                ),
                "run the export from inside the project checkout",
            )
        })?;

        let candidate = if Path::new(raw).is_absolute() {
            PathBuf::from(raw)
        } else {
            project_dir.join(raw)
        };

        if !candidate.exists() {
            return Err(ExportError::setup(
                format!("repository not found at {}", candidate.display()),
                hint,
            ));
        }

        let root = std::fs::canonicalize(&candidate).map_err(|e| {
            ExportError::setup(
                format!("repository path {} cannot be resolved: {}", candidate.display(), e),
                hint.clone(),
            )
        })?;

        if !root.starts_with(&project_dir) {
            return Err(ExportError::setup(
                format!(
                    "repository {} lies outside the project directory {}",
                    root.display(),
                    project_dir.display()
                ),
                hint,
            ));
        }

        if !root.is_dir() {
            return Err(ExportError::setup(
                format!("repository path {} is not a directory", root.display()),
                hint,
            ));
        }

        log::info!("Using card data repository at {}", root.display());
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Canonicalize `path` and reject it unless it stays beneath the root
    pub async fn contain(&self, path: &Path) -> ExportResult<PathBuf> {
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let canonical = tokio::fs::canonicalize(&resolved).await?;
        if canonical.starts_with(&self.root) {
            Ok(canonical)
        } else {
            Err(ExportError::SecurityError(resolved))
        }
    }

    fn pattern(&self, config: &ExportConfig, depth: usize) -> String {
        let mut pattern = glob::Pattern::escape(&self.root.join(&config.data_subdir).to_string_lossy());
        for _ in 0..depth {
            pattern.push_str("/*");
        }
        pattern.push_str(&format!("/*.{}", config.file_extension));
        pattern
    }

    /// `<root>/<data_subdir>/<set>.<ext>`
    pub fn set_pattern(&self, config: &ExportConfig) -> String {
        self.pattern(config, 0)
    }

    /// `<root>/<data_subdir>/<set>/<card>.<ext>`
    pub fn card_pattern(&self, config: &ExportConfig) -> String {
        self.pattern(config, 1)
    }
}
