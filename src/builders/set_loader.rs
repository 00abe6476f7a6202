use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classes::SetInfo;
use crate::error::{ExportError, ExportResult};
use crate::parallel_call::{map_limit, ConcurrencyLimit};
use crate::providers::ModuleLoader;

/// Loads every set definition of a batch through a bounded worker pool
#[derive(Clone)]
pub struct SetLoader {
    loader: Arc<dyn ModuleLoader>,
    limit: ConcurrencyLimit,
    default_locale: Arc<str>,
}

impl SetLoader {
    pub fn new(loader: Arc<dyn ModuleLoader>, limit: ConcurrencyLimit, default_locale: &str) -> Self {
        Self {
            loader,
            limit,
            default_locale: Arc::from(default_locale),
        }
    }

    /// One `SetInfo` per file, in input order. Any failing file fails the batch.
    pub async fn load_all(&self, files: Vec<PathBuf>) -> ExportResult<Vec<SetInfo>> {
        log::info!("Loading {} set files", files.len());
        let this = self.clone();
        map_limit(files, self.limit, move |path: PathBuf| {
            let this = this.clone();
            async move {
                match this.load_one(&path).await {
                    Ok(set) => Ok(set),
                    Err(e) => Err(ExportError::SetLoadError {
                        path,
                        source: Box::new(e),
                    }),
                }
            }
        })
        .await
    }

    pub async fn load_one(&self, path: &Path) -> ExportResult<SetInfo> {
        let module = self.loader.load(path).await?;
        let file_stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| ExportError::decode(path, "set file has no base name"))?;
        SetInfo::from_module(module, path, &file_stem, &self.default_locale)
    }
}
