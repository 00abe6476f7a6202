use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classes::Card;
use crate::error::{ExportError, ExportResult};
use crate::parallel_call::{map_limit, ConcurrencyLimit};
use crate::providers::ModuleLoader;

/// Loads every card definition of a batch through a bounded worker pool.
///
/// Card files sit one level below a per-set directory whose name is the
/// fallback set id.
#[derive(Clone)]
pub struct CardLoader {
    loader: Arc<dyn ModuleLoader>,
    limit: ConcurrencyLimit,
}

impl CardLoader {
    pub fn new(loader: Arc<dyn ModuleLoader>, limit: ConcurrencyLimit) -> Self {
        Self { loader, limit }
    }

    pub async fn load_all(&self, files: Vec<PathBuf>) -> ExportResult<Vec<Card>> {
        log::info!("Loading {} card files", files.len());
        let this = self.clone();
        map_limit(files, self.limit, move |path: PathBuf| {
            let this = this.clone();
            async move {
                match this.load_one(&path).await {
                    Ok(card) => Ok(card),
                    Err(e) => Err(ExportError::CardLoadError {
                        path,
                        source: Box::new(e),
                    }),
                }
            }
        })
        .await
    }

    pub async fn load_one(&self, path: &Path) -> ExportResult<Card> {
        let module = self.loader.load(path).await?;
        let parent_dir = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ExportError::decode(path, "card file has no parent directory"))?;
        Card::from_module(module, path, &parent_dir)
    }
}
