use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ExportError, ExportResult};
use crate::providers::repository::RepositoryRoot;

/// Loads the decoded content of one data module
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, path: &Path) -> ExportResult<Value>;
}

/// Reads data modules as JSON documents from inside the repository root
#[derive(Debug, Clone)]
pub struct JsonModuleLoader {
    root: RepositoryRoot,
}

impl JsonModuleLoader {
    pub fn new(root: RepositoryRoot) -> Self {
        Self { root }
    }
}

#[async_trait]
impl ModuleLoader for JsonModuleLoader {
    async fn load(&self, path: &Path) -> ExportResult<Value> {
        let contained = self.root.contain(path).await?;
        let bytes = tokio::fs::read(&contained).await?;
        serde_json::from_slice(&bytes).map_err(|e| ExportError::decode(&contained, e.to_string()))
    }
}
