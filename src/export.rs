use std::sync::Arc;

use crate::builders::{CardLoader, OutputGenerator, PublishedArtifacts, SetLoader};
use crate::classes::{Card, SetInfo};
use crate::config::ExportConfig;
use crate::error::ExportResult;
use crate::providers::{FileDiscovery, GlobDiscovery, JsonModuleLoader, ModuleLoader, RepositoryRoot};

/// Outcome of one successful export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub set_count: usize,
    pub card_count: usize,
    pub artifacts: PublishedArtifacts,
}

/// One export run: discover, load sets and cards side by side, publish
pub struct Exporter {
    config: ExportConfig,
    root: RepositoryRoot,
    discovery: Arc<dyn FileDiscovery>,
    loader: Arc<dyn ModuleLoader>,
}

impl Exporter {
    /// Validate the repository and wire the filesystem collaborators
    pub fn new(config: ExportConfig) -> ExportResult<Self> {
        let root = RepositoryRoot::resolve(&config)?;
        let loader = Arc::new(JsonModuleLoader::new(root.clone()));
        Ok(Self::with_collaborators(config, root, Arc::new(GlobDiscovery), loader))
    }

    pub fn with_collaborators(
        config: ExportConfig,
        root: RepositoryRoot,
        discovery: Arc<dyn FileDiscovery>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Self {
        Self {
            config,
            root,
            discovery,
            loader,
        }
    }

    pub async fn load_sets(&self) -> ExportResult<Vec<SetInfo>> {
        let files = self
            .discovery
            .discover(&self.root.set_pattern(&self.config))
            .await?;
        SetLoader::new(
            Arc::clone(&self.loader),
            self.config.concurrency,
            &self.config.default_locale,
        )
        .load_all(files)
        .await
    }

    pub async fn load_cards(&self) -> ExportResult<Vec<Card>> {
        let files = self
            .discovery
            .discover(&self.root.card_pattern(&self.config))
            .await?;
        CardLoader::new(Arc::clone(&self.loader), self.config.concurrency)
            .load_all(files)
            .await
    }

    /// Load both batches concurrently; either failing fails the run
    pub async fn collect(&self) -> ExportResult<(Vec<Card>, Vec<SetInfo>)> {
        let (sets, cards) = tokio::try_join!(self.load_sets(), self.load_cards())?;
        Ok((cards, sets))
    }

    pub async fn run(&self) -> ExportResult<ExportSummary> {
        log::info!(
            "Exporting from {} with concurrency {}",
            self.root.path().display(),
            self.config.concurrency.get()
        );
        let (cards, sets) = self.collect().await?;

        let artifacts = OutputGenerator::new(&self.config.output_dir)
            .write_all(&cards, &sets)
            .await?;

        Ok(ExportSummary {
            set_count: sets.len(),
            card_count: cards.len(),
            artifacts,
        })
    }
}

/// Resolve the repository from `config` and run a full export
pub async fn run_export(config: ExportConfig) -> ExportResult<ExportSummary> {
    Exporter::new(config)?.run().await
}
