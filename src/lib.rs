//! Export trading-card set and card definitions from a source data
//! repository into `cards.json` and `sets.json`.

pub mod builders;
pub mod classes;
pub mod config;
pub mod error;
pub mod export;
pub mod parallel_call;
pub mod providers;

pub use builders::{CardLoader, OutputGenerator, PublishedArtifacts, SetLoader};
pub use classes::{Card, SetInfo};
pub use config::{resolve_concurrency, ExportConfig, RawLimit};
pub use error::{ExportError, ExportResult};
pub use export::{run_export, ExportSummary, Exporter};
pub use parallel_call::{map_limit, ConcurrencyLimit};
