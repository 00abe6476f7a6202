/// Builders module - turns discovered data modules into published artifacts

pub mod card_loader;
pub mod output_generator;
pub mod set_loader;

pub use card_loader::CardLoader;
pub use output_generator::{
    FileOps, OutputGenerator, PublishedArtifacts, TokioFileOps, CARDS_FILE_NAME, SETS_FILE_NAME,
};
pub use set_loader::SetLoader;
