// Source-side collaborators: where data modules live and how they are read

pub mod discovery;
pub mod module_loader;
pub mod repository;

pub use discovery::{FileDiscovery, GlobDiscovery};
pub use module_loader::{JsonModuleLoader, ModuleLoader};
pub use repository::RepositoryRoot;
