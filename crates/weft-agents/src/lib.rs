pub mod builtin;
pub mod catalog;
pub mod registry;

pub use catalog::{AgentCatalog, CatalogEntry};
pub use registry::{registry_slug, AgentRegistry};
