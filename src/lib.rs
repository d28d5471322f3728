//! hpxconf: Hydra-style configuration composition
//!
//! Composes YAML config documents through `defaults` lists, applies command-line style
//! overrides and resolves `${...}` interpolations, producing the fully-resolved dataset
//! configs consumed by the DLWP HEALPix data pipeline.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod document;
pub mod error;
pub mod interpolation;
pub mod loader;
pub mod logging;
pub mod overrides;
pub mod resolved;
pub mod resolver;
pub mod value;

pub use dataset::DatasetParams;
pub use document::{ConfigDocument, DefaultEntry, PackageDirective};
pub use error::ConfigError;
pub use loader::{DocumentEntry, DocumentLoader, FsLoader, MemoryLoader};
pub use overrides::{Override, OverrideOp};
pub use resolved::ResolvedConfig;
pub use resolver::{resolve, Composition, Resolver};
pub use value::{KeyPath, Mapping, Value};
