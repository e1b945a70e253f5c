//! Catalog directory indexing.

/// Indexer type definitions
pub mod types;
/// Directory walking and concurrent loading
pub mod workspace;

pub use types::{
    CatalogFailure,
    CatalogSet,
    IndexerError,
    UNDETERMINED_LANGUAGE,
};
pub use workspace::CatalogIndexer;
