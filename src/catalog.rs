//! Loading and indexing of `.ts` message catalogs.

/// Catalog entry types
mod entry;
/// Load errors
mod error;
/// Language identifier helpers
pub mod language;
/// `.ts` document parser
mod parser;
/// Indexed catalog store
mod store;

pub use entry::{
    CatalogEntry,
    KeyRef,
    Location,
    Status,
    Translations,
};
pub use error::LoadError;
pub use parser::CatalogHeader;
pub use store::{
    CatalogStats,
    CatalogStore,
    DuplicateKey,
    DuplicatePolicy,
    LoadOptions,
};
