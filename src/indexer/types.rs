//! Indexer type definitions.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::language::{
    normalize_language_code,
    primary_subtag,
};
use crate::catalog::{
    CatalogStore,
    LoadError,
};

/// Key used for catalogs whose language could not be determined.
pub const UNDETERMINED_LANGUAGE: &str = "und";

#[derive(Error, Debug)]
pub enum IndexerError {
    /// Error when the catalog root is not a directory
    #[error("Not a directory: {}", .0.display())]
    InvalidPath(PathBuf),
    /// Error when a configured glob pattern cannot be compiled
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    /// Error when a loading task panicked or was cancelled
    #[error("Catalog loading task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A catalog file that could not be loaded.
#[derive(Debug)]
pub struct CatalogFailure {
    pub path: PathBuf,
    pub error: LoadError,
}

/// Catalogs of several languages, keyed by normalized language code (`pt_br`).
#[derive(Debug, Default)]
pub struct CatalogSet {
    /// Language → catalog
    stores: BTreeMap<String, Arc<CatalogStore>>,
    /// Files that failed to load
    failures: Vec<CatalogFailure>,
}

impl CatalogSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `store` under its declared language, replacing any catalog of the same language.
    pub fn insert(&mut self, store: impl Into<Arc<CatalogStore>>) {
        let store = store.into();
        let language = store.language().map_or_else(
            || UNDETERMINED_LANGUAGE.to_string(),
            normalize_language_code,
        );
        self.stores.insert(language, store);
    }

    pub(crate) fn push_failure(&mut self, failure: CatalogFailure) {
        self.failures.push(failure);
    }

    /// Catalog for `language`.
    ///
    /// Falls back from a regional variant to its primary language (`pl_PL` → `pl`) and from a
    /// primary language to the first regional variant (`pt` → `pt_br`).
    #[must_use]
    pub fn get(&self, language: &str) -> Option<Arc<CatalogStore>> {
        let normalized = normalize_language_code(language);
        if let Some(store) = self.stores.get(&normalized) {
            return Some(Arc::clone(store));
        }

        let primary = primary_subtag(&normalized);
        self.stores
            .get(&primary)
            .or_else(|| {
                self.stores
                    .iter()
                    .find(|(code, _)| primary_subtag(code) == primary)
                    .map(|(_, store)| store)
            })
            .map(Arc::clone)
    }

    /// The catalog for `language` if given and present, otherwise the first catalog in
    /// language order.
    #[must_use]
    pub fn preferred(&self, language: Option<&str>) -> Option<Arc<CatalogStore>> {
        language
            .and_then(|language| self.get(language))
            .or_else(|| self.stores.values().next().map(Arc::clone))
    }

    /// Normalized language codes in sorted order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<CatalogStore>)> {
        self.stores.iter().map(|(language, store)| (language.as_str(), store))
    }

    #[must_use]
    pub fn failures(&self) -> &[CatalogFailure] {
        &self.failures
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}
