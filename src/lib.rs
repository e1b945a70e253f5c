//! ts-catalog
//!
//! Qt Linguist (`.ts`) 翻訳カタログの読み込み・検索・フォーマットを行うランタイムエンジン

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod format;
pub mod indexer;
pub mod plural;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use catalog::{
    CatalogEntry,
    CatalogStore,
    LoadError,
};
pub use engine::Translator;
