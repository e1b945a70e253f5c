//! Loads every catalog below a directory.
use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};

use futures::stream::{
    self,
    StreamExt,
};
use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;

use crate::catalog::language::normalize_language_code;
use crate::catalog::{
    CatalogStore,
    DuplicatePolicy,
};
use crate::config::ConfigManager;
use crate::indexer::types::{
    CatalogFailure,
    CatalogSet,
    IndexerError,
    UNDETERMINED_LANGUAGE,
};

/// Discovers and loads catalog files.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogIndexer;

impl CatalogIndexer {
    /// 新しいインデクサーを作成
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// ディレクトリ内のカタログをすべて読み込む
    ///
    /// Files are loaded concurrently on the blocking pool. Catalogs of the same language are
    /// merged in path order; a file that fails to load is recorded in
    /// [`CatalogSet::failures`] and does not affect the others.
    ///
    /// # Errors
    /// - `root` is not a directory
    /// - Invalid glob pattern
    /// - A loading task panicked
    pub async fn index_directory(
        &self,
        root: &Path,
        config_manager: &ConfigManager,
    ) -> Result<CatalogSet, IndexerError> {
        tracing::debug!(root = %root.display(), "Indexing catalogs");
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(root.to_path_buf()));
        }

        let settings = config_manager.get_settings();
        let include_set = build_glob_set(std::slice::from_ref(&settings.catalog_pattern))?;
        let exclude_set = build_glob_set(&settings.exclude_patterns)?;

        let walk_root = root.to_path_buf();
        let mut files = tokio::task::spawn_blocking(move || {
            find_catalog_files(&walk_root, &include_set, &exclude_set)
        })
        .await?;
        files.sort();
        tracing::debug!(count = files.len(), "Found catalog files");

        let options = config_manager.load_options();
        let policy = options.duplicate_policy;
        let num_threads = settings.loading.effective_num_threads();

        // 並列処理でファイルを読み込み（結果はパス順）
        let results: Vec<_> = stream::iter(files)
            .map(|path| {
                let options = options.clone();
                tokio::task::spawn_blocking(move || {
                    let result = CatalogStore::load_path(&path, &options);
                    (path, result)
                })
            })
            .buffered(num_threads)
            .collect()
            .await;

        let mut set = CatalogSet::new();
        let mut by_language: BTreeMap<String, CatalogStore> = BTreeMap::new();
        for joined in results {
            let (path, result) = joined?;
            match result {
                Ok(store) => merge_into(&mut by_language, store, policy),
                Err(error) => {
                    tracing::warn!("Failed to load catalog {:?}: {}", path, error);
                    set.push_failure(CatalogFailure { path, error });
                }
            }
        }
        for store in by_language.into_values() {
            set.insert(store);
        }

        tracing::debug!(
            languages = set.len(),
            failures = set.failures().len(),
            "Indexing finished"
        );
        Ok(set)
    }
}

/// Adds `store` to the catalog of its language, merging when one already exists.
fn merge_into(
    by_language: &mut BTreeMap<String, CatalogStore>,
    store: CatalogStore,
    policy: DuplicatePolicy,
) {
    let language = store
        .language()
        .map_or_else(|| UNDETERMINED_LANGUAGE.to_string(), normalize_language_code);
    let merged = match by_language.remove(&language) {
        Some(existing) => {
            tracing::debug!(language, "Merging catalogs of the same language");
            existing.merge(store, policy)
        }
        None => store,
    };
    by_language.insert(language, merged);
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, IndexerError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|source| IndexerError::Pattern { pattern: pattern.clone(), source })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|source| IndexerError::Pattern { pattern: patterns.join(", "), source })
}

/// カタログファイルを検索
fn find_catalog_files(root: &Path, include_set: &GlobSet, exclude_set: &GlobSet) -> Vec<PathBuf> {
    let mut found_files = Vec::new();

    // ignore クレートでファイルを走査
    for result in WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        // ファイルのみを対象
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();

        // ルートからの相対パスを取得
        let Ok(relative_path) = path.strip_prefix(root) else {
            continue;
        };
        if !include_set.is_match(relative_path) || exclude_set.is_match(relative_path) {
            continue;
        }

        found_files.push(path.to_path_buf());
    }

    found_files
}
