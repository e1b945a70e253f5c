//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    CatalogSettings,
    ConfigError,
    SettingsOverrides,
    loader,
};
use crate::catalog::LoadOptions;

/// カタログの読み込みに使う設定を保持する
///
/// 設定ファイルの値にコマンドラインからの上書きを重ねた結果を持ちます。
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: CatalogSettings,
}

impl ConfigManager {
    /// デフォルト設定で作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: CatalogSettings::default() }
    }

    /// カタログのパスに対応する設定を読み込んで作成
    ///
    /// ディレクトリならそのディレクトリ、ファイルなら親ディレクトリの
    /// `.ts-catalog.json` を使います。
    ///
    /// # Errors
    /// 設定ファイルの読み込み・パース・バリデーションエラー
    pub fn for_catalog(path: &Path) -> Result<Self, ConfigError> {
        let root = if path.is_dir() { Some(path) } else { path.parent() };
        let root = root.filter(|root| !root.as_os_str().is_empty()).map(Path::to_path_buf);

        let mut manager = Self::new();
        manager.load_settings(root)?;
        Ok(manager)
    }

    /// 設定を読み込む
    ///
    /// # Arguments
    /// * `catalog_root` - カタログのルートパス
    ///
    /// # Returns
    /// - `Ok(())`: 設定の読み込みとバリデーション成功
    /// - `Err(ConfigError)`: エラー（現在の設定は維持される）
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, catalog_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for catalog root: {:?}", catalog_root);

        let settings = match &catalog_root {
            Some(root) => loader::load_from_root(root)?.unwrap_or_default(),
            None => CatalogSettings::default(),
        };
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);
        Ok(())
    }

    /// コマンドラインの値で設定を上書きする
    ///
    /// 上書き後の設定がバリデーションに失敗した場合、現在の設定は変更されない。
    ///
    /// # Errors
    /// バリデーションエラー
    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) -> Result<(), ConfigError> {
        if overrides.is_empty() {
            return Ok(());
        }
        tracing::debug!("Applying overrides: {:?}", overrides);

        let mut settings = self.current_settings.clone();
        if let Some(policy) = overrides.duplicate_policy {
            settings.duplicate_policy = policy;
        }
        if let Some(fallback) = overrides.fallback_to_undisambiguated {
            settings.fallback_to_undisambiguated = fallback;
        }
        if let Some(language) = &overrides.default_language {
            settings.default_language = Some(language.clone());
        }
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &CatalogSettings {
        &self.current_settings
    }

    /// 現在の設定でカタログを読み込むためのオプション
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions { duplicate_policy: self.current_settings.duplicate_policy, language: None }
    }
}
