//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    CONFIG_FILE_NAME,
    CatalogSettings,
    ConfigError,
};

/// カタログのルートディレクトリから設定を読み込む
///
/// `.ts-catalog.json` ファイルを探して読み込む
///
/// # Arguments
/// * `catalog_root` - カタログのルートパス
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
/// - `Err(ConfigError)`: ファイル読み込みまたはパースエラー
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub(super) fn load_from_root(catalog_root: &Path) -> Result<Option<CatalogSettings>, ConfigError> {
    let config_path = catalog_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: CatalogSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::catalog::DuplicatePolicy;

    /// `load_from_root`: 設定ファイルが存在する場合
    #[rstest]
    fn test_load_from_root_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"duplicatePolicy": "firstWins"}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let result = load_from_root(temp_dir.path());

        assert!(result.is_ok());
        let settings = result.unwrap();
        assert!(settings.is_some());
        assert_eq!(settings.unwrap().duplicate_policy, DuplicatePolicy::FirstWins);
    }

    /// `load_from_root`: 設定ファイルが存在しない場合
    #[rstest]
    fn test_load_from_root_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_root(temp_dir.path());

        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    /// `load_from_root`: JSON パースエラー
    #[rstest]
    #[case::not_json("invalid json")]
    #[case::unknown_policy(r#"{"duplicatePolicy": "random"}"#)]
    fn test_load_from_root_invalid_json(#[case] content: &str) {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), content).unwrap();

        let result = load_from_root(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
