use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::catalog::DuplicatePolicy;

/// Settings file looked up in the catalog root.
pub const CONFIG_FILE_NAME: &str = ".ts-catalog.json";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "excludePatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    /// Glob selecting catalog files, relative to the catalog root.
    pub catalog_pattern: String,
    pub exclude_patterns: Vec<String>,

    pub duplicate_policy: DuplicatePolicy,

    /// Retry a lookup without its disambiguation when the disambiguated key is missing.
    pub fallback_to_undisambiguated: bool,

    /// Language activated first after indexing.
    /// If unset, the first language found (in sorted order) is used.
    pub default_language: Option<String>,

    pub loading: LoadingConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Values given on the command line that replace the ones from the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub duplicate_policy: Option<DuplicatePolicy>,
    pub fallback_to_undisambiguated: Option<bool>,
    pub default_language: Option<String>,
}

impl SettingsOverrides {
    /// `true` when nothing is overridden.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.duplicate_policy.is_none()
            && self.fallback_to_undisambiguated.is_none()
            && self.default_language.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadingConfig {
    /// Parallel thread count for loading catalogs.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

impl LoadingConfig {
    /// Thread count actually used for loading.
    #[must_use]
    pub fn effective_num_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| (num_cpus::get() * 4 / 5).max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    /// Report `%N` placeholders of the source text missing from a translation.
    pub placeholders: bool,
    /// Report plural translations whose form count does not match the language.
    pub numerus_count: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { placeholders: true, numerus_count: true }
    }
}

impl CatalogSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Zero loading threads
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.catalog_pattern.is_empty() {
            errors.push(ValidationError::new(
                "catalogPattern",
                "The pattern cannot be empty. Example: \"translations/*.ts\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.catalog_pattern) {
            errors.push(ValidationError::new(
                "catalogPattern",
                format!("Invalid glob pattern '{}': {e}", self.catalog_pattern),
            ));
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if let Some(language) = &self.default_language
            && language.is_empty()
        {
            errors.push(ValidationError::new(
                "defaultLanguage",
                "The language cannot be empty. Please specify a language (e.g., \"pl\"), or remove this field",
            ));
        }

        if self.loading.num_threads == Some(0) {
            errors.push(ValidationError::new(
                "loading.numThreads",
                "At least one thread is required. Remove this field to use the default",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            catalog_pattern: "**/*.ts".to_string(),
            exclude_patterns: Vec::new(),
            duplicate_policy: DuplicatePolicy::default(),
            fallback_to_undisambiguated: true,
            default_language: None,
            loading: LoadingConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}
