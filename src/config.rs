//! Catalog settings (`.ts-catalog.json`)
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Configuration types and settings
mod types;

pub use manager::ConfigManager;
pub use types::{
    CONFIG_FILE_NAME,
    CatalogSettings,
    ConfigError,
    DiagnosticsConfig,
    LoadingConfig,
    SettingsOverrides,
    ValidationError,
};
