//! カタログディレクトリのインデックスに関するテスト

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]

use std::fs;
use std::path::Path;

use googletest::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use ts_catalog::Translator;
use ts_catalog::config::ConfigManager;
use ts_catalog::indexer::{
    CatalogIndexer,
    CatalogSet,
};

fn fixtures() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

fn index(root: &Path) -> CatalogSet {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(root.to_path_buf())).unwrap();
    tokio_test::block_on(CatalogIndexer::new().index_directory(root, &config_manager)).unwrap()
}

#[test]
fn test_index_fixtures_collects_languages_and_failures() {
    let set = index(fixtures());

    assert_eq!(set.languages().collect::<Vec<_>>(), vec!["de_de", "pl_pl"]);
    assert_eq!(set.failures().len(), 1);
    assert!(set.failures()[0].path.ends_with("broken/qtcreator_cs.ts"));
}

#[googletest::test]
fn test_switch_language() {
    let set = index(fixtures());
    let translator = Translator::new(set.preferred(Some("pl")).unwrap());
    expect_that!(translator.tr("AttachCoreDialog", "Executable:"), eq("Plik wykonywalny:"));

    expect_that!(translator.switch_language(&set, "de"), eq(true));
    expect_that!(translator.tr("AttachCoreDialog", "Executable:"), eq("Ausführbare Datei:"));

    expect_that!(translator.switch_language(&set, "fr"), eq(false));
    expect_that!(translator.current().language(), some(eq("de_DE")));
}

#[googletest::test]
fn test_settings_file_controls_patterns() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("translations")).unwrap();
    fs::create_dir_all(root.join("old")).unwrap();
    fs::copy(
        fixtures().join("translations/qtcreator_pl.ts"),
        root.join("translations/qtcreator_pl.ts"),
    )
    .unwrap();
    fs::copy(fixtures().join("translations/qtcreator_de.ts"), root.join("old/qtcreator_de.ts"))
        .unwrap();
    fs::write(root.join(".ts-catalog.json"), r#"{"excludePatterns": ["old/**"]}"#).unwrap();

    let set = index(root);

    assert_eq!(set.languages().collect::<Vec<_>>(), vec!["pl_pl"]);
    expect_that!(set.failures(), is_empty());
}

#[googletest::test]
fn test_file_without_language_attribute_uses_file_name() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("app_cs.ts"),
        "<TS version=\"2.1\"><context><name>Ctx</name><message><source>Yes</source><translation>Ano</translation></message></context></TS>",
    )
    .unwrap();

    let set = index(temp_dir.path());
    let translator = Translator::new(set.get("cs").unwrap());

    expect_that!(translator.tr("Ctx", "Yes"), eq("Ano"));
}
