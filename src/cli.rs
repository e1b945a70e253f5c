//! Command line interface of the `ts-catalog` binary.

use std::fmt;
use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use clap::{
    Args,
    Parser,
    Subcommand,
    ValueEnum,
};
use serde::Serialize;
use thiserror::Error;
use ts_catalog::catalog::{
    CatalogEntry,
    CatalogStore,
    DuplicatePolicy,
    LoadError,
};
use ts_catalog::config::{
    ConfigError,
    ConfigManager,
    SettingsOverrides,
};
use ts_catalog::diagnostics::{
    Diagnostic,
    Severity,
    check_store,
};
use ts_catalog::indexer::{
    CatalogIndexer,
    IndexerError,
};
use ts_catalog::plural::PluralRules;
use ts_catalog::Translator;

/// Inspect Qt Linguist translation catalogs
#[derive(Parser, Debug)]
#[clap(name = "ts-catalog", version, about)]
pub(crate) struct Cli {
    /// Write logs to this file instead of stderr
    #[clap(long, global = true)]
    pub(crate) log_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) settings: SettingsArgs,

    #[clap(subcommand)]
    pub(crate) command: Command,
}

/// Options that replace values of `.ts-catalog.json`.
#[derive(Args, Debug, Default)]
pub(crate) struct SettingsArgs {
    /// Which entry to keep when a key occurs more than once
    #[clap(long, value_enum, global = true)]
    pub(crate) duplicate_policy: Option<PolicyArg>,

    /// Do not retry a disambiguated lookup without its disambiguation
    #[clap(long, global = true)]
    pub(crate) no_fallback: bool,
}

impl SettingsArgs {
    /// Overrides for a command; `language` is the `--language` of `lookup`.
    fn overrides(&self, language: Option<&str>) -> SettingsOverrides {
        SettingsOverrides {
            duplicate_policy: self.duplicate_policy.map(DuplicatePolicy::from),
            fallback_to_undisambiguated: self.no_fallback.then_some(false),
            default_language: language.map(str::to_string),
        }
    }
}

/// Command line spelling of [`DuplicatePolicy`].
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PolicyArg {
    /// Keep the entry appearing last
    LastWins,
    /// Keep the entry appearing first
    FirstWins,
}

impl From<PolicyArg> for DuplicatePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::LastWins => Self::LastWins,
            PolicyArg::FirstWins => Self::FirstWins,
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Translate one message
    Lookup {
        /// Catalog file, or a directory of catalogs
        catalog: PathBuf,

        /// Message context (e.g., AttachCoreDialog)
        context: String,

        /// Source text
        source: String,

        /// Disambiguation comment
        #[clap(long)]
        comment: Option<String>,

        /// Language to use when CATALOG is a directory (defaults to `defaultLanguage`)
        #[clap(long)]
        language: Option<String>,

        /// Plural count, also substituted for %n
        #[clap(long, allow_negative_numbers = true)]
        count: Option<i64>,

        /// Values substituted for %1, %2, ...
        args: Vec<String>,
    },

    /// Report problems in a catalog file or in every catalog below a directory
    Check {
        /// Catalog file or directory
        path: PathBuf,
    },

    /// Print all entries as JSON
    Dump {
        /// Catalog file
        catalog: PathBuf,
    },

    /// Print entry counts by status
    Stats {
        /// Catalog file
        catalog: PathBuf,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

#[derive(Error, Debug)]
pub(crate) enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error("No catalog found in {}", .0.display())]
    NoCatalog(PathBuf),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON shape of `dump`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DumpOutput<'a> {
    /// Target language
    language: Option<&'a str>,
    /// Source language
    source_language: Option<&'a str>,
    /// Schema version
    version: Option<&'a str>,
    /// Finished and unfinished entries
    entries: &'a [CatalogEntry],
    /// Obsolete entries
    obsolete: &'a [CatalogEntry],
}

/// Runs a parsed command line.
///
/// # Errors
/// Loading, configuration and output failures.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Lookup { catalog, context, source, comment, language, count, args } => {
            let manager = configure(&catalog, cli.settings.overrides(language.as_deref()))?;
            let translator = lookup_translator(&catalog, &manager).await?;
            let args: Vec<&dyn fmt::Display> =
                args.iter().map(|arg| arg as &dyn fmt::Display).collect();

            let text = translator.translate(&context, &source, comment.as_deref(), count, &args);
            writeln!(out, "{text}")?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { path } => {
            let manager = configure(&path, cli.settings.overrides(None))?;
            check(&path, &manager, &mut out).await
        }
        Command::Dump { catalog } => {
            let manager = configure(&catalog, cli.settings.overrides(None))?;
            let store = load_catalog(&catalog, &manager)?;
            let dump = DumpOutput {
                language: store.language(),
                source_language: store.source_language(),
                version: store.version(),
                entries: store.entries(),
                obsolete: store.obsolete_entries(),
            };
            serde_json::to_writer_pretty(&mut out, &dump)?;
            writeln!(out)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats { catalog, json } => {
            let manager = configure(&catalog, cli.settings.overrides(None))?;
            let store = load_catalog(&catalog, &manager)?;
            let stats = store.stats();
            if json {
                serde_json::to_writer_pretty(&mut out, &stats)?;
                writeln!(out)?;
            } else {
                writeln!(out, "language:   {}", store.language().unwrap_or("-"))?;
                writeln!(out, "finished:   {}", stats.finished)?;
                writeln!(out, "unfinished: {}", stats.unfinished)?;
                writeln!(out, "obsolete:   {}", stats.obsolete)?;
                writeln!(out, "vanished:   {}", stats.vanished)?;
                writeln!(out, "plural:     {}", stats.plural)?;
                writeln!(out, "duplicates: {}", stats.duplicates)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Settings of the catalog path with the command line overrides applied.
fn configure(path: &Path, overrides: SettingsOverrides) -> Result<ConfigManager, ConfigError> {
    let mut manager = ConfigManager::for_catalog(path)?;
    manager.apply_overrides(&overrides)?;
    Ok(manager)
}

/// Builds the translator for `lookup` from a catalog file or a catalog directory.
///
/// For a directory the catalog of `defaultLanguage` is used, or the first one found.
async fn lookup_translator(path: &Path, manager: &ConfigManager) -> Result<Translator, CliError> {
    let settings = manager.get_settings();
    if !path.is_dir() {
        let store = load_catalog(path, manager)?;
        return Ok(Translator::from_settings(store, settings));
    }

    let set = CatalogIndexer::new().index_directory(path, manager).await?;
    let store = set
        .preferred(settings.default_language.as_deref())
        .ok_or_else(|| CliError::NoCatalog(path.to_path_buf()))?;
    Ok(Translator::from_settings(store, settings))
}

/// Loads one catalog file with the duplicate policy of `manager`.
fn load_catalog(path: &Path, manager: &ConfigManager) -> Result<CatalogStore, CliError> {
    Ok(CatalogStore::load_path(path, &manager.load_options())?)
}

/// `check`: prints diagnostics; exit code 1 when a warning or a load failure was found.
async fn check(
    path: &Path,
    manager: &ConfigManager,
    out: &mut impl Write,
) -> Result<ExitCode, CliError> {
    let rules = PluralRules::builtin();
    let config = &manager.get_settings().diagnostics;
    let mut failed = false;

    if path.is_dir() {
        let set = CatalogIndexer::new().index_directory(path, manager).await?;
        for failure in set.failures() {
            failed = true;
            writeln!(out, "{}: error: {}", failure.path.display(), failure.error)?;
        }
        for (language, store) in set.iter() {
            failed |= write_diagnostics(out, language, &check_store(store, &rules, config))?;
        }
    } else {
        let store = load_catalog(path, manager)?;
        let diagnostics = check_store(&store, &rules, config);
        failed |= write_diagnostics(out, &path.display().to_string(), &diagnostics)?;
    }

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Returns true if any diagnostic is a warning.
fn write_diagnostics(
    out: &mut impl Write,
    origin: &str,
    diagnostics: &[Diagnostic],
) -> io::Result<bool> {
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            Severity::Warning => "warning",
            Severity::Information => "info",
        };
        writeln!(out, "{origin}:{}: {severity}: {}", diagnostic.position, diagnostic.message)?;
    }
    Ok(diagnostics.iter().any(|diagnostic| diagnostic.severity == Severity::Warning))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::fs;

    use clap::CommandFactory;
    use tempfile::TempDir;

    use super::*;

    const DUPLICATED: &str = "<TS version=\"2.1\" language=\"pl\">\
        <context><name>Ctx</name>\
        <message><source>Key</source><translation>Pierwszy</translation></message>\
        <message><source>Key</source><translation>Drugi</translation></message>\
        <message><source>Open</source><translation>Otwórz</translation></message>\
        </context></TS>";

    fn lookup(path: &Path, settings: &SettingsArgs, language: Option<&str>) -> Translator {
        let manager = configure(path, settings.overrides(language)).unwrap();
        tokio_test::block_on(lookup_translator(path, &manager)).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lookup_with_negative_count() {
        let cli = Cli::try_parse_from([
            "ts-catalog",
            "lookup",
            "app_pl.ts",
            "Find",
            "%n found",
            "--count",
            "-3",
            "x",
        ])
        .unwrap();

        let Command::Lookup { count, args, .. } = cli.command else {
            panic!("expected lookup");
        };
        assert_eq!(count, Some(-3));
        assert_eq!(args, vec!["x".to_string()]);
    }

    #[test]
    fn test_write_diagnostics_reports_warnings() {
        let mut out = Vec::new();
        let diagnostics = [Diagnostic {
            severity: ts_catalog::diagnostics::Severity::Warning,
            kind: ts_catalog::diagnostics::DiagnosticKind::DuplicateKey,
            position: ts_catalog::types::SourcePosition { line: 3, column: 5 },
            message: "Duplicate".to_string(),
        }];

        let failed = write_diagnostics(&mut out, "pl", &diagnostics).unwrap();

        assert!(failed);
        assert_eq!(String::from_utf8(out).unwrap(), "pl:3:5: warning: Duplicate\n");
    }

    #[test]
    fn test_parse_settings_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ts-catalog",
            "check",
            "translations",
            "--duplicate-policy",
            "first-wins",
            "--no-fallback",
        ])
        .unwrap();

        let overrides = cli.settings.overrides(None);
        assert_eq!(overrides.duplicate_policy, Some(DuplicatePolicy::FirstWins));
        assert_eq!(overrides.fallback_to_undisambiguated, Some(false));
        assert!(SettingsArgs::default().overrides(None).is_empty());
    }

    #[test]
    fn test_duplicate_policy_override_beats_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = temp_dir.path().join("app_pl.ts");
        fs::write(&catalog, DUPLICATED).unwrap();
        fs::write(temp_dir.path().join(".ts-catalog.json"), r#"{"duplicatePolicy": "firstWins"}"#)
            .unwrap();

        let from_file = lookup(&catalog, &SettingsArgs::default(), None);
        let overridden = SettingsArgs {
            duplicate_policy: Some(PolicyArg::LastWins),
            ..SettingsArgs::default()
        };
        let from_cli = lookup(&catalog, &overridden, None);

        assert_eq!(from_file.tr("Ctx", "Key"), "Pierwszy");
        assert_eq!(from_cli.tr("Ctx", "Key"), "Drugi");
    }

    #[test]
    fn test_no_fallback_disables_undisambiguated_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = temp_dir.path().join("app_pl.ts");
        fs::write(&catalog, DUPLICATED).unwrap();

        let with_fallback = lookup(&catalog, &SettingsArgs::default(), None);
        let without =
            lookup(&catalog, &SettingsArgs { no_fallback: true, ..SettingsArgs::default() }, None);

        assert_eq!(with_fallback.translate("Ctx", "Open", Some("verb"), None, &[]), "Otwórz");
        assert_eq!(without.translate("Ctx", "Open", Some("verb"), None, &[]), "Open");
    }

    #[test]
    fn test_lookup_language_selects_catalog_in_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("app_pl.ts"), DUPLICATED).unwrap();
        fs::write(
            temp_dir.path().join("app_de.ts"),
            "<TS version=\"2.1\" language=\"de\"><context><name>Ctx</name>\
             <message><source>Open</source><translation>Öffnen</translation></message>\
             </context></TS>",
        )
        .unwrap();

        let german = lookup(temp_dir.path(), &SettingsArgs::default(), Some("de"));
        let polish = lookup(temp_dir.path(), &SettingsArgs::default(), Some("pl"));

        assert_eq!(german.tr("Ctx", "Open"), "Öffnen");
        assert_eq!(polish.tr("Ctx", "Open"), "Otwórz");
    }
}
