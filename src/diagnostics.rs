//! 診断メッセージ生成モジュール

use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::{
    CatalogEntry,
    CatalogStore,
    Status,
    Translations,
};
use crate::config::DiagnosticsConfig;
use crate::format::placeholders;
use crate::plural::PluralRules;
use crate::types::SourcePosition;

/// 診断の重大度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Information,
    Warning,
}

/// 診断の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// `%N` of the source text is missing from the translation
    MissingPlaceholder,
    /// The translation uses a `%N` the source text does not have
    UnexpectedPlaceholder,
    /// Plural form count differs from the language's plural rule
    NumerusFormCount,
    /// The same key appeared more than once
    DuplicateKey,
    /// Summary of unfinished translations
    Unfinished,
}

/// カタログに対する診断メッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub position: SourcePosition,
    pub message: String,
}

/// カタログの診断メッセージを生成
///
/// 翻訳済みエントリのプレースホルダーと複数形の数、読み込み時の重複キー、
/// 未完了の翻訳をチェックします。
///
/// # Arguments
/// * `store` - チェック対象のカタログ
/// * `rules` - 複数形ルール
/// * `config` - 有効にするチェック
///
/// # Returns
/// 位置順に並んだ診断メッセージのリスト
#[must_use]
pub fn check_store(
    store: &CatalogStore,
    rules: &PluralRules,
    config: &DiagnosticsConfig,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let language = store.language().unwrap_or_default();
    tracing::debug!("Checking catalog '{}'", language);

    let mut unfinished = 0;
    for entry in store.entries() {
        if entry.status == Status::Unfinished {
            unfinished += 1;
            continue;
        }
        if config.placeholders {
            check_placeholders(entry, &mut diagnostics);
        }
        if config.numerus_count
            && let Translations::Plural(forms) = &entry.translations
        {
            let expected = rules.rule_for(language).category_count();
            if forms.len() != expected {
                diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    kind: DiagnosticKind::NumerusFormCount,
                    position: entry.position,
                    message: format!(
                        "'{}' has {} plural forms, but '{language}' uses {expected}",
                        entry.key(),
                        forms.len()
                    ),
                });
            }
        }
    }

    for duplicate in store.duplicates() {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            kind: DiagnosticKind::DuplicateKey,
            position: duplicate.discarded,
            message: format!(
                "Duplicate message '{}::{}' ignored, the entry at {} is used",
                duplicate.context, duplicate.source, duplicate.kept
            ),
        });
    }

    if unfinished > 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Information,
            kind: DiagnosticKind::Unfinished,
            position: SourcePosition::START,
            message: format!("{unfinished} of {} translations are unfinished", store.len()),
        });
    }

    diagnostics.sort_by_key(|diagnostic| diagnostic.position);
    diagnostics
}

/// プレースホルダーの過不足をチェック
///
/// A source `%N` only needs to appear in one of the plural forms; each form may only use
/// placeholders the source has. Both are reported at most once per entry.
fn check_placeholders(entry: &CatalogEntry, diagnostics: &mut Vec<Diagnostic>) {
    let mut forms = entry.translations.forms().filter(|form| !form.is_empty()).peekable();
    if forms.peek().is_none() {
        return;
    }
    let expected = placeholders(&entry.source);
    let found: BTreeSet<u8> = forms.flat_map(placeholders).collect();

    let report = |kind, numbers: BTreeSet<&u8>, what: &str| Diagnostic {
        severity: Severity::Warning,
        kind,
        position: entry.position,
        message: format!(
            "Translation of '{}' {what} {}",
            entry.key(),
            numbers.iter().map(|n| format!("%{n}")).collect::<Vec<_>>().join(", ")
        ),
    };

    let missing: BTreeSet<_> = expected.difference(&found).collect();
    if !missing.is_empty() {
        diagnostics.push(report(DiagnosticKind::MissingPlaceholder, missing, "is missing"));
    }
    let unexpected: BTreeSet<_> = found.difference(&expected).collect();
    if !unexpected.is_empty() {
        diagnostics.push(report(
            DiagnosticKind::UnexpectedPlaceholder,
            unexpected,
            "uses unknown placeholder",
        ));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::test_utils::{
        create_store,
        message,
        numerus_message,
    };

    fn check(store: &CatalogStore) -> Vec<Diagnostic> {
        check_store(store, &PluralRules::builtin(), &DiagnosticsConfig::default())
    }

    #[googletest::test]
    fn test_clean_catalog_has_no_diagnostics() {
        let body = format!(
            "{}{}",
            message("Ctx", "%1 of %2", "%2 z %1", ""),
            numerus_message("Find", "%n found", &["%n jeden", "%n kilka", "%n wiele"]),
        );

        expect_that!(check(&create_store("pl", &body)), is_empty());
    }

    #[googletest::test]
    fn test_missing_and_unexpected_placeholders() {
        let body = message("Ctx", "Copy %1 to %2", "Kopiuj %1 do %3", "");

        let diagnostics = check(&create_store("pl", &body));

        assert_that!(diagnostics, len(eq(2)));
        expect_that!(
            diagnostics,
            each(field!(Diagnostic.severity, eq(&Severity::Warning)))
        );
        expect_that!(
            diagnostics,
            contains(all![
                field!(Diagnostic.kind, eq(&DiagnosticKind::MissingPlaceholder)),
                field!(Diagnostic.message, contains_substring("%2"))
            ])
        );
        expect_that!(
            diagnostics,
            contains(all![
                field!(Diagnostic.kind, eq(&DiagnosticKind::UnexpectedPlaceholder)),
                field!(Diagnostic.message, contains_substring("%3"))
            ])
        );
    }

    #[googletest::test]
    fn test_placeholder_used_by_some_plural_forms_only() {
        let body = numerus_message(
            "Find",
            "%n matches in %1",
            &["jedno trafienie", "%n trafienia w %1", "%n trafień w %1"],
        );

        expect_that!(check(&create_store("pl", &body)), is_empty());
    }

    #[googletest::test]
    fn test_placeholder_missing_from_every_plural_form() {
        let body = numerus_message(
            "Find",
            "%n matches in %1",
            &["jedno trafienie", "%n trafienia", "%n trafień w %2"],
        );

        let diagnostics = check(&create_store("pl", &body));

        assert_that!(diagnostics, len(eq(2)));
        expect_that!(
            diagnostics,
            contains(all![
                field!(Diagnostic.kind, eq(&DiagnosticKind::MissingPlaceholder)),
                field!(Diagnostic.message, contains_substring("is missing %1"))
            ])
        );
        expect_that!(
            diagnostics,
            contains(all![
                field!(Diagnostic.kind, eq(&DiagnosticKind::UnexpectedPlaceholder)),
                field!(Diagnostic.message, contains_substring("%2"))
            ])
        );
    }

    #[googletest::test]
    fn test_numerus_form_count_mismatch() {
        let body = numerus_message("Find", "%n found", &["%n jeden", "%n wiele"]);

        let diagnostics = check(&create_store("pl", &body));

        assert_that!(diagnostics, len(eq(1)));
        expect_that!(diagnostics[0].kind, eq(DiagnosticKind::NumerusFormCount));
        expect_that!(diagnostics[0].message, contains_substring("uses 3"));
    }

    #[googletest::test]
    fn test_duplicate_key_and_unfinished_summary() {
        let body = format!(
            "{}{}{}",
            message("Ctx", "Key", "A", ""),
            message("Ctx", "Key", "B", ""),
            r#"
<context><name>Ctx</name><message><source>Draft</source><translation type="unfinished"/></message></context>"#,
        );

        let diagnostics = check(&create_store("pl", &body));

        assert_that!(diagnostics, len(eq(2)));
        // the summary is reported at the start of the document
        expect_that!(diagnostics[0].kind, eq(DiagnosticKind::Unfinished));
        expect_that!(diagnostics[0].severity, eq(Severity::Information));
        expect_that!(diagnostics[0].message, contains_substring("1 of 2"));
        expect_that!(diagnostics[1].kind, eq(DiagnosticKind::DuplicateKey));
    }

    #[googletest::test]
    fn test_checks_can_be_disabled() {
        let body = format!(
            "{}{}",
            message("Ctx", "Copy %1", "Kopiuj", ""),
            numerus_message("Find", "%n found", &["%n"]),
        );
        let config = DiagnosticsConfig { placeholders: false, numerus_count: false };

        let diagnostics =
            check_store(&create_store("pl", &body), &PluralRules::builtin(), &config);

        expect_that!(diagnostics, is_empty());
    }
}
