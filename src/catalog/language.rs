//! Language identifier helpers

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// ISO 639 primary language subtags recognised in catalog file names.
static LANGUAGE_CODES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "af", "ar", "az", "be", "bg", "bn", "bs", "ca", "cs", "cy", "da", "de", "el", "en", "eo",
        "es", "et", "eu", "fa", "fi", "fil", "fo", "fr", "ga", "gd", "gl", "gu", "he", "hi", "hr",
        "hu", "hy", "id", "is", "it", "ja", "ka", "kk", "km", "kn", "ko", "ky", "lo", "lt", "lv",
        "mk", "ml", "mn", "mr", "ms", "mt", "my", "nb", "ne", "nl", "nn", "no", "oc", "pa", "pl",
        "ps", "pt", "ro", "ru", "sk", "sl", "sq", "sr", "sv", "sw", "ta", "te", "th", "tl", "tr",
        "tt", "ug", "uk", "ur", "uz", "vi", "zh", "zu",
    ]
    .into_iter()
    .collect()
});

/// Normalize language code (lowercase and replace - with _)
#[must_use]
pub fn normalize_language_code(code: &str) -> String {
    code.to_lowercase().replace('-', "_")
}

/// Primary subtag of a language identifier, lowercased (`pt_BR` → `pt`).
#[must_use]
pub fn primary_subtag(code: &str) -> String {
    code.split(['_', '-', '.', '@']).next().unwrap_or(code).to_ascii_lowercase()
}

/// Detect language from a catalog file path heuristically.
///
/// The file stem is split into `.` separated parts and each part into `_`/`-` separated
/// tokens, searched backwards for a known language code optionally followed by a region or
/// script subtag. Only when the file name carries no code are the parent directories
/// consulted, and a directory counts only when its whole name is a code (`i18n/de/`).
///
/// # Examples
/// - `translations/qtcreator_pl.ts` → `pl`
/// - `translations/app_pt_BR.ts` → `pt_BR`
/// - `i18n/de/app.ts` → `de`
/// - `build-tr/app.ts` → `None`
///
/// # Returns
/// Detected language code, or `None` when nothing in the path looks like one.
#[must_use]
pub fn detect_language_from_path(file_path: &Path) -> Option<String> {
    let stem = file_path.file_stem().map(|stem| stem.to_string_lossy()).unwrap_or_default();
    if let Some(code) = stem.rsplit('.').find_map(language_suffix) {
        return Some(code);
    }

    file_path
        .parent()?
        .components()
        .rev()
        .find_map(|component| language_exact(&component.as_os_str().to_string_lossy()))
}

/// `part` as a whole is a language code, e.g. `de` or `pt_BR`.
fn language_exact(part: &str) -> Option<String> {
    match part.split(['_', '-']).collect::<Vec<_>>().as_slice() {
        [language] if is_language(language) => Some((*language).to_string()),
        [language, region] if is_language(language) && is_subtag(region) => {
            Some(format!("{language}_{region}"))
        }
        _ => None,
    }
}

/// Finds a language code at the end of `part`, e.g. `app_pt_BR` → `pt_BR`.
fn language_suffix(part: &str) -> Option<String> {
    let tokens: Vec<&str> = part.split(['_', '-']).collect();

    if let [.., language, region] = tokens.as_slice()
        && is_language(language)
        && is_subtag(region)
    {
        return Some(format!("{language}_{region}"));
    }
    tokens.last().filter(|token| is_language(token)).map(|token| (*token).to_string())
}

fn is_language(token: &str) -> bool {
    LANGUAGE_CODES.contains(token.to_ascii_lowercase().as_str())
}

/// Region (`BR`, `419`) or script (`Latn`) subtag.
fn is_subtag(token: &str) -> bool {
    match token.len() {
        2 => token.chars().all(|c| c.is_ascii_alphabetic()),
        3 => token.chars().all(|c| c.is_ascii_digit()),
        4 => token.chars().all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}
