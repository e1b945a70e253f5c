//! Immutable, indexed catalog for one language.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use super::entry::{
    CatalogEntry,
    KeyRef,
    Status,
};
use super::error::LoadError;
use super::language::detect_language_from_path;
use super::parser::{
    CatalogHeader,
    ParsedCatalog,
    parse_catalog,
};
use crate::types::SourcePosition;

/// Which entry survives when a catalog repeats a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// The entry appearing later in the document replaces the earlier one.
    #[default]
    LastWins,
    /// The first entry is kept and later ones are ignored.
    FirstWins,
}

/// Options for building a [`CatalogStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub duplicate_policy: DuplicatePolicy,
    /// Used instead of the `language` attribute of the document when set.
    pub language: Option<String>,
}

/// A key that occurred more than once while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateKey {
    pub context: String,
    pub source: String,
    pub disambiguation: Option<String>,
    /// Position of the entry that was kept
    pub kept: SourcePosition,
    /// Position of the entry that was discarded
    pub discarded: SourcePosition,
}

/// Entry counts of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub finished: usize,
    pub unfinished: usize,
    pub obsolete: usize,
    pub vanished: usize,
    pub plural: usize,
    pub duplicates: usize,
}

/// `context → source → slots`, one slot per distinct disambiguation.
#[derive(Debug, Clone, Default)]
struct KeyIndex {
    /// Nested map so lookups borrow `&str` without building an owned key
    by_context: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl KeyIndex {
    fn get(&self, entries: &[CatalogEntry], key: KeyRef<'_>) -> Option<usize> {
        self.by_context
            .get(key.context)?
            .get(key.source)?
            .iter()
            .copied()
            .find(|&slot| {
                entries.get(slot).is_some_and(|e| e.disambiguation.as_deref() == key.disambiguation)
            })
    }

    fn insert(&mut self, key: KeyRef<'_>, slot: usize) {
        self.by_context
            .entry(key.context.to_string())
            .or_default()
            .entry(key.source.to_string())
            .or_default()
            .push(slot);
    }
}

/// Accumulates entries and applies the duplicate policy.
#[derive(Debug, Default)]
struct StoreBuilder {
    /// Policy applied on key collisions
    policy: DuplicatePolicy,
    /// Finished and unfinished entries
    active: Partition,
    /// Obsolete entries, kept for diagnostics
    obsolete: Partition,
    /// Dropped entries
    vanished: usize,
    /// Collisions seen so far
    duplicates: Vec<DuplicateKey>,
}

/// Entries plus their key index.
#[derive(Debug, Clone, Default)]
struct Partition {
    /// Entries in document order
    entries: Vec<CatalogEntry>,
    /// Key → slot in `entries`
    index: KeyIndex,
}

impl Partition {
    fn lookup(&self, key: KeyRef<'_>) -> Option<&CatalogEntry> {
        self.index.get(&self.entries, key).and_then(|slot| self.entries.get(slot))
    }

    /// Inserts `entry`, returning the collision if its key was already present.
    fn insert(&mut self, entry: CatalogEntry, policy: DuplicatePolicy) -> Option<DuplicateKey> {
        let Some(slot) = self.index.get(&self.entries, entry.key()) else {
            self.index.insert(entry.key(), self.entries.len());
            self.entries.push(entry);
            return None;
        };
        let existing = self.entries.get_mut(slot)?;

        let duplicate = DuplicateKey {
            context: entry.context.clone(),
            source: entry.source.clone(),
            disambiguation: entry.disambiguation.clone(),
            kept: match policy {
                DuplicatePolicy::LastWins => entry.position,
                DuplicatePolicy::FirstWins => existing.position,
            },
            discarded: match policy {
                DuplicatePolicy::LastWins => existing.position,
                DuplicatePolicy::FirstWins => entry.position,
            },
        };
        if policy == DuplicatePolicy::LastWins {
            *existing = entry;
        }
        Some(duplicate)
    }
}

impl StoreBuilder {
    fn new(policy: DuplicatePolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    fn push(&mut self, entry: CatalogEntry) {
        let duplicate = match entry.status {
            Status::Finished | Status::Unfinished => self.active.insert(entry, self.policy),
            Status::Obsolete => self.obsolete.insert(entry, self.policy),
            Status::Vanished => {
                self.vanished += 1;
                None
            }
        };
        if let Some(duplicate) = duplicate {
            tracing::warn!(
                context = duplicate.context,
                source = duplicate.source,
                kept = %duplicate.kept,
                discarded = %duplicate.discarded,
                "Duplicate catalog key"
            );
            self.duplicates.push(duplicate);
        }
    }

    fn finish(self, header: CatalogHeader) -> CatalogStore {
        CatalogStore {
            header,
            active: self.active,
            obsolete: self.obsolete,
            vanished: self.vanished,
            duplicates: self.duplicates,
        }
    }
}

/// All messages of one catalog, indexed by `(context, source, disambiguation)`.
///
/// Built once and never mutated afterwards, so a store can be shared between threads
/// (typically behind an `Arc`) without locking.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    /// Root element attributes
    header: CatalogHeader,
    /// Entries visible to lookups
    active: Partition,
    /// Obsolete entries, visible to diagnostics only
    obsolete: Partition,
    /// Number of vanished entries dropped while loading
    vanished: usize,
    /// Collisions resolved by the duplicate policy
    duplicates: Vec<DuplicateKey>,
}

impl CatalogStore {
    /// Loads a catalog from raw bytes with default options.
    ///
    /// # Errors
    /// Returns [`LoadError`] if the input is not a well-formed catalog.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        Self::load(bytes, &LoadOptions::default())
    }

    /// Loads a catalog file with default options.
    ///
    /// # Errors
    /// Returns [`LoadError`] if the file cannot be read or is not a well-formed catalog.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        Self::load_path(path, &LoadOptions::default())
    }

    /// Loads a catalog from raw bytes.
    ///
    /// # Errors
    /// Returns [`LoadError`] if the input is not a well-formed catalog.
    pub fn load(bytes: &[u8], options: &LoadOptions) -> Result<Self, LoadError> {
        let ParsedCatalog { mut header, messages } = parse_catalog(bytes)?;
        if let Some(language) = &options.language {
            header.language = Some(language.clone());
        }

        let mut builder = StoreBuilder::new(options.duplicate_policy);
        for entry in messages {
            builder.push(entry);
        }
        let store = builder.finish(header);

        tracing::debug!(
            language = ?store.language(),
            entries = store.len(),
            obsolete = store.obsolete.entries.len(),
            vanished = store.vanished,
            "Catalog loaded"
        );
        Ok(store)
    }

    /// Loads a catalog file. When the document declares no language, it is detected from
    /// the file name.
    ///
    /// # Errors
    /// Returns [`LoadError`] if the file cannot be read or is not a well-formed catalog.
    pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
        tracing::debug!("Loading catalog from: {:?}", path);
        let bytes = std::fs::read(path)
            .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;

        let mut store = Self::load(&bytes, options)?;
        if store.header.language.is_none() {
            store.header.language = detect_language_from_path(path);
            tracing::debug!(language = ?store.header.language, "Detected catalog language from path");
        }
        Ok(store)
    }

    /// Builds a store from entries that did not come from a document.
    #[must_use]
    pub fn from_entries(
        language: Option<String>,
        entries: impl IntoIterator<Item = CatalogEntry>,
        policy: DuplicatePolicy,
    ) -> Self {
        let mut builder = StoreBuilder::new(policy);
        for entry in entries {
            builder.push(entry);
        }
        builder.finish(CatalogHeader { language, ..CatalogHeader::default() })
    }

    /// Combines two catalogs of the same language; on collisions `policy` treats `other`
    /// as the later document.
    #[must_use]
    pub fn merge(self, other: Self, policy: DuplicatePolicy) -> Self {
        let mut builder = StoreBuilder::new(policy);
        builder.vanished = self.vanished + other.vanished;
        builder.duplicates = self.duplicates;
        builder.duplicates.extend(other.duplicates);

        for entry in self.active.entries.into_iter().chain(self.obsolete.entries) {
            builder.push(entry);
        }
        for entry in other.active.entries.into_iter().chain(other.obsolete.entries) {
            builder.push(entry);
        }

        let mut header = self.header;
        if header.language.is_none() {
            header.language = other.header.language;
        }
        builder.finish(header)
    }

    /// Finds the finished or unfinished entry for a key.
    ///
    /// An empty `disambiguation` is the same as none.
    #[must_use]
    pub fn lookup(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
    ) -> Option<&CatalogEntry> {
        self.active.lookup(KeyRef::new(context, source, disambiguation))
    }

    /// Finds an obsolete entry for a key. Never used for display.
    #[must_use]
    pub fn lookup_obsolete(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
    ) -> Option<&CatalogEntry> {
        self.obsolete.lookup(KeyRef::new(context, source, disambiguation))
    }

    /// Finished and unfinished entries in document order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.active.entries
    }

    #[must_use]
    pub fn obsolete_entries(&self) -> &[CatalogEntry] {
        &self.obsolete.entries
    }

    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateKey] {
        &self.duplicates
    }

    /// Number of entries visible to lookups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.entries.is_empty()
    }

    /// Target language declared by the catalog (e.g. `pl_PL`).
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.header.language.as_deref()
    }

    #[must_use]
    pub fn source_language(&self) -> Option<&str> {
        self.header.source_language.as_deref()
    }

    /// Schema version of the document (e.g. `2.1`).
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.header.version.as_deref()
    }

    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            obsolete: self.obsolete.entries.len(),
            vanished: self.vanished,
            duplicates: self.duplicates.len(),
            ..CatalogStats::default()
        };
        for entry in &self.active.entries {
            match entry.status {
                Status::Finished => stats.finished += 1,
                _ => stats.unfinished += 1,
            }
            if entry.translations.is_plural() {
                stats.plural += 1;
            }
        }
        stats
    }
}

impl FromStr for CatalogStore {
    type Err = LoadError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(text.as_bytes())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::catalog::entry::Translations;
    use crate::test_utils::{
        message,
        ts_document,
    };

    fn store_with(body: &str, policy: DuplicatePolicy) -> CatalogStore {
        let options = LoadOptions { duplicate_policy: policy, language: None };
        CatalogStore::load(ts_document("pl", body).as_bytes(), &options).unwrap()
    }

    #[googletest::test]
    fn test_lookup_finished_entry() {
        let store: CatalogStore = ts_document(
            "pl",
            &message("AttachCoreDialog", "Executable:", "Plik wykonywalny:", ""),
        )
        .parse()
        .unwrap();

        let entry = store.lookup("AttachCoreDialog", "Executable:", None);

        assert_that!(entry, some(anything()));
        let entry = entry.unwrap();
        expect_that!(entry.translations, eq(&Translations::Single("Plik wykonywalny:".into())));
        expect_that!(store.lookup("AttachCoreDialog", "Executable:", Some("")), some(anything()));
        expect_that!(store.lookup("OtherDialog", "Executable:", None), none());
        expect_that!(store.lookup("AttachCoreDialog", "Executable", None), none());
        expect_that!(store.language(), some(eq("pl")));
        expect_that!(store.source_language(), some(eq("en")));
        expect_that!(store.version(), some(eq("2.1")));
    }

    #[googletest::test]
    fn test_disambiguation_distinguishes_entries() {
        let body = format!(
            "{}{}",
            message("Menu", "Open", "Otwórz", "verb"),
            message("Menu", "Open", "Otwarty", "adjective"),
        );
        let store = store_with(&body, DuplicatePolicy::LastWins);

        expect_that!(store.len(), eq(2));
        expect_that!(store.duplicates(), is_empty());
        let verb = store.lookup("Menu", "Open", Some("verb")).unwrap();
        expect_that!(verb.translations, eq(&Translations::Single("Otwórz".into())));
        let adjective = store.lookup("Menu", "Open", Some("adjective")).unwrap();
        expect_that!(adjective.translations, eq(&Translations::Single("Otwarty".into())));
        expect_that!(store.lookup("Menu", "Open", None), none());
    }

    #[rstest]
    #[case::last_wins(DuplicatePolicy::LastWins, "Second")]
    #[case::first_wins(DuplicatePolicy::FirstWins, "First")]
    fn test_duplicate_policy(#[case] policy: DuplicatePolicy, #[case] expected: &str) {
        let body = format!(
            "{}{}",
            message("Ctx", "Key", "First", ""),
            message("Ctx", "Key", "Second", ""),
        );
        let store = store_with(&body, policy);

        assert_eq!(store.len(), 1);
        assert_eq!(store.duplicates().len(), 1);
        let entry = store.lookup("Ctx", "Key", None).unwrap();
        assert_eq!(entry.translations, Translations::Single(expected.to_string()));
    }

    #[googletest::test]
    fn test_obsolete_and_vanished_entries_are_not_returned() {
        let body = r#"
<context>
    <name>Ctx</name>
    <message>
        <source>Old</source>
        <translation type="obsolete">Stary</translation>
    </message>
    <message>
        <source>Gone</source>
        <translation type="vanished">Zniknął</translation>
    </message>
    <message>
        <source>Draft</source>
        <translation type="unfinished">Szkic</translation>
    </message>
</context>"#;
        let store = store_with(body, DuplicatePolicy::LastWins);

        expect_that!(store.lookup("Ctx", "Old", None), none());
        expect_that!(store.lookup_obsolete("Ctx", "Old", None), some(anything()));
        expect_that!(store.lookup("Ctx", "Gone", None), none());
        expect_that!(store.lookup_obsolete("Ctx", "Gone", None), none());
        expect_that!(store.lookup("Ctx", "Draft", None), some(anything()));

        let stats = store.stats();
        expect_that!(stats.finished, eq(0));
        expect_that!(stats.unfinished, eq(1));
        expect_that!(stats.obsolete, eq(1));
        expect_that!(stats.vanished, eq(1));
    }

    #[googletest::test]
    fn test_obsolete_entry_does_not_collide_with_active_entry() {
        let body = r#"
<context>
    <name>Ctx</name>
    <message>
        <source>Save</source>
        <translation type="obsolete">Zachowaj</translation>
    </message>
    <message>
        <source>Save</source>
        <translation>Zapisz</translation>
    </message>
</context>"#;
        let store = store_with(body, DuplicatePolicy::LastWins);

        expect_that!(store.duplicates(), is_empty());
        let entry = store.lookup("Ctx", "Save", None).unwrap();
        expect_that!(entry.translations, eq(&Translations::Single("Zapisz".into())));
    }

    #[googletest::test]
    fn test_malformed_input_fails_whole_load() {
        let text = ts_document("pl", &format!("{}<context>", message("Ctx", "a", "b", "")));

        let result = CatalogStore::from_bytes(text.as_bytes());

        expect_that!(result, err(anything()));
    }

    #[googletest::test]
    fn test_loading_identical_bytes_twice_answers_identically() {
        let body = format!(
            "{}{}{}",
            message("A", "One", "Jeden", ""),
            message("A", "Two", "Dwa", "number"),
            message("B", "One", "Raz", ""),
        );
        let bytes = ts_document("pl", &body).into_bytes();

        let first = CatalogStore::from_bytes(&bytes).unwrap();
        let second = CatalogStore::from_bytes(&bytes).unwrap();

        for entry in first.entries() {
            let other = second.lookup(&entry.context, &entry.source, entry.disambiguation.as_deref());
            expect_that!(other, some(eq(entry)));
        }
    }

    #[googletest::test]
    fn test_load_path_detects_language_from_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app_cs.ts");
        fs::write(&path, "<TS version=\"2.1\"><context><name>a</name></context></TS>").unwrap();

        let store = CatalogStore::from_path(&path).unwrap();

        expect_that!(store.language(), some(eq("cs")));
    }

    #[googletest::test]
    fn test_load_path_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = CatalogStore::from_path(&temp_dir.path().join("missing.ts"));

        assert_that!(result, err(anything()));
        let error = result.unwrap_err();
        expect_that!(error.position(), none());
        expect_that!(error.to_string(), contains_substring("missing.ts"));
    }

    #[googletest::test]
    fn test_language_option_overrides_document() {
        let options = LoadOptions { language: Some("pl_PL".into()), ..LoadOptions::default() };

        let store = CatalogStore::load(ts_document("en", "").as_bytes(), &options).unwrap();

        expect_that!(store.language(), some(eq("pl_PL")));
    }

    #[googletest::test]
    fn test_merge_applies_policy_across_stores() {
        let first = store_with(
            &format!("{}{}", message("Ctx", "Key", "First", ""), message("Ctx", "Only", "A", "")),
            DuplicatePolicy::LastWins,
        );
        let second = store_with(&message("Ctx", "Key", "Second", ""), DuplicatePolicy::LastWins);

        let merged = first.merge(second, DuplicatePolicy::LastWins);

        expect_that!(merged.len(), eq(2));
        expect_that!(merged.duplicates(), len(eq(1)));
        let entry = merged.lookup("Ctx", "Key", None).unwrap();
        expect_that!(entry.translations, eq(&Translations::Single("Second".into())));
    }

    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CatalogStore>();
    }
}
