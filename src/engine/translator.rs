//! Lookup façade: resolves a key against the active catalog and formats the result.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::report::{
    Miss,
    MissKind,
    MissReporter,
    TracingReporter,
};
use crate::catalog::{
    CatalogEntry,
    CatalogStore,
    KeyRef,
    Status,
    Translations,
};
use crate::config::CatalogSettings;
use crate::format::{
    Args,
    format_with_count,
};
use crate::indexer::CatalogSet;
use crate::plural::PluralRules;

/// Translates messages against an atomically replaceable [`CatalogStore`].
///
/// Lookups never fail: anything that cannot be translated falls back to the source text and
/// is reported to the configured [`MissReporter`]. The store can be replaced with
/// [`install`](Self::install) while other threads translate; each call sees either the old or
/// the new store, never a mix.
pub struct Translator {
    /// Active catalog
    store: ArcSwap<CatalogStore>,
    /// Plural rule table used for numerus messages
    rules: PluralRules,
    /// Receives lookups that fell back to the source text
    reporter: Arc<dyn MissReporter>,
    /// Retry a missed disambiguated lookup without the disambiguation
    fallback_to_undisambiguated: bool,
}

impl Translator {
    /// Creates a translator serving `store`.
    #[must_use]
    pub fn new(store: impl Into<Arc<CatalogStore>>) -> Self {
        Self {
            store: ArcSwap::new(store.into()),
            rules: PluralRules::builtin(),
            reporter: Arc::new(TracingReporter),
            fallback_to_undisambiguated: true,
        }
    }

    /// A translator without catalog; every lookup returns the source text.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(CatalogStore::default())
    }

    /// Creates a translator configured from settings.
    #[must_use]
    pub fn from_settings(store: impl Into<Arc<CatalogStore>>, settings: &CatalogSettings) -> Self {
        Self::new(store).with_undisambiguated_fallback(settings.fallback_to_undisambiguated)
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn MissReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn with_plural_rules(mut self, rules: PluralRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub const fn with_undisambiguated_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_undisambiguated = enabled;
        self
    }

    /// Replaces the active store, returning the previous one.
    pub fn install(&self, store: impl Into<Arc<CatalogStore>>) -> Arc<CatalogStore> {
        let store = store.into();
        tracing::debug!(language = ?store.language(), entries = store.len(), "Installing catalog");
        self.store.swap(store)
    }

    /// The active store.
    #[must_use]
    pub fn current(&self) -> Arc<CatalogStore> {
        self.store.load_full()
    }

    /// Installs the store for `language` from `set`.
    ///
    /// Returns `false` and keeps the active store when the set has no such language.
    pub fn switch_language(&self, set: &CatalogSet, language: &str) -> bool {
        let Some(store) = set.get(language) else {
            tracing::warn!(language, "No catalog for language, keeping current catalog");
            return false;
        };
        self.install(store);
        true
    }

    /// Translates `source` in `context`.
    ///
    /// `count` selects the plural form of numerus messages and replaces `%n`; `args` replace
    /// `%1`..`%9`.
    ///
    /// Without arguments and count the resolved text is returned verbatim, `%%` included, so a
    /// missing message always comes back as its exact source text. Passing any argument or a
    /// count runs the text through [`format_with_count`], which also collapses `%%` to `%`.
    #[must_use]
    pub fn translate(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        count: Option<i64>,
        args: &Args<'_>,
    ) -> String {
        let store = self.store.load();
        let key = KeyRef::new(context, source, disambiguation);
        let text = self.resolve(&store, key, count).unwrap_or(source);

        if args.is_empty() && count.is_none() {
            text.to_string()
        } else {
            format_with_count(text, count, args)
        }
    }

    /// Translates a plain message.
    #[must_use]
    pub fn tr(&self, context: &str, source: &str) -> String {
        self.translate(context, source, None, None, &[])
    }

    /// Translates a numerus message, replacing `%n` with `count`.
    #[must_use]
    pub fn tr_n(&self, context: &str, source: &str, count: i64) -> String {
        self.translate(context, source, None, Some(count), &[])
    }

    /// Finds the translated text for `key`, reporting a miss when there is none.
    fn resolve<'s>(
        &self,
        store: &'s CatalogStore,
        key: KeyRef<'_>,
        count: Option<i64>,
    ) -> Option<&'s str> {
        let language = store.language();
        let miss = |kind| self.reporter.report(&Miss { key, language, kind });

        let Some(entry) = self.find(store, key) else {
            miss(MissKind::NotFound);
            return None;
        };
        if entry.status == Status::Unfinished {
            miss(MissKind::Unfinished);
            return None;
        }

        let text = self.select_form(entry, language.unwrap_or_default(), count);
        if text.is_empty() {
            miss(MissKind::EmptyTranslation);
            return None;
        }
        Some(text)
    }

    fn find<'s>(&self, store: &'s CatalogStore, key: KeyRef<'_>) -> Option<&'s CatalogEntry> {
        let found = store.lookup(key.context, key.source, key.disambiguation);
        if found.is_some() || key.disambiguation.is_none() || !self.fallback_to_undisambiguated {
            return found;
        }
        store.lookup(key.context, key.source, None)
    }

    /// Picks the text of `entry` for `count`.
    ///
    /// Negative counts use their magnitude, a missing count selects the first form and an
    /// index past the last form selects the last one.
    fn select_form<'s>(
        &self,
        entry: &'s CatalogEntry,
        language: &str,
        count: Option<i64>,
    ) -> &'s str {
        match &entry.translations {
            Translations::Single(text) => text,
            Translations::Plural(forms) => {
                let index = count.map_or(0, |n| self.rules.select(language, n.unsigned_abs()));
                forms.get(index).or_else(|| forms.last()).map_or("", String::as_str)
            }
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.load();
        f.debug_struct("Translator")
            .field("language", &store.language())
            .field("entries", &store.len())
            .field("rules", &self.rules)
            .field("fallback_to_undisambiguated", &self.fallback_to_undisambiguated)
            .finish_non_exhaustive()
    }
}
