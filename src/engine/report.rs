//! Reporting of lookups that fell back to the source text.

use std::sync::{
    Mutex,
    PoisonError,
};

use serde::Serialize;

use crate::catalog::KeyRef;

/// Why a lookup fell back to the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MissKind {
    /// No entry for the key
    NotFound,
    /// The entry is marked unfinished
    Unfinished,
    /// The entry (or the selected plural form) has no text
    EmptyTranslation,
}

/// A lookup that did not produce a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Miss<'a> {
    pub key: KeyRef<'a>,
    /// Language of the store that was queried
    pub language: Option<&'a str>,
    pub kind: MissKind,
}

/// Receives misses from a [`Translator`](super::Translator).
///
/// Called on the lookup path, so implementations should be cheap.
pub trait MissReporter: Send + Sync {
    fn report(&self, miss: &Miss<'_>);
}

/// Logs every miss at `debug` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl MissReporter for TracingReporter {
    fn report(&self, miss: &Miss<'_>) {
        tracing::debug!(
            key = %miss.key,
            language = miss.language,
            kind = ?miss.kind,
            "Falling back to source text"
        );
    }
}

/// Discards all misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl MissReporter for SilentReporter {
    fn report(&self, _miss: &Miss<'_>) {}
}

/// Owned copy of a [`Miss`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMiss {
    pub context: String,
    pub source: String,
    pub disambiguation: Option<String>,
    pub kind: MissKind,
}

/// Records misses in memory, e.g. to list untranslated strings seen at runtime.
#[derive(Debug, Default)]
pub struct MissCollector {
    /// Misses in the order they were reported
    misses: Mutex<Vec<RecordedMiss>>,
}

impl MissCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the misses recorded so far.
    #[must_use]
    pub fn misses(&self) -> Vec<RecordedMiss> {
        self.misses.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Removes and returns the recorded misses.
    pub fn take(&self) -> Vec<RecordedMiss> {
        std::mem::take(&mut *self.misses.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl MissReporter for MissCollector {
    fn report(&self, miss: &Miss<'_>) {
        let recorded = RecordedMiss {
            context: miss.key.context.to_string(),
            source: miss.key.source.to_string(),
            disambiguation: miss.key.disambiguation.map(str::to_string),
            kind: miss.kind,
        };
        self.misses.lock().unwrap_or_else(PoisonError::into_inner).push(recorded);
    }
}
