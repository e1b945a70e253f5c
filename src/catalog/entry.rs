//! Catalog entry definitions

use serde::Serialize;

use crate::types::SourcePosition;

/// Lifecycle state of a message, taken from the `type` attribute of `<translation>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Finished,
    Unfinished,
    Obsolete,
    Vanished,
}

impl Status {
    /// Maps a `type` attribute value to a status.
    ///
    /// A missing attribute means the translation is finished. Unknown values are treated as
    /// unfinished so they are never displayed.
    #[must_use]
    pub fn from_type_attribute(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::Finished,
            Some("unfinished") => Self::Unfinished,
            Some("obsolete") => Self::Obsolete,
            Some("vanished") => Self::Vanished,
            Some(other) => {
                tracing::warn!(value = other, "Unknown translation type, treating as unfinished");
                Self::Unfinished
            }
        }
    }

    /// Whether entries with this status take part in lookups.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Finished | Self::Unfinished)
    }
}

/// Translated text of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Translations {
    /// Plain message.
    Single(String),
    /// Numerus message: one form per plural category of the target language, never empty.
    Plural(Vec<String>),
}

impl Translations {
    /// An empty translation of the given shape.
    #[must_use]
    pub fn empty(numerus: bool) -> Self {
        if numerus { Self::Plural(vec![String::new()]) } else { Self::Single(String::new()) }
    }

    #[must_use]
    pub const fn is_plural(&self) -> bool {
        matches!(self, Self::Plural(_))
    }

    /// Returns true if no form carries any text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(text) => text.is_empty(),
            Self::Plural(forms) => forms.iter().all(String::is_empty),
        }
    }

    /// All forms in order (a single translation yields one form).
    pub fn forms(&self) -> impl Iterator<Item = &str> {
        let forms: &[String] = match self {
            Self::Single(text) => std::slice::from_ref(text),
            Self::Plural(forms) => forms,
        };
        forms.iter().map(String::as_str)
    }
}

/// A `<location>` reference to the code that uses the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub filename: Option<String>,
    /// Absolute (`"42"`) or relative (`"+3"`) line as written in the catalog.
    pub line: Option<String>,
}

/// One `<message>` of a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub context: String,
    pub source: String,
    /// The `<comment>` element; `None` when absent or empty.
    pub disambiguation: Option<String>,
    pub translations: Translations,
    pub status: Status,
    /// Developer guidance for translators (`<extracomment>`).
    pub extracomment: Option<String>,
    pub translator_comment: Option<String>,
    pub id: Option<String>,
    pub locations: Vec<Location>,
    /// Where the `<message>` element starts in the catalog document.
    pub position: SourcePosition,
}

impl CatalogEntry {
    /// Creates a finished, non-plural entry.
    #[must_use]
    pub fn new(
        context: impl Into<String>,
        source: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            disambiguation: None,
            translations: Translations::Single(translation.into()),
            status: Status::Finished,
            extracomment: None,
            translator_comment: None,
            id: None,
            locations: Vec::new(),
            position: SourcePosition::START,
        }
    }

    #[must_use]
    pub fn with_disambiguation(mut self, disambiguation: impl Into<String>) -> Self {
        self.disambiguation = normalize_disambiguation(Some(disambiguation.into()));
        self
    }

    #[must_use]
    pub fn with_plural_forms(mut self, forms: Vec<String>) -> Self {
        self.translations =
            if forms.is_empty() { Translations::empty(true) } else { Translations::Plural(forms) };
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn key(&self) -> KeyRef<'_> {
        KeyRef {
            context: &self.context,
            source: &self.source,
            disambiguation: self.disambiguation.as_deref(),
        }
    }
}

/// Borrowed composite lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRef<'a> {
    pub context: &'a str,
    pub source: &'a str,
    pub disambiguation: Option<&'a str>,
}

impl<'a> KeyRef<'a> {
    /// Builds a key, treating an empty disambiguation as none.
    #[must_use]
    pub fn new(context: &'a str, source: &'a str, disambiguation: Option<&'a str>) -> Self {
        Self { context, source, disambiguation: disambiguation.filter(|d| !d.is_empty()) }
    }
}

impl std::fmt::Display for KeyRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.disambiguation {
            Some(comment) => write!(f, "{}::{} ({comment})", self.context, self.source),
            None => write!(f, "{}::{}", self.context, self.source),
        }
    }
}

/// Empty comments carry no meaning, so they do not distinguish keys.
pub(crate) fn normalize_disambiguation(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
