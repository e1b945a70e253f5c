//! Plural (numerus) form selection.
//!
//! A numerus message stores one translation per grammatical plural category of the target
//! language. [`PluralRule::index`] maps a cardinal count to the position of the matching form.
//! Every rule is total: any `u64` yields an index below [`PluralRule::category_count`].

use std::collections::HashMap;

use crate::catalog::language::{
    normalize_language_code,
    primary_subtag,
};

/// Built-in plural rules, one per language family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralRule {
    /// No plural distinction (Chinese, Japanese, Korean, Turkish, ...).
    OneForm,
    /// `one` for 1, `other` for everything else.
    English,
    /// `one` for 0 and 1.
    French,
    /// `one` ending in 1 except 11, `other` non-zero, `zero`.
    Latvian,
    /// `one`, `two`, `other`.
    Irish,
    /// `one`, `few` for 0 and numbers ending in 01-19, `other`.
    Romanian,
    /// `one`, `few`, `other`, distinguished by the last two digits.
    Lithuanian,
    /// Russian, Ukrainian, Belarusian, Serbian, Croatian, Bosnian: `one`, `few`, `many`.
    Slavic,
    /// Czech and Slovak: `one`, `few` for 2-4, `other`.
    Czech,
    /// `one` only for 1, `few` ending in 2-4 except 12-14, `many`.
    Polish,
    /// `one`, `two`, `few`, `other` by the last two digits.
    Slovenian,
    /// `one` ending in 1, `two` ending in 2, `other`.
    Macedonian,
    /// `one`, `few`, `many`, `other`.
    Maltese,
    /// `zero`, `one`, `two`, `few`, `many`, `other`.
    Arabic,
    /// `one`, `two`, `few` for 8 and 11, `other`.
    Welsh,
    /// `one` ending in 1 except 11, `other`.
    Icelandic,
}

impl PluralRule {
    /// Number of plural forms a catalog for this rule carries.
    #[must_use]
    pub const fn category_count(self) -> usize {
        self.category_names().len()
    }

    /// CLDR-style category names in form order.
    #[must_use]
    pub const fn category_names(self) -> &'static [&'static str] {
        match self {
            Self::OneForm => &["other"],
            Self::English | Self::French | Self::Icelandic => &["one", "other"],
            Self::Latvian => &["one", "other", "zero"],
            Self::Irish | Self::Macedonian => &["one", "two", "other"],
            Self::Romanian | Self::Lithuanian | Self::Czech => &["one", "few", "other"],
            Self::Slavic | Self::Polish => &["one", "few", "many"],
            Self::Slovenian | Self::Welsh => &["one", "two", "few", "other"],
            Self::Maltese => &["one", "few", "many", "other"],
            Self::Arabic => &["zero", "one", "two", "few", "many", "other"],
        }
    }

    /// Index of the plural form to use for `n`.
    #[must_use]
    pub const fn index(self, n: u64) -> usize {
        let mod10 = n % 10;
        let mod100 = n % 100;
        // "ends in 2-4, but not in 12-14"
        let few_slavic = mod10 >= 2 && mod10 <= 4 && (mod100 < 10 || mod100 >= 20);

        match self {
            Self::OneForm => 0,
            Self::English => usize_from(n != 1),
            Self::French => usize_from(n > 1),
            Self::Icelandic => usize_from(!(mod10 == 1 && mod100 != 11)),
            Self::Latvian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Macedonian => match mod10 {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (mod100 >= 1 && mod100 <= 19) {
                    1
                } else {
                    2
                }
            }
            Self::Lithuanian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if mod10 >= 2 && (mod100 < 10 || mod100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Slavic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if few_slavic {
                    1
                } else {
                    2
                }
            }
            Self::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Polish => {
                if n == 1 {
                    0
                } else if few_slavic {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match mod100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Maltese => {
                if n == 1 {
                    0
                } else if n == 0 || (mod100 >= 2 && mod100 <= 10) {
                    1
                } else if mod100 >= 11 && mod100 <= 19 {
                    2
                } else {
                    3
                }
            }
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if mod100 >= 3 && mod100 <= 10 => 3,
                _ if mod100 >= 11 => 4,
                _ => 5,
            },
            Self::Welsh => match n {
                1 => 0,
                2 => 1,
                8 | 11 => 2,
                _ => 3,
            },
        }
    }

    /// Built-in rule for a language identifier, if the language is known.
    ///
    /// Full tags are checked before the primary subtag, so `pt_BR` can differ from `pt`.
    #[must_use]
    pub fn for_language(language: &str) -> Option<Self> {
        let normalized = normalize_language_code(language);
        if let Some(rule) = Self::for_tag(&normalized) {
            return Some(rule);
        }
        Self::for_tag(&primary_subtag(&normalized))
    }

    /// Lookup of a single normalized tag.
    fn for_tag(tag: &str) -> Option<Self> {
        let rule = match tag {
            "bo" | "dz" | "fa" | "hu" | "id" | "ja" | "jv" | "ka" | "km" | "ko" | "lo" | "ms"
            | "my" | "su" | "th" | "tr" | "tt" | "ug" | "vi" | "yo" | "zh" => Self::OneForm,
            "af" | "bg" | "ca" | "da" | "de" | "el" | "en" | "eo" | "es" | "et" | "eu" | "fi"
            | "fo" | "fy" | "gl" | "gu" | "he" | "it" | "kk" | "kn" | "ky" | "lb" | "ml" | "mn"
            | "mr" | "nb" | "ne" | "nl" | "nn" | "no" | "pa" | "ps" | "pt" | "sq" | "sv" | "sw"
            | "ta" | "te" | "ur" | "uz" | "zu" => Self::English,
            "ak" | "am" | "bn" | "fil" | "fr" | "hi" | "ln" | "oc" | "pt_br" | "ti" | "tl"
            | "wa" => Self::French,
            "lv" => Self::Latvian,
            "ga" => Self::Irish,
            "mo" | "ro" => Self::Romanian,
            "lt" => Self::Lithuanian,
            "be" | "bs" | "hr" | "ru" | "sh" | "sr" | "uk" => Self::Slavic,
            "cs" | "sk" => Self::Czech,
            "pl" => Self::Polish,
            "sl" => Self::Slovenian,
            "mk" => Self::Macedonian,
            "mt" => Self::Maltese,
            "ar" => Self::Arabic,
            "cy" => Self::Welsh,
            "is" => Self::Icelandic,
            _ => return None,
        };
        Some(rule)
    }
}

/// `false` → 0, `true` → 1.
const fn usize_from(value: bool) -> usize {
    if value { 1 } else { 0 }
}

/// Language → rule table: the built-in rules plus caller overrides.
#[derive(Debug, Clone, Default)]
pub struct PluralRules {
    /// Overrides keyed by normalized language code (`pt_br`, `pl`)
    overrides: HashMap<String, PluralRule>,
}

impl PluralRules {
    /// Table with only the built-in rules.
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Adds or replaces the rule used for `language`.
    ///
    /// A bare primary subtag (`pt`) applies to all its regional variants unless a more
    /// specific override (`pt_BR`) exists.
    #[must_use]
    pub fn with_rule(mut self, language: &str, rule: PluralRule) -> Self {
        self.overrides.insert(normalize_language_code(language), rule);
        self
    }

    /// Rule for a language. Unknown languages use the English rule.
    #[must_use]
    pub fn rule_for(&self, language: &str) -> PluralRule {
        let normalized = normalize_language_code(language);
        let primary = primary_subtag(&normalized);

        self.overrides
            .get(&normalized)
            .or_else(|| self.overrides.get(&primary))
            .copied()
            .or_else(|| PluralRule::for_language(&normalized))
            .unwrap_or_else(|| {
                tracing::trace!(language, "No plural rule for language, using English rule");
                PluralRule::English
            })
    }

    /// Index of the plural form for `n` in `language`.
    #[must_use]
    pub fn select(&self, language: &str, n: u64) -> usize {
        self.rule_for(language).index(n)
    }
}

/// Index of the plural form for `n` using the built-in rules.
#[must_use]
pub fn select(language: &str, n: u64) -> usize {
    PluralRule::for_language(language).unwrap_or(PluralRule::English).index(n)
}
