#![forbid(unsafe_code)]

//! Two-form plural model for pluralized string templates.
//!
//! A pluralized template stores exactly two forms per locale, `one` and
//! `other`, selected by a numeric count parameter. This is a deliberate
//! reduction of the full CLDR category set — the schema's wire format
//! only carries these two forms.

use serde::{Deserialize, Serialize};

/// Which stored form a count selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralForm {
    /// Singular form.
    One,
    /// Everything else.
    Other,
}

impl PluralForm {
    /// The wire/storage key of this form.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            PluralForm::One => "one",
            PluralForm::Other => "other",
        }
    }
}

/// The two stored forms of a pluralized template value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluralForms {
    /// Singular text.
    pub one: String,
    /// Plural text.
    pub other: String,
}

impl PluralForms {
    /// Text for the given form.
    #[must_use]
    pub fn select(&self, form: PluralForm) -> &str {
        match form {
            PluralForm::One => &self.one,
            PluralForm::Other => &self.other,
        }
    }
}

/// Select the form a locale uses for `count`.
///
/// Negative counts use their absolute value. Locales whose primary
/// subtag is French-family (`fr`, `pt`) treat 0 as singular; every other
/// locale is singular only at ±1. Unknown locales never panic — they
/// fall back to the ±1 rule.
#[must_use]
pub fn form_for(locale: &str, count: i64) -> PluralForm {
    let primary = locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_ascii_lowercase();
    let magnitude = count.unsigned_abs();
    let one = match primary.as_str() {
        "fr" | "pt" => magnitude <= 1,
        _ => magnitude == 1,
    };
    if one { PluralForm::One } else { PluralForm::Other }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
