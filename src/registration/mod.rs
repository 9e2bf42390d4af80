//! Aircraft registration normalization.
//!
//! Registrations arrive in whatever shape the listing shows them: lower case,
//! with stray spaces, with or without the nationality-prefix hyphen. The
//! canonical form is what downstream joins key on:
//!
//! | Shape                         | Example in | Canonical |
//! |-------------------------------|------------|-----------|
//! | already hyphenated            | `c-fabc`   | `C-FABC`  |
//! | USA, `N` + digits + letters   | `n123ab`   | `N123AB`  |
//! | Canada, `C` + `F`/`G` + 3     | `CFABC`    | `C-FABC`  |
//! | single-letter prefix + 4      | `gabcd`    | `G-ABCD`  |
//! | two-character prefix + 3..5   | `9vabc`    | `9V-ABC`  |
//!
//! Rules are tried in the order above and the first match wins; later rules
//! overlap earlier ones (`CFABC` is also a valid single-letter shape), so the
//! order is part of the contract.

use regex::Regex;
use std::sync::LazyLock;

static HYPHEN_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());
static US_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^N\d{1,5}[A-Z]{0,2}$").unwrap());
static CANADA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^C[FG][A-Z]{3}$").unwrap());
static TWO_CHAR_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{2}[A-Z0-9]{3,5}$").unwrap());

/// Nationality prefixes written as a single letter before a 4-letter mark.
const SINGLE_LETTER_PREFIXES: &[char] = &['G', 'F', 'D', 'I', 'O', 'Y', 'M', 'S', 'T', 'C'];

/// Which rule a cleaned registration falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationShape {
    /// Already contains a hyphen; kept as written.
    Hyphenated,
    /// `N` + 1-5 digits + 0-2 letters; never hyphenated.
    UnitedStates,
    /// `C` + `F`/`G` + 3 letters without the hyphen.
    CanadaUnhyphenated,
    /// One prefix letter + 4 letters.
    SingleLetterPrefix,
    /// Two alphanumeric prefix characters + 3-5 alphanumerics.
    TwoCharPrefix,
    Unrecognized,
}

impl RegistrationShape {
    /// Canonical form of `cleaned`, which must be the output of
    /// [`clean_registration`] that produced this shape.
    pub fn render(self, cleaned: &str) -> String {
        match self {
            Self::Hyphenated | Self::UnitedStates | Self::Unrecognized => cleaned.to_string(),
            Self::CanadaUnhyphenated | Self::SingleLetterPrefix => insert_hyphen(cleaned, 1),
            Self::TwoCharPrefix => insert_hyphen(cleaned, 2),
        }
    }
}

/// Uppercase, drop all whitespace, collapse hyphen runs to one hyphen.
pub fn clean_registration(raw: &str) -> String {
    let upper: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    HYPHEN_RUN_RE.replace_all(&upper, "-").into_owned()
}

/// Classify a cleaned registration. First matching rule wins.
pub fn classify(cleaned: &str) -> RegistrationShape {
    // Canadian C-Fxxx/C-Gxxx lands here too; any existing hyphen is trusted.
    if cleaned.contains('-') {
        return RegistrationShape::Hyphenated;
    }

    if US_RE.is_match(cleaned) {
        return RegistrationShape::UnitedStates;
    }

    if CANADA_RE.is_match(cleaned) {
        return RegistrationShape::CanadaUnhyphenated;
    }

    if is_single_letter_prefix(cleaned) {
        return RegistrationShape::SingleLetterPrefix;
    }

    if TWO_CHAR_PREFIX_RE.is_match(cleaned) && !cleaned.starts_with('N') {
        return RegistrationShape::TwoCharPrefix;
    }

    RegistrationShape::Unrecognized
}

/// Normalize a raw registration to its canonical form. `None` stays `None`.
pub fn normalize_registration(raw: Option<&str>) -> Option<String> {
    let cleaned = clean_registration(raw?);
    Some(classify(&cleaned).render(&cleaned))
}

/// Column-wise variant of [`normalize_registration`].
pub fn normalize_all<'a, I>(raws: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    raws.into_iter().map(normalize_registration).collect()
}

fn is_single_letter_prefix(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else { return false };
    s.chars().count() == 5
        && SINGLE_LETTER_PREFIXES.contains(&first)
        && chars.all(char::is_alphabetic)
}

fn insert_hyphen(s: &str, prefix_chars: usize) -> String {
    let split = s
        .char_indices()
        .nth(prefix_chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    format!("{}-{}", &s[..split], &s[split..])
}
