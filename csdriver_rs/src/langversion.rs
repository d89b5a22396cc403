//! Language versions accepted by `/langversion`.
//!
//! The table below is append-only: a new release adds a row, nothing is
//! renumbered. Symbolic values (`default`, `latest`, `latestmajor`) are what
//! the user *specified*; [`LanguageVersion::effective`] maps them to the
//! concrete version the driver compiles with.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LanguageVersion {
    CSharp1,
    CSharp2,
    CSharp3,
    CSharp4,
    CSharp5,
    CSharp6,
    CSharp7,
    CSharp7_1,
    CSharp7_2,
    CSharp7_3,
    CSharp8,
    CSharp9,
    CSharp10,
    CSharp11,
    CSharp12,
    CSharp13,
    Preview,
    LatestMajor,
    Latest,
    #[default]
    Default,
}

/// Display string → version, in release order.
const VERSION_TABLE: &[(&str, LanguageVersion)] = &[
    ("1", LanguageVersion::CSharp1),
    ("2", LanguageVersion::CSharp2),
    ("3", LanguageVersion::CSharp3),
    ("4", LanguageVersion::CSharp4),
    ("5", LanguageVersion::CSharp5),
    ("6", LanguageVersion::CSharp6),
    ("7.0", LanguageVersion::CSharp7),
    ("7.1", LanguageVersion::CSharp7_1),
    ("7.2", LanguageVersion::CSharp7_2),
    ("7.3", LanguageVersion::CSharp7_3),
    ("8.0", LanguageVersion::CSharp8),
    ("9.0", LanguageVersion::CSharp9),
    ("10.0", LanguageVersion::CSharp10),
    ("11.0", LanguageVersion::CSharp11),
    ("12.0", LanguageVersion::CSharp12),
    ("13.0", LanguageVersion::CSharp13),
    ("preview", LanguageVersion::Preview),
    ("latestmajor", LanguageVersion::LatestMajor),
    ("latest", LanguageVersion::Latest),
    ("default", LanguageVersion::Default),
];

/// Extra spellings that parse but are never displayed.
const ALIASES: &[(&str, LanguageVersion)] = &[
    ("iso-1", LanguageVersion::CSharp1),
    ("iso-2", LanguageVersion::CSharp2),
    ("1.0", LanguageVersion::CSharp1),
    ("2.0", LanguageVersion::CSharp2),
    ("3.0", LanguageVersion::CSharp3),
    ("4.0", LanguageVersion::CSharp4),
    ("5.0", LanguageVersion::CSharp5),
    ("6.0", LanguageVersion::CSharp6),
    ("7", LanguageVersion::CSharp7),
    ("8", LanguageVersion::CSharp8),
    ("9", LanguageVersion::CSharp9),
    ("10", LanguageVersion::CSharp10),
    ("11", LanguageVersion::CSharp11),
    ("12", LanguageVersion::CSharp12),
    ("13", LanguageVersion::CSharp13),
];

const LATEST_MAJOR: LanguageVersion = LanguageVersion::CSharp13;
const LATEST: LanguageVersion = LanguageVersion::CSharp13;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageVersionError {
    LeadingZeroes(String),
    Unrecognized(String),
}

impl LanguageVersion {
    /// Parse a `/langversion` value. Case-insensitive.
    pub fn parse(text: &str) -> Result<Self, LanguageVersionError> {
        if has_leading_zero(text) {
            return Err(LanguageVersionError::LeadingZeroes(text.to_string()));
        }
        let lowered = text.to_ascii_lowercase();
        VERSION_TABLE
            .iter()
            .chain(ALIASES)
            .find(|(name, _)| *name == lowered)
            .map(|(_, version)| *version)
            .ok_or_else(|| LanguageVersionError::Unrecognized(text.to_string()))
    }

    /// Resolve symbolic values to a concrete version.
    pub fn effective(self) -> Self {
        match self {
            LanguageVersion::Default | LanguageVersion::LatestMajor => LATEST_MAJOR,
            LanguageVersion::Latest => LATEST,
            other => other,
        }
    }

    pub fn display(self) -> &'static str {
        VERSION_TABLE
            .iter()
            .find(|(_, version)| *version == self)
            .map(|(name, _)| *name)
            .unwrap_or("default")
    }

    /// Whether `self` (effective) enables a feature introduced in `required`.
    pub fn allows(self, required: LanguageVersion) -> bool {
        self.effective() >= required
    }

    /// Lines for `/langversion:?`, the default marked.
    pub fn listing() -> Vec<String> {
        let default = LanguageVersion::Default.effective();
        VERSION_TABLE
            .iter()
            .map(|(name, version)| {
                if *version == default {
                    format!("{} (default)", name)
                } else {
                    (*name).to_string()
                }
            })
            .collect()
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// `07`, `7.01` and `0` are rejected; `7.0` is fine.
fn has_leading_zero(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    if !first.is_ascii_digit() {
        return false;
    }
    if text.starts_with('0') {
        return true;
    }
    match text.split_once('.') {
        Some((_, fraction)) => fraction.len() > 1 && fraction.starts_with('0'),
        None => false,
    }
}

/// Language features gated on the effective version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFeature {
    NullableReferenceTypes,
}

impl LanguageFeature {
    pub fn required_version(self) -> LanguageVersion {
        match self {
            LanguageFeature::NullableReferenceTypes => LanguageVersion::CSharp8,
        }
    }
}
