//! Programmatic suppression of already-configured diagnostics.
//!
//! Suppressors run after severities are final. They can only silence
//! diagnostics whose descriptor allows it; errors that are errors by
//! default stay visible. Entries are read from
//! `.csdriver/suppressions.toml`:
//!
//! ```toml
//! [[suppress]]
//! id = "SPR1001"
//! suppressed_id = "CS0168"
//! justification = "Locals kept for debugging"
//! file = "src/legacy/**"
//! ```

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::diagnostics::{
    Diagnostic, DiagnosticSeverity, ErrorCode, ProgrammaticSuppression,
};
use crate::fs_utils::FileSystem;
use crate::paths;

pub const SUPPRESSIONS_FILE: &str = "suppressions.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionDescriptor {
    /// Suppressor ID reported alongside the suppressed diagnostic.
    pub id: String,
    pub suppressed_id: String,
    pub justification: String,
}

pub trait DiagnosticSuppressor {
    fn supported_suppressions(&self) -> &[SuppressionDescriptor];

    /// The suppression to apply to `diagnostic`, if any.
    fn suppress(&self, diagnostic: &Diagnostic) -> Option<SuppressionDescriptor>;
}

/// One `[[suppress]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionEntry {
    pub id: String,
    pub suppressed_id: String,
    #[serde(default)]
    pub justification: String,
    /// Glob over the diagnostic's location, relative to the base directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SuppressionsFile {
    #[serde(default, rename = "suppress")]
    pub items: Vec<SuppressionEntry>,
}

/// Suppressor backed by a TOML file.
#[derive(Debug, Default, Clone)]
pub struct TomlSuppressor {
    base_directory: String,
    descriptors: Vec<SuppressionDescriptor>,
    file_matchers: Vec<Option<GlobMatcher>>,
}

impl TomlSuppressor {
    pub fn from_entries(base_directory: &str, entries: Vec<SuppressionEntry>) -> Self {
        let mut suppressor = Self {
            base_directory: base_directory.to_string(),
            ..Self::default()
        };
        for entry in entries {
            let matcher = match entry.file.as_deref() {
                None => None,
                Some(pattern) => match Glob::new(pattern) {
                    Ok(glob) => Some(glob.compile_matcher()),
                    Err(err) => {
                        warn!(pattern, error = %err, "skipping suppression with invalid file glob");
                        continue;
                    }
                },
            };
            suppressor.descriptors.push(SuppressionDescriptor {
                id: entry.id,
                suppressed_id: entry.suppressed_id,
                justification: entry.justification,
            });
            suppressor.file_matchers.push(matcher);
        }
        suppressor
    }

    /// Load `<config_dir>/suppressions.toml`. Missing or invalid files
    /// yield an empty suppressor.
    pub fn load(fs: &dyn FileSystem, config_dir: &str, base_directory: &str) -> Self {
        let path = format!("{}/{}", config_dir.trim_end_matches('/'), SUPPRESSIONS_FILE);
        if !fs.file_exists(&path) {
            return Self::from_entries(base_directory, Vec::new());
        }
        let file: SuppressionsFile = match fs.read_all_text(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(file) => file,
                Err(e) => {
                    warn!(path = %path, error = %e, "failed to parse suppressions");
                    SuppressionsFile::default()
                }
            },
            Err(e) => {
                warn!(path = %path, error = %e, "failed to read suppressions");
                SuppressionsFile::default()
            }
        };
        debug!(path = %path, entries = file.items.len(), "loaded suppressions");
        Self::from_entries(base_directory, file.items)
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl DiagnosticSuppressor for TomlSuppressor {
    fn supported_suppressions(&self) -> &[SuppressionDescriptor] {
        &self.descriptors
    }

    fn suppress(&self, diagnostic: &Diagnostic) -> Option<SuppressionDescriptor> {
        self.descriptors
            .iter()
            .zip(&self.file_matchers)
            .find(|(descriptor, matcher)| {
                if !descriptor.suppressed_id.eq_ignore_ascii_case(diagnostic.id()) {
                    return false;
                }
                match (matcher, diagnostic.location()) {
                    (None, _) => true,
                    (Some(matcher), Some(location)) => {
                        matcher.is_match(paths::relative_to(&location.path, &self.base_directory))
                    }
                    (Some(_), None) => false,
                }
            })
            .map(|(descriptor, _)| descriptor.clone())
    }
}

/// Whether a suppressor may touch this diagnostic at all.
pub fn is_suppressible(diagnostic: &Diagnostic) -> bool {
    let descriptor = diagnostic.descriptor();
    !diagnostic.is_suppressed()
        && descriptor.is_configurable()
        && descriptor.default_severity != DiagnosticSeverity::Error
}

/// Run `suppressors` over `diagnostics`. Each suppressed diagnostic keeps
/// its place, gains a suppression record and is followed by an
/// informational `SP0001`.
pub fn apply_suppressors(
    diagnostics: Vec<Diagnostic>,
    suppressors: &[&dyn DiagnosticSuppressor],
) -> Vec<Diagnostic> {
    if suppressors.is_empty() {
        return diagnostics;
    }
    let mut out = Vec::with_capacity(diagnostics.len());
    for diagnostic in diagnostics {
        let suppression = if is_suppressible(&diagnostic)
            && matches!(
                diagnostic.severity(),
                DiagnosticSeverity::Warning | DiagnosticSeverity::Error
            ) {
            suppressors.iter().find_map(|s| s.suppress(&diagnostic))
        } else {
            None
        };
        let Some(descriptor) = suppression else {
            out.push(diagnostic);
            continue;
        };

        debug!(id = diagnostic.id(), suppressor = %descriptor.id, "diagnostic suppressed");
        let mut info = Diagnostic::new(
            ErrorCode::ProgrammaticSuppression,
            [
                diagnostic.id().to_string(),
                diagnostic.message(),
                descriptor.id.clone(),
                descriptor.justification.clone(),
            ],
        );
        if let Some(location) = diagnostic.location() {
            info = info.with_location(location.clone());
        }
        out.push(diagnostic.with_suppression(ProgrammaticSuppression {
            suppressor_id: descriptor.id,
            justification: descriptor.justification,
        }));
        out.push(info);
    }
    out
}
