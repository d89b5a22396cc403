//! Merged view over every analyzer-config file of a compilation.
//!
//! Global files are folded once into a single [`GlobalAnalyzerConfig`];
//! ordinary files are layered per source path, outermost directory first.
//! The result for a path is an [`AnalyzerConfigOptions`]: per-ID severities
//! pulled out of the `*.severity` keys plus every remaining property.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::analyzer_config::{AnalyzerConfig, diagnostic_id_from_key, parse_severity};
use super::section_matcher::{SectionNameMatcher, unescape_section_name};
use crate::diagnostics::{Diagnostic, ErrorCode, ReportDiagnostic};
use crate::paths;

const GLOBAL_SECTION_DISPLAY: &str = "Global Section";

/// Options visible to one source file (or to the whole compilation).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerConfigOptions {
    /// Keyed by lower-cased diagnostic ID.
    pub severities: BTreeMap<String, ReportDiagnostic>,
    pub properties: BTreeMap<String, String>,
    /// Invalid severity values met while building this view.
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalyzerConfigOptions {
    pub fn severity_for(&self, id: &str) -> Option<ReportDiagnostic> {
        self.severities.get(&id.to_lowercase()).copied()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    fn apply(&mut self, properties: &BTreeMap<String, String>, origin: &str) {
        for (key, value) in properties {
            if let Some(id) = diagnostic_id_from_key(key) {
                match parse_severity(value) {
                    Some(severity) => {
                        self.severities.insert(id.to_string(), severity);
                    }
                    None => self.diagnostics.push(Diagnostic::new(
                        ErrorCode::InvalidSeverityInAnalyzerConfig,
                        [id, value.as_str(), origin],
                    )),
                }
                continue;
            }
            self.properties.insert(key.clone(), value.clone());
        }
    }
}

#[derive(Debug, Clone)]
struct GlobalSection {
    /// Unescaped absolute path.
    name: String,
    matcher: Option<SectionNameMatcher>,
    properties: BTreeMap<String, String>,
    /// File the section's properties were first seen in.
    origin: String,
}

/// All global files folded together.
#[derive(Debug, Clone, Default)]
pub struct GlobalAnalyzerConfig {
    preamble: BTreeMap<String, String>,
    preamble_origin: String,
    sections: Vec<GlobalSection>,
}

/// One merged value while folding global files.
#[derive(Debug)]
struct GlobalEntry {
    value: String,
    level: i32,
    files: Vec<String>,
}

impl GlobalAnalyzerConfig {
    fn merge(configs: &[&AnalyzerConfig], diagnostics: &mut Vec<Diagnostic>) -> Self {
        // section name ("" for the preamble) -> key -> entry
        let mut merged: BTreeMap<String, BTreeMap<String, GlobalEntry>> = BTreeMap::new();
        let mut section_order: Vec<String> = Vec::new();
        let mut first_origin: BTreeMap<String, String> = BTreeMap::new();

        for config in configs {
            let sections = std::iter::once((String::new(), &config.global_section)).chain(
                config
                    .named_sections
                    .iter()
                    .map(|s| (unescape_section_name(&s.name), s)),
            );
            for (name, section) in sections {
                if !name.is_empty() && !paths::is_absolute(&name) {
                    diagnostics.push(Diagnostic::new(
                        ErrorCode::InvalidGlobalSectionName,
                        [section.name.as_str(), config.path.as_str()],
                    ));
                    continue;
                }
                let name = if name.is_empty() { name } else { paths::normalize(&name) };
                if !merged.contains_key(&name) {
                    section_order.push(name.clone());
                    first_origin.insert(name.clone(), config.path.clone());
                }
                let entries = merged.entry(name).or_default();
                for (key, value) in &section.properties {
                    match entries.get_mut(key) {
                        None => {
                            entries.insert(
                                key.clone(),
                                GlobalEntry {
                                    value: value.clone(),
                                    level: config.global_level,
                                    files: vec![config.path.clone()],
                                },
                            );
                        }
                        Some(entry) if entry.level < config.global_level => {
                            *entry = GlobalEntry {
                                value: value.clone(),
                                level: config.global_level,
                                files: vec![config.path.clone()],
                            };
                        }
                        Some(entry) if entry.level == config.global_level => {
                            entry.files.push(config.path.clone());
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        let mut global = GlobalAnalyzerConfig::default();
        for name in section_order {
            let Some(entries) = merged.remove(&name) else {
                continue;
            };
            let mut properties = BTreeMap::new();
            for (key, entry) in entries {
                if entry.files.len() > 1 {
                    let section_display = if name.is_empty() {
                        GLOBAL_SECTION_DISPLAY
                    } else {
                        name.as_str()
                    };
                    diagnostics.push(Diagnostic::new(
                        ErrorCode::MultipleGlobalAnalyzerKeys,
                        [key.clone(), section_display.to_string(), entry.files.join(", ")],
                    ));
                    continue;
                }
                properties.insert(key, entry.value);
            }
            let origin = first_origin.remove(&name).unwrap_or_default();
            if name.is_empty() {
                global.preamble = properties;
                global.preamble_origin = origin;
            } else {
                global.sections.push(GlobalSection {
                    matcher: SectionNameMatcher::compile(&escape_glob(&name)),
                    name,
                    properties,
                    origin,
                });
            }
        }
        global
    }
}

/// Make every glob metacharacter in an absolute path literal.
fn escape_glob(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if matches!(c, '*' | '?' | '{' | '}' | '[' | ']' | ',' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn directory_depth(directory: &str) -> usize {
    directory.split('/').filter(|s| !s.is_empty()).count()
}

/// `/`-rooted form expected by section matchers.
fn rooted(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[derive(Debug, Clone)]
struct LayeredConfig {
    config: AnalyzerConfig,
    matchers: Vec<Option<SectionNameMatcher>>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfigSet {
    /// Non-global files, outermost directory first.
    layered: Vec<LayeredConfig>,
    global: GlobalAnalyzerConfig,
    diagnostics: Vec<Diagnostic>,
}

impl AnalyzerConfigSet {
    pub fn create(configs: Vec<AnalyzerConfig>) -> Self {
        let mut diagnostics = Vec::new();

        let (globals, mut ordinary): (Vec<AnalyzerConfig>, Vec<AnalyzerConfig>) =
            configs.into_iter().partition(|c| c.is_global);
        let global_refs: Vec<&AnalyzerConfig> = globals.iter().collect();
        let global = GlobalAnalyzerConfig::merge(&global_refs, &mut diagnostics);

        ordinary.sort_by(|a, b| {
            directory_depth(&a.directory)
                .cmp(&directory_depth(&b.directory))
                .then_with(|| a.directory.cmp(&b.directory))
        });
        for pair in ordinary.windows(2) {
            if pair[0].directory == pair[1].directory
                && !diagnostics.iter().any(|d| {
                    d.id() == ErrorCode::MultipleAnalyzerConfigsInSameDir.id()
                        && d.arguments().first() == Some(&pair[0].directory)
                })
            {
                diagnostics.push(Diagnostic::new(
                    ErrorCode::MultipleAnalyzerConfigsInSameDir,
                    [pair[0].directory.as_str()],
                ));
            }
        }

        let layered = ordinary
            .into_iter()
            .map(|config| {
                let matchers = config
                    .named_sections
                    .iter()
                    .map(|s| SectionNameMatcher::compile(&s.name))
                    .collect();
                LayeredConfig { config, matchers }
            })
            .collect::<Vec<_>>();

        debug!(
            layered = layered.len(),
            global_files = globals.len(),
            "built analyzer config set"
        );
        Self {
            layered,
            global,
            diagnostics,
        }
    }

    /// Diagnostics from building the set (conflicts, bad section names).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.layered.is_empty()
            && self.global.preamble.is_empty()
            && self.global.sections.is_empty()
    }

    /// Options that are not tied to a source file: the global preamble.
    pub fn global_options(&self) -> AnalyzerConfigOptions {
        let mut options = AnalyzerConfigOptions::default();
        options.apply(&self.global.preamble, &self.global.preamble_origin);
        options
    }

    /// Options for one source file (a normalized full path).
    pub fn options_for_source_path(&self, source_path: &str) -> AnalyzerConfigOptions {
        let source_path = paths::normalize(source_path);
        let mut options = self.global_options();

        let full = rooted(&source_path);
        for section in &self.global.sections {
            if section.matcher.as_ref().is_some_and(|m| m.is_match(&full)) {
                trace!(section = %section.name, "global section applies");
                options.apply(&section.properties, &section.origin);
            }
        }

        let applicable: Vec<&LayeredConfig> = self
            .layered
            .iter()
            .filter(|layer| {
                layer.config.directory.is_empty() || paths::is_under(&source_path, &layer.config.directory)
            })
            .collect();
        let start = applicable
            .iter()
            .rposition(|layer| layer.config.is_root)
            .unwrap_or(0);

        for layer in &applicable[start..] {
            let relative = rooted(paths::relative_to(&source_path, &layer.config.directory));
            for (section, matcher) in layer.config.named_sections.iter().zip(&layer.matchers) {
                if matcher.as_ref().is_some_and(|m| m.is_match(&relative)) {
                    trace!(config = %layer.config.path, section = %section.name, "section applies");
                    options.apply(&section.properties, &layer.config.path);
                }
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: &str, text: &str) -> AnalyzerConfig {
        AnalyzerConfig::parse(text, path)
    }

    #[test]
    fn inner_directories_override_outer() {
        let set = AnalyzerConfigSet::create(vec![
            config("/p/src/.editorconfig", "[*.cs]\nk = inner\n"),
            config("/p/.editorconfig", "[*.cs]\nk = outer\nother = 1\n"),
        ]);
        let options = set.options_for_source_path("/p/src/a.cs");
        assert_eq!(options.property("k"), Some("inner"));
        assert_eq!(options.property("other"), Some("1"));
        let outside = set.options_for_source_path("/p/b.cs");
        assert_eq!(outside.property("k"), Some("outer"));
    }

    #[test]
    fn root_stops_inheritance() {
        let set = AnalyzerConfigSet::create(vec![
            config("/p/.editorconfig", "[*.cs]\nouter = 1\n"),
            config("/p/src/.editorconfig", "root = true\n[*.cs]\ninner = 1\n"),
        ]);
        let options = set.options_for_source_path("/p/src/a.cs");
        assert_eq!(options.property("outer"), None);
        assert_eq!(options.property("inner"), Some("1"));
    }

    #[test]
    fn sections_match_relative_to_config_directory() {
        let set = AnalyzerConfigSet::create(vec![config(
            "/p/.editorconfig",
            "[src/*.cs]\nk = v\n",
        )]);
        assert_eq!(set.options_for_source_path("/p/src/a.cs").property("k"), Some("v"));
        assert_eq!(set.options_for_source_path("/p/src/x/a.cs").property("k"), None);
    }

    #[test]
    fn severities_are_extracted_and_validated() {
        let set = AnalyzerConfigSet::create(vec![config(
            "/p/.editorconfig",
            "[*.cs]\ndotnet_diagnostic.CA1000.severity = error\ndiagnostic.CA2000.severity = loud\n",
        )]);
        let options = set.options_for_source_path("/p/a.cs");
        assert_eq!(options.severity_for("CA1000"), Some(ReportDiagnostic::Error));
        assert_eq!(options.severity_for("CA2000"), None);
        assert_eq!(options.diagnostics.len(), 1);
        assert_eq!(options.diagnostics[0].id(), "CS8703");
        assert_eq!(
            options.diagnostics[0].arguments(),
            ["ca2000".to_string(), "loud".to_string(), "/p/.editorconfig".to_string()]
        );
    }

    #[test]
    fn same_directory_is_reported_once() {
        let set = AnalyzerConfigSet::create(vec![
            config("/p/.editorconfig", "[*]\n"),
            config("/p/.other", "[*]\n"),
        ]);
        assert_eq!(set.diagnostics().len(), 1);
        assert_eq!(set.diagnostics()[0].id(), "CS8700");
    }

    #[test]
    fn global_conflicts_unset_the_key() {
        let set = AnalyzerConfigSet::create(vec![
            config("/p/a.globalconfig", "is_global = true\nkey = a\nkeep = 1\n"),
            config("/p/b/b.globalconfig", "is_global = true\nkey = b\n"),
        ]);
        assert_eq!(set.diagnostics().len(), 1);
        assert_eq!(
            set.diagnostics()[0].arguments(),
            [
                "key".to_string(),
                "Global Section".to_string(),
                "/p/a.globalconfig, /p/b/b.globalconfig".to_string()
            ]
        );
        let options = set.global_options();
        assert_eq!(options.property("key"), None);
        assert_eq!(options.property("keep"), Some("1"));
    }

    #[test]
    fn higher_global_level_wins_without_conflict() {
        let set = AnalyzerConfigSet::create(vec![
            config("/p/.globalconfig", "key = user\n"),
            config("/p/a.config", "is_global = true\nkey = low\n"),
        ]);
        assert!(set.diagnostics().is_empty());
        assert_eq!(set.global_options().property("key"), Some("user"));
    }

    #[test]
    fn global_sections_need_absolute_paths() {
        let set = AnalyzerConfigSet::create(vec![config(
            "/p/g.config",
            "is_global = true\n[/p/src/a.cs]\nk = 1\n[*.cs]\nk = 2\n",
        )]);
        assert_eq!(set.diagnostics().len(), 1);
        assert_eq!(set.diagnostics()[0].id(), "CS8785");
        assert_eq!(set.options_for_source_path("/p/src/a.cs").property("k"), Some("1"));
        assert_eq!(set.options_for_source_path("/p/src/b.cs").property("k"), None);
    }

    #[test]
    fn editorconfig_overrides_global() {
        let set = AnalyzerConfigSet::create(vec![
            config("/p/.globalconfig", "k = global\n"),
            config("/p/.editorconfig", "[*.cs]\nk = local\n"),
        ]);
        assert_eq!(set.options_for_source_path("/p/a.cs").property("k"), Some("local"));
        assert_eq!(set.options_for_source_path("/p/a.vb").property("k"), Some("global"));
    }
}
