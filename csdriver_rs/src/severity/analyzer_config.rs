//! Analyzer-config files (`.editorconfig`, `.globalconfig`).
//!
//! INI-style: an optional preamble of `key = value` lines, then `[glob]`
//! sections. Keys are lower-cased; values are trimmed and the reserved
//! words `true`, `false` and `unset` lower-cased.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostics::ReportDiagnostic;
use crate::paths;

static SECTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\[(([^#;]|\\#|\\;)+)\]\s*([#;].*)?$").expect("section pattern is valid")
});

static PROPERTY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([\w\.\-_]+)\s*[=:]\s*(.*?)\s*([#;].*)?$").expect("property pattern is valid")
});

const RESERVED_VALUES: &[&str] = &["true", "false", "unset"];

pub const GLOBAL_CONFIG_FILE_NAME: &str = ".globalconfig";
pub const USER_GLOBAL_LEVEL: i32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Raw header text; empty for the preamble.
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

impl Section {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            properties: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Normalized full path of the file.
    pub path: String,
    /// Directory the file governs.
    pub directory: String,
    pub global_section: Section,
    pub named_sections: Vec<Section>,
    pub is_root: bool,
    pub is_global: bool,
    pub global_level: i32,
}

impl AnalyzerConfig {
    pub fn parse(text: &str, path: &str) -> Self {
        let path = paths::normalize(path);
        let mut global_section = Section::default();
        let mut named_sections: Vec<Section> = Vec::new();

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(captures) = SECTION_LINE.captures(line) {
                named_sections.push(Section::named(&captures[1]));
                continue;
            }
            let Some(captures) = PROPERTY_LINE.captures(line) else {
                continue;
            };
            let key = captures[1].to_lowercase();
            let mut value = captures
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            if RESERVED_VALUES.iter().any(|r| r.eq_ignore_ascii_case(&value)) {
                value = value.to_ascii_lowercase();
            }
            let target = named_sections.last_mut().unwrap_or(&mut global_section);
            target.properties.insert(key, value);
        }

        let preamble = &global_section.properties;
        let is_root = preamble.get("root").is_some_and(|v| v == "true");
        let named_global = paths::file_name(&path).eq_ignore_ascii_case(GLOBAL_CONFIG_FILE_NAME);
        let is_global = named_global || preamble.get("is_global").is_some_and(|v| v == "true");
        let default_level = if named_global { USER_GLOBAL_LEVEL } else { 0 };
        let global_level = preamble
            .get("global_level")
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(default_level);

        if is_global {
            global_section.properties.remove("is_global");
            global_section.properties.remove("global_level");
        }

        let directory = paths::directory_name(&path).unwrap_or("").to_string();
        Self {
            path,
            directory,
            global_section,
            named_sections,
            is_root,
            is_global,
            global_level,
        }
    }
}

/// Map a severity value to a decision. `None` for unknown spellings.
pub fn parse_severity(value: &str) -> Option<ReportDiagnostic> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" => Some(ReportDiagnostic::Suppress),
        "silent" | "refactoring" => Some(ReportDiagnostic::Hidden),
        "suggestion" => Some(ReportDiagnostic::Info),
        "warning" => Some(ReportDiagnostic::Warn),
        "error" => Some(ReportDiagnostic::Error),
        "default" => Some(ReportDiagnostic::Default),
        _ => None,
    }
}

/// Extract `<id>` from `dotnet_diagnostic.<id>.severity` or
/// `diagnostic.<id>.severity`.
pub fn diagnostic_id_from_key(key: &str) -> Option<&str> {
    let rest = key
        .strip_prefix("dotnet_diagnostic.")
        .or_else(|| key.strip_prefix("diagnostic."))?;
    let id = rest.strip_suffix(".severity")?;
    (!id.is_empty()).then_some(id)
}

/// Keys for bulk analyzer severities, most specific first.
pub fn category_severity_keys(category: &str) -> [String; 2] {
    let category = category.to_lowercase();
    [
        format!("dotnet_analyzer_diagnostic.category-{}.severity", category),
        format!("analyzer-diagnostic.category-{}.severity", category),
    ]
}

pub const ALL_ANALYZER_SEVERITY_KEYS: &[&str] = &[
    "dotnet_analyzer_diagnostic.severity",
    "analyzer-diagnostic.severity",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_preamble_and_sections() {
        let config = AnalyzerConfig::parse(
            "root = TRUE\n\n# comment\n[*.cs]\nIndent_Style = Space ; trailing\nflag: False\n\n[src/{a,b}.cs]\nkey =\n",
            "/proj/.editorconfig",
        );
        assert!(config.is_root);
        assert!(!config.is_global);
        assert_eq!(config.directory, "/proj");
        assert_eq!(config.named_sections.len(), 2);
        let first = &config.named_sections[0];
        assert_eq!(first.name, "*.cs");
        assert_eq!(first.properties.get("indent_style").map(String::as_str), Some("Space"));
        assert_eq!(first.properties.get("flag").map(String::as_str), Some("false"));
        assert_eq!(
            config.named_sections[1].properties.get("key").map(String::as_str),
            Some("")
        );
    }

    #[test]
    fn invalid_headers_and_keys_are_skipped() {
        let config = AnalyzerConfig::parse(
            "[*.cs]\na = 1\n[broken\nb = 2\n[]\nc = 3\n!bad = 4\n",
            "/p/.editorconfig",
        );
        assert_eq!(config.named_sections.len(), 1);
        let props = &config.named_sections[0].properties;
        assert_eq!(props.len(), 3);
        assert!(props.contains_key("b"));
        assert!(props.contains_key("c"));
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let config = AnalyzerConfig::parse("[*]\nk = 1\nk = 2\n", "/p/.editorconfig");
        assert_eq!(
            config.named_sections[0].properties.get("k").map(String::as_str),
            Some("2")
        );
    }

    #[test]
    fn escaped_comment_chars_in_section_names() {
        let config = AnalyzerConfig::parse(r"[a\#b.cs] # note", "/p/.editorconfig");
        assert_eq!(config.named_sections[0].name, r"a\#b.cs");
    }

    #[test]
    fn global_markers_and_levels() {
        let explicit = AnalyzerConfig::parse("is_global = true\nglobal_level = 7\nk = v\n", "/p/a.config");
        assert!(explicit.is_global);
        assert_eq!(explicit.global_level, 7);
        assert!(!explicit.global_section.properties.contains_key("is_global"));
        assert!(explicit.global_section.properties.contains_key("k"));

        let by_name = AnalyzerConfig::parse("k = v\n", "/p/.GlobalConfig");
        assert!(by_name.is_global);
        assert_eq!(by_name.global_level, 100);

        let bad_level = AnalyzerConfig::parse("is_global = true\nglobal_level = high\n", "/p/x");
        assert_eq!(bad_level.global_level, 0);
    }

    #[test]
    fn severity_values_and_keys() {
        assert_eq!(parse_severity("none"), Some(ReportDiagnostic::Suppress));
        assert_eq!(parse_severity("Refactoring"), Some(ReportDiagnostic::Hidden));
        assert_eq!(parse_severity("suggestion"), Some(ReportDiagnostic::Info));
        assert_eq!(parse_severity("loud"), None);
        assert_eq!(diagnostic_id_from_key("dotnet_diagnostic.ca1822.severity"), Some("ca1822"));
        assert_eq!(diagnostic_id_from_key("diagnostic.cs0168.severity"), Some("cs0168"));
        assert_eq!(diagnostic_id_from_key("dotnet_diagnostic..severity"), None);
        assert_eq!(diagnostic_id_from_key("indent_style"), None);
        assert_eq!(
            category_severity_keys("Style")[0],
            "dotnet_analyzer_diagnostic.category-style.severity"
        );
    }
}
