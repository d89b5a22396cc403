//! `.ruleset` documents.
//!
//! ```xml
//! <RuleSet Name="Project">
//!   <IncludeAll Action="Warning" />
//!   <Include Path="shared.ruleset" Action="Default" />
//!   <Rules AnalyzerId="..." RuleNamespace="...">
//!     <Rule Id="CA1000" Action="None" />
//!   </Rules>
//! </RuleSet>
//! ```
//!
//! [`load_rule_set`] returns the *effective* ruleset: includes are folded
//! in, the including file's own rules winning over anything included.

use std::collections::{BTreeMap, HashSet};
use std::io;

use thiserror::Error;
use tracing::debug;

use crate::diagnostics::ReportDiagnostic;
use crate::fs_utils::FileSystem;
use crate::paths;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub path: String,
    /// `IncludeAll` action; `Default` when absent.
    pub general_action: ReportDiagnostic,
    pub specific: BTreeMap<String, ReportDiagnostic>,
}

impl RuleSet {
    pub fn action_for(&self, id: &str) -> Option<ReportDiagnostic> {
        self.specific.get(id).copied()
    }
}

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("{source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{source}")]
    Xml {
        path: String,
        #[source]
        source: roxmltree::Error,
    },
    #[error("{message}")]
    Invalid { path: String, message: String },
}

impl RuleSetError {
    /// File the failure belongs to (may be an included file).
    pub fn path(&self) -> &str {
        match self {
            RuleSetError::Read { path, .. }
            | RuleSetError::Xml { path, .. }
            | RuleSetError::Invalid { path, .. } => path,
        }
    }

    fn invalid(path: &str, message: impl Into<String>) -> Self {
        RuleSetError::Invalid {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// One file as written, before includes are resolved.
#[derive(Debug, Clone, Default)]
struct RuleSetDocument {
    general_action: ReportDiagnostic,
    includes: Vec<(String, ReportDiagnostic)>,
    rules: BTreeMap<String, ReportDiagnostic>,
}

pub fn parse_action(text: &str) -> Option<ReportDiagnostic> {
    match text.trim().to_ascii_lowercase().as_str() {
        "error" => Some(ReportDiagnostic::Error),
        "warning" => Some(ReportDiagnostic::Warn),
        "info" => Some(ReportDiagnostic::Info),
        "hidden" => Some(ReportDiagnostic::Hidden),
        "none" => Some(ReportDiagnostic::Suppress),
        "default" => Some(ReportDiagnostic::Default),
        _ => None,
    }
}

fn required_action(path: &str, node: roxmltree::Node<'_, '_>) -> Result<ReportDiagnostic, RuleSetError> {
    let raw = node.attribute("Action").ok_or_else(|| {
        RuleSetError::invalid(
            path,
            format!("'{}' element is missing the 'Action' attribute", node.tag_name().name()),
        )
    })?;
    parse_action(raw)
        .ok_or_else(|| RuleSetError::invalid(path, format!("Invalid action value '{}'", raw)))
}

fn parse_document(path: &str, text: &str) -> Result<RuleSetDocument, RuleSetError> {
    let document = roxmltree::Document::parse(text).map_err(|source| RuleSetError::Xml {
        path: path.to_string(),
        source,
    })?;
    let root = document.root_element();
    if root.tag_name().name() != "RuleSet" {
        return Err(RuleSetError::invalid(
            path,
            format!(
                "The root element must be 'RuleSet', found '{}'",
                root.tag_name().name()
            ),
        ));
    }

    let mut parsed = RuleSetDocument::default();
    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "IncludeAll" => parsed.general_action = required_action(path, child)?,
            "Include" => {
                let include = child.attribute("Path").ok_or_else(|| {
                    RuleSetError::invalid(path, "'Include' element is missing the 'Path' attribute")
                })?;
                parsed
                    .includes
                    .push((include.to_string(), required_action(path, child)?));
            }
            "Rules" => {
                for rule in child
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "Rule")
                {
                    let id = rule.attribute("Id").ok_or_else(|| {
                        RuleSetError::invalid(path, "'Rule' element is missing the 'Id' attribute")
                    })?;
                    parsed
                        .rules
                        .insert(id.trim().to_string(), required_action(path, rule)?);
                }
            }
            _ => {}
        }
    }
    Ok(parsed)
}

/// Load `path` and everything it includes.
pub fn load_rule_set(fs: &dyn FileSystem, path: &str) -> Result<RuleSet, RuleSetError> {
    let mut visited = HashSet::new();
    let (general_action, specific) = load_effective(fs, path, &mut visited)?;
    Ok(RuleSet {
        path: path.to_string(),
        general_action,
        specific,
    })
}

type Effective = (ReportDiagnostic, BTreeMap<String, ReportDiagnostic>);

fn load_effective(
    fs: &dyn FileSystem,
    path: &str,
    visited: &mut HashSet<String>,
) -> Result<Effective, RuleSetError> {
    visited.insert(path.to_string());
    let text = fs.read_all_text(path).map_err(|source| RuleSetError::Read {
        path: path.to_string(),
        source,
    })?;
    let document = parse_document(path, &text)?;
    debug!(
        path,
        rules = document.rules.len(),
        includes = document.includes.len(),
        "loaded ruleset"
    );

    let mut general = document.general_action;
    let mut included: BTreeMap<String, ReportDiagnostic> = BTreeMap::new();
    let directory = paths::directory_name(path);

    for (include_path, action) in &document.includes {
        let Some(resolved) = paths::resolve_relative_path(include_path, directory) else {
            return Err(RuleSetError::invalid(
                path,
                format!("Invalid include path '{}'", include_path),
            ));
        };
        if visited.contains(&resolved) {
            continue;
        }
        let (mut include_general, mut include_rules) = load_effective(fs, &resolved, visited)?;
        if *action != ReportDiagnostic::Default {
            if include_general != ReportDiagnostic::Default {
                include_general = *action;
            }
            include_rules.values_mut().for_each(|value| *value = *action);
        }
        if include_general.is_stricter_than(general) {
            general = include_general;
        }
        for (id, value) in include_rules {
            match included.get(&id) {
                Some(existing) if !value.is_stricter_than(*existing) => {}
                _ => {
                    included.insert(id, value);
                }
            }
        }
    }

    included.extend(document.rules);
    Ok((general, included))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_utils::MemoryFileSystem;

    #[test]
    fn reads_general_and_specific_actions() {
        let fs = MemoryFileSystem::new().with_file(
            "/p/a.ruleset",
            r#"<?xml version="1.0" encoding="utf-8"?>
<RuleSet Name="Test" ToolsVersion="12.0">
  <IncludeAll Action="Warning" />
  <Rules AnalyzerId="Analyzers" RuleNamespace="Analyzers">
    <Rule Id="CA1012" Action="Error" />
    <Rule Id="CA1013" Action="none" />
  </Rules>
</RuleSet>"#,
        );
        let rule_set = load_rule_set(&fs, "/p/a.ruleset").expect("valid ruleset");
        assert_eq!(rule_set.general_action, ReportDiagnostic::Warn);
        assert_eq!(rule_set.action_for("CA1012"), Some(ReportDiagnostic::Error));
        assert_eq!(rule_set.action_for("CA1013"), Some(ReportDiagnostic::Suppress));
        assert_eq!(rule_set.action_for("CA9999"), None);
    }

    #[test]
    fn own_rules_beat_includes_and_stricter_include_wins() {
        let fs = MemoryFileSystem::new()
            .with_file(
                "/p/main.ruleset",
                r#"<RuleSet>
  <Include Path="sub/one.ruleset" Action="Default" />
  <Include Path="sub/two.ruleset" Action="Default" />
  <Rules><Rule Id="X1" Action="Hidden" /></Rules>
</RuleSet>"#,
            )
            .with_file(
                "/p/sub/one.ruleset",
                r#"<RuleSet><Rules><Rule Id="X1" Action="Error" /><Rule Id="X2" Action="Info" /></Rules></RuleSet>"#,
            )
            .with_file(
                "/p/sub/two.ruleset",
                r#"<RuleSet><Rules><Rule Id="X2" Action="Warning" /></Rules></RuleSet>"#,
            );
        let rule_set = load_rule_set(&fs, "/p/main.ruleset").expect("valid ruleset");
        assert_eq!(rule_set.action_for("X1"), Some(ReportDiagnostic::Hidden));
        assert_eq!(rule_set.action_for("X2"), Some(ReportDiagnostic::Warn));
    }

    #[test]
    fn include_action_overrides_included_rules() {
        let fs = MemoryFileSystem::new()
            .with_file(
                "/p/main.ruleset",
                r#"<RuleSet><Include Path="inc.ruleset" Action="Error" /></RuleSet>"#,
            )
            .with_file(
                "/p/inc.ruleset",
                r#"<RuleSet><Rules><Rule Id="X1" Action="Info" /></Rules></RuleSet>"#,
            );
        let rule_set = load_rule_set(&fs, "/p/main.ruleset").expect("valid ruleset");
        assert_eq!(rule_set.action_for("X1"), Some(ReportDiagnostic::Error));
    }

    #[test]
    fn include_cycles_are_ignored() {
        let fs = MemoryFileSystem::new()
            .with_file(
                "/p/a.ruleset",
                r#"<RuleSet><Include Path="b.ruleset" Action="Default" /><Rules><Rule Id="A" Action="Error" /></Rules></RuleSet>"#,
            )
            .with_file(
                "/p/b.ruleset",
                r#"<RuleSet><Include Path="a.ruleset" Action="Default" /><Rules><Rule Id="B" Action="Warning" /></Rules></RuleSet>"#,
            );
        let rule_set = load_rule_set(&fs, "/p/a.ruleset").expect("cycle tolerated");
        assert_eq!(rule_set.specific.len(), 2);
    }

    #[test]
    fn failures_carry_path_and_message() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/bad.ruleset", "<RuleSet><Rules>")
            .with_file("/p/wrong.ruleset", "<Rules />")
            .with_file(
                "/p/action.ruleset",
                r#"<RuleSet><IncludeAll Action="Loud" /></RuleSet>"#,
            );

        let err = load_rule_set(&fs, "/p/missing.ruleset").expect_err("missing file");
        assert!(matches!(err, RuleSetError::Read { .. }));
        assert_eq!(err.path(), "/p/missing.ruleset");

        let err = load_rule_set(&fs, "/p/bad.ruleset").expect_err("malformed xml");
        assert!(matches!(err, RuleSetError::Xml { .. }));

        let err = load_rule_set(&fs, "/p/wrong.ruleset").expect_err("wrong root");
        assert!(err.to_string().contains("RuleSet"));

        let err = load_rule_set(&fs, "/p/action.ruleset").expect_err("bad action");
        assert_eq!(err.to_string(), "Invalid action value 'Loud'");
    }
}
