//! Severity state accumulated from `/warnaserror`, `/nowarn` and `/warn`.
//!
//! The general `/warnaserror[+|-]` flag and the per-ID entries are tracked
//! separately: each occurrence only overwrites the earlier decision for its
//! own target.

use std::collections::{BTreeMap, BTreeSet};

use super::ruleset::RuleSet;
use crate::cli::tokenizer::remove_quotes_and_slashes;
use crate::diagnostics::{NULLABLE_WARNINGS, ReportDiagnostic, normalize_diagnostic_id};

pub const DEFAULT_WARNING_LEVEL: u32 = 4;
/// Highest level `/warn` accepts.
pub const MAX_WARNING_LEVEL: u32 = 4;

/// Pseudo-ID accepted by `/nowarn` and `/warnaserror`.
pub const NULLABLE_GROUP: &str = "nullable";

/// Per-ID `/warnaserror` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecificWarnAsError {
    /// `/warnaserror+:id`
    Error,
    /// `/warnaserror-:id`: back to whatever the other sources decide.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLineSeverity {
    pub general_warn_as_error: bool,
    pub warn_as_error: BTreeMap<String, SpecificWarnAsError>,
    pub no_warn: BTreeSet<String>,
    pub warning_level: u32,
}

impl Default for CommandLineSeverity {
    fn default() -> Self {
        Self {
            general_warn_as_error: false,
            warn_as_error: BTreeMap::new(),
            no_warn: BTreeSet::new(),
            warning_level: DEFAULT_WARNING_LEVEL,
        }
    }
}

impl CommandLineSeverity {
    pub fn set_general_warn_as_error(&mut self, enabled: bool) {
        self.general_warn_as_error = enabled;
    }

    /// `/warnaserror+:ids` escalates every ID, ruleset `None` included. The
    /// one exception is an ID an earlier `/warnaserror-:id` reset while the
    /// ruleset suppresses it: that entry stays suppressed.
    pub fn set_specific_warn_as_error<I>(&mut self, enabled: bool, ids: I, rule_set: Option<&RuleSet>)
    where
        I: IntoIterator<Item = String>,
    {
        for id in ids {
            if !enabled {
                self.warn_as_error.insert(id, SpecificWarnAsError::Reset);
                continue;
            }
            let was_reset = self.warn_as_error.get(&id) == Some(&SpecificWarnAsError::Reset);
            let reset_to_suppressed = was_reset
                && rule_set
                    .and_then(|r| r.action_for(&id))
                    .is_some_and(|action| action == ReportDiagnostic::Suppress);
            if !reset_to_suppressed {
                self.warn_as_error.insert(id, SpecificWarnAsError::Error);
            }
        }
    }

    pub fn add_no_warn<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.no_warn.extend(ids);
    }

    pub fn is_no_warn(&self, id: &str) -> bool {
        self.no_warn.contains(id)
    }

    pub fn specific_warn_as_error(&self, id: &str) -> Option<SpecificWarnAsError> {
        self.warn_as_error.get(id).copied()
    }
}

/// Split a `/nowarn` or `/warnaserror` list into canonical IDs.
///
/// Separators are `,`, `;` and whitespace; bare numbers become `CSnnnn`
/// and `nullable` expands to the nullable warning group.
pub fn parse_warning_ids(value: &str) -> Vec<String> {
    let unquoted = remove_quotes_and_slashes(value);
    let mut ids = Vec::new();
    for item in unquoted
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|item| !item.is_empty())
    {
        if item.eq_ignore_ascii_case(NULLABLE_GROUP) {
            ids.extend(NULLABLE_WARNINGS.iter().map(|id| id.to_string()));
        } else {
            ids.push(normalize_diagnostic_id(item));
        }
    }
    ids
}
