//! Diagnostic severity resolution.
//!
//! Sources, in the order they are consulted:
//!
//! 1. the descriptor's default severity
//! 2. the ruleset (`IncludeAll` floor and per-ID rules)
//! 3. analyzer-config files (per-ID entries outrank bulk entries)
//! 4. `/warn:<level>` for compiler warnings not specifically configured
//! 5. `/warnaserror` (general and per-ID, tracked separately)
//! 6. `/nowarn`, which always wins
//!
//! [`DiagnosticConfiguration`] is the frozen snapshot the parser hands out;
//! [`DiagnosticConfiguration::resolve`] computes one decision and never
//! mutates anything.

pub mod analyzer_config;
pub mod command_line;
pub mod config_set;
pub mod ruleset;
pub mod section_matcher;
pub mod suppression;

use tracing::trace;

pub use analyzer_config::{AnalyzerConfig, parse_severity};
pub use command_line::{CommandLineSeverity, SpecificWarnAsError, parse_warning_ids};
pub use config_set::{AnalyzerConfigOptions, AnalyzerConfigSet};
pub use ruleset::{RuleSet, RuleSetError, load_rule_set};
pub use suppression::{DiagnosticSuppressor, SuppressionDescriptor, TomlSuppressor};

use crate::diagnostics::{
    Diagnostic, DiagnosticDescriptor, DiagnosticOrigin, DiagnosticSeverity, ReportDiagnostic,
};
use analyzer_config::{ALL_ANALYZER_SEVERITY_KEYS, category_severity_keys};

/// Which source produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Default,
    RuleSetSpecific,
    RuleSetGeneral,
    AnalyzerConfigSpecific,
    AnalyzerConfigBulk,
    WarningLevel,
    WarnAsErrorSpecific,
    WarnAsErrorGeneral,
    NoWarn,
    NotConfigurable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityDecision {
    pub report: ReportDiagnostic,
    pub source: DecisionSource,
}

impl SeverityDecision {
    /// Severity the diagnostic is reported with; `None` when suppressed.
    pub fn effective(&self, descriptor: &DiagnosticDescriptor) -> Option<DiagnosticSeverity> {
        self.report.apply_to(descriptor)
    }
}

/// Frozen severity configuration of one compilation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticConfiguration {
    pub rule_set: Option<RuleSet>,
    pub command_line: CommandLineSeverity,
    pub analyzer_configs: AnalyzerConfigSet,
}

impl DiagnosticConfiguration {
    pub fn general_rule_set_action(&self) -> ReportDiagnostic {
        self.rule_set
            .as_ref()
            .map(|r| r.general_action)
            .unwrap_or_default()
    }

    /// Analyzer-config view for a diagnostic at `source_path`, or the
    /// global view when the diagnostic has no location.
    pub fn options_for(&self, source_path: Option<&str>) -> AnalyzerConfigOptions {
        match source_path {
            Some(path) => self.analyzer_configs.options_for_source_path(path),
            None => self.analyzer_configs.global_options(),
        }
    }

    /// Final decision for `descriptor` under `options`.
    pub fn resolve(
        &self,
        descriptor: &DiagnosticDescriptor,
        options: Option<&AnalyzerConfigOptions>,
    ) -> SeverityDecision {
        if !descriptor.is_configurable() {
            return SeverityDecision {
                report: ReportDiagnostic::Default,
                source: DecisionSource::NotConfigurable,
            };
        }

        let id = descriptor.id.as_ref();
        let mut decision = SeverityDecision {
            report: ReportDiagnostic::Default,
            source: DecisionSource::Default,
        };
        let mut specific = false;

        if let Some(action) = self.rule_set.as_ref().and_then(|r| r.action_for(id)) {
            decision = SeverityDecision {
                report: action,
                source: DecisionSource::RuleSetSpecific,
            };
            specific = true;
        }

        let mut bulk = false;
        let config_options = options.filter(|_| !descriptor.tags.custom_severity);
        if let Some(options) = config_options {
            if let Some(severity) = options.severity_for(id) {
                decision = SeverityDecision {
                    report: severity,
                    source: DecisionSource::AnalyzerConfigSpecific,
                };
                specific = true;
            } else if !specific && descriptor.origin == DiagnosticOrigin::Analyzer {
                if let Some(severity) = bulk_severity(descriptor, options) {
                    decision = SeverityDecision {
                        report: severity,
                        source: DecisionSource::AnalyzerConfigBulk,
                    };
                    bulk = true;
                }
            }
        }

        if !specific && !bulk {
            if let Some(report) = apply_general_action(self.general_rule_set_action(), descriptor, decision.report) {
                decision = SeverityDecision {
                    report,
                    source: DecisionSource::RuleSetGeneral,
                };
            }
        }

        let command_line = &self.command_line;
        let specific_warn_as_error = command_line.specific_warn_as_error(id);
        if !specific
            && specific_warn_as_error.is_none()
            && descriptor.origin == DiagnosticOrigin::Compiler
            && descriptor.default_severity == DiagnosticSeverity::Warning
            && descriptor.warning_level > command_line.warning_level
        {
            decision = SeverityDecision {
                report: ReportDiagnostic::Suppress,
                source: DecisionSource::WarningLevel,
            };
        }

        match specific_warn_as_error {
            Some(SpecificWarnAsError::Error) => {
                decision = SeverityDecision {
                    report: ReportDiagnostic::Error,
                    source: DecisionSource::WarnAsErrorSpecific,
                };
            }
            Some(SpecificWarnAsError::Reset) => {}
            None => {
                if command_line.general_warn_as_error
                    && !descriptor.tags.custom_severity
                    && decision.effective(descriptor) == Some(DiagnosticSeverity::Warning)
                {
                    decision = SeverityDecision {
                        report: ReportDiagnostic::Error,
                        source: DecisionSource::WarnAsErrorGeneral,
                    };
                }
            }
        }

        if command_line.is_no_warn(id) {
            decision = SeverityDecision {
                report: ReportDiagnostic::Suppress,
                source: DecisionSource::NoWarn,
            };
        }

        trace!(id, report = %decision.report, source = ?decision.source, "severity decision");
        decision
    }

    /// Configure one diagnostic. `None` when it ends up suppressed.
    pub fn apply(&self, diagnostic: Diagnostic, options: Option<&AnalyzerConfigOptions>) -> Option<Diagnostic> {
        let decision = self.resolve(diagnostic.descriptor(), options);
        let severity = decision.effective(diagnostic.descriptor())?;
        Some(diagnostic.with_severity(severity))
    }

    /// Configure a batch, looking up analyzer-config options per location.
    pub fn apply_all(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        let global = self.analyzer_configs.global_options();
        diagnostics
            .into_iter()
            .filter_map(|diagnostic| match diagnostic.location() {
                Some(location) => {
                    let options = self.options_for(Some(&location.path));
                    self.apply(diagnostic, Some(&options))
                }
                None => self.apply(diagnostic, Some(&global)),
            })
            .collect()
    }
}

/// Category entry first, then the all-analyzers entry.
fn bulk_severity(descriptor: &DiagnosticDescriptor, options: &AnalyzerConfigOptions) -> Option<ReportDiagnostic> {
    let category_keys = category_severity_keys(&descriptor.category);
    category_keys
        .iter()
        .map(String::as_str)
        .chain(ALL_ANALYZER_SEVERITY_KEYS.iter().copied())
        .find_map(|key| options.property(key).and_then(parse_severity))
}

/// Ruleset `IncludeAll` floor for a diagnostic nobody configured.
fn apply_general_action(
    general: ReportDiagnostic,
    descriptor: &DiagnosticDescriptor,
    current: ReportDiagnostic,
) -> Option<ReportDiagnostic> {
    let effective = current.apply_to(descriptor)?;
    match general {
        ReportDiagnostic::Default => None,
        ReportDiagnostic::Error => {
            (effective == DiagnosticSeverity::Warning).then_some(ReportDiagnostic::Error)
        }
        ReportDiagnostic::Suppress => matches!(
            effective,
            DiagnosticSeverity::Warning | DiagnosticSeverity::Info
        )
        .then_some(ReportDiagnostic::Suppress),
        ReportDiagnostic::Warn | ReportDiagnostic::Info | ReportDiagnostic::Hidden => {
            (descriptor.origin == DiagnosticOrigin::Analyzer
                && effective == DiagnosticSeverity::Warning)
                .then_some(general)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DescriptorTags, ErrorCode};

    fn analyzer(id: &'static str, severity: DiagnosticSeverity) -> DiagnosticDescriptor {
        DiagnosticDescriptor::analyzer(id, "Style", severity, "msg")
    }

    fn options(pairs: &[(&str, &str)]) -> AnalyzerConfigOptions {
        let text: String = std::iter::once("[*.cs]".to_string())
            .chain(pairs.iter().map(|(k, v)| format!("{} = {}", k, v)))
            .collect::<Vec<_>>()
            .join("\n");
        AnalyzerConfigSet::create(vec![AnalyzerConfig::parse(&text, "/p/.editorconfig")])
            .options_for_source_path("/p/a.cs")
    }

    fn rule_set(general: ReportDiagnostic, specific: &[(&str, ReportDiagnostic)]) -> RuleSet {
        RuleSet {
            path: "/p/a.ruleset".to_string(),
            general_action: general,
            specific: specific.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn untouched_diagnostic_keeps_default() {
        let config = DiagnosticConfiguration::default();
        let decision = config.resolve(&analyzer("CA1", DiagnosticSeverity::Info), None);
        assert_eq!(decision.report, ReportDiagnostic::Default);
        assert_eq!(decision.source, DecisionSource::Default);
    }

    #[test]
    fn per_id_entry_beats_bulk_entry() {
        let config = DiagnosticConfiguration::default();
        let opts = options(&[
            ("dotnet_analyzer_diagnostic.severity", "error"),
            ("dotnet_diagnostic.CA1.severity", "suggestion"),
        ]);
        let decision = config.resolve(&analyzer("CA1", DiagnosticSeverity::Warning), Some(&opts));
        assert_eq!(decision.report, ReportDiagnostic::Info);
        let other = config.resolve(&analyzer("CA2", DiagnosticSeverity::Warning), Some(&opts));
        assert_eq!(other.report, ReportDiagnostic::Error);
    }

    #[test]
    fn category_bulk_beats_all_bulk() {
        let config = DiagnosticConfiguration::default();
        let opts = options(&[
            ("analyzer-diagnostic.severity", "error"),
            ("dotnet_analyzer_diagnostic.category-style.severity", "none"),
        ]);
        let decision = config.resolve(&analyzer("CA1", DiagnosticSeverity::Warning), Some(&opts));
        assert_eq!(decision.report, ReportDiagnostic::Suppress);
    }

    #[test]
    fn bulk_entries_skip_compiler_diagnostics() {
        let config = DiagnosticConfiguration::default();
        let opts = options(&[("dotnet_analyzer_diagnostic.severity", "error")]);
        let decision = config.resolve(&ErrorCode::NoSources.descriptor(), Some(&opts));
        assert_eq!(decision.report, ReportDiagnostic::Default);
    }

    #[test]
    fn custom_severity_ignores_config_files() {
        let config = DiagnosticConfiguration::default();
        let opts = options(&[("dotnet_diagnostic.CA1.severity", "none")]);
        let descriptor = analyzer("CA1", DiagnosticSeverity::Warning).with_tags(DescriptorTags {
            custom_severity: true,
            not_configurable: false,
        });
        assert_eq!(config.resolve(&descriptor, Some(&opts)).report, ReportDiagnostic::Default);
    }

    #[test]
    fn rule_set_general_floor() {
        let config = DiagnosticConfiguration {
            rule_set: Some(rule_set(ReportDiagnostic::Error, &[])),
            ..Default::default()
        };
        let warning = config.resolve(&analyzer("CA1", DiagnosticSeverity::Warning), None);
        assert_eq!(warning.report, ReportDiagnostic::Error);
        let info = config.resolve(&analyzer("CA2", DiagnosticSeverity::Info), None);
        assert_eq!(info.report, ReportDiagnostic::Default);

        let quiet = DiagnosticConfiguration {
            rule_set: Some(rule_set(ReportDiagnostic::Suppress, &[])),
            ..Default::default()
        };
        let info = quiet.resolve(&analyzer("CA2", DiagnosticSeverity::Info), None);
        assert_eq!(info.report, ReportDiagnostic::Suppress);
    }

    #[test]
    fn analyzer_config_overrides_rule_set_rule() {
        let config = DiagnosticConfiguration {
            rule_set: Some(rule_set(ReportDiagnostic::Default, &[("CA1", ReportDiagnostic::Error)])),
            ..Default::default()
        };
        let opts = options(&[("dotnet_diagnostic.CA1.severity", "warning")]);
        let decision = config.resolve(&analyzer("CA1", DiagnosticSeverity::Info), Some(&opts));
        assert_eq!(decision.report, ReportDiagnostic::Warn);
        let bulk = options(&[("dotnet_analyzer_diagnostic.severity", "none")]);
        let decision = config.resolve(&analyzer("CA1", DiagnosticSeverity::Info), Some(&bulk));
        assert_eq!(decision.report, ReportDiagnostic::Error);
    }

    #[test]
    fn warning_level_filters_unconfigured_compiler_warnings() {
        let mut config = DiagnosticConfiguration::default();
        config.command_line.warning_level = 1;
        let level_two = ErrorCode::InvalidSearchPathDir.descriptor();
        assert_eq!(config.resolve(&level_two, None).report, ReportDiagnostic::Suppress);

        config
            .command_line
            .set_specific_warn_as_error(true, vec!["CS1668".to_string()], None);
        assert_eq!(config.resolve(&level_two, None).report, ReportDiagnostic::Error);
    }

    #[test]
    fn general_warn_as_error_respects_reset() {
        let mut config = DiagnosticConfiguration::default();
        config
            .command_line
            .set_specific_warn_as_error(false, vec!["CS2008".to_string()], None);
        config.command_line.set_general_warn_as_error(true);
        let no_sources = ErrorCode::NoSources.descriptor();
        assert_eq!(config.resolve(&no_sources, None).report, ReportDiagnostic::Default);
        let other = ErrorCode::FileAlreadyIncluded.descriptor();
        assert_eq!(config.resolve(&other, None).report, ReportDiagnostic::Error);
    }

    #[test]
    fn no_warn_wins_over_warn_as_error() {
        let mut config = DiagnosticConfiguration::default();
        config.command_line.add_no_warn(vec!["CS2008".to_string()]);
        config
            .command_line
            .set_specific_warn_as_error(true, vec!["CS2008".to_string()], None);
        config.command_line.set_general_warn_as_error(true);
        let decision = config.resolve(&ErrorCode::NoSources.descriptor(), None);
        assert_eq!(decision.report, ReportDiagnostic::Suppress);
        assert_eq!(decision.source, DecisionSource::NoWarn);
    }

    #[test]
    fn compiler_errors_stay_errors() {
        let mut config = DiagnosticConfiguration::default();
        config.command_line.add_no_warn(vec!["CS2007".to_string()]);
        let diagnostic = Diagnostic::new(ErrorCode::BadSwitch, ["/x"]);
        let applied = config.apply(diagnostic, None).expect("still reported");
        assert!(applied.is_error());
    }
}
