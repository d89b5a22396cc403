use std::collections::BTreeMap;

use serde_json::json;

use crate::diagnostics::{Diagnostic, DiagnosticDescriptor, DiagnosticSeverity};

fn level(severity: DiagnosticSeverity) -> &'static str {
    match severity {
        DiagnosticSeverity::Error => "error",
        DiagnosticSeverity::Warning => "warning",
        DiagnosticSeverity::Info => "note",
        DiagnosticSeverity::Hidden => "none",
    }
}

fn rule(descriptor: &DiagnosticDescriptor) -> serde_json::Value {
    json!({
        "id": descriptor.id,
        "shortDescription": { "text": descriptor.message_format },
        "defaultConfiguration": {
            "enabled": descriptor.enabled_by_default,
            "level": level(descriptor.default_severity)
        },
        "properties": {
            "category": descriptor.category,
            "warningLevel": descriptor.warning_level
        }
    })
}

fn result(diagnostic: &Diagnostic) -> serde_json::Value {
    let mut result = json!({
        "ruleId": diagnostic.id(),
        "level": level(diagnostic.severity()),
        "message": { "text": diagnostic.message() }
    });

    if let Some(location) = diagnostic.location() {
        result["locations"] = json!([{
            "physicalLocation": {
                "artifactLocation": { "uri": location.path },
                "region": {
                    "startLine": location.line,
                    "startColumn": location.column
                }
            }
        }]);
    }

    if let Some(suppression) = diagnostic.suppression() {
        result["suppressions"] = json!([{
            "kind": "external",
            "justification": suppression.justification,
            "properties": { "suppressionId": suppression.suppressor_id }
        }]);
    }

    result
}

/// SARIF 2.1.0 log of every diagnostic that was not hidden.
pub fn build_error_log(diagnostics: &[Diagnostic]) -> serde_json::Value {
    let reported: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| d.severity() != DiagnosticSeverity::Hidden)
        .collect();

    let rules: BTreeMap<&str, serde_json::Value> = reported
        .iter()
        .map(|d| (d.id(), rule(d.descriptor())))
        .collect();
    let results: Vec<serde_json::Value> = reported.iter().map(|d| result(d)).collect();

    json!({
        "version": "2.1.0",
        "$schema": "https://json.schemastore.org/sarif-2.1.0.json",
        "runs": [{
            "tool": {
                "driver": {
                    "name": crate::cli::help::PRODUCT_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                    "rules": rules.into_values().collect::<Vec<_>>()
                }
            },
            "results": results
        }]
    })
}

pub fn error_log_string(diagnostics: &[Diagnostic]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&build_error_log(diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{ErrorCode, Location, ProgrammaticSuppression};

    #[test]
    fn results_carry_rule_level_and_location() {
        let diagnostics = vec![
            Diagnostic::new(ErrorCode::FileAlreadyIncluded, ["a.cs"])
                .with_location(Location::new("/p/a.cs", 1, 2)),
            Diagnostic::bare(ErrorCode::OutputNeedsName),
        ];
        let log = build_error_log(&diagnostics);
        assert_eq!(log["version"], "2.1.0");
        let results = log["runs"][0]["results"].as_array().expect("results");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["ruleId"], "CS2002");
        assert_eq!(results[0]["level"], "warning");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["region"]["startLine"],
            1
        );
        assert_eq!(results[1]["level"], "error");
        assert!(results[1].get("locations").is_none());
        let rules = log["runs"][0]["tool"]["driver"]["rules"].as_array().expect("rules");
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn suppressed_results_keep_the_justification() {
        let diagnostics = vec![
            Diagnostic::new(ErrorCode::FileAlreadyIncluded, ["a.cs"]).with_suppression(
                ProgrammaticSuppression {
                    suppressor_id: "SPR1".to_string(),
                    justification: "generated code".to_string(),
                },
            ),
        ];
        let log = build_error_log(&diagnostics);
        let suppression = &log["runs"][0]["results"][0]["suppressions"][0];
        assert_eq!(suppression["kind"], "external");
        assert_eq!(suppression["justification"], "generated code");
        assert_eq!(suppression["properties"]["suppressionId"], "SPR1");
    }

    #[test]
    fn hidden_diagnostics_are_left_out() {
        let diagnostics = vec![
            Diagnostic::bare(ErrorCode::NoSources).with_severity(DiagnosticSeverity::Hidden),
        ];
        let text = error_log_string(&diagnostics).expect("serializes");
        let log: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert!(log["runs"][0]["results"].as_array().is_some_and(|r| r.is_empty()));
    }
}
