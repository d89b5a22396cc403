//! Helper functions for switch recognition.
//!
//! - Option detection (`/x`, `-x`, rooted paths that only look like options)
//! - Switch suggestion via Levenshtein distance

use strsim::levenshtein;

use crate::cli::switches;

/// A token split into switch name and raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOption {
    /// Lower-cased, including any `+`/`-` suffix.
    pub name: String,
    /// Text after the first `:`; `None` when there is no colon.
    pub value: Option<String>,
}

/// Split `arg` into an option, or `None` when it is not one.
///
/// `/home/u/a.cs` is a rooted path: the next `/` comes before any `:`.
pub fn try_parse_option(arg: &str) -> Option<RawOption> {
    let first = arg.chars().next()?;
    if first != '/' && first != '-' {
        return None;
    }
    let colon = arg.find(':');
    if first == '/' && arg.len() > 1 {
        if let Some(separator) = arg[1..].find('/').map(|i| i + 1) {
            if colon.is_none_or(|colon| separator < colon) {
                return None;
            }
        }
    }
    let (name, value) = match colon {
        Some(colon) => (&arg[1..colon], Some(arg[colon + 1..].to_string())),
        None => (&arg[1..], None),
    };
    Some(RawOption {
        name: name.to_lowercase(),
        value,
    })
}

/// Suggest a known switch close to `input`.
/// Returns Some(suggestion) if a close match is found (distance <= 2).
pub fn suggest_similar_switch(input: &str) -> Option<&'static str> {
    let input = input
        .trim_start_matches(['/', '-'])
        .split(':')
        .next()
        .unwrap_or("")
        .trim_end_matches(['+', '-'])
        .to_lowercase();
    if input.is_empty() {
        return None;
    }
    let mut best_match: Option<(&str, usize)> = None;
    for name in switches::all_names() {
        // One-letter aliases match almost anything.
        if name.len() < 2 {
            continue;
        }
        let distance = levenshtein(&input, name);
        if distance <= 2 && best_match.is_none_or(|(_, best)| distance < best) {
            best_match = Some((name, distance));
        }
    }
    best_match.map(|(name, _)| name)
}

/// `/name` as shown in diagnostics.
pub(super) fn switch_text(name: &str) -> String {
    format!("/{}", name)
}

/// `/name:` as shown in "missing value" diagnostics.
pub(super) fn switch_value_text(name: &str) -> String {
    format!("/{}:", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(name: &str, value: Option<&str>) -> Option<RawOption> {
        Some(RawOption {
            name: name.to_string(),
            value: value.map(str::to_string),
        })
    }

    #[test]
    fn recognizes_both_prefixes() {
        assert_eq!(try_parse_option("/OUT:a.exe"), option("out", Some("a.exe")));
        assert_eq!(try_parse_option("-t:library"), option("t", Some("library")));
        assert_eq!(try_parse_option("/debug+"), option("debug+", None));
        assert_eq!(try_parse_option("/define:"), option("define", Some("")));
    }

    #[test]
    fn value_keeps_everything_after_first_colon() {
        assert_eq!(
            try_parse_option("/out:c:/dir/a.exe"),
            option("out", Some("c:/dir/a.exe"))
        );
    }

    #[test]
    fn rooted_paths_are_not_options() {
        assert_eq!(try_parse_option("/home/u/a.cs"), None);
        assert_eq!(try_parse_option("//server/a.cs"), None);
        assert_eq!(try_parse_option("a.cs"), None);
        assert_eq!(try_parse_option(""), None);
        assert!(try_parse_option("-dir/a.cs").is_some());
    }

    #[test]
    fn suggests_close_switches() {
        assert_eq!(suggest_similar_switch("/tagret:exe"), Some("target"));
        assert_eq!(suggest_similar_switch("/nowran:1"), Some("nowarn"));
        assert_eq!(suggest_similar_switch("/completelywrong"), None);
    }
}
