//! Help, version and language-version listings.

use crate::cli::switches::{Group, SWITCHES, SwitchDescriptor};
use crate::langversion::LanguageVersion;

pub const PRODUCT_NAME: &str = "csdriver";

/// The line printed unless `/nologo` is given.
pub fn format_logo() -> String {
    format!(
        "{} version {} - compiler command-line front end",
        PRODUCT_NAME,
        env!("CARGO_PKG_VERSION")
    )
}

pub fn format_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn usage_column(descriptor: &SwitchDescriptor) -> String {
    let mut column = format!("-{}{}", descriptor.canonical_name(), descriptor.value_hint);
    for alias in &descriptor.names[1..] {
        column.push_str(&format!(" (-{})", alias));
    }
    column
}

/// Usage listing generated from the switch table, one section per group.
pub fn format_help() -> String {
    let mut help = String::new();
    help.push_str(&format_logo());
    help.push_str("\n\nUsage: csdriver [options] <source files>\n");

    for group in Group::ALL {
        help.push_str(&format!("\n- {} -\n", group.title()));
        for descriptor in SWITCHES.iter().filter(|d| d.group == *group) {
            let column = usage_column(descriptor);
            if column.len() < 32 {
                help.push_str(&format!("{:<32}{}\n", column, descriptor.help));
            } else {
                help.push_str(&format!("{}\n{:<32}{}\n", column, "", descriptor.help));
            }
        }
    }

    help.push_str("\n@<file>                         Read response file for more options\n");
    help.push_str("--                              Treat the next argument as a script and pass the rest to it\n");
    help
}

/// `/langversion:?`
pub fn format_language_versions() -> String {
    let mut out = String::from("Supported language versions:\n");
    for line in LanguageVersion::listing() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_switch() {
        let help = format_help();
        for descriptor in SWITCHES {
            assert!(
                help.contains(&format!("-{}", descriptor.canonical_name())),
                "missing {}",
                descriptor.canonical_name()
            );
        }
        assert!(help.contains("(-t)"));
        assert!(help.contains("- ERRORS AND WARNINGS -"));
    }

    #[test]
    fn test_language_versions_mark_default() {
        let listing = format_language_versions();
        assert!(listing.contains("latest"));
        assert!(listing.contains("(default)"));
    }

    #[test]
    fn test_version_is_package_version() {
        assert_eq!(format_version(), env!("CARGO_PKG_VERSION"));
        assert!(format_logo().contains(PRODUCT_NAME));
    }
}
