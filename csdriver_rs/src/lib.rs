//! # csdriver
//!
//! Command-line front end for a C#-style compiler driver: everything that
//! happens between `argv` and the compiler proper.
//!
//! ## Features
//!
//! - **Response files** - `@file` expansion with quoting rules and nesting limits
//! - **Switch parsing** - `/name[+|-][:value]` with aliases and precise diagnostics
//! - **Path resolution** - relative paths, wildcards and `/recurse`
//! - **Severity engine** - rulesets, `.editorconfig`/global analyzer configs,
//!   `/warn`, `/warnaserror` and `/nowarn` folded into one decision
//! - **Reporting** - console output and SARIF 2.1.0 error logs
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,no_run
//! use csdriver::cli::CommandLineParser;
//! use csdriver::fs_utils::RealFileSystem;
//!
//! let args: Vec<String> = vec!["/target:library".into(), "src/*.cs".into()];
//! let parsed = CommandLineParser::new(&RealFileSystem, Some("/work")).parse(&args);
//! for diagnostic in &parsed.diagnostics {
//!     println!("{}", diagnostic);
//! }
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Argument tokenizing, response files, the switch table and the parser.
pub mod cli;

/// Optional `.csdriver/config.toml`.
pub mod config;

/// Diagnostic descriptors, codes and instances.
pub mod diagnostics;

/// Parse, configure severities, suppress.
pub mod driver;

/// File-system abstraction with a real and an in-memory implementation.
pub mod fs_utils;

pub mod langversion;

/// Output file and module naming.
pub mod output;

pub mod paths;

/// Console and SARIF rendering.
pub mod report;

pub mod resources;

/// Ruleset and analyzer-config driven severity resolution.
///
/// # Submodules
///
/// - [`severity::ruleset`] - XML ruleset documents with includes
/// - [`severity::analyzer_config`] - `.editorconfig` / global config files
/// - [`severity::config_set`] - per-file option views over many configs
/// - [`severity::command_line`] - `/warn`, `/nowarn`, `/warnaserror`
/// - [`severity::suppression`] - programmatic suppressors
pub mod severity;

pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{CommandLineParser, ParsedArguments};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, ErrorCode};
pub use driver::{Driver, DriverError, DriverOutcome};
pub use langversion::LanguageVersion;
pub use resources::ResourceDescription;
