//! Command-line parser for the compiler driver.
//!
//! This module is organized into several submodules:
//! - `core`: the reducer folding switches into [`ParsedArguments`]
//! - `values`: parsers for structured switch values
//! - `finish`: whole-command-line checks and output naming
//! - `helpers`: option detection and switch suggestions
//!
//! Parsing never fails: every problem becomes a diagnostic on the result.

mod core;
mod finish;
mod helpers;
mod values;

pub use helpers::{RawOption, suggest_similar_switch, try_parse_option};
pub use values::is_valid_identifier;

use tracing::debug;

use self::core::ArgumentsBuilder;
use crate::cli::arguments::ParsedArguments;
use crate::cli::response_files::{DEFAULT_MAX_DEPTH, ResponseFileExpander};
use crate::fs_utils::FileSystem;
use crate::output::{EntryPointLocator, MainMethodScanner};

/// Knobs that come from the driver configuration rather than the
/// command line.
#[derive(Debug, Clone)]
pub struct ParserSettings {
    pub max_response_file_depth: usize,
    /// Library directories appended after `/lib`.
    pub extra_lib_paths: Vec<String>,
    /// `(path, text)` of response files the caller has already read.
    pub preloaded_response_files: Vec<(String, String)>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            max_response_file_depth: DEFAULT_MAX_DEPTH,
            extra_lib_paths: Vec::new(),
            preloaded_response_files: Vec::new(),
        }
    }
}

pub struct CommandLineParser<'a> {
    fs: &'a dyn FileSystem,
    base_directory: Option<String>,
    settings: ParserSettings,
    entry_points: Option<&'a dyn EntryPointLocator>,
}

impl<'a> CommandLineParser<'a> {
    pub fn new(fs: &'a dyn FileSystem, base_directory: Option<&str>) -> Self {
        Self {
            fs,
            base_directory: base_directory.map(crate::paths::normalize),
            settings: ParserSettings::default(),
            entry_points: None,
        }
    }

    pub fn with_settings(mut self, settings: ParserSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the default `Main` scanner used for output naming.
    pub fn with_entry_point_locator(mut self, locator: &'a dyn EntryPointLocator) -> Self {
        self.entry_points = Some(locator);
        self
    }

    pub fn base_directory(&self) -> Option<&str> {
        self.base_directory.as_deref()
    }

    /// Expand response files and reduce every token.
    pub fn parse(&self, args: &[String]) -> ParsedArguments {
        let base_directory = self.base_directory.as_deref();
        let mut diagnostics = Vec::new();
        let tokens = ResponseFileExpander::new(self.fs, base_directory)
            .with_max_depth(self.settings.max_response_file_depth)
            .with_preloaded(self.settings.preloaded_response_files.iter().cloned())
            .expand(args, &mut diagnostics);
        debug!(args = args.len(), tokens = tokens.len(), "expanded command line");

        let mut builder = ArgumentsBuilder::new(self.fs, base_directory, diagnostics);
        builder.load_rule_set(&tokens);
        for token in &tokens {
            builder.reduce(token);
        }

        let scanner = MainMethodScanner::new(self.fs);
        let locator: &dyn EntryPointLocator = match self.entry_points {
            Some(locator) => locator,
            None => &scanner,
        };
        builder.finish(&self.settings.extra_lib_paths, locator)
    }
}
