//! The driver pipeline: configuration, parsing, severity, suppression.
//!
//! ```text
//! argv ──► default response file ──► CommandLineParser ──► missing-source check
//!                                                              │
//!   exit code ◄── report ◄── suppressors ◄── severity engine ◄─┘
//! ```

use std::collections::HashSet;
use std::io;

use thiserror::Error;
use tracing::{debug, info};

use crate::cli::arguments::ParsedArguments;
use crate::cli::parser::{CommandLineParser, ParserSettings, try_parse_option};
use crate::cli::switches::{self, SwitchId};
use crate::config::DriverConfig;
use crate::diagnostics::{Diagnostic, ErrorCode, has_errors};
use crate::fs_utils::FileSystem;
use crate::report::error_log_string;
use crate::severity::TomlSuppressor;
use crate::severity::suppression::apply_suppressors;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read default response file {path}: {source}")]
    DefaultResponseFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot write error log {path}: {source}")]
    ErrorLog {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot serialize error log: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything one invocation produced.
#[derive(Debug, Clone)]
pub struct DriverOutcome {
    pub arguments: ParsedArguments,
    /// Diagnostics after severity configuration and suppression.
    pub diagnostics: Vec<Diagnostic>,
}

impl DriverOutcome {
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }

    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_errors())
    }
}

pub struct Driver<'a> {
    fs: &'a dyn FileSystem,
    base_directory: String,
    config: DriverConfig,
}

impl<'a> Driver<'a> {
    /// Driver rooted at `base_directory`, reading `.csdriver/config.toml`.
    pub fn new(fs: &'a dyn FileSystem, base_directory: &str) -> Self {
        let base_directory = crate::paths::normalize(base_directory);
        let config = DriverConfig::load(fs, &base_directory);
        Self {
            fs,
            base_directory,
            config,
        }
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_directory(&self) -> &str {
        &self.base_directory
    }

    /// `/noconfig` counts only when given directly on the command line.
    fn has_no_config(args: &[String]) -> bool {
        args.iter().any(|arg| {
            try_parse_option(arg)
                .and_then(|option| switches::lookup(&option.name))
                .is_some_and(|(descriptor, _)| descriptor.id == SwitchId::NoConfig)
        })
    }

    /// The configured default response file and its text, if any.
    fn default_response_file(
        &self,
        args: &[String],
    ) -> Result<Option<(String, String)>, DriverError> {
        if Self::has_no_config(args) {
            return Ok(None);
        }
        let Some(path) = self
            .config
            .default_response_file(&self.base_directory)
            .filter(|path| self.fs.file_exists(path))
        else {
            return Ok(None);
        };
        let text = self
            .fs
            .read_all_text(&path)
            .map_err(|source| DriverError::DefaultResponseFile {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path, "using default response file");
        Ok(Some((path, text)))
    }

    pub fn parse(&self, args: &[String]) -> Result<ParsedArguments, DriverError> {
        let default = self.default_response_file(args)?;
        let mut effective = Vec::with_capacity(args.len() + 1);
        if let Some((path, _)) = &default {
            effective.push(format!("@{}", path));
        }
        effective.extend_from_slice(args);
        let settings = ParserSettings {
            max_response_file_depth: self.config.response_files.max_depth,
            extra_lib_paths: self.config.extra_lib_paths().map(str::to_string).collect(),
            preloaded_response_files: default.into_iter().collect(),
        };
        Ok(CommandLineParser::new(self.fs, Some(&self.base_directory))
            .with_settings(settings)
            .parse(&effective))
    }

    /// Run the whole pipeline up to, but not including, output.
    pub fn run(&self, args: &[String]) -> Result<DriverOutcome, DriverError> {
        let arguments = self.parse(args)?;
        let mut diagnostics = arguments.diagnostics.clone();

        if !arguments.display.wants_display_only() {
            for path in &arguments.explicit_source_paths {
                if !self.fs.file_exists(path) {
                    diagnostics.push(Diagnostic::new(ErrorCode::FileNotFound, [path.as_str()]));
                }
            }
        }
        diagnostics.extend(self.analyzer_config_diagnostics(&arguments));

        let configuration = &arguments.diagnostic_configuration;
        let mut diagnostics = configuration.apply_all(diagnostics);

        if self.config.suppressions.enabled {
            let config_dir = DriverConfig::directory(&self.base_directory);
            let suppressor = TomlSuppressor::load(self.fs, &config_dir, &self.base_directory);
            if !suppressor.is_empty() {
                diagnostics = apply_suppressors(diagnostics, &[&suppressor]);
            }
        }

        info!(
            diagnostics = diagnostics.len(),
            errors = diagnostics.iter().filter(|d| d.is_error()).count(),
            "driver finished"
        );
        Ok(DriverOutcome {
            arguments,
            diagnostics,
        })
    }

    /// Invalid severities found while building per-file option views.
    /// The same file entry is reported once however many sources see it.
    fn analyzer_config_diagnostics(&self, arguments: &ParsedArguments) -> Vec<Diagnostic> {
        let configuration = &arguments.diagnostic_configuration;
        if configuration.analyzer_configs.is_empty() {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let views = std::iter::once(configuration.analyzer_configs.global_options()).chain(
            arguments
                .source_paths()
                .map(|path| configuration.options_for(Some(path))),
        );
        for view in views {
            for diagnostic in view.diagnostics {
                if seen.insert((diagnostic.id().to_string(), diagnostic.arguments().to_vec())) {
                    out.push(diagnostic);
                }
            }
        }
        out
    }

    /// Write the `/errorlog` SARIF file, when one was requested.
    pub fn write_error_log(&self, outcome: &DriverOutcome) -> Result<(), DriverError> {
        let Some(path) = outcome.arguments.reporting.error_log_path.as_deref() else {
            return Ok(());
        };
        let text = error_log_string(&outcome.diagnostics)?;
        std::fs::write(path, text).map_err(|source| DriverError::ErrorLog {
            path: path.to_string(),
            source,
        })?;
        debug!(path, "wrote error log");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::diagnostics::DiagnosticSeverity;
    use crate::fs_utils::MemoryFileSystem;

    /// Records every path read through it.
    struct RecordingFileSystem {
        inner: MemoryFileSystem,
        reads: RefCell<Vec<String>>,
    }

    impl FileSystem for RecordingFileSystem {
        fn file_exists(&self, path: &str) -> bool {
            self.inner.file_exists(path)
        }

        fn directory_exists(&self, path: &str) -> bool {
            self.inner.directory_exists(path)
        }

        fn enumerate_files(
            &self,
            dir: &str,
            pattern: &str,
            recursive: bool,
        ) -> io::Result<Vec<String>> {
            self.inner.enumerate_files(dir, pattern, recursive)
        }

        fn read_all_text(&self, path: &str) -> io::Result<String> {
            self.reads.borrow_mut().push(path.to_string());
            self.inner.read_all_text(path)
        }

        fn read_all_bytes(&self, path: &str) -> io::Result<Vec<u8>> {
            self.reads.borrow_mut().push(path.to_string());
            self.inner.read_all_bytes(path)
        }

        fn full_path(&self, path: &str) -> String {
            self.inner.full_path(path)
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn ids(outcome: &DriverOutcome) -> Vec<&str> {
        outcome.diagnostics.iter().map(|d| d.id()).collect()
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let fs = MemoryFileSystem::new().with_file("/p/a.cs", "class A { static void Main() {} }");
        let outcome = Driver::new(&fs, "/p").run(&args(&["a.cs", "b.cs"])).expect("runs");
        assert_eq!(ids(&outcome), vec!["CS2001"]);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_library_without_sources_exits_zero() {
        let fs = MemoryFileSystem::new().with_directory("/p");
        let outcome = Driver::new(&fs, "/p")
            .run(&args(&["/target:library", "/out:abc.dll"]))
            .expect("runs");
        assert_eq!(ids(&outcome), vec!["CS2008"]);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_nowarn_suppresses_parser_warning() {
        let fs = MemoryFileSystem::new().with_directory("/p");
        let outcome = Driver::new(&fs, "/p")
            .run(&args(&["/t:library", "/out:abc.dll", "/nowarn:2008"]))
            .expect("runs");
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_warnaserror_escalates_parser_warning() {
        let fs = MemoryFileSystem::new().with_directory("/p");
        let outcome = Driver::new(&fs, "/p")
            .run(&args(&["/t:library", "/out:abc.dll", "/warnaserror"]))
            .expect("runs");
        assert_eq!(outcome.diagnostics[0].severity(), DiagnosticSeverity::Error);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_default_response_file_is_prepended() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/a.cs", "")
            .with_file("/p/.csdriver/config.toml", "[response_files]\ndefault = \"csdriver.rsp\"\n")
            .with_file("/p/.csdriver/csdriver.rsp", "/define:FROM_RSP\n");
        let driver = Driver::new(&fs, "/p");
        let parsed = driver.parse(&args(&["a.cs"])).expect("parses");
        assert_eq!(parsed.parse_options.preprocessor_symbols, vec!["FROM_RSP"]);

        let parsed = driver.parse(&args(&["/noconfig", "a.cs"])).expect("parses");
        assert!(parsed.parse_options.preprocessor_symbols.is_empty());
    }

    #[test]
    fn test_default_response_file_is_read_once() {
        let fs = RecordingFileSystem {
            inner: MemoryFileSystem::new()
                .with_file("/p/a.cs", "")
                .with_file("/p/.csdriver/config.toml", "[response_files]\ndefault = \"csdriver.rsp\"\n")
                .with_file("/p/.csdriver/csdriver.rsp", "/define:FROM_RSP\n"),
            reads: RefCell::new(Vec::new()),
        };
        let driver = Driver::new(&fs, "/p");
        fs.reads.borrow_mut().clear();
        let parsed = driver.parse(&args(&["/t:library", "a.cs"])).expect("parses");
        assert_eq!(parsed.parse_options.preprocessor_symbols, vec!["FROM_RSP"]);
        let reads = fs.reads.borrow();
        let rsp_reads = reads.iter().filter(|p| p.ends_with("csdriver.rsp")).count();
        assert_eq!(rsp_reads, 1, "{reads:?}");
    }

    #[test]
    fn test_analyzer_config_diagnostics_are_reported_once() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/a.cs", "class A { static void Main() {} }")
            .with_file("/p/b.cs", "")
            .with_file(
                "/p/.editorconfig",
                "root = true\n[*.cs]\ndotnet_diagnostic.CA1000.severity = loud\n",
            );
        let outcome = Driver::new(&fs, "/p")
            .run(&args(&["/analyzerconfig:.editorconfig", "a.cs", "b.cs"]))
            .expect("runs");
        assert_eq!(ids(&outcome), vec!["CS8703"]);
    }

    #[test]
    fn test_suppressions_file_is_applied() {
        let fs = MemoryFileSystem::new().with_directory("/p").with_file(
            "/p/.csdriver/suppressions.toml",
            "[[suppress]]\nid = \"SPR1\"\nsuppressed_id = \"CS2008\"\njustification = \"empty build\"\n",
        );
        let outcome = Driver::new(&fs, "/p")
            .run(&args(&["/t:library", "/out:abc.dll"]))
            .expect("runs");
        assert_eq!(ids(&outcome), vec!["CS2008", "SP0001"]);
        assert!(outcome.diagnostics[0].is_suppressed());
        assert_eq!(outcome.exit_code(), 0);
    }
}
