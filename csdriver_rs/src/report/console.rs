//! Console rendering of diagnostics.

use std::io::{self, Write};

use colored::Colorize;

use crate::cli::parser::suggest_similar_switch;
use crate::diagnostics::{Diagnostic, DiagnosticSeverity, ErrorCode};
use crate::paths;

pub struct ConsoleReporter {
    base_directory: Option<String>,
    full_paths: bool,
    color: bool,
}

impl ConsoleReporter {
    pub fn new(base_directory: Option<&str>, full_paths: bool) -> Self {
        Self {
            base_directory: base_directory.map(str::to_string),
            full_paths,
            color: false,
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Whether the console shows this diagnostic at all.
    pub fn is_visible(diagnostic: &Diagnostic) -> bool {
        diagnostic.severity() != DiagnosticSeverity::Hidden && !diagnostic.is_suppressed()
    }

    fn display_path<'p>(&self, path: &'p str) -> &'p str {
        match (&self.base_directory, self.full_paths) {
            (Some(base), false) => paths::relative_to(path, base),
            _ => path,
        }
    }

    /// Plain text for one diagnostic, or `None` when it is not shown.
    pub fn format(&self, diagnostic: &Diagnostic) -> Option<String> {
        if !Self::is_visible(diagnostic) {
            return None;
        }
        let path = diagnostic.location().map(|l| self.display_path(&l.path));
        let mut line = diagnostic.render_with_path(path);
        if diagnostic.id() == ErrorCode::BadSwitch.id() {
            let suggestion = diagnostic
                .arguments()
                .first()
                .and_then(|arg| suggest_similar_switch(arg));
            if let Some(suggestion) = suggestion {
                line.push_str(&format!("\n    did you mean '/{}'?", suggestion));
            }
        }
        Some(line)
    }

    fn paint(&self, line: String, severity: DiagnosticSeverity) -> String {
        if !self.color {
            return line;
        }
        match severity {
            DiagnosticSeverity::Error => line.red().to_string(),
            DiagnosticSeverity::Warning => line.yellow().to_string(),
            DiagnosticSeverity::Info | DiagnosticSeverity::Hidden => line,
        }
    }

    pub fn write_all(&self, out: &mut dyn Write, diagnostics: &[Diagnostic]) -> io::Result<()> {
        for diagnostic in diagnostics {
            if let Some(line) = self.format(diagnostic) {
                writeln!(out, "{}", self.paint(line, diagnostic.severity()))?;
            }
        }
        Ok(())
    }
}
