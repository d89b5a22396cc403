//! Diagnostics as tagged values.
//!
//! Every user-input mistake the driver finds becomes a [`Diagnostic`]: a
//! descriptor (ID, default severity, category, warning level, tags), the
//! message arguments, an optional location and the effective severity after
//! configuration. Nothing in the pipeline throws for bad input; stages push
//! diagnostics and keep going.

pub mod codes;

use std::borrow::Cow;
use std::fmt;

pub use codes::{ErrorCode, NULLABLE_WARNINGS, normalize_diagnostic_id};

/// Severity a diagnostic is reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    Hidden,
    Info,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Hidden => write!(f, "hidden"),
            DiagnosticSeverity::Info => write!(f, "info"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Error => write!(f, "error"),
        }
    }
}

/// A configured severity decision for one diagnostic ID.
///
/// `Default` means "nobody said anything": the descriptor's own default
/// severity applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportDiagnostic {
    #[default]
    Default,
    Error,
    Warn,
    Info,
    Hidden,
    Suppress,
}

impl ReportDiagnostic {
    /// Strictness rank used when merging included rulesets.
    fn rank(self) -> u8 {
        match self {
            ReportDiagnostic::Error => 5,
            ReportDiagnostic::Warn => 4,
            ReportDiagnostic::Info => 3,
            ReportDiagnostic::Hidden => 2,
            ReportDiagnostic::Suppress => 1,
            ReportDiagnostic::Default => 0,
        }
    }

    pub fn is_stricter_than(self, other: ReportDiagnostic) -> bool {
        self.rank() > other.rank()
    }

    /// Apply this decision to a descriptor. `None` means the diagnostic is
    /// not reported at all.
    pub fn apply_to(self, descriptor: &DiagnosticDescriptor) -> Option<DiagnosticSeverity> {
        match self {
            ReportDiagnostic::Default => descriptor
                .enabled_by_default
                .then_some(descriptor.default_severity),
            ReportDiagnostic::Error => Some(DiagnosticSeverity::Error),
            ReportDiagnostic::Warn => Some(DiagnosticSeverity::Warning),
            ReportDiagnostic::Info => Some(DiagnosticSeverity::Info),
            ReportDiagnostic::Hidden => Some(DiagnosticSeverity::Hidden),
            ReportDiagnostic::Suppress => None,
        }
    }
}

impl From<DiagnosticSeverity> for ReportDiagnostic {
    fn from(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Hidden => ReportDiagnostic::Hidden,
            DiagnosticSeverity::Info => ReportDiagnostic::Info,
            DiagnosticSeverity::Warning => ReportDiagnostic::Warn,
            DiagnosticSeverity::Error => ReportDiagnostic::Error,
        }
    }
}

impl fmt::Display for ReportDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReportDiagnostic::Default => "default",
            ReportDiagnostic::Error => "error",
            ReportDiagnostic::Warn => "warning",
            ReportDiagnostic::Info => "info",
            ReportDiagnostic::Hidden => "hidden",
            ReportDiagnostic::Suppress => "suppress",
        };
        f.write_str(text)
    }
}

/// Who produces a diagnostic. Bulk analyzer-config entries only reach
/// analyzer diagnostics; `/warn:<level>` only reaches compiler ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticOrigin {
    Compiler,
    Analyzer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DescriptorTags {
    /// Severity is decided by the diagnostic's author; config files are ignored.
    pub custom_severity: bool,
    /// No configuration source may change the severity.
    pub not_configurable: bool,
}

/// Static description of a diagnosable condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosticDescriptor {
    pub id: Cow<'static, str>,
    pub message_format: Cow<'static, str>,
    pub category: Cow<'static, str>,
    pub default_severity: DiagnosticSeverity,
    pub enabled_by_default: bool,
    /// Compiler warning level (1..=4 for builtin warnings, 0 otherwise).
    pub warning_level: u32,
    pub origin: DiagnosticOrigin,
    pub tags: DescriptorTags,
}

impl DiagnosticDescriptor {
    /// Descriptor for an analyzer-produced diagnostic.
    pub fn analyzer(
        id: impl Into<Cow<'static, str>>,
        category: impl Into<Cow<'static, str>>,
        default_severity: DiagnosticSeverity,
        message_format: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            id: id.into(),
            message_format: message_format.into(),
            category: category.into(),
            default_severity,
            enabled_by_default: true,
            warning_level: 0,
            origin: DiagnosticOrigin::Analyzer,
            tags: DescriptorTags::default(),
        }
    }

    /// Descriptor for a compiler-builtin warning at the given level.
    pub fn compiler_warning(
        id: impl Into<Cow<'static, str>>,
        warning_level: u32,
        message_format: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            id: id.into(),
            message_format: message_format.into(),
            category: Cow::Borrowed("Compiler"),
            default_severity: DiagnosticSeverity::Warning,
            enabled_by_default: true,
            warning_level,
            origin: DiagnosticOrigin::Compiler,
            tags: DescriptorTags::default(),
        }
    }

    pub fn with_tags(mut self, tags: DescriptorTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn disabled_by_default(mut self) -> Self {
        self.enabled_by_default = false;
        self
    }

    /// Compiler errors and explicitly tagged descriptors cannot be reconfigured.
    pub fn is_configurable(&self) -> bool {
        !self.tags.not_configurable
            && !(self.origin == DiagnosticOrigin::Compiler
                && self.default_severity == DiagnosticSeverity::Error)
    }
}

/// A position inside a file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }

    /// Location naming a whole file.
    pub fn file(path: impl Into<String>) -> Self {
        Self::new(path, 1, 1)
    }
}

/// Record left behind when a suppressor silenced a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgrammaticSuppression {
    pub suppressor_id: String,
    pub justification: String,
}

/// One reported condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    descriptor: DiagnosticDescriptor,
    arguments: Vec<String>,
    location: Option<Location>,
    severity: DiagnosticSeverity,
    suppression: Option<ProgrammaticSuppression>,
}

impl Diagnostic {
    /// Diagnostic for a builtin code with message arguments.
    pub fn new<I, S>(code: ErrorCode, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_descriptor(code.descriptor(), arguments)
    }

    /// Diagnostic for a builtin code whose message takes no arguments.
    pub fn bare(code: ErrorCode) -> Self {
        Self::from_descriptor(code.descriptor(), Vec::<String>::new())
    }

    pub fn from_descriptor<I, S>(descriptor: DiagnosticDescriptor, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let severity = descriptor.default_severity;
        Self {
            descriptor,
            arguments: arguments.into_iter().map(Into::into).collect(),
            location: None,
            severity,
            suppression: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_severity(mut self, severity: DiagnosticSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_suppression(mut self, suppression: ProgrammaticSuppression) -> Self {
        self.suppression = Some(suppression);
        self
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &DiagnosticDescriptor {
        &self.descriptor
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    pub fn suppression(&self) -> Option<&ProgrammaticSuppression> {
        self.suppression.as_ref()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_some()
    }

    /// Unsuppressed error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error && !self.is_suppressed()
    }

    /// Render the message by substituting `{0}`, `{1}`, ... placeholders.
    pub fn message(&self) -> String {
        format_message(&self.descriptor.message_format, &self.arguments)
    }

    /// Render with a caller-chosen path (relative vs. full paths).
    pub fn render_with_path(&self, path: Option<&str>) -> String {
        let head = match (&self.location, path) {
            (Some(location), Some(path)) => {
                format!("{}({},{}): ", path, location.line, location.column)
            }
            (Some(location), None) => format!(
                "{}({},{}): ",
                location.path, location.line, location.column
            ),
            (None, _) => String::new(),
        };
        format!("{}{} {}: {}", head, self.severity, self.id(), self.message())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with_path(None))
    }
}

fn format_message(format: &str, arguments: &[String]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let rest = &format[start + 1..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        let closes = rest[digits.len()..].starts_with('}');
        match digits.parse::<usize>() {
            Ok(index) if closes && !digits.is_empty() => {
                out.push_str(arguments.get(index).map(String::as_str).unwrap_or(""));
                for _ in 0..=digits.len() {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Whether any unsuppressed diagnostic in the list is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_message_arguments() {
        let diag = Diagnostic::new(ErrorCode::BadSwitch, ["/foo"]);
        assert_eq!(diag.message(), "Unrecognized option: '/foo'");
        assert_eq!(diag.to_string(), "error CS2007: Unrecognized option: '/foo'");
    }

    #[test]
    fn renders_location_prefix() {
        let diag = Diagnostic::new(ErrorCode::FileAlreadyIncluded, ["a.cs"])
            .with_location(Location::new("dir/a.cs", 3, 7));
        assert_eq!(
            diag.to_string(),
            "dir/a.cs(3,7): warning CS2002: Source file 'a.cs' specified multiple times"
        );
    }

    #[test]
    fn missing_argument_renders_empty() {
        let diag = Diagnostic::bare(ErrorCode::BadSwitch);
        assert_eq!(diag.message(), "Unrecognized option: ''");
    }

    #[test]
    fn default_decision_follows_descriptor() {
        let descriptor = DiagnosticDescriptor::analyzer(
            "CA1000",
            "Design",
            DiagnosticSeverity::Info,
            "msg",
        );
        assert_eq!(
            ReportDiagnostic::Default.apply_to(&descriptor),
            Some(DiagnosticSeverity::Info)
        );
        assert_eq!(
            ReportDiagnostic::Default.apply_to(&descriptor.clone().disabled_by_default()),
            None
        );
        assert_eq!(ReportDiagnostic::Suppress.apply_to(&descriptor), None);
    }

    #[test]
    fn compiler_errors_are_not_configurable() {
        assert!(!ErrorCode::BadSwitch.descriptor().is_configurable());
        assert!(ErrorCode::NoSources.descriptor().is_configurable());
    }

    #[test]
    fn strictness_ordering() {
        assert!(ReportDiagnostic::Error.is_stricter_than(ReportDiagnostic::Warn));
        assert!(ReportDiagnostic::Hidden.is_stricter_than(ReportDiagnostic::Suppress));
        assert!(!ReportDiagnostic::Default.is_stricter_than(ReportDiagnostic::Suppress));
    }
}
