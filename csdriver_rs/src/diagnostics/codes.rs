//! Builtin driver diagnostic codes.

use std::borrow::Cow;

use super::{DescriptorTags, DiagnosticDescriptor, DiagnosticOrigin, DiagnosticSeverity};

/// Diagnostics the driver itself can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Command-line syntax
    BadSwitch,
    NoFileSpec,
    SwitchNeedsString,
    SwitchNeedsNumber,
    OpenResponseFile,
    ResponseFileTooDeep,
    NoConfigNotOnCommandLine,

    // Inputs and paths
    FileNotFound,
    FileAlreadyIncluded,
    InvalidInputFileName,
    NoOutputDirectory,
    NoSources,
    OutputNeedsName,
    InvalidSearchPathDir,

    // Switch values
    InvalidTarget,
    BadPlatformType,
    BadPrefer32OnLib,
    BadDebugType,
    BadCompatMode,
    LanguageVersionCannotHaveLeadingZeroes,
    BadNullableContextOption,
    NullableOptionNotAvailable,
    BadWarningLevel,
    BadExternIdentifier,
    OneAliasPerReference,
    AliasMissingFile,
    BadResourceVis,
    BadBaseNumber,
    InvalidFileAlignment,
    BadCodepage,
    BadChecksumAlgorithm,
    InvalidPathMap,
    InvalidSubsystemVersion,
    DefineIdentifierRequired,
    BadUiLang,
    AssemblyNameOnNonModule,
    NoRefOutWhenRefOnly,
    NoNetModuleOutputWhenRefOutOrRefOnly,
    SourceLinkRequiresPdb,
    CannotEmbedWithoutPdb,

    // Diagnostic configuration sources
    CantReadRulesetFile,
    MultipleRuleSetFiles,
    CantReadConfigFile,
    MultipleAnalyzerConfigsInSameDir,
    InvalidSeverityInAnalyzerConfig,
    MultipleGlobalAnalyzerKeys,
    InvalidGlobalSectionName,

    ProgrammaticSuppression,
}

struct CodeInfo {
    id: &'static str,
    severity: DiagnosticSeverity,
    level: u32,
    format: &'static str,
}

const fn error(id: &'static str, format: &'static str) -> CodeInfo {
    CodeInfo {
        id,
        severity: DiagnosticSeverity::Error,
        level: 0,
        format,
    }
}

const fn warning(id: &'static str, level: u32, format: &'static str) -> CodeInfo {
    CodeInfo {
        id,
        severity: DiagnosticSeverity::Warning,
        level,
        format,
    }
}

impl ErrorCode {
    fn info(self) -> CodeInfo {
        use ErrorCode::*;
        match self {
            BadSwitch => error("CS2007", "Unrecognized option: '{0}'"),
            NoFileSpec => error("CS2005", "Missing file specification for '{0}' option"),
            SwitchNeedsString => error(
                "CS2006",
                "Command-line syntax error: Missing '{0}' for '{1}' option",
            ),
            SwitchNeedsNumber => error(
                "CS2035",
                "Command-line syntax error: Missing ':<number>' value for '{0}' option",
            ),
            OpenResponseFile => error("CS2011", "Error opening response file '{0}'"),
            ResponseFileTooDeep => error(
                "CS2070",
                "Response file '{0}' is nested deeper than the limit of {1}",
            ),
            NoConfigNotOnCommandLine => warning(
                "CS2023",
                1,
                "Ignoring /noconfig option because it was specified in a response file",
            ),
            FileNotFound => error("CS2001", "Source file '{0}' could not be found."),
            FileAlreadyIncluded => {
                warning("CS2002", 1, "Source file '{0}' specified multiple times")
            }
            InvalidInputFileName => error(
                "CS2021",
                "File name '{0}' is empty, contains invalid characters, has a drive specification without an absolute path, or is too long",
            ),
            NoOutputDirectory => error("CS2071", "Output directory could not be determined"),
            NoSources => warning("CS2008", 1, "No source files specified."),
            OutputNeedsName => error(
                "CS1562",
                "Outputs without source must have the /out option specified",
            ),
            InvalidSearchPathDir => warning(
                "CS1668",
                2,
                "Invalid search path '{0}' specified in '{1}' -- '{2}'",
            ),
            InvalidTarget => error(
                "CS2019",
                "Invalid target type for /target: must specify 'exe', 'winexe', 'library', 'module', 'appcontainerexe' or 'winmdobj'",
            ),
            BadPlatformType => error(
                "CS1672",
                "Invalid option '{0}' for /platform; must be anycpu, x86, Itanium, arm, arm64 or x64",
            ),
            BadPrefer32OnLib => error(
                "CS4023",
                "/platform:anycpu32bitpreferred can only be used with /t:exe, /t:winexe and /t:appcontainerexe",
            ),
            BadDebugType => error(
                "CS1902",
                "Invalid option '{0}' for /debug; must be 'portable', 'embedded', 'full' or 'pdbonly'",
            ),
            BadCompatMode => error(
                "CS1617",
                "Invalid option '{0}' for /langversion. Use '/langversion:?' to list supported values.",
            ),
            LanguageVersionCannotHaveLeadingZeroes => error(
                "CS8303",
                "Specified language version '{0}' cannot have leading zeroes",
            ),
            BadNullableContextOption => error(
                "CS8636",
                "Invalid option '{0}' for /nullable; must be 'disable', 'enable', 'warnings' or 'annotations'",
            ),
            NullableOptionNotAvailable => error(
                "CS8630",
                "Invalid '{0}' value: '{1}' for C# {2}. Please use language version '{3}' or greater.",
            ),
            BadWarningLevel => error("CS1900", "Warning level must be in the range 0-4"),
            BadExternIdentifier => error(
                "CS1679",
                "Invalid extern alias for '/reference'; '{0}' is not a valid identifier",
            ),
            OneAliasPerReference => error(
                "CS2034",
                "A /reference option that declares an extern alias can only have one filename. To specify multiple aliases or filenames, use multiple /reference options.",
            ),
            AliasMissingFile => error(
                "CS1680",
                "Invalid reference alias option: '{0}=' -- missing filename",
            ),
            BadResourceVis => error(
                "CS1906",
                "Invalid option '{0}'; Resource visibility must be either 'public' or 'private'",
            ),
            BadBaseNumber => error("CS1927", "Invalid image base number '{0}'"),
            InvalidFileAlignment => error("CS2024", "Invalid file section alignment '{0}'"),
            BadCodepage => error("CS2016", "Code page '{0}' is invalid or not installed"),
            BadChecksumAlgorithm => error("CS8113", "Invalid hash algorithm name: '{0}'"),
            InvalidPathMap => error("CS8101", "The pathmap option was incorrectly formatted."),
            InvalidSubsystemVersion => error(
                "CS1773",
                "Invalid version {0} for /subsystemversion. The version must be 6.02 or greater for ARM or AppContainerExe, and 4.00 or greater otherwise",
            ),
            DefineIdentifierRequired => warning(
                "CS2029",
                1,
                "Invalid name for a preprocessing symbol; '{0}' is not a valid identifier",
            ),
            BadUiLang => warning("CS2038", 1, "The language name '{0}' is invalid."),
            AssemblyNameOnNonModule => error(
                "CS0734",
                "The /moduleassemblyname option may only be specified when building a target type of 'module'",
            ),
            NoRefOutWhenRefOnly => error("CS8301", "Do not use refout when using refonly."),
            NoNetModuleOutputWhenRefOutOrRefOnly => error(
                "CS8302",
                "Cannot compile net modules when using /refout or /refonly.",
            ),
            SourceLinkRequiresPdb => error(
                "CS8056",
                "/sourcelink switch is only supported when emitting PDB.",
            ),
            CannotEmbedWithoutPdb => error(
                "CS8057",
                "/embed switch is only supported when emitting a PDB.",
            ),
            CantReadRulesetFile => error("CS8043", "Cannot read ruleset file '{0}': {1}"),
            MultipleRuleSetFiles => error(
                "CS8044",
                "Only one ruleset file may be specified; '{0}' is ignored",
            ),
            CantReadConfigFile => error("CS8702", "Unable to read analyzer config file '{0}': {1}"),
            MultipleAnalyzerConfigsInSameDir => error(
                "CS8700",
                "Multiple analyzer config files cannot be in the same directory ('{0}').",
            ),
            InvalidSeverityInAnalyzerConfig => warning(
                "CS8703",
                1,
                "The diagnostic '{0}' was given an invalid severity '{1}' in the analyzer config file at '{2}'.",
            ),
            MultipleGlobalAnalyzerKeys => warning(
                "CS8784",
                1,
                "Multiple global analyzer config files set the same key '{0}' in section '{1}'. It has been unset. Key was set by the following files: '{2}'",
            ),
            InvalidGlobalSectionName => warning(
                "CS8785",
                1,
                "Global analyzer config section name '{0}' is invalid as it is not an absolute path. Section will be ignored. Section was declared in file: '{1}'",
            ),
            ProgrammaticSuppression => CodeInfo {
                id: "SP0001",
                severity: DiagnosticSeverity::Info,
                level: 0,
                format: "Diagnostic '{0}: {1}' was programmatically suppressed by a DiagnosticSuppressor with suppression ID '{2}' and justification '{3}'",
            },
        }
    }

    /// The `CSnnnn` identifier.
    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn descriptor(self) -> DiagnosticDescriptor {
        let info = self.info();
        let tags = DescriptorTags {
            custom_severity: false,
            not_configurable: self == ErrorCode::ProgrammaticSuppression,
        };
        DiagnosticDescriptor {
            id: Cow::Borrowed(info.id),
            message_format: Cow::Borrowed(info.format),
            category: Cow::Borrowed("Compiler"),
            default_severity: info.severity,
            enabled_by_default: true,
            warning_level: info.level,
            origin: DiagnosticOrigin::Compiler,
            tags,
        }
    }
}

/// The `nullable` pseudo-ID expands to this fixed set of warnings.
pub const NULLABLE_WARNINGS: &[&str] = &[
    "CS8600", "CS8601", "CS8602", "CS8603", "CS8604", "CS8605", "CS8607", "CS8608", "CS8609",
    "CS8610", "CS8611", "CS8612", "CS8613", "CS8614", "CS8615", "CS8616", "CS8617", "CS8618",
    "CS8619", "CS8620", "CS8621", "CS8622", "CS8624", "CS8625", "CS8629", "CS8631", "CS8633",
    "CS8634", "CS8643", "CS8644", "CS8645", "CS8655", "CS8667", "CS8670", "CS8714", "CS8762",
    "CS8763", "CS8764", "CS8765", "CS8766", "CS8767", "CS8768", "CS8769", "CS8770", "CS8774",
    "CS8775", "CS8776", "CS8777", "CS8819", "CS8824", "CS8825", "CS8847",
];

/// Map a user-typed ID to its canonical form: bare numbers become `CSnnnn`.
pub fn normalize_diagnostic_id(raw: &str) -> String {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let trimmed = raw.trim_start_matches('0');
        let number = if trimmed.is_empty() { "0" } else { trimmed };
        return format!("CS{:0>4}", number);
    }
    raw.to_string()
}
