//! The frozen result of command-line parsing.

use crate::diagnostics::Diagnostic;
use crate::langversion::LanguageVersion;
use crate::output::OutputNames;
use crate::resources::ResourceDescription;
use crate::severity::DiagnosticConfiguration;
use crate::types::{
    ChecksumAlgorithm, DebugFormat, NullableContextOptions, OptimizationLevel, OutputKind,
    Platform,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    /// The `--` script file.
    pub is_script: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataReference {
    pub path: String,
    /// Extern aliases; empty means `global`.
    pub aliases: Vec<String>,
    /// Added through `/link`.
    pub embed_interop_types: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// What `/langversion` said.
    pub specified_language_version: LanguageVersion,
    /// What the compiler uses.
    pub language_version: LanguageVersion,
    pub preprocessor_symbols: Vec<String>,
    /// `/features` entries; `key` alone means `key=true`.
    pub features: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub emit_pdb: bool,
    pub debug_format: DebugFormat,
    pub pdb_path: Option<String>,
    pub source_link_path: Option<String>,
    pub embed_all_sources: bool,
    pub embedded_files: Vec<String>,
    pub base_address: u64,
    pub file_alignment: u32,
    pub high_entropy_virtual_address_space: bool,
    pub subsystem_version: Option<String>,
    pub output_ref_path: Option<String>,
    pub emit_metadata_only: bool,
    pub checksum_algorithm: ChecksumAlgorithm,
    pub documentation_path: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            emit_pdb: false,
            debug_format: DebugFormat::default(),
            pdb_path: None,
            source_link_path: None,
            embed_all_sources: false,
            embedded_files: Vec::new(),
            base_address: 0,
            file_alignment: 0,
            high_entropy_virtual_address_space: true,
            subsystem_version: None,
            output_ref_path: None,
            emit_metadata_only: false,
            checksum_algorithm: ChecksumAlgorithm::default(),
            documentation_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationOptions {
    pub output_kind: OutputKind,
    pub platform: Platform,
    pub optimization: OptimizationLevel,
    pub check_overflow: bool,
    pub allow_unsafe: bool,
    pub deterministic: bool,
    pub nullable: NullableContextOptions,
    pub main_type_name: Option<String>,
    pub module_assembly_name: Option<String>,
    pub key_file: Option<String>,
    pub key_container: Option<String>,
    pub delay_sign: Option<bool>,
    pub public_sign: bool,
    pub no_std_lib: bool,
    pub report_analyzer: bool,
}

/// Requests that replace compilation (`/help`, `/version`, `/langversion:?`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub help: bool,
    pub version: bool,
    pub language_versions: bool,
    pub logo: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            help: false,
            version: false,
            language_versions: false,
            logo: true,
        }
    }
}

impl DisplayOptions {
    pub fn wants_display_only(&self) -> bool {
        self.help || self.version || self.language_versions
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportingOptions {
    pub full_paths: bool,
    pub error_log_path: Option<String>,
    pub preferred_ui_lang: Option<String>,
    pub utf8_output: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedArguments {
    pub base_directory: Option<String>,
    /// Encounter order, duplicates kept.
    pub source_files: Vec<SourceFile>,
    /// Sources given as literal paths, for existence checks.
    pub explicit_source_paths: Vec<String>,
    pub references: Vec<MetadataReference>,
    pub added_modules: Vec<String>,
    pub analyzer_references: Vec<String>,
    pub additional_files: Vec<String>,
    pub analyzer_config_paths: Vec<String>,
    pub rule_set_path: Option<String>,
    pub manifest_resources: Vec<ResourceDescription>,
    pub lib_paths: Vec<String>,
    pub generated_files_output_directory: Option<String>,
    pub parse_options: ParseOptions,
    pub emit_options: EmitOptions,
    pub compilation_options: CompilationOptions,
    pub output: OutputNames,
    pub display: DisplayOptions,
    pub reporting: ReportingOptions,
    pub path_map: Vec<PathMapEntry>,
    pub code_page: Option<u32>,
    pub script_arguments: Vec<String>,
    pub no_config: bool,
    pub diagnostic_configuration: DiagnosticConfiguration,
    /// Parser diagnostics in the order they were produced.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedArguments {
    pub fn source_paths(&self) -> impl Iterator<Item = &str> {
        self.source_files.iter().map(|s| s.path.as_str())
    }

    pub fn script_file(&self) -> Option<&SourceFile> {
        self.source_files.iter().find(|s| s.is_script)
    }

    pub fn has_errors(&self) -> bool {
        crate::diagnostics::has_errors(&self.diagnostics)
    }
}
