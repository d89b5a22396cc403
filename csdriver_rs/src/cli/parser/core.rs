//! The argument reducer.
//!
//! [`ArgumentsBuilder`] folds the flattened token stream into
//! [`ParsedArguments`] one switch at a time. A switch whose value is
//! missing or malformed reports one diagnostic and changes nothing else.

use tracing::{debug, trace};

use super::helpers::{RawOption, switch_text, switch_value_text, try_parse_option};
use super::values;
use crate::cli::arguments::{ParsedArguments, SourceFile};
use crate::cli::response_files::ArgToken;
use crate::cli::switches::{self, Arity, MissingValue, SwitchDescriptor, SwitchId, ToggleSuffix};
use crate::cli::tokenizer::remove_quotes_and_slashes;
use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::fs_utils::FileSystem;
use crate::langversion::{LanguageVersion, LanguageVersionError};
use crate::paths::{self, PatternError};
use crate::resources::parse_resource_description;
use crate::severity::command_line::MAX_WARNING_LEVEL;
use crate::severity::{load_rule_set, parse_warning_ids};
use crate::types::{
    ChecksumAlgorithm, DebugFormat, NullableContextOptions, OptimizationLevel, OutputKind,
    Platform,
};

pub(super) const LIB_OPTION_ORIGIN: &str = "/LIB option";

/// One recognized switch occurrence.
pub(super) struct Switch<'t> {
    pub descriptor: &'static SwitchDescriptor,
    /// Name as typed, without the `+`/`-` suffix.
    pub name: String,
    pub suffix: Option<ToggleSuffix>,
    pub value: Option<String>,
    pub token: &'t ArgToken,
}

impl Switch<'_> {
    fn enabled(&self) -> bool {
        self.suffix != Some(ToggleSuffix::Minus)
    }

    /// Value with quotes and escapes removed; empty when absent.
    fn unquoted(&self) -> String {
        self.value
            .as_deref()
            .map(remove_quotes_and_slashes)
            .unwrap_or_default()
    }

    fn raw(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

pub(super) struct ArgumentsBuilder<'a> {
    pub(super) fs: &'a dyn FileSystem,
    pub(super) base_directory: Option<&'a str>,
    pub(super) args: ParsedArguments,
    pub(super) out_directory: Option<String>,
    pub(super) out_file_name: Option<String>,
    pub(super) module_name: Option<String>,
    pub(super) sources_specified: bool,
    pub(super) resources_or_modules_specified: bool,
    script_mode: bool,
}

impl<'a> ArgumentsBuilder<'a> {
    pub(super) fn new(
        fs: &'a dyn FileSystem,
        base_directory: Option<&'a str>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let args = ParsedArguments {
            base_directory: base_directory.map(str::to_string),
            diagnostics,
            ..Default::default()
        };
        Self {
            fs,
            base_directory,
            args,
            out_directory: None,
            out_file_name: None,
            module_name: None,
            sources_specified: false,
            resources_or_modules_specified: false,
            script_mode: false,
        }
    }

    pub(super) fn report(&mut self, diagnostic: Diagnostic) {
        trace!(id = diagnostic.id(), "parser diagnostic");
        self.args.diagnostics.push(diagnostic);
    }

    /// Load the first `/ruleset` before anything else reads the severity
    /// configuration.
    pub(super) fn load_rule_set(&mut self, tokens: &[ArgToken]) {
        for token in tokens.iter().take_while(|t| t.text != "--") {
            let Some(RawOption { name, value }) = try_parse_option(&token.text) else {
                continue;
            };
            let is_rule_set = switches::lookup(&name)
                .is_some_and(|(descriptor, _)| descriptor.id == SwitchId::RuleSet);
            let Some(value) = value.filter(|_| is_rule_set) else {
                continue;
            };
            let unquoted = remove_quotes_and_slashes(&value);
            if unquoted.trim().is_empty() {
                continue;
            }
            if self.args.rule_set_path.is_some() {
                self.report(Diagnostic::new(ErrorCode::MultipleRuleSetFiles, [unquoted]));
                continue;
            }
            let Some(path) = self.resolve_file(&unquoted) else {
                continue;
            };
            match load_rule_set(self.fs, &path) {
                Ok(rule_set) => {
                    debug!(path = %path, rules = rule_set.specific.len(), "loaded ruleset");
                    self.args.diagnostic_configuration.rule_set = Some(rule_set);
                }
                Err(err) => {
                    let failing = err.path().to_string();
                    self.report(Diagnostic::new(
                        ErrorCode::CantReadRulesetFile,
                        [failing, err.to_string()],
                    ));
                }
            }
            self.args.rule_set_path = Some(path);
        }
    }

    pub(super) fn reduce(&mut self, token: &ArgToken) {
        if self.script_mode {
            if self.args.script_file().is_some() {
                self.args.script_arguments.push(token.text.clone());
            } else {
                let spec = remove_quotes_and_slashes(&token.text);
                if let Some(path) = self.resolve_file(&spec) {
                    self.args.explicit_source_paths.push(path.clone());
                    self.args.source_files.push(SourceFile {
                        path,
                        is_script: true,
                    });
                    self.sources_specified = true;
                }
            }
            return;
        }
        if token.text == "--" {
            self.script_mode = true;
            return;
        }

        let Some(RawOption { name, value }) = try_parse_option(&token.text) else {
            self.sources_specified = true;
            let spec = remove_quotes_and_slashes(&token.text);
            self.add_source_spec(&spec, false);
            return;
        };
        let Some((descriptor, suffix)) = switches::lookup(&name) else {
            self.report(Diagnostic::new(ErrorCode::BadSwitch, [token.text.as_str()]));
            return;
        };
        let name = match suffix {
            Some(_) => name[..name.len() - 1].to_string(),
            None => name,
        };
        let switch = Switch {
            descriptor,
            name,
            suffix,
            value,
            token,
        };
        if self.check_arity(&switch) {
            self.apply(&switch);
        }
    }

    /// Report a value the switch cannot take, or a required one it lacks.
    fn check_arity(&mut self, switch: &Switch<'_>) -> bool {
        let missing = match switch.descriptor.arity {
            Arity::Flag | Arity::Toggle => {
                if switch.value.is_some() {
                    self.report(Diagnostic::new(ErrorCode::BadSwitch, [switch.token.text.as_str()]));
                    return false;
                }
                return true;
            }
            Arity::ToggleValue => {
                if switch.suffix.is_some()
                    && switch.value.is_some()
                    && switch.descriptor.id != SwitchId::WarnAsError
                {
                    self.report(Diagnostic::new(ErrorCode::BadSwitch, [switch.token.text.as_str()]));
                    return false;
                }
                return true;
            }
            Arity::OptionalValue => return true,
            Arity::Value(missing) | Arity::List(missing) => missing,
        };

        if missing == MissingValue::Unrecognized {
            if switch.value.is_none() {
                self.report(Diagnostic::new(ErrorCode::BadSwitch, [switch.token.text.as_str()]));
                return false;
            }
            return true;
        }
        if !switch.unquoted().trim().is_empty() {
            return true;
        }
        let diagnostic = match missing {
            MissingValue::Text(placeholder) => Diagnostic::new(
                ErrorCode::SwitchNeedsString,
                [placeholder.to_string(), switch_value_text(&switch.name)],
            ),
            MissingValue::Number => {
                Diagnostic::new(ErrorCode::SwitchNeedsNumber, [switch_text(&switch.name)])
            }
            MissingValue::FileSpec | MissingValue::Unrecognized => {
                Diagnostic::new(ErrorCode::NoFileSpec, [switch_text(&switch.name)])
            }
        };
        self.report(diagnostic);
        false
    }

    fn apply(&mut self, switch: &Switch<'_>) {
        let args = &mut self.args;
        match switch.descriptor.id {
            SwitchId::Help => args.display.help = true,
            SwitchId::Version => args.display.version = true,
            SwitchId::NoLogo => args.display.logo = false,
            SwitchId::FullPaths => args.reporting.full_paths = true,
            SwitchId::Utf8Output => args.reporting.utf8_output = switch.enabled(),
            SwitchId::ReportAnalyzer => {
                args.compilation_options.report_analyzer = switch.enabled();
            }
            SwitchId::NoStdLib => args.compilation_options.no_std_lib = switch.enabled(),
            SwitchId::RefOnly => args.emit_options.emit_metadata_only = true,
            SwitchId::Checked => args.compilation_options.check_overflow = switch.enabled(),
            SwitchId::Unsafe => args.compilation_options.allow_unsafe = switch.enabled(),
            SwitchId::Deterministic => args.compilation_options.deterministic = switch.enabled(),
            SwitchId::Optimize => {
                args.compilation_options.optimization = if switch.enabled() {
                    OptimizationLevel::Release
                } else {
                    OptimizationLevel::Debug
                };
            }
            SwitchId::DelaySign => args.compilation_options.delay_sign = Some(switch.enabled()),
            SwitchId::PublicSign => args.compilation_options.public_sign = switch.enabled(),
            SwitchId::HighEntropyVa => {
                args.emit_options.high_entropy_virtual_address_space = switch.enabled();
            }
            SwitchId::NoConfig => {
                if switch.token.origin.is_command_line() {
                    args.no_config = true;
                } else {
                    self.report(Diagnostic::bare(ErrorCode::NoConfigNotOnCommandLine));
                }
            }
            SwitchId::RuleSet => {}
            SwitchId::Target => match switch.unquoted().parse::<OutputKind>() {
                Ok(kind) => args.compilation_options.output_kind = kind,
                Err(()) => self.report(Diagnostic::bare(ErrorCode::InvalidTarget)),
            },
            SwitchId::Platform => match switch.unquoted().parse::<Platform>() {
                Ok(platform) => args.compilation_options.platform = platform,
                Err(()) => {
                    self.report(Diagnostic::new(ErrorCode::BadPlatformType, [switch.unquoted()]));
                }
            },
            SwitchId::ChecksumAlgorithm => match switch.unquoted().parse::<ChecksumAlgorithm>() {
                Ok(algorithm) => args.emit_options.checksum_algorithm = algorithm,
                Err(()) => self.report(Diagnostic::new(
                    ErrorCode::BadChecksumAlgorithm,
                    [switch.unquoted()],
                )),
            },
            SwitchId::Debug => self.apply_debug(switch),
            SwitchId::Nullable => self.apply_nullable(switch),
            SwitchId::LangVersion => self.apply_language_version(switch),
            SwitchId::Warn => self.apply_warning_level(switch),
            SwitchId::NoWarn => {
                let ids = parse_warning_ids(switch.raw());
                if ids.is_empty() {
                    self.report(Diagnostic::new(
                        ErrorCode::SwitchNeedsNumber,
                        [switch_text(&switch.name)],
                    ));
                } else {
                    args.diagnostic_configuration.command_line.add_no_warn(ids);
                }
            }
            SwitchId::WarnAsError => self.apply_warn_as_error(switch),
            SwitchId::Define => {
                let symbols = values::parse_symbols(switch.raw(), &mut args.diagnostics);
                args.parse_options.preprocessor_symbols.extend(symbols);
            }
            SwitchId::Features => match switch.value.as_deref() {
                None => args.parse_options.features.clear(),
                Some(value) => args
                    .parse_options
                    .features
                    .extend(values::parse_features(value)),
            },
            SwitchId::Reference | SwitchId::Link => {
                let embed = switch.descriptor.id == SwitchId::Link;
                match values::parse_references(switch.raw(), embed) {
                    Ok(references) => args.references.extend(references),
                    Err(diagnostic) => self.report(diagnostic),
                }
            }
            SwitchId::AddModule => {
                let modules = values::split_paths(switch.raw());
                self.resources_or_modules_specified |= !modules.is_empty();
                args.added_modules.extend(modules);
            }
            SwitchId::Analyzer => {
                for path in values::split_paths(switch.raw()) {
                    if let Some(resolved) = self.resolve_file(&path) {
                        self.args.analyzer_references.push(resolved);
                    }
                }
            }
            SwitchId::AdditionalFile => {
                let files = self.file_list(switch.raw());
                self.args.additional_files.extend(files);
            }
            SwitchId::AnalyzerConfig => {
                let files = self.file_list(switch.raw());
                self.args.analyzer_config_paths.extend(files);
            }
            SwitchId::Embed => {
                if switch.unquoted().trim().is_empty() {
                    args.emit_options.embed_all_sources = true;
                } else {
                    let files = self.file_list(switch.raw());
                    self.args.emit_options.embedded_files.extend(files);
                }
            }
            SwitchId::Resource | SwitchId::LinkResource => {
                let embedded = switch.descriptor.id == SwitchId::Resource;
                match parse_resource_description(
                    &switch_text(&switch.name),
                    switch.raw(),
                    self.base_directory,
                    embedded,
                ) {
                    Ok(resource) => {
                        self.resources_or_modules_specified = true;
                        self.args.manifest_resources.push(resource);
                    }
                    Err(diagnostic) => self.report(diagnostic),
                }
            }
            SwitchId::Recurse => {
                if self.add_source_spec(&switch.unquoted(), true) > 0 {
                    self.sources_specified = true;
                }
            }
            SwitchId::Lib => {
                for directory in values::split_paths(switch.raw()) {
                    self.add_lib_path(&directory, LIB_OPTION_ORIGIN);
                }
            }
            SwitchId::Out => self.apply_out(switch),
            SwitchId::RefOut => {
                self.args.emit_options.output_ref_path = self.resolve_file(&switch.unquoted());
            }
            SwitchId::Pdb => {
                self.args.emit_options.pdb_path = self.resolve_file(&switch.unquoted());
            }
            SwitchId::SourceLink => {
                self.args.emit_options.source_link_path = self.resolve_file(&switch.unquoted());
            }
            SwitchId::Doc => {
                self.args.emit_options.documentation_path = self.resolve_file(&switch.unquoted());
            }
            SwitchId::ErrorLog => {
                self.args.reporting.error_log_path = self.resolve_file(&switch.unquoted());
            }
            SwitchId::GeneratedFilesOut => {
                self.args.generated_files_output_directory = self.resolve_file(&switch.unquoted());
            }
            SwitchId::KeyFile => args.compilation_options.key_file = Some(switch.unquoted()),
            SwitchId::KeyContainer => {
                args.compilation_options.key_container = Some(switch.unquoted());
            }
            SwitchId::Main => args.compilation_options.main_type_name = Some(switch.unquoted()),
            SwitchId::ModuleName => self.module_name = Some(switch.unquoted()),
            SwitchId::ModuleAssemblyName => {
                args.compilation_options.module_assembly_name = Some(switch.unquoted());
            }
            SwitchId::BaseAddress => match values::parse_base_address(switch.raw()) {
                Ok(address) => args.emit_options.base_address = address,
                Err(diagnostic) => self.report(diagnostic),
            },
            SwitchId::FileAlign => match values::parse_file_alignment(switch.raw()) {
                Ok(alignment) => args.emit_options.file_alignment = alignment,
                Err(diagnostic) => self.report(diagnostic),
            },
            SwitchId::CodePage => match values::parse_code_page(switch.raw()) {
                Ok(page) => args.code_page = Some(page),
                Err(diagnostic) => self.report(diagnostic),
            },
            SwitchId::SubsystemVersion => match values::parse_subsystem_version(switch.raw()) {
                Ok(version) => args.emit_options.subsystem_version = Some(version),
                Err(diagnostic) => self.report(diagnostic),
            },
            SwitchId::PreferredUiLang => {
                let name = switch.unquoted();
                if values::is_valid_culture_name(&name) {
                    args.reporting.preferred_ui_lang = Some(name);
                } else {
                    self.report(Diagnostic::new(ErrorCode::BadUiLang, [name]));
                }
            }
            SwitchId::PathMap => {
                let entries = values::parse_path_map(switch.raw(), &mut args.diagnostics);
                args.path_map.extend(entries);
            }
        }
    }

    fn apply_debug(&mut self, switch: &Switch<'_>) {
        let emit = &mut self.args.emit_options;
        if switch.suffix.is_some() || switch.value.is_none() {
            emit.emit_pdb = switch.enabled();
            return;
        }
        let value = switch.unquoted();
        if value.trim().is_empty() {
            self.report(Diagnostic::new(
                ErrorCode::SwitchNeedsString,
                ["<text>".to_string(), switch_value_text(&switch.name)],
            ));
            return;
        }
        match value.parse::<DebugFormat>() {
            Ok(format) => {
                emit.emit_pdb = true;
                emit.debug_format = format;
            }
            Err(()) => self.report(Diagnostic::new(ErrorCode::BadDebugType, [value])),
        }
    }

    fn apply_nullable(&mut self, switch: &Switch<'_>) {
        let options = &mut self.args.compilation_options;
        let Some(raw) = switch.value.as_deref() else {
            options.nullable = if switch.enabled() {
                NullableContextOptions::Enable
            } else {
                NullableContextOptions::Disable
            };
            return;
        };
        let value = remove_quotes_and_slashes(raw);
        match value.parse::<NullableContextOptions>() {
            Ok(mode) => options.nullable = mode,
            Err(()) => self.report(Diagnostic::new(ErrorCode::BadNullableContextOption, [value])),
        }
    }

    fn apply_language_version(&mut self, switch: &Switch<'_>) {
        let value = switch.unquoted();
        if value == "?" {
            self.args.display.language_versions = true;
            return;
        }
        match LanguageVersion::parse(&value) {
            Ok(version) => self.args.parse_options.specified_language_version = version,
            Err(LanguageVersionError::LeadingZeroes(text)) => self.report(Diagnostic::new(
                ErrorCode::LanguageVersionCannotHaveLeadingZeroes,
                [text],
            )),
            Err(LanguageVersionError::Unrecognized(text)) => {
                self.report(Diagnostic::new(ErrorCode::BadCompatMode, [text]));
            }
        }
    }

    fn apply_warning_level(&mut self, switch: &Switch<'_>) {
        match switch.unquoted().trim().parse::<i64>() {
            Ok(level) => match u32::try_from(level) {
                Ok(level) if level <= MAX_WARNING_LEVEL => {
                    self.args.diagnostic_configuration.command_line.warning_level = level;
                }
                _ => self.report(Diagnostic::new(
                    ErrorCode::BadWarningLevel,
                    [switch_text(&switch.name)],
                )),
            },
            Err(_) => self.report(Diagnostic::new(
                ErrorCode::SwitchNeedsNumber,
                [switch_text(&switch.name)],
            )),
        }
    }

    fn apply_warn_as_error(&mut self, switch: &Switch<'_>) {
        let enabled = switch.enabled();
        let config = &mut self.args.diagnostic_configuration;
        let Some(value) = switch.value.as_deref() else {
            config.command_line.set_general_warn_as_error(enabled);
            return;
        };
        let ids = parse_warning_ids(value);
        if ids.is_empty() {
            self.report(Diagnostic::new(
                ErrorCode::SwitchNeedsNumber,
                [switch_text(&switch.name)],
            ));
            return;
        }
        config
            .command_line
            .set_specific_warn_as_error(enabled, ids, config.rule_set.as_ref());
    }

    fn apply_out(&mut self, switch: &Switch<'_>) {
        let value = switch.unquoted();
        match paths::resolve_relative_path(&value, self.base_directory) {
            Some(full) if paths::is_valid_file_path(&full) => {
                self.out_directory = paths::directory_name(&full).map(str::to_string);
                self.out_file_name = Some(paths::file_name(&full).to_string());
            }
            None if self.base_directory.is_none() && paths::is_valid_file_path(&value) => {
                self.report(Diagnostic::bare(ErrorCode::NoOutputDirectory));
            }
            _ => self.report(Diagnostic::new(ErrorCode::InvalidInputFileName, [value])),
        }
    }

    /// Resolve one path against the base directory. Without a base
    /// directory a valid relative path is kept as written.
    pub(super) fn resolve_file(&mut self, path: &str) -> Option<String> {
        match paths::resolve_relative_path(path, self.base_directory) {
            Some(full) if paths::is_valid_file_path(&full) => Some(full),
            None if self.base_directory.is_none() && paths::is_valid_file_path(path) => {
                Some(path.to_string())
            }
            _ => {
                self.report(Diagnostic::new(ErrorCode::InvalidInputFileName, [path]));
                None
            }
        }
    }

    /// Expand one file argument, wildcards included.
    fn expand_file_argument(&mut self, spec: &str, recursive: bool) -> Vec<String> {
        if spec.trim().is_empty() {
            self.report(Diagnostic::new(ErrorCode::InvalidInputFileName, [spec]));
            return Vec::new();
        }
        if !recursive && !paths::has_wildcards(spec) {
            return self.resolve_file(spec).into_iter().collect();
        }
        match paths::expand_file_pattern(self.fs, spec, self.base_directory, recursive) {
            Ok(files) => {
                debug!(pattern = %spec, matches = files.len(), recursive, "expanded file pattern");
                files
            }
            Err(PatternError::InvalidPath) => {
                self.report(Diagnostic::new(ErrorCode::InvalidInputFileName, [spec]));
                Vec::new()
            }
            Err(PatternError::DirectoryNotFound) => {
                self.report(Diagnostic::new(ErrorCode::FileNotFound, [spec]));
                Vec::new()
            }
        }
    }

    /// `,`/`;` separated file arguments.
    fn file_list(&mut self, value: &str) -> Vec<String> {
        values::split_paths(value)
            .iter()
            .flat_map(|spec| self.expand_file_argument(spec, false))
            .collect()
    }

    /// Add source files for `spec`; returns how many were added.
    fn add_source_spec(&mut self, spec: &str, recursive: bool) -> usize {
        let literal = !recursive && !paths::has_wildcards(spec);
        let files = self.expand_file_argument(spec, recursive);
        if literal {
            self.args.explicit_source_paths.extend(files.iter().cloned());
        }
        let count = files.len();
        self.args
            .source_files
            .extend(files.into_iter().map(|path| SourceFile {
                path,
                is_script: false,
            }));
        count
    }

    /// Validate a library search directory and keep it if it exists.
    pub(super) fn add_lib_path(&mut self, directory: &str, origin: &str) {
        let resolved = paths::resolve_relative_path(directory, self.base_directory)
            .filter(|path| !paths::has_wildcards(path));
        match resolved {
            None => self.report(Diagnostic::new(
                ErrorCode::InvalidSearchPathDir,
                [directory, origin, "path is too long or invalid"],
            )),
            Some(path) if !self.fs.directory_exists(&path) => self.report(Diagnostic::new(
                ErrorCode::InvalidSearchPathDir,
                [directory, origin, "directory does not exist"],
            )),
            Some(path) => self.args.lib_paths.push(path),
        }
    }
}
