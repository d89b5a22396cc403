//! Checks that need the whole command line, then freezing the result.

use std::collections::HashSet;

use tracing::{debug, info};

use super::core::ArgumentsBuilder;
use crate::cli::arguments::ParsedArguments;
use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::langversion::LanguageFeature;
use crate::output::{EntryPointLocator, OutputRequest, resolve_output_names};
use crate::severity::{AnalyzerConfig, AnalyzerConfigSet};
use crate::types::{NullableContextOptions, Platform};

pub(super) const CONFIG_FILE_ORIGIN: &str = "configuration file";

impl ArgumentsBuilder<'_> {
    pub(super) fn finish(
        mut self,
        extra_lib_paths: &[String],
        locator: &dyn EntryPointLocator,
    ) -> ParsedArguments {
        for directory in extra_lib_paths {
            self.add_lib_path(directory, CONFIG_FILE_ORIGIN);
        }
        self.report_duplicate_sources();
        self.check_emit_combinations();
        self.check_language_version();

        if !self.args.display.wants_display_only() {
            let kind = self.args.compilation_options.output_kind;
            if !self.sources_specified
                && (kind.is_net_module() || !self.resources_or_modules_specified)
            {
                self.report(Diagnostic::bare(ErrorCode::NoSources));
            }
            self.resolve_output(locator);
        }

        self.load_analyzer_configs();
        info!(
            sources = self.args.source_files.len(),
            diagnostics = self.args.diagnostics.len(),
            "parsed command line"
        );
        self.args
    }

    /// One warning per path that appears more than once. All copies stay.
    fn report_duplicate_sources(&mut self) {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for source in &self.args.source_files {
            if !seen.insert(source.path.as_str()) && reported.insert(source.path.as_str()) {
                duplicates.push(source.path.clone());
            }
        }
        for path in duplicates {
            self.report(Diagnostic::new(ErrorCode::FileAlreadyIncluded, [path]));
        }
    }

    fn check_emit_combinations(&mut self) {
        let kind = self.args.compilation_options.output_kind;
        let emit = &self.args.emit_options;
        let mut found = Vec::new();

        if emit.emit_metadata_only && emit.output_ref_path.is_some() {
            found.push(ErrorCode::NoRefOutWhenRefOnly);
        }
        if kind.is_net_module() && (emit.emit_metadata_only || emit.output_ref_path.is_some()) {
            found.push(ErrorCode::NoNetModuleOutputWhenRefOutOrRefOnly);
        }
        if self.args.compilation_options.platform == Platform::AnyCpu32BitPreferred
            && !kind.is_application()
        {
            found.push(ErrorCode::BadPrefer32OnLib);
        }
        if self.args.compilation_options.module_assembly_name.is_some() && !kind.is_net_module() {
            found.push(ErrorCode::AssemblyNameOnNonModule);
        }
        if emit.source_link_path.is_some() && !emit.emit_pdb {
            found.push(ErrorCode::SourceLinkRequiresPdb);
        }
        if (emit.embed_all_sources || !emit.embedded_files.is_empty()) && !emit.emit_pdb {
            found.push(ErrorCode::CannotEmbedWithoutPdb);
        }

        for code in found {
            self.report(Diagnostic::bare(code));
        }
    }

    fn check_language_version(&mut self) {
        let specified = self.args.parse_options.specified_language_version;
        let effective = specified.effective();
        self.args.parse_options.language_version = effective;

        let nullable = self.args.compilation_options.nullable;
        let required = LanguageFeature::NullableReferenceTypes.required_version();
        if nullable != NullableContextOptions::Disable && !effective.allows(required) {
            self.report(Diagnostic::new(
                ErrorCode::NullableOptionNotAvailable,
                [
                    "nullable".to_string(),
                    nullable.to_string(),
                    effective.display().to_string(),
                    required.display().to_string(),
                ],
            ));
        }
    }

    fn resolve_output(&mut self, locator: &dyn EntryPointLocator) {
        let sources: Vec<String> = self.args.source_paths().map(str::to_string).collect();
        let options = &self.args.compilation_options;
        let request = OutputRequest {
            kind: options.output_kind,
            out_directory: self.out_directory.as_deref(),
            out_file_name: self.out_file_name.as_deref(),
            sources: &sources,
            module_name: self.module_name.as_deref(),
            module_assembly_name: options.module_assembly_name.as_deref(),
            main_type_name: options.main_type_name.as_deref(),
            base_directory: self.base_directory,
        };
        let mut diagnostics = Vec::new();
        let names = resolve_output_names(&request, locator, &mut diagnostics);
        debug!(output = ?names.output_path(), "resolved output names");
        self.args.output = names;
        for diagnostic in diagnostics {
            self.report(diagnostic);
        }
    }

    fn load_analyzer_configs(&mut self) {
        let mut configs = Vec::new();
        let paths = self.args.analyzer_config_paths.clone();
        for path in paths {
            match self.fs.read_all_text(&path) {
                Ok(text) => configs.push(AnalyzerConfig::parse(&text, &path)),
                Err(err) => self.report(Diagnostic::new(
                    ErrorCode::CantReadConfigFile,
                    [path, err.to_string()],
                )),
            }
        }
        if configs.is_empty() {
            return;
        }
        let set = AnalyzerConfigSet::create(configs);
        let set_diagnostics = set.diagnostics().to_vec();
        for diagnostic in set_diagnostics {
            self.report(diagnostic);
        }
        self.args.diagnostic_configuration.analyzer_configs = set;
    }
}
