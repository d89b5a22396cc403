//! Output file, module and compilation names.
//!
//! With `/out`, the names come straight from it. Without it, libraries and
//! modules are named after the first source file, and applications after
//! the source that declares the entry point, as found by an
//! [`EntryPointLocator`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::fs_utils::FileSystem;
use crate::paths;
use crate::types::OutputKind;

static MAIN_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bstatic\b[^;{}=]*?\bMain\s*\(").expect("entry point pattern is valid")
});

static TYPE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:class|struct|record|interface)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("type declaration pattern is valid")
});

/// Resolved naming for the primary output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputNames {
    pub output_directory: Option<String>,
    /// File name with extension, e.g. `app.exe`.
    pub output_file_name: Option<String>,
    pub module_name: Option<String>,
    /// Assembly name; for modules this is `/moduleassemblyname`.
    pub compilation_name: Option<String>,
}

impl OutputNames {
    pub fn output_path(&self) -> Option<String> {
        let directory = self.output_directory.as_deref()?;
        let file = self.output_file_name.as_deref()?;
        Some(paths::normalize(&format!("{}/{}", directory, file)))
    }
}

/// Finds the source file that declares the entry point.
pub trait EntryPointLocator {
    fn locate(&self, sources: &[String], main_type_name: Option<&str>) -> Option<String>;
}

/// Text scan for a `static ... Main(` declaration.
pub struct MainMethodScanner<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> MainMethodScanner<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    fn declares_entry_point(text: &str, main_type_name: Option<&str>) -> bool {
        let Some(main_type) = main_type_name else {
            return MAIN_METHOD.is_match(text);
        };
        let simple_name = main_type.rsplit('.').next().unwrap_or(main_type);
        TYPE_DECLARATION
            .captures_iter(text)
            .filter(|c| &c[1] == simple_name)
            .filter_map(|c| c.get(0))
            .any(|declaration| MAIN_METHOD.is_match(&text[declaration.end()..]))
    }
}

impl EntryPointLocator for MainMethodScanner<'_> {
    fn locate(&self, sources: &[String], main_type_name: Option<&str>) -> Option<String> {
        sources
            .iter()
            .find(|source| {
                self.fs
                    .read_all_text(source)
                    .is_ok_and(|text| Self::declares_entry_point(&text, main_type_name))
            })
            .cloned()
    }
}

/// What the parser knows about the output once all switches are in.
#[derive(Debug, Clone, Default)]
pub struct OutputRequest<'a> {
    pub kind: OutputKind,
    /// Directory and file name from `/out`, already validated.
    pub out_directory: Option<&'a str>,
    pub out_file_name: Option<&'a str>,
    pub sources: &'a [String],
    pub module_name: Option<&'a str>,
    pub module_assembly_name: Option<&'a str>,
    pub main_type_name: Option<&'a str>,
    pub base_directory: Option<&'a str>,
}

pub fn resolve_output_names(
    request: &OutputRequest<'_>,
    locator: &dyn EntryPointLocator,
    diagnostics: &mut Vec<Diagnostic>,
) -> OutputNames {
    let (output_directory, output_file_name) = match request.out_file_name {
        Some(name) => (request.out_directory.map(str::to_string), Some(name.to_string())),
        None if request.sources.is_empty() => {
            diagnostics.push(Diagnostic::bare(ErrorCode::OutputNeedsName));
            (request.base_directory.map(str::to_string), None)
        }
        None => {
            let named_after = if request.kind.is_application() {
                locator
                    .locate(request.sources, request.main_type_name)
                    .unwrap_or_else(|| request.sources[0].clone())
            } else {
                request.sources[0].clone()
            };
            let stem = paths::file_stem(&named_after);
            debug!(source = %named_after, kind = %request.kind, "output named after source");
            (
                request.base_directory.map(str::to_string),
                Some(format!("{}{}", stem, request.kind.default_extension())),
            )
        }
    };

    let simple_name = output_file_name
        .as_deref()
        .map(|name| paths::file_stem(name).to_string());
    if simple_name.as_deref().is_some_and(|s| s.trim().is_empty()) {
        diagnostics.push(Diagnostic::new(
            ErrorCode::InvalidInputFileName,
            [output_file_name.clone().unwrap_or_default()],
        ));
    }

    let compilation_name = if request.kind.is_net_module() {
        request.module_assembly_name.map(str::to_string)
    } else {
        simple_name.filter(|s| !s.trim().is_empty())
    };
    let module_name = request
        .module_name
        .map(str::to_string)
        .or_else(|| output_file_name.clone());

    OutputNames {
        output_directory,
        output_file_name,
        module_name,
        compilation_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_utils::MemoryFileSystem;

    fn sources(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn resolve(request: OutputRequest<'_>, fs: &MemoryFileSystem) -> (OutputNames, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let names = resolve_output_names(&request, &MainMethodScanner::new(fs), &mut diagnostics);
        (names, diagnostics)
    }

    #[test]
    fn explicit_out_wins() {
        let fs = MemoryFileSystem::new();
        let list = sources(&["/p/a.cs"]);
        let (names, diags) = resolve(
            OutputRequest {
                kind: OutputKind::DynamicallyLinkedLibrary,
                out_directory: Some("/bin"),
                out_file_name: Some("abc.dll"),
                sources: &list,
                base_directory: Some("/p"),
                ..Default::default()
            },
            &fs,
        );
        assert!(diags.is_empty());
        assert_eq!(names.output_path().as_deref(), Some("/bin/abc.dll"));
        assert_eq!(names.compilation_name.as_deref(), Some("abc"));
        assert_eq!(names.module_name.as_deref(), Some("abc.dll"));
    }

    #[test]
    fn library_named_after_first_source() {
        let fs = MemoryFileSystem::new();
        let list = sources(&["/p/first.cs", "/p/second.cs"]);
        let (names, _) = resolve(
            OutputRequest {
                kind: OutputKind::NetModule,
                sources: &list,
                module_assembly_name: Some("Host"),
                base_directory: Some("/p"),
                ..Default::default()
            },
            &fs,
        );
        assert_eq!(names.output_file_name.as_deref(), Some("first.netmodule"));
        assert_eq!(names.compilation_name.as_deref(), Some("Host"));
    }

    #[test]
    fn application_named_after_entry_point() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/lib.cs", "class Helper { void Run() {} }")
            .with_file(
                "/p/prog.cs",
                "class Program {\n    public static async Task Main(string[] args) {}\n}",
            );
        let list = sources(&["/p/lib.cs", "/p/prog.cs"]);
        let (names, _) = resolve(
            OutputRequest {
                kind: OutputKind::ConsoleApplication,
                sources: &list,
                base_directory: Some("/p"),
                ..Default::default()
            },
            &fs,
        );
        assert_eq!(names.output_file_name.as_deref(), Some("prog.exe"));
    }

    #[test]
    fn main_type_narrows_the_search() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/a.cs", "class A { static void Main() {} }")
            .with_file("/p/b.cs", "namespace N { class B { static int Main() => 0; } }");
        let list = sources(&["/p/a.cs", "/p/b.cs"]);
        let (names, _) = resolve(
            OutputRequest {
                kind: OutputKind::WindowsApplication,
                sources: &list,
                main_type_name: Some("N.B"),
                base_directory: Some("/p"),
                ..Default::default()
            },
            &fs,
        );
        assert_eq!(names.output_file_name.as_deref(), Some("b.exe"));
    }

    #[test]
    fn no_entry_point_falls_back_to_first_source() {
        let fs = MemoryFileSystem::new().with_file("/p/a.cs", "class A {}");
        let list = sources(&["/p/a.cs"]);
        let (names, _) = resolve(
            OutputRequest {
                kind: OutputKind::ConsoleApplication,
                sources: &list,
                base_directory: Some("/p"),
                ..Default::default()
            },
            &fs,
        );
        assert_eq!(names.output_file_name.as_deref(), Some("a.exe"));
    }

    #[test]
    fn no_out_and_no_sources_needs_a_name() {
        let fs = MemoryFileSystem::new();
        let (names, diags) = resolve(OutputRequest::default(), &fs);
        assert_eq!(names.output_file_name, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].id(), "CS1562");
    }

    #[test]
    fn empty_simple_name_is_invalid() {
        let fs = MemoryFileSystem::new();
        let (_, diags) = resolve(
            OutputRequest {
                kind: OutputKind::DynamicallyLinkedLibrary,
                out_directory: Some("/p"),
                out_file_name: Some(".dll"),
                ..Default::default()
            },
            &fs,
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].id(), "CS2021");
    }
}
