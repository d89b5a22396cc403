//! Immutable switch descriptor table.
//!
//! [`SWITCHES`] is the single source of truth for what the driver accepts:
//! names and aliases, arity, the diagnostic for a missing value, and the
//! help line. Lookup goes through a name index built once; the parser never
//! mutates any of it.

use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchId {
    Help,
    Version,
    NoLogo,
    NoConfig,
    FullPaths,
    Utf8Output,
    ReportAnalyzer,
    NoStdLib,
    Target,
    Out,
    RefOut,
    RefOnly,
    Reference,
    Link,
    AddModule,
    Resource,
    LinkResource,
    Recurse,
    Lib,
    Define,
    LangVersion,
    Nullable,
    Checked,
    Unsafe,
    Optimize,
    Deterministic,
    Debug,
    Pdb,
    SourceLink,
    Embed,
    Doc,
    ErrorLog,
    RuleSet,
    AnalyzerConfig,
    Analyzer,
    AdditionalFile,
    GeneratedFilesOut,
    NoWarn,
    WarnAsError,
    Warn,
    Platform,
    KeyFile,
    KeyContainer,
    DelaySign,
    PublicSign,
    HighEntropyVa,
    SubsystemVersion,
    PathMap,
    Features,
    Main,
    ModuleName,
    ModuleAssemblyName,
    BaseAddress,
    FileAlign,
    CodePage,
    ChecksumAlgorithm,
    PreferredUiLang,
}

/// How a missing required value is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingValue {
    /// "Missing '<placeholder>' for '/x' option"
    Text(&'static str),
    /// "Missing ':<number>' value"
    Number,
    /// "Missing file specification"
    FileSpec,
    /// Reported as an unrecognized option.
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No value, no `+`/`-`.
    Flag,
    /// Optional `+`/`-`, no value.
    Toggle,
    /// `:value` required; single value, last wins.
    Value(MissingValue),
    /// `:value` required; items append across occurrences.
    List(MissingValue),
    /// `:value` may be absent.
    OptionalValue,
    /// `+`/`-` and an optional value.
    ToggleValue,
}

impl Arity {
    pub fn accepts_toggle(self) -> bool {
        matches!(self, Arity::Toggle | Arity::ToggleValue)
    }

    pub fn accepts_value(self) -> bool {
        !matches!(self, Arity::Flag | Arity::Toggle)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SwitchDescriptor {
    pub id: SwitchId,
    /// Canonical name first, then aliases. All lower-case.
    pub names: &'static [&'static str],
    pub arity: Arity,
    /// Value shown in help, e.g. `:<file list>`.
    pub value_hint: &'static str,
    pub help: &'static str,
    pub group: Group,
}

impl SwitchDescriptor {
    pub fn canonical_name(&self) -> &'static str {
        self.names[0]
    }
}

/// Help listing sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Output,
    Inputs,
    Resources,
    CodeGeneration,
    ErrorsAndWarnings,
    Language,
    Security,
    Miscellaneous,
    Advanced,
}

impl Group {
    pub const ALL: &'static [Group] = &[
        Group::Output,
        Group::Inputs,
        Group::Resources,
        Group::CodeGeneration,
        Group::ErrorsAndWarnings,
        Group::Language,
        Group::Security,
        Group::Miscellaneous,
        Group::Advanced,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Group::Output => "OUTPUT FILES",
            Group::Inputs => "INPUT FILES",
            Group::Resources => "RESOURCES",
            Group::CodeGeneration => "CODE GENERATION",
            Group::ErrorsAndWarnings => "ERRORS AND WARNINGS",
            Group::Language => "LANGUAGE",
            Group::Security => "SECURITY",
            Group::Miscellaneous => "MISCELLANEOUS",
            Group::Advanced => "ADVANCED",
        }
    }
}

const fn switch(
    id: SwitchId,
    names: &'static [&'static str],
    arity: Arity,
    value_hint: &'static str,
    group: Group,
    help: &'static str,
) -> SwitchDescriptor {
    SwitchDescriptor {
        id,
        names,
        arity,
        value_hint,
        help,
        group,
    }
}

use Arity::*;
use MissingValue::*;

pub static SWITCHES: &[SwitchDescriptor] = &[
    // Output
    switch(SwitchId::Out, &["out"], Value(FileSpec), ":<file>", Group::Output,
        "Specify output file name (default: base name of file with main class or first file)"),
    switch(SwitchId::Target, &["target", "t"], Value(Unrecognized), ":<kind>", Group::Output,
        "Build an exe, winexe, library, module, appcontainerexe or winmdobj"),
    switch(SwitchId::RefOut, &["refout"], Value(FileSpec), ":<file>", Group::Output,
        "Reference assembly output to generate"),
    switch(SwitchId::RefOnly, &["refonly"], Flag, "", Group::Output,
        "Produce a reference assembly in place of the main output"),
    switch(SwitchId::Doc, &["doc"], Value(FileSpec), ":<file>", Group::Output,
        "XML Documentation file to generate"),
    switch(SwitchId::GeneratedFilesOut, &["generatedfilesout"], Value(FileSpec), ":<dir>", Group::Output,
        "Place files generated during compilation in the specified directory"),
    switch(SwitchId::ModuleName, &["modulename"], Value(Text("<string>")), ":<string>", Group::Output,
        "Specify the name of the source module"),
    switch(SwitchId::ModuleAssemblyName, &["moduleassemblyname"], Value(Text("<string>")), ":<string>", Group::Output,
        "Name of the assembly which this module will be a part of"),
    // Inputs
    switch(SwitchId::Recurse, &["recurse"], List(FileSpec), ":<wildcard>", Group::Inputs,
        "Include all files in the current directory and subdirectories according to the wildcard specifications"),
    switch(SwitchId::Reference, &["reference", "r"], List(Text("<file list>")), ":<alias>=<file>", Group::Inputs,
        "Reference metadata from the specified assembly files, optionally using an extern alias"),
    switch(SwitchId::Link, &["link", "l"], List(Text("<file list>")), ":<file list>", Group::Inputs,
        "Embed metadata from the specified interop assembly files"),
    switch(SwitchId::AddModule, &["addmodule"], List(Text("<file list>")), ":<file list>", Group::Inputs,
        "Link the specified modules into this assembly"),
    switch(SwitchId::Analyzer, &["analyzer", "a"], List(Text("<file list>")), ":<file list>", Group::Inputs,
        "Run the analyzers from this assembly"),
    switch(SwitchId::AdditionalFile, &["additionalfile"], List(Text("<file list>")), ":<file list>", Group::Inputs,
        "Additional files that don't directly affect code generation but may be used by analyzers"),
    switch(SwitchId::Embed, &["embed"], OptionalValue, "[:<file list>]", Group::Inputs,
        "Embed files in the PDB; without a value, embed all source files"),
    switch(SwitchId::AnalyzerConfig, &["analyzerconfig"], List(FileSpec), ":<file list>", Group::Inputs,
        "Specify an analyzer config file"),
    // Resources
    switch(SwitchId::Resource, &["resource", "res"], List(FileSpec), ":<resinfo>", Group::Resources,
        "Embed the specified resource"),
    switch(SwitchId::LinkResource, &["linkresource", "linkres"], List(FileSpec), ":<resinfo>", Group::Resources,
        "Link the specified resource to this assembly"),
    // Code generation
    switch(SwitchId::Debug, &["debug"], ToggleValue, "[+|-|:<type>]", Group::CodeGeneration,
        "Emit debugging information; type is full, pdbonly, portable or embedded"),
    switch(SwitchId::Optimize, &["optimize", "o"], Toggle, "[+|-]", Group::CodeGeneration,
        "Enable optimizations"),
    switch(SwitchId::Deterministic, &["deterministic"], Toggle, "[+|-]", Group::CodeGeneration,
        "Produce a deterministic assembly"),
    switch(SwitchId::Pdb, &["pdb"], Value(FileSpec), ":<file>", Group::CodeGeneration,
        "Specify debug information file name"),
    switch(SwitchId::SourceLink, &["sourcelink"], Value(FileSpec), ":<file>", Group::CodeGeneration,
        "Source link info to embed into PDB"),
    switch(SwitchId::PathMap, &["pathmap"], List(Text("<text>")), ":<K1>=<V1>,<K2>=<V2>", Group::CodeGeneration,
        "Specify a mapping for source path names output by the compiler"),
    // Errors and warnings
    switch(SwitchId::WarnAsError, &["warnaserror"], ToggleValue, "[+|-][:<warn list>]", Group::ErrorsAndWarnings,
        "Report all warnings, or the listed ones, as errors"),
    switch(SwitchId::Warn, &["warn", "w"], Value(Number), ":<n>", Group::ErrorsAndWarnings,
        "Set warning level (0 or higher)"),
    switch(SwitchId::NoWarn, &["nowarn"], List(Number), ":<warn list>", Group::ErrorsAndWarnings,
        "Disable specific warning messages"),
    switch(SwitchId::RuleSet, &["ruleset"], Value(FileSpec), ":<file>", Group::ErrorsAndWarnings,
        "Specify a ruleset file that disables specific diagnostics"),
    switch(SwitchId::ErrorLog, &["errorlog"], Value(FileSpec), ":<file>", Group::ErrorsAndWarnings,
        "Specify a file to log all compiler and analyzer diagnostics (SARIF)"),
    switch(SwitchId::ReportAnalyzer, &["reportanalyzer"], Toggle, "", Group::ErrorsAndWarnings,
        "Report additional analyzer information"),
    // Language
    switch(SwitchId::Checked, &["checked"], Toggle, "[+|-]", Group::Language,
        "Generate overflow checks"),
    switch(SwitchId::Unsafe, &["unsafe"], Toggle, "[+|-]", Group::Language,
        "Allow 'unsafe' code"),
    switch(SwitchId::Define, &["define", "d"], List(Text("<text>")), ":<symbol list>", Group::Language,
        "Define conditional compilation symbol(s)"),
    switch(SwitchId::LangVersion, &["langversion"], Value(Text("<text>")), ":?", Group::Language,
        "Specify language version; '?' lists the supported values"),
    switch(SwitchId::Nullable, &["nullable"], ToggleValue, "[+|-|:<mode>]", Group::Language,
        "Specify nullable context option: enable, disable, warnings or annotations"),
    switch(SwitchId::Features, &["features"], OptionalValue, "[:<key=value,...>]", Group::Language,
        "Enable experimental features; without a value, clear them"),
    // Security
    switch(SwitchId::DelaySign, &["delaysign"], Toggle, "[+|-]", Group::Security,
        "Delay-sign the assembly using only the public portion of the strong name key"),
    switch(SwitchId::PublicSign, &["publicsign"], Toggle, "[+|-]", Group::Security,
        "Public-sign the assembly using only the public portion of the strong name key"),
    switch(SwitchId::KeyFile, &["keyfile"], Value(FileSpec), ":<file>", Group::Security,
        "Specify a strong name key file"),
    switch(SwitchId::KeyContainer, &["keycontainer"], Value(Text("<text>")), ":<string>", Group::Security,
        "Specify a strong name key container"),
    switch(SwitchId::HighEntropyVa, &["highentropyva"], Toggle, "[+|-]", Group::Security,
        "Enable high-entropy ASLR"),
    // Miscellaneous
    switch(SwitchId::Help, &["help", "?"], Flag, "", Group::Miscellaneous,
        "Display this usage message"),
    switch(SwitchId::Version, &["version"], Flag, "", Group::Miscellaneous,
        "Display the compiler version number and exit"),
    switch(SwitchId::NoLogo, &["nologo"], Flag, "", Group::Miscellaneous,
        "Suppress compiler copyright message"),
    switch(SwitchId::NoConfig, &["noconfig"], Flag, "", Group::Miscellaneous,
        "Do not auto include the default response file"),
    // Advanced
    switch(SwitchId::BaseAddress, &["baseaddress"], Value(Number), ":<address>", Group::Advanced,
        "Base address for the library to be built"),
    switch(SwitchId::ChecksumAlgorithm, &["checksumalgorithm"], Value(Text("<string>")), ":<alg>", Group::Advanced,
        "Algorithm for the source file checksum stored in the PDB: SHA1 or SHA256 (default)"),
    switch(SwitchId::CodePage, &["codepage"], Value(Text("<text>")), ":<n>", Group::Advanced,
        "Specify the codepage to use when opening source files"),
    switch(SwitchId::Utf8Output, &["utf8output"], Toggle, "", Group::Advanced,
        "Output compiler messages in UTF-8 encoding"),
    switch(SwitchId::Main, &["main", "m"], Value(Text("<text>")), ":<type>", Group::Advanced,
        "Specify the type that contains the entry point"),
    switch(SwitchId::FullPaths, &["fullpaths"], Flag, "", Group::Advanced,
        "Compiler generates fully qualified paths"),
    switch(SwitchId::FileAlign, &["filealign"], Value(Number), ":<n>", Group::Advanced,
        "Specify the alignment used for output file sections"),
    switch(SwitchId::PreferredUiLang, &["preferreduilang"], Value(Text("<text>")), ":<lang>", Group::Advanced,
        "Specify the preferred output language name"),
    switch(SwitchId::NoStdLib, &["nostdlib"], Toggle, "[+|-]", Group::Advanced,
        "Do not reference the standard library"),
    switch(SwitchId::SubsystemVersion, &["subsystemversion"], Value(Text("<text>")), ":<string>", Group::Advanced,
        "Specify subsystem version of this assembly"),
    switch(SwitchId::Lib, &["lib", "libpath"], List(Text("<file list>")), ":<file list>", Group::Advanced,
        "Specify additional directories to search in for references"),
    switch(SwitchId::Platform, &["platform"], Value(Text("<string>")), ":<string>", Group::Advanced,
        "Limit which platforms this code can run on: x86, Itanium, x64, arm, arm64, anycpu32bitpreferred or anycpu"),
];

static INDEX: LazyLock<HashMap<&'static str, usize>> = LazyLock::new(|| {
    let mut index = HashMap::new();
    for (slot, descriptor) in SWITCHES.iter().enumerate() {
        for name in descriptor.names {
            index.insert(*name, slot);
        }
    }
    index
});

/// A `+` or `-` suffix on a toggle switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleSuffix {
    Plus,
    Minus,
}

/// Find a descriptor by (already lower-cased) name, peeling a `+`/`-`
/// suffix for switches that accept one.
pub fn lookup(name: &str) -> Option<(&'static SwitchDescriptor, Option<ToggleSuffix>)> {
    if let Some(&slot) = INDEX.get(name) {
        return Some((&SWITCHES[slot], None));
    }
    let (stem, suffix) = if let Some(stem) = name.strip_suffix('+') {
        (stem, ToggleSuffix::Plus)
    } else if let Some(stem) = name.strip_suffix('-') {
        (stem, ToggleSuffix::Minus)
    } else {
        return None;
    };
    let descriptor = &SWITCHES[*INDEX.get(stem)?];
    descriptor
        .arity
        .accepts_toggle()
        .then_some((descriptor, Some(suffix)))
}

/// All names and aliases, for suggestions.
pub fn all_names() -> impl Iterator<Item = &'static str> {
    SWITCHES.iter().flat_map(|d| d.names.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_lowercase() {
        let mut seen = std::collections::HashSet::new();
        for name in all_names() {
            assert_eq!(name, name.to_ascii_lowercase());
            assert!(seen.insert(name), "duplicate switch name {}", name);
        }
    }

    #[test]
    fn aliases_share_a_descriptor() {
        let (target, _) = lookup("t").expect("alias");
        assert_eq!(target.id, SwitchId::Target);
        assert_eq!(target.canonical_name(), "target");
        let (optimize, suffix) = lookup("o+").expect("toggle alias");
        assert_eq!(optimize.id, SwitchId::Optimize);
        assert_eq!(suffix, Some(ToggleSuffix::Plus));
    }

    #[test]
    fn suffix_only_on_toggles() {
        assert!(lookup("out+").is_none());
        assert!(lookup("nologo-").is_none());
        let (warn_as_error, suffix) = lookup("warnaserror-").expect("toggle value");
        assert_eq!(warn_as_error.id, SwitchId::WarnAsError);
        assert_eq!(suffix, Some(ToggleSuffix::Minus));
    }

    #[test]
    fn every_group_is_populated() {
        for group in Group::ALL {
            assert!(SWITCHES.iter().any(|d| d.group == *group), "{:?}", group);
        }
    }
}
