//! Option value types shared by the parser and its consumers.

use std::fmt;
use std::str::FromStr;

/// What `/target` asks the compiler to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputKind {
    #[default]
    ConsoleApplication,
    WindowsApplication,
    DynamicallyLinkedLibrary,
    NetModule,
    WindowsRuntimeApplication,
    WindowsRuntimeMetadata,
}

impl OutputKind {
    /// Kinds that need an entry point.
    pub fn is_application(self) -> bool {
        matches!(
            self,
            OutputKind::ConsoleApplication
                | OutputKind::WindowsApplication
                | OutputKind::WindowsRuntimeApplication
        )
    }

    pub fn is_net_module(self) -> bool {
        self == OutputKind::NetModule
    }

    pub fn default_extension(self) -> &'static str {
        match self {
            OutputKind::ConsoleApplication
            | OutputKind::WindowsApplication
            | OutputKind::WindowsRuntimeApplication => ".exe",
            OutputKind::DynamicallyLinkedLibrary => ".dll",
            OutputKind::NetModule => ".netmodule",
            OutputKind::WindowsRuntimeMetadata => ".winmdobj",
        }
    }
}

impl FromStr for OutputKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exe" => Ok(OutputKind::ConsoleApplication),
            "winexe" => Ok(OutputKind::WindowsApplication),
            "library" => Ok(OutputKind::DynamicallyLinkedLibrary),
            "module" => Ok(OutputKind::NetModule),
            "appcontainerexe" => Ok(OutputKind::WindowsRuntimeApplication),
            "winmdobj" => Ok(OutputKind::WindowsRuntimeMetadata),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OutputKind::ConsoleApplication => "exe",
            OutputKind::WindowsApplication => "winexe",
            OutputKind::DynamicallyLinkedLibrary => "library",
            OutputKind::NetModule => "module",
            OutputKind::WindowsRuntimeApplication => "appcontainerexe",
            OutputKind::WindowsRuntimeMetadata => "winmdobj",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    AnyCpu,
    AnyCpu32BitPreferred,
    X86,
    X64,
    Itanium,
    Arm,
    Arm64,
}

impl Platform {
    pub fn requires_64_bit(self) -> bool {
        matches!(self, Platform::X64 | Platform::Itanium | Platform::Arm64)
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" => Ok(Platform::X86),
            "x64" => Ok(Platform::X64),
            "itanium" => Ok(Platform::Itanium),
            "anycpu" => Ok(Platform::AnyCpu),
            "anycpu32bitpreferred" => Ok(Platform::AnyCpu32BitPreferred),
            "arm" => Ok(Platform::Arm),
            "arm64" => Ok(Platform::Arm64),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DebugFormat {
    /// Full and pdbonly both map here.
    #[default]
    Pdb,
    PortablePdb,
    Embedded,
}

impl FromStr for DebugFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" | "pdbonly" => Ok(DebugFormat::Pdb),
            "portable" => Ok(DebugFormat::PortablePdb),
            "embedded" => Ok(DebugFormat::Embedded),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullableContextOptions {
    #[default]
    Disable,
    Enable,
    Warnings,
    Annotations,
}

impl FromStr for NullableContextOptions {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" => Ok(NullableContextOptions::Disable),
            "enable" => Ok(NullableContextOptions::Enable),
            "warnings" => Ok(NullableContextOptions::Warnings),
            "annotations" => Ok(NullableContextOptions::Annotations),
            _ => Err(()),
        }
    }
}

impl fmt::Display for NullableContextOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NullableContextOptions::Disable => "Disable",
            NullableContextOptions::Enable => "Enable",
            NullableContextOptions::Warnings => "Warnings",
            NullableContextOptions::Annotations => "Annotations",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChecksumAlgorithm {
    Sha1,
    #[default]
    Sha256,
}

impl FromStr for ChecksumAlgorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(ChecksumAlgorithm::Sha1),
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptimizationLevel {
    #[default]
    Debug,
    Release,
}
