//! Shared main() body for the `csdriver` binary.
//!
//! Display requests (`/help`, `/version`, `/langversion:?`) print and
//! exit 0 unless the command line itself had errors. Everything else
//! goes through [`Driver::run`], the console reporter and the optional
//! SARIF error log.

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::help;
use crate::driver::{Driver, DriverOutcome};
use crate::fs_utils::{FileSystem, RealFileSystem};
use crate::report::ConsoleReporter;

/// Options controlling how results reach the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryOptions {
    /// Paint errors and warnings.
    pub color: bool,
}

/// Run with the process arguments from the current directory.
pub fn run() -> Result<i32> {
    // args[0] is the executable.
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let current_dir = std::env::current_dir().context("cannot determine current directory")?;
    let base_directory = current_dir.to_string_lossy().into_owned();
    let stdout = io::stdout();
    let options = EntryOptions {
        color: stdout.is_terminal(),
    };
    let mut out = stdout.lock();
    run_with(&RealFileSystem, &base_directory, &raw_args, options, &mut out)
}

/// Run against an arbitrary file system and sink. Returns the exit code.
pub fn run_with(
    fs: &dyn FileSystem,
    base_directory: &str,
    args: &[String],
    options: EntryOptions,
    out: &mut dyn Write,
) -> Result<i32> {
    let driver = Driver::new(fs, base_directory);
    let outcome = driver.run(args)?;
    let display = outcome.arguments.display;

    if display.help {
        writeln!(out, "{}", help::format_help())?;
    } else if display.version {
        writeln!(out, "{}", help::format_version())?;
    } else if display.logo {
        writeln!(out, "{}", help::format_logo())?;
    }
    if display.language_versions {
        write!(out, "{}", help::format_language_versions())?;
    }

    report(&driver, &outcome, options, out)?;
    if !display.wants_display_only() {
        driver.write_error_log(&outcome)?;
    }

    let code = outcome.exit_code();
    debug!(code, "exiting");
    Ok(code)
}

fn report(
    driver: &Driver<'_>,
    outcome: &DriverOutcome,
    options: EntryOptions,
    out: &mut dyn Write,
) -> Result<()> {
    let reporter = ConsoleReporter::new(
        Some(driver.base_directory()),
        outcome.arguments.reporting.full_paths,
    )
    .with_color(options.color);
    reporter
        .write_all(out, &outcome.diagnostics)
        .context("cannot write diagnostics")
}
