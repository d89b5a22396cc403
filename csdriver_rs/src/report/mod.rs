//! Diagnostic output.
//!
//! - [`console`]: `path(line,col): severity id: message` lines
//! - [`sarif`]: the `/errorlog` SARIF 2.1.0 document

pub mod console;
pub mod sarif;

pub use console::ConsoleReporter;
pub use sarif::{build_error_log, error_log_string};
