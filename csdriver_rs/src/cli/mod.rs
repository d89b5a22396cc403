//! Command-line front end.
//!
//! ```text
//!   argv
//!    │
//!    ▼
//!  response_files ── @file expansion, tokenizer for file contents
//!    │
//!    ▼
//!  parser ── switch table lookup, value parsing, cross-switch checks
//!    │
//!    ▼
//!  ParsedArguments ──► driver ──► entrypoint (help, logo, reports)
//! ```

pub mod arguments;
pub mod entrypoint;
pub mod help;
pub mod parser;
pub mod response_files;
pub mod switches;
pub mod tokenizer;

pub use arguments::ParsedArguments;
pub use parser::{CommandLineParser, ParserSettings};
