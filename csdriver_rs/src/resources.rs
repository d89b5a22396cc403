//! `/resource` and `/linkresource` descriptions.
//!
//! Grammar: `<path>[,<name>[,public|private]]`. Fields may be quoted; a
//! doubled quote inside a quoted field is a literal quote.

use crate::cli::tokenizer::{split_separated, unquote_field};
use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::paths;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescription {
    /// Resolved path, or the raw path when there is no base directory.
    pub file_path: String,
    /// File name as written, used for linked resources.
    pub file_name: String,
    pub resource_name: String,
    pub is_public: bool,
    /// `/resource` embeds; `/linkresource` links.
    pub is_embedded: bool,
}

/// Parse one resource value. `switch` is the raw switch text used in
/// diagnostics (`/res`, `/linkresource`, ...).
pub fn parse_resource_description(
    switch: &str,
    value: &str,
    base_directory: Option<&str>,
    is_embedded: bool,
) -> Result<ResourceDescription, Diagnostic> {
    let fields = split_separated(value, &[','], false);
    let field = |index: usize| fields.get(index).map(|f| unquote_field(f));

    let file_path = field(0).unwrap_or_default();
    let resource_name = field(1);
    let accessibility = field(2);

    if file_path.trim().is_empty() {
        return Err(Diagnostic::new(ErrorCode::NoFileSpec, [switch]));
    }

    let full_path = match paths::resolve_relative_path(&file_path, base_directory) {
        Some(resolved) if paths::is_valid_file_path(&resolved) => resolved,
        Some(_) => {
            return Err(Diagnostic::new(ErrorCode::InvalidInputFileName, [file_path]));
        }
        None if base_directory.is_none() && paths::is_valid_file_path(&file_path) => {
            file_path.clone()
        }
        None => {
            return Err(Diagnostic::new(ErrorCode::InvalidInputFileName, [file_path]));
        }
    };

    let file_name = paths::file_name(&file_path).to_string();
    let resource_name = match resource_name {
        Some(name) if !name.is_empty() => name,
        _ => file_name.clone(),
    };

    let is_public = match accessibility.as_deref() {
        None | Some("") => true,
        Some(text) if text.eq_ignore_ascii_case("public") => true,
        Some(text) if text.eq_ignore_ascii_case("private") => false,
        Some(text) => {
            return Err(Diagnostic::new(ErrorCode::BadResourceVis, [text]));
        }
    };

    Ok(ResourceDescription {
        file_path: full_path,
        file_name,
        resource_name,
        is_public,
        is_embedded,
    })
}
