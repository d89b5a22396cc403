//! Parsers for structured switch values.
//!
//! Each function takes the raw value (quotes intact) and returns the parsed
//! form or the diagnostic describing why it was rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::cli::arguments::{MetadataReference, PathMapEntry};
use crate::cli::tokenizer::{remove_quotes_and_slashes, split_separated, unquote_field};
use crate::diagnostics::{Diagnostic, ErrorCode};

static CULTURE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2,8}(?:-[A-Za-z0-9]{1,8})*$").expect("culture pattern is valid")
});

static SUBSYSTEM_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("version pattern is valid"));

const FILE_ALIGNMENTS: &[u32] = &[512, 1024, 2048, 4096, 8192];

const CODE_PAGES: &[(u32, &str)] = &[
    (437, "ibm437"),
    (850, "ibm850"),
    (932, "shift_jis"),
    (936, "gb2312"),
    (949, "ks_c_5601-1987"),
    (950, "big5"),
    (1200, "utf-16"),
    (1201, "unicodefffe"),
    (1250, "windows-1250"),
    (1251, "windows-1251"),
    (1252, "windows-1252"),
    (1253, "windows-1253"),
    (1254, "windows-1254"),
    (1255, "windows-1255"),
    (1256, "windows-1256"),
    (1257, "windows-1257"),
    (1258, "windows-1258"),
    (12000, "utf-32"),
    (12001, "utf-32be"),
    (20127, "us-ascii"),
    (28591, "iso-8859-1"),
    (65000, "utf-7"),
    (65001, "utf-8"),
];

/// Identifier check used for symbols and extern aliases.
pub fn is_valid_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Split a file list on `,` and `;` outside quotes, unquoting each item.
pub fn split_paths(value: &str) -> Vec<String> {
    split_separated(value, &[',', ';'], true)
        .iter()
        .map(|item| remove_quotes_and_slashes(item))
        .filter(|item| !item.trim().is_empty())
        .collect()
}

/// `/define` symbols. Empty items are skipped; invalid ones warn.
pub fn parse_symbols(value: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<String> {
    let unquoted = remove_quotes_and_slashes(value);
    let mut symbols = Vec::new();
    for item in unquoted.split([';', ',']) {
        let symbol = item.trim();
        if symbol.is_empty() {
            continue;
        }
        if is_valid_identifier(symbol) {
            symbols.push(symbol.to_string());
        } else {
            diagnostics.push(Diagnostic::new(ErrorCode::DefineIdentifierRequired, [symbol]));
        }
    }
    symbols
}

/// `/reference` and `/link`: `[alias[,alias]=]path` or a plain path list.
pub fn parse_references(
    value: &str,
    embed_interop_types: bool,
) -> Result<Vec<MetadataReference>, Diagnostic> {
    let (aliases, paths_value) = match value.find(['"', '=']) {
        Some(index) if value[index..].starts_with('=') => {
            let aliases: Vec<String> = value[..index]
                .split(',')
                .map(|alias| alias.trim().to_string())
                .collect();
            if let Some(bad) = aliases.iter().find(|alias| !is_valid_identifier(alias)) {
                return Err(Diagnostic::new(ErrorCode::BadExternIdentifier, [bad.as_str()]));
            }
            (aliases, &value[index + 1..])
        }
        _ => (Vec::new(), value),
    };

    let paths = split_paths(paths_value);
    if !aliases.is_empty() {
        if paths.len() > 1 {
            return Err(Diagnostic::new(ErrorCode::OneAliasPerReference, [paths_value]));
        }
        if paths.is_empty() {
            return Err(Diagnostic::new(
                ErrorCode::AliasMissingFile,
                [aliases.join(",")],
            ));
        }
    }

    Ok(paths
        .into_iter()
        .map(|path| MetadataReference {
            path,
            aliases: aliases.clone(),
            embed_interop_types,
        })
        .collect())
}

/// Split on `separator`, treating a doubled separator as a literal one.
fn split_with_doubled_separator(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != separator {
            current.push(c);
            continue;
        }
        if chars.peek() == Some(&separator) {
            chars.next();
            current.push(separator);
        } else {
            parts.push(std::mem::take(&mut current));
        }
    }
    parts.push(current);
    parts
}

fn ensure_trailing_separator(path: &str) -> String {
    if path.ends_with('/') || path.ends_with('\\') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// `/pathmap:K1=V1,K2=V2`. Keys and values get a trailing separator.
pub fn parse_path_map(value: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<PathMapEntry> {
    let unquoted = remove_quotes_and_slashes(value);
    let mut entries = Vec::new();
    for pair in split_with_doubled_separator(&unquoted, ',') {
        if pair.is_empty() {
            continue;
        }
        let parts = split_with_doubled_separator(&pair, '=');
        match parts.as_slice() {
            [key, value] if !key.is_empty() && !value.is_empty() => entries.push(PathMapEntry {
                key: ensure_trailing_separator(key),
                value: ensure_trailing_separator(value),
            }),
            _ => diagnostics.push(Diagnostic::bare(ErrorCode::InvalidPathMap)),
        }
    }
    entries
}

/// Decimal or `0x` hex.
fn parse_unsigned(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

pub fn parse_base_address(value: &str) -> Result<u64, Diagnostic> {
    let unquoted = remove_quotes_and_slashes(value);
    parse_unsigned(&unquoted)
        .ok_or_else(|| Diagnostic::new(ErrorCode::BadBaseNumber, [unquoted.as_str()]))
}

pub fn parse_file_alignment(value: &str) -> Result<u32, Diagnostic> {
    let unquoted = remove_quotes_and_slashes(value);
    parse_unsigned(&unquoted)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| FILE_ALIGNMENTS.contains(n))
        .ok_or_else(|| Diagnostic::new(ErrorCode::InvalidFileAlignment, [unquoted.as_str()]))
}

/// A known code page number or name.
pub fn parse_code_page(value: &str) -> Result<u32, Diagnostic> {
    let unquoted = remove_quotes_and_slashes(value);
    let lowered = unquoted.trim().to_ascii_lowercase();
    let found = match lowered.parse::<u32>() {
        Ok(number) => CODE_PAGES.iter().find(|(page, _)| *page == number),
        Err(_) => CODE_PAGES.iter().find(|(_, name)| *name == lowered),
    };
    found
        .map(|(page, _)| *page)
        .ok_or_else(|| Diagnostic::new(ErrorCode::BadCodepage, [unquoted.as_str()]))
}

pub fn parse_subsystem_version(value: &str) -> Result<String, Diagnostic> {
    let unquoted = remove_quotes_and_slashes(value);
    if SUBSYSTEM_VERSION.is_match(&unquoted) {
        Ok(unquoted)
    } else {
        Err(Diagnostic::new(ErrorCode::InvalidSubsystemVersion, [unquoted.as_str()]))
    }
}

pub fn is_valid_culture_name(name: &str) -> bool {
    CULTURE_NAME.is_match(name)
}

/// `/features:a,b=c`. A bare key means `key=true`.
pub fn parse_features(value: &str) -> Vec<(String, String)> {
    split_separated(value, &[','], true)
        .iter()
        .map(|item| unquote_field(item))
        .filter(|item| !item.trim().is_empty())
        .map(|item| match item.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (item.trim().to_string(), "true".to_string()),
        })
        .collect()
}
