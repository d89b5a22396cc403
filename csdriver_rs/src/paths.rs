//! Path resolution and wildcard expansion.
//!
//! User-supplied paths may use either `/` or `\`; everything this module
//! returns uses `/`. Relative paths are combined with a base directory and
//! `.`/`..` segments collapsed. Drive-relative paths (`C:foo`) are rejected
//! rather than guessed at.

use crate::fs_utils::FileSystem;

/// Shape of a raw path string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Empty,
    /// `foo/bar`
    Relative,
    /// `./foo`
    RelativeToCurrentDirectory,
    /// `../foo`
    RelativeToCurrentParent,
    /// `C:foo`: drive letter without a following separator.
    RelativeToDriveDirectory,
    /// `/foo`, `C:/foo`, `//server/share/foo`
    Absolute,
}

pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Length of the root portion of a `/`-separated path.
fn root_length(path: &str) -> usize {
    if let Some(rest) = path.strip_prefix("//") {
        // `//server/share`
        let mut consumed = 2;
        let mut parts = 0;
        for segment in rest.split('/') {
            consumed += segment.len();
            parts += 1;
            if parts == 2 {
                break;
            }
            consumed += 1;
        }
        return consumed.min(path.len());
    }
    if path.starts_with('/') {
        return 1;
    }
    if has_drive_prefix(path) {
        return if path.as_bytes().get(2) == Some(&b'/') { 3 } else { 2 };
    }
    0
}

pub fn path_kind(path: &str) -> PathKind {
    let path = normalize_separators(path);
    if path.trim().is_empty() {
        return PathKind::Empty;
    }
    if path.starts_with('/') {
        return PathKind::Absolute;
    }
    if has_drive_prefix(&path) {
        return if path.as_bytes().get(2) == Some(&b'/') {
            PathKind::Absolute
        } else {
            PathKind::RelativeToDriveDirectory
        };
    }
    if path == "." || path.starts_with("./") {
        return PathKind::RelativeToCurrentDirectory;
    }
    if path == ".." || path.starts_with("../") {
        return PathKind::RelativeToCurrentParent;
    }
    PathKind::Relative
}

pub fn is_absolute(path: &str) -> bool {
    path_kind(path) == PathKind::Absolute
}

/// Unify separators, drop empty and `.` segments and fold `..`.
///
/// `..` never climbs above the root of an absolute path.
pub fn normalize(path: &str) -> String {
    let path = normalize_separators(path);
    let root_len = root_length(&path);
    let (root, rest) = path.split_at(root_len);
    let rooted = root.starts_with('/') || root.ends_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let mut out = root.to_string();
    if !out.is_empty() && !out.ends_with('/') && !parts.is_empty() && rooted {
        out.push('/');
    }
    out.push_str(&parts.join("/"));
    if out.is_empty() && path.starts_with('.') {
        out.push('.');
    }
    out
}

/// Directory part of a normalized path. `None` when there is no separator
/// or the path is a bare root.
pub fn directory_name(path: &str) -> Option<&str> {
    let root_len = root_length(path);
    if path.len() <= root_len {
        return None;
    }
    let index = path.rfind('/')?;
    if index < root_len {
        return Some(&path[..root_len]);
    }
    if index + 1 == root_len {
        return Some(&path[..root_len]);
    }
    Some(&path[..index])
}

/// Last segment of a path, after either separator.
pub fn file_name(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(index) => &path[index + 1..],
        None if has_drive_prefix(path) => &path[2..],
        None => path,
    }
}

/// File name without its last extension.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(index) => &name[..index],
        None => name,
    }
}

/// Extension of the file name including the dot, or `""`.
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(index) => &name[index..],
        None => "",
    }
}

pub fn has_wildcards(path: &str) -> bool {
    path.contains(['*', '?'])
}

fn has_invalid_chars(path: &str) -> bool {
    path.chars().any(|c| {
        c == '\0'
            || (c as u32) < 0x20
            || matches!(c, '<' | '>' | '|' | '"' | '*' | '?')
            || (cfg!(windows) && c == ':')
    })
}

/// Resolved path check: no invalid characters and a non-empty file name.
pub fn is_valid_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    let root_len = root_length(path);
    if has_invalid_chars(&path[root_len.min(path.len())..]) {
        return false;
    }
    !file_name(path).is_empty()
}

/// Combine `path` with `base_directory` unless it is already absolute.
///
/// Returns `None` for empty and drive-relative input, and for relative
/// input when there is no base directory.
pub fn resolve_relative_path(path: &str, base_directory: Option<&str>) -> Option<String> {
    match path_kind(path) {
        PathKind::Empty | PathKind::RelativeToDriveDirectory => None,
        PathKind::Absolute => Some(normalize(path)),
        PathKind::Relative
        | PathKind::RelativeToCurrentDirectory
        | PathKind::RelativeToCurrentParent => {
            base_directory.map(|base| normalize(&format!("{}/{}", base, path)))
        }
    }
}

/// Make `path` relative to `base` when it lives underneath it.
pub fn relative_to<'a>(path: &'a str, base: &str) -> &'a str {
    let base = base.trim_end_matches('/');
    match path.strip_prefix(base) {
        Some(rest) if rest.starts_with('/') && !base.is_empty() => &rest[1..],
        _ => path,
    }
}

/// Whether `path` lies strictly inside `directory` (both normalized).
pub fn is_under(path: &str, directory: &str) -> bool {
    let directory = directory.trim_end_matches('/');
    path.strip_prefix(directory)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Why a wildcard pattern produced nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    /// Directory part is invalid, unresolvable, or the file glob is empty.
    InvalidPath,
    DirectoryNotFound,
}

/// Split `pattern` at its last separator and enumerate matching files.
///
/// Zero matches is `Ok(vec![])`.
pub fn expand_file_pattern(
    fs: &dyn FileSystem,
    pattern: &str,
    base_directory: Option<&str>,
    recursive: bool,
) -> Result<Vec<String>, PatternError> {
    let pattern = normalize_separators(pattern);
    let (directory, file_pattern) = match pattern.rfind('/') {
        Some(0) => ("/", &pattern[1..]),
        Some(index) => (&pattern[..index], &pattern[index + 1..]),
        None => ("", pattern.as_str()),
    };
    if file_pattern.is_empty() {
        return Err(PatternError::InvalidPath);
    }

    let resolved = if directory.is_empty() {
        base_directory.map(normalize)
    } else {
        resolve_relative_path(directory, base_directory)
    };
    let Some(resolved) = resolved.filter(|dir| !has_invalid_chars(&dir[root_length(dir)..]))
    else {
        return Err(PatternError::InvalidPath);
    };

    if !fs.directory_exists(&resolved) {
        return Err(PatternError::DirectoryNotFound);
    }
    fs.enumerate_files(&resolved, file_pattern, recursive)
        .map_err(|_| PatternError::DirectoryNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_utils::MemoryFileSystem;

    #[test]
    fn classifies_path_shapes() {
        assert_eq!(path_kind(""), PathKind::Empty);
        assert_eq!(path_kind("   "), PathKind::Empty);
        assert_eq!(path_kind("a/b.cs"), PathKind::Relative);
        assert_eq!(path_kind("./a.cs"), PathKind::RelativeToCurrentDirectory);
        assert_eq!(path_kind("..\\a.cs"), PathKind::RelativeToCurrentParent);
        assert_eq!(path_kind("C:a.cs"), PathKind::RelativeToDriveDirectory);
        assert_eq!(path_kind("C:\\a.cs"), PathKind::Absolute);
        assert_eq!(path_kind("/usr/a.cs"), PathKind::Absolute);
        assert_eq!(path_kind("\\\\server\\share\\a.cs"), PathKind::Absolute);
    }

    #[test]
    fn normalizes_dots_and_separators() {
        assert_eq!(normalize("/a/./b/../c.cs"), "/a/c.cs");
        assert_eq!(normalize("C:\\x\\..\\y\\z.cs"), "C:/y/z.cs");
        assert_eq!(normalize("/../a.cs"), "/a.cs");
        assert_eq!(normalize("a//b/"), "a/b");
        assert_eq!(normalize("../a"), "../a");
        assert_eq!(normalize("\\\\srv\\share\\dir\\..\\f.cs"), "//srv/share/f.cs");
        assert_eq!(normalize("/"), "/");
    }

    #[test]
    fn resolves_against_base() {
        assert_eq!(
            resolve_relative_path("sub/../a.cs", Some("/proj")),
            Some("/proj/a.cs".to_string())
        );
        assert_eq!(
            resolve_relative_path("/abs/a.cs", Some("/proj")),
            Some("/abs/a.cs".to_string())
        );
        assert_eq!(resolve_relative_path("a.cs", None), None);
        assert_eq!(resolve_relative_path("C:a.cs", Some("C:/proj")), None);
        assert_eq!(resolve_relative_path("", Some("/proj")), None);
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(is_valid_file_path("/proj/a.cs"));
        assert!(!is_valid_file_path("/proj/a\0.cs"));
        assert!(!is_valid_file_path("/proj/a|b.cs"));
        assert!(!is_valid_file_path("/proj/"));
        assert!(!is_valid_file_path(""));
    }

    #[test]
    fn splits_names() {
        assert_eq!(directory_name("/src/a.cs"), Some("/src"));
        assert_eq!(directory_name("/a.cs"), Some("/"));
        assert_eq!(directory_name("/"), None);
        assert_eq!(directory_name("a.cs"), None);
        assert_eq!(directory_name("C:/a.cs"), Some("C:/"));
        assert_eq!(file_name("dir\\a.cs"), "a.cs");
        assert_eq!(file_stem("/x/lib.core.dll"), "lib.core");
        assert_eq!(file_stem(".cs"), "");
        assert_eq!(extension("a.netmodule"), ".netmodule");
    }

    #[test]
    fn relative_display_paths() {
        assert_eq!(relative_to("/proj/src/a.cs", "/proj"), "src/a.cs");
        assert_eq!(relative_to("/other/a.cs", "/proj"), "/other/a.cs");
        assert!(is_under("/proj/a.cs", "/proj"));
        assert!(!is_under("/project/a.cs", "/proj"));
    }

    #[test]
    fn expands_patterns_in_name_order() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/b.cs", "")
            .with_file("/p/a.cs", "")
            .with_file("/p/c.txt", "")
            .with_file("/p/sub/d.cs", "");
        assert_eq!(
            expand_file_pattern(&fs, "*.cs", Some("/p"), false),
            Ok(vec!["/p/a.cs".to_string(), "/p/b.cs".to_string()])
        );
        assert_eq!(
            expand_file_pattern(&fs, "sub\\*.cs", Some("/p"), true),
            Ok(vec!["/p/sub/d.cs".to_string()])
        );
        assert_eq!(
            expand_file_pattern(&fs, "*.vb", Some("/p"), true),
            Ok(Vec::new())
        );
        assert_eq!(
            expand_file_pattern(&fs, "missing/*.cs", Some("/p"), false),
            Err(PatternError::DirectoryNotFound)
        );
        assert_eq!(
            expand_file_pattern(&fs, "*.cs", None, false),
            Err(PatternError::InvalidPath)
        );
    }
}
