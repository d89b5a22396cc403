//! Filesystem capability used by every stage of the driver.
//!
//! Parsing never touches `std::fs` directly: it goes through [`FileSystem`],
//! so tests can run against [`MemoryFileSystem`] and a snapshot is probed
//! the same way on every run. Paths crossing this boundary are `/`-separated
//! strings as produced by [`crate::paths`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

use crate::paths;

pub trait FileSystem {
    fn file_exists(&self, path: &str) -> bool;

    fn directory_exists(&self, path: &str) -> bool;

    /// Files in `dir` whose names match `pattern`, in name order. With
    /// `recursive`, each subdirectory (again in name order) follows the
    /// files of its parent.
    fn enumerate_files(&self, dir: &str, pattern: &str, recursive: bool)
    -> io::Result<Vec<String>>;

    fn read_all_text(&self, path: &str) -> io::Result<String>;

    fn read_all_bytes(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Absolute, normalized form of `path`.
    fn full_path(&self, path: &str) -> String;
}

/// Compile a file-name glob (`*.cs`, `a?.txt`). Returns `None` for
/// patterns globset cannot represent.
pub fn file_name_matcher(pattern: &str) -> Option<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(false)
        .case_insensitive(cfg!(windows))
        .build()
        .ok()
        .map(|glob| glob.compile_matcher())
}

/// The real disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    fn collect(dir: &Path, matcher: &GlobMatcher, recursive: bool, out: &mut Vec<String>) -> io::Result<()> {
        let mut subdirs = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::other)?;
            let file_type = entry.file_type();
            if file_type.is_dir() {
                subdirs.push(entry.into_path());
                continue;
            }
            if file_type.is_file() && matcher.is_match(entry.file_name()) {
                out.push(paths::normalize(&entry.path().to_string_lossy()));
            }
        }
        if recursive {
            for sub in subdirs {
                Self::collect(&sub, matcher, recursive, out)?;
            }
        }
        Ok(())
    }
}

impl FileSystem for RealFileSystem {
    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn directory_exists(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn enumerate_files(
        &self,
        dir: &str,
        pattern: &str,
        recursive: bool,
    ) -> io::Result<Vec<String>> {
        let Some(matcher) = file_name_matcher(pattern) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        Self::collect(Path::new(dir), &matcher, recursive, &mut out)?;
        Ok(out)
    }

    fn read_all_text(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn read_all_bytes(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn full_path(&self, path: &str) -> String {
        match std::path::absolute(path) {
            Ok(abs) => paths::normalize(&abs.to_string_lossy()),
            Err(_) => paths::normalize(path),
        }
    }
}

/// In-memory snapshot for tests and embedding hosts.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeSet<String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories.
    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, contents);
        self
    }

    pub fn with_directory(mut self, path: &str) -> Self {
        self.add_directory(path);
        self
    }

    pub fn add_file(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        let path = paths::normalize(path);
        if let Some(parent) = paths::directory_name(&path) {
            self.add_directory(parent);
        }
        self.files.insert(path, contents.into());
    }

    pub fn add_directory(&mut self, path: &str) {
        let mut current = Some(paths::normalize(path));
        while let Some(dir) = current {
            if dir.is_empty() || !self.directories.insert(dir.clone()) {
                break;
            }
            current = paths::directory_name(&dir).map(str::to_string);
        }
    }

    fn children(&self, dir: &str) -> (Vec<&str>, Vec<&str>) {
        let prefix = if dir.ends_with('/') {
            dir.to_string()
        } else {
            format!("{}/", dir)
        };
        let direct = |p: &&String| {
            p.strip_prefix(prefix.as_str())
                .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
        };
        let files = self.files.keys().filter(direct).map(String::as_str).collect();
        let dirs = self
            .directories
            .iter()
            .filter(direct)
            .map(String::as_str)
            .collect();
        (files, dirs)
    }

    fn collect(&self, dir: &str, matcher: &GlobMatcher, recursive: bool, out: &mut Vec<String>) {
        let (files, dirs) = self.children(dir);
        for file in files {
            if matcher.is_match(paths::file_name(file)) {
                out.push(file.to_string());
            }
        }
        if recursive {
            for sub in dirs {
                self.collect(sub, matcher, recursive, out);
            }
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn file_exists(&self, path: &str) -> bool {
        self.files.contains_key(&paths::normalize(path))
    }

    fn directory_exists(&self, path: &str) -> bool {
        self.directories.contains(&paths::normalize(path))
    }

    fn enumerate_files(
        &self,
        dir: &str,
        pattern: &str,
        recursive: bool,
    ) -> io::Result<Vec<String>> {
        let dir = paths::normalize(dir);
        if !self.directories.contains(&dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory '{}' not found", dir),
            ));
        }
        let Some(matcher) = file_name_matcher(pattern) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        self.collect(&dir, &matcher, recursive, &mut out);
        Ok(out)
    }

    fn read_all_text(&self, path: &str) -> io::Result<String> {
        let bytes = self.read_all_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn read_all_bytes(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(&paths::normalize(path))
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Could not find file '{}'", path),
                )
            })
    }

    fn full_path(&self, path: &str) -> String {
        paths::normalize(path)
    }
}
