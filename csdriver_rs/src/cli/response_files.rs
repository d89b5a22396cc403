//! `@file` response-file expansion.
//!
//! Expansion runs on an explicit stack of frames instead of recursion. Each
//! frame is spliced in place of its `@file` token, so argument order is
//! depth-first: `@a.rsp b.cs` with `a.rsp` containing `a.cs` yields
//! `a.cs b.cs`. A frame that cannot be opened only loses itself; siblings
//! keep parsing.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::tokenizer::{remove_quotes_and_slashes, split_command_line};
use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::fs_utils::FileSystem;
use crate::paths;

pub const DEFAULT_MAX_DEPTH: usize = 32;
/// Total response files one expansion may open.
pub const DEFAULT_MAX_FRAMES: usize = 4096;

/// Where a token came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgOrigin {
    /// Index into the original argument vector.
    CommandLine(usize),
    ResponseFile { path: String, line: usize },
}

impl ArgOrigin {
    pub fn is_command_line(&self) -> bool {
        matches!(self, ArgOrigin::CommandLine(_))
    }
}

/// A flattened argument and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgToken {
    pub text: String,
    pub origin: ArgOrigin,
}

/// One activation record of the expansion stack.
#[derive(Debug, Clone)]
pub struct ResponseFileFrame {
    pub path: String,
    pub base_directory: Option<String>,
    pub lines: Vec<String>,
}

impl ResponseFileFrame {
    /// Tokenize the frame's lines, dropping blank and `#` comment lines.
    fn tokens(&self, remove_hash_comments: bool) -> Vec<ArgToken> {
        let mut out = Vec::new();
        for (index, raw) in self.lines.iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() || (remove_hash_comments && line.starts_with('#')) {
                continue;
            }
            for text in split_command_line(line, remove_hash_comments) {
                out.push(ArgToken {
                    text,
                    origin: ArgOrigin::ResponseFile {
                        path: self.path.clone(),
                        line: index + 1,
                    },
                });
            }
        }
        out
    }
}

pub struct ResponseFileExpander<'a> {
    fs: &'a dyn FileSystem,
    base_directory: Option<&'a str>,
    max_depth: usize,
    max_frames: usize,
    remove_hash_comments: bool,
    /// Texts already read by the caller, keyed by resolved path.
    preloaded: HashMap<String, String>,
}

impl<'a> ResponseFileExpander<'a> {
    pub fn new(fs: &'a dyn FileSystem, base_directory: Option<&'a str>) -> Self {
        Self {
            fs,
            base_directory,
            max_depth: DEFAULT_MAX_DEPTH,
            max_frames: DEFAULT_MAX_FRAMES,
            remove_hash_comments: true,
            preloaded: HashMap::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn with_hash_comments(mut self, remove: bool) -> Self {
        self.remove_hash_comments = remove;
        self
    }

    /// Serve these `(path, text)` pairs instead of reading the file system.
    pub fn with_preloaded<I>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.preloaded
            .extend(files.into_iter().map(|(path, text)| (paths::normalize(&path), text)));
        self
    }

    /// Absolute path named by an `@file` reference, or the raw name when invalid.
    fn resolve(&self, raw: &str) -> Result<String, String> {
        let unquoted = remove_quotes_and_slashes(raw);
        let name = unquoted.trim_end();
        paths::resolve_relative_path(name, self.base_directory)
            .filter(|p| paths::is_valid_file_path(p))
            .ok_or_else(|| name.to_string())
    }

    /// Read a response file into a frame.
    fn read(&self, resolved: String) -> Result<ResponseFileFrame, String> {
        let text = match self.preloaded.get(&resolved) {
            Some(text) => text.clone(),
            None => self
                .fs
                .read_all_text(&resolved)
                .map_err(|_| resolved.clone())?,
        };
        Ok(ResponseFileFrame {
            path: resolved,
            base_directory: self.base_directory.map(str::to_string),
            lines: text.lines().map(str::to_string).collect(),
        })
    }

    /// Flatten `args`, splicing every `@file` in place.
    ///
    /// A file already open on the current chain is a cycle: it is reported
    /// once and not reopened. At most `max_frames` files are opened in total.
    pub fn expand(&self, args: &[String], diagnostics: &mut Vec<Diagnostic>) -> Vec<ArgToken> {
        let top: Vec<ArgToken> = args
            .iter()
            .enumerate()
            .map(|(index, text)| ArgToken {
                text: text.clone(),
                origin: ArgOrigin::CommandLine(index),
            })
            .collect();

        let mut out = Vec::with_capacity(top.len());
        let mut stack: Vec<Frame> = vec![Frame {
            tokens: top.into_iter(),
            depth: 0,
            path: None,
        }];
        let mut reported_cycles = HashSet::new();
        let mut opened = 0usize;
        let mut frame_limit_reported = false;

        loop {
            let (next, depth) = match stack.last_mut() {
                Some(frame) => (frame.tokens.next(), frame.depth),
                None => break,
            };
            let Some(token) = next else {
                stack.pop();
                continue;
            };
            let Some(reference) = token.text.strip_prefix('@') else {
                out.push(token);
                continue;
            };

            if depth >= self.max_depth {
                diagnostics.push(Diagnostic::new(
                    ErrorCode::ResponseFileTooDeep,
                    [reference.to_string(), self.max_depth.to_string()],
                ));
                continue;
            }
            let resolved = match self.resolve(reference) {
                Ok(resolved) => resolved,
                Err(name) => {
                    diagnostics.push(Diagnostic::new(ErrorCode::OpenResponseFile, [name]));
                    continue;
                }
            };
            if stack.iter().any(|frame| frame.path.as_deref() == Some(resolved.as_str())) {
                debug!(path = %resolved, "response file includes itself");
                if reported_cycles.insert(resolved.clone()) {
                    diagnostics.push(Diagnostic::new(
                        ErrorCode::ResponseFileTooDeep,
                        [resolved, self.max_depth.to_string()],
                    ));
                }
                continue;
            }
            if opened >= self.max_frames {
                if !frame_limit_reported {
                    frame_limit_reported = true;
                    diagnostics.push(Diagnostic::new(
                        ErrorCode::ResponseFileTooDeep,
                        [resolved, self.max_frames.to_string()],
                    ));
                }
                continue;
            }
            opened += 1;
            match self.read(resolved) {
                Ok(frame) => {
                    debug!(path = %frame.path, depth = depth + 1, "expanding response file");
                    let tokens = frame.tokens(self.remove_hash_comments);
                    trace!(count = tokens.len(), "response file tokens");
                    stack.push(Frame {
                        tokens: tokens.into_iter(),
                        depth: depth + 1,
                        path: Some(frame.path),
                    });
                }
                Err(path) => {
                    diagnostics.push(Diagnostic::new(ErrorCode::OpenResponseFile, [path]));
                }
            }
        }

        out
    }
}

struct Frame {
    tokens: std::vec::IntoIter<ArgToken>,
    depth: usize,
    /// `None` for the command line itself.
    path: Option<String>,
}
