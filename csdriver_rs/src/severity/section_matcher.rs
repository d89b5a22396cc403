//! Analyzer-config section names compiled to regular expressions.
//!
//! | glob        | regex                               |
//! |-------------|-------------------------------------|
//! | no `/`      | `.*/` prefix                        |
//! | `*`         | `[^/]*`                             |
//! | `**`        | `.*`                                |
//! | `?`         | `.`                                 |
//! | `{a,b}`     | `(?:a|b)`                           |
//! | `{n1..n2}`  | `(-?[0-9]+)`, range checked after   |
//! | `[!a-z]`    | `[^a-z]`                            |
//!
//! Paths handed to [`SectionNameMatcher::is_match`] are `/`-rooted and
//! relative to the directory of the config file.

use std::sync::LazyLock;

use regex::Regex;

static NUMERIC_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{(-?[0-9]+)\.\.(-?[0-9]+)\}").expect("numeric range pattern is valid")
});

#[derive(Debug, Clone)]
pub struct SectionNameMatcher {
    regex: Regex,
    numeric_ranges: Vec<(i64, i64)>,
}

/// Why a nested sequence stopped.
enum Stop {
    End,
    Comma,
    Close,
}

struct GlobCompiler<'a> {
    chars: &'a [char],
    pos: usize,
    numeric_ranges: Vec<(i64, i64)>,
}

impl GlobCompiler<'_> {
    fn rest(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    /// Translate up to the end of the input (depth 0) or to the `,`/`}`
    /// that ends the current alternative. `None` for malformed input.
    fn sequence(&mut self, out: &mut String, depth: usize) -> Option<Stop> {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            self.pos += 1;
            match c {
                '*' => {
                    if self.chars.get(self.pos) == Some(&'*') {
                        self.pos += 1;
                        out.push_str(".*");
                    } else {
                        out.push_str("[^/]*");
                    }
                }
                '?' => out.push('.'),
                '{' => self.brace(out, depth)?,
                '}' => return (depth > 0).then_some(Stop::Close),
                ',' => return (depth > 0).then_some(Stop::Comma),
                '[' => self.class(out)?,
                '\\' => {
                    let escaped = *self.chars.get(self.pos)?;
                    self.pos += 1;
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
                other => out.push_str(&regex::escape(&other.to_string())),
            }
        }
        (depth == 0).then_some(Stop::End)
    }

    fn brace(&mut self, out: &mut String, depth: usize) -> Option<()> {
        // `pos` is just past `{`; the range pattern wants to see it.
        let from_open: String = std::iter::once('{').chain(self.rest().chars()).collect();
        if let Some(captures) = NUMERIC_RANGE.captures(&from_open) {
            let first: i64 = captures[1].parse().ok()?;
            let second: i64 = captures[2].parse().ok()?;
            self.numeric_ranges
                .push((first.min(second), first.max(second)));
            self.pos += captures[0].chars().count() - 1;
            out.push_str("(-?[0-9]+)");
            return Some(());
        }

        out.push_str("(?:");
        loop {
            match self.sequence(out, depth + 1)? {
                Stop::Comma => out.push('|'),
                Stop::Close => break,
                Stop::End => return None,
            }
        }
        out.push(')');
        Some(())
    }

    fn class(&mut self, out: &mut String) -> Option<()> {
        let start = self.pos;
        let close = self.chars[start..].iter().position(|c| *c == ']')? + start;
        let body = &self.chars[start..close];
        if body.is_empty() {
            return None;
        }
        out.push('[');
        let mut items = body;
        if items[0] == '!' {
            out.push('^');
            items = &items[1..];
        }
        for c in items {
            match c {
                '\\' | '[' | ']' | '^' | '&' | '~' => {
                    out.push('\\');
                    out.push(*c);
                }
                other => out.push(*other),
            }
        }
        out.push(']');
        self.pos = close + 1;
        Some(())
    }
}

impl SectionNameMatcher {
    /// Compile a section name. `None` for names that can never match.
    pub fn compile(section_name: &str) -> Option<Self> {
        let chars: Vec<char> = section_name.chars().collect();
        let mut pattern = String::from("^");
        if !section_name.contains('/') {
            pattern.push_str(".*/");
        } else if !section_name.starts_with('/') {
            pattern.push('/');
        }

        let mut compiler = GlobCompiler {
            chars: &chars,
            pos: 0,
            numeric_ranges: Vec::new(),
        };
        match compiler.sequence(&mut pattern, 0)? {
            Stop::End => {}
            Stop::Comma | Stop::Close => return None,
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).ok()?;
        Some(Self {
            regex,
            numeric_ranges: compiler.numeric_ranges,
        })
    }

    pub fn is_match(&self, path: &str) -> bool {
        let Some(captures) = self.regex.captures(path) else {
            return false;
        };
        self.numeric_ranges
            .iter()
            .enumerate()
            .all(|(index, (low, high))| {
                captures
                    .get(index + 1)
                    .and_then(|m| m.as_str().parse::<i64>().ok())
                    .is_some_and(|n| *low <= n && n <= *high)
            })
    }
}

/// Remove `\` escapes from a section name.
pub fn unescape_section_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }
        out.push(c);
    }
    out
}
