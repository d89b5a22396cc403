//! Command-line tokenization with the legacy quote/backslash rules.
//!
//! Splitting keeps the raw text of each token (quotes and backslashes
//! intact) so list-valued switches can still see which separators were
//! quoted. [`remove_quotes_and_slashes`] applies the escape rules when a
//! value is finally consumed:
//!
//! - `2n` backslashes + `"` → `n` backslashes, quote toggles quoted-mode
//! - `2n+1` backslashes + `"` → `n` backslashes and a literal `"`
//! - backslashes not followed by `"` are literal

/// Split one command line into raw tokens.
///
/// With `remove_hash_comments`, an unquoted `#` that starts a token ends
/// the line.
pub fn split_command_line(line: &str, remove_hash_comments: bool) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        if remove_hash_comments && chars[i] == '#' {
            break;
        }

        let start = i;
        let mut in_quotes = false;
        while i < chars.len() {
            let c = chars[i];
            if c == '\\' {
                let run_start = i;
                while i < chars.len() && chars[i] == '\\' {
                    i += 1;
                }
                if i < chars.len() && chars[i] == '"' {
                    if (i - run_start) % 2 == 0 {
                        in_quotes = !in_quotes;
                    }
                    i += 1;
                }
                continue;
            }
            if c == '"' {
                in_quotes = !in_quotes;
                i += 1;
                continue;
            }
            if c.is_whitespace() && !in_quotes {
                break;
            }
            i += 1;
        }
        tokens.push(chars[start..i].iter().collect());
    }

    tokens
}

/// Apply the backslash/quote rules and drop the quoting quotes.
pub fn remove_quotes_and_slashes(arg: &str) -> String {
    let chars: Vec<char> = arg.chars().collect();
    let mut out = String::with_capacity(arg.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let run_start = i;
                while i < chars.len() && chars[i] == '\\' {
                    i += 1;
                }
                let run = i - run_start;
                if i < chars.len() && chars[i] == '"' {
                    out.extend(std::iter::repeat_n('\\', run / 2));
                    if run % 2 == 1 {
                        out.push('"');
                    }
                    i += 1;
                } else {
                    out.extend(std::iter::repeat_n('\\', run));
                }
            }
            '"' => i += 1,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Strip quoting from a list item where `""` inside quotes is a literal
/// quote (resource fields, path map entries).
pub fn unquote_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars().peekable();
    let mut in_quotes = false;
    while let Some(c) = chars.next() {
        if c != '"' {
            out.push(c);
            continue;
        }
        if in_quotes && chars.peek() == Some(&'"') {
            chars.next();
            out.push('"');
            continue;
        }
        in_quotes = !in_quotes;
    }
    out
}

/// Split a switch value on any of `separators` outside quotes. Items keep
/// their quotes; callers unquote.
pub fn split_separated(value: &str, separators: &[char], remove_empty: bool) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in value.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        if !in_quotes && separators.contains(&c) {
            items.push(std::mem::take(&mut current));
            continue;
        }
        current.push(c);
    }
    items.push(current);
    if remove_empty {
        items.retain(|item| !item.is_empty());
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_outside_quotes() {
        assert_eq!(
            split_command_line(r#"a.cs  "b c.cs"   /r:"x y.dll""#, false),
            vec!["a.cs", r#""b c.cs""#, r#"/r:"x y.dll""#]
        );
    }

    #[test]
    fn escaped_quote_does_not_toggle() {
        let tokens = split_command_line(r#"a\"b c"#, false);
        assert_eq!(tokens, vec![r#"a\"b"#, "c"]);
        assert_eq!(remove_quotes_and_slashes(&tokens[0]), r#"a"b"#);
    }

    #[test]
    fn even_backslashes_before_quote_toggle() {
        let tokens = split_command_line(r#""a\\" b"#, false);
        assert_eq!(tokens, vec![r#""a\\""#, "b"]);
        assert_eq!(remove_quotes_and_slashes(&tokens[0]), r"a\");
    }

    #[test]
    fn lone_backslashes_are_literal() {
        assert_eq!(remove_quotes_and_slashes(r"c:\dir\\file"), r"c:\dir\\file");
        assert_eq!(remove_quotes_and_slashes(r#"\\\"x"#), r#"\"x"#);
    }

    #[test]
    fn hash_comments_end_the_line() {
        assert_eq!(split_command_line("a.cs # trailing", true), vec!["a.cs"]);
        assert_eq!(split_command_line("a.cs b#c", true), vec!["a.cs", "b#c"]);
        assert_eq!(split_command_line("# all", false), vec!["#", "all"]);
    }

    #[test]
    fn unquotes_doubled_quotes() {
        assert_eq!(unquote_field(r#""a ""b"" c""#), r#"a "b" c"#);
        assert_eq!(unquote_field("plain"), "plain");
    }

    #[test]
    fn separated_values_respect_quotes() {
        assert_eq!(
            split_separated(r#"a;"b;c",d"#, &[';', ','], false),
            vec!["a", r#""b;c""#, "d"]
        );
        assert_eq!(split_separated("a;;b;", &[';'], true), vec!["a", "b"]);
        assert_eq!(split_separated("a;;b;", &[';'], false), vec!["a", "", "b", ""]);
    }
}
