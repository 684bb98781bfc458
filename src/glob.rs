//! MODULE: GLOB ENGINE (spec.md §4.2.1)
//!
//! A standalone pattern compiler translating a glob to a regular
//! expression. Deliberately hand-rolled rather than built on `globset`/
//! `ignore`: the hierarchical last-match-wins resolution in
//! [`crate::exclusion`] and the basename-only invariant (a pattern without
//! `/` must never match a path containing `/`, spec.md §8 invariant 8) need
//! to be exactly controlled and unit-tested against the pattern-conformance
//! suite, not inherited from a general-purpose walker's semantics.

use regex::Regex;
use thiserror::Error;

/// A glob compiled to a `regex::Regex`, plus the metadata the resolver
/// needs to apply last-match-wins and directory-prefix semantics.
#[derive(Debug, Clone)]
pub struct CompiledGlob {
    /// The pattern exactly as written (including any leading `!`), kept for
    /// diagnostics (e.g. the warning logged when a rule fails to compile).
    pub raw: String,
    /// `true` if the pattern started with `!` (inverts the verdict).
    pub negated: bool,
    /// `true` if the pattern ended with `/` (matches the directory itself
    /// and everything under it).
    pub dir_only: bool,
    /// `true` if the pattern contains no `/` (must never match a path that
    /// contains one — spec.md §8 invariant 8).
    pub basename_only: bool,
    regex: Regex,
}

#[derive(Debug, Error)]
pub enum GlobError {
    #[error("unterminated character class in glob `{0}`")]
    UnterminatedClass(String),
    #[error("unterminated brace alternation in glob `{0}`")]
    UnterminatedBrace(String),
    #[error("glob `{pattern}` compiled to an invalid regex: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl CompiledGlob {
    /// Compile a single glob rule line (as it would appear in an ignore
    /// file or an `options.fileExclusions` entry).
    pub fn compile(raw_pattern: &str) -> Result<Self, GlobError> {
        let raw = raw_pattern.to_string();

        let negated = raw_pattern.starts_with('!');
        let mut body = if negated { &raw_pattern[1..] } else { raw_pattern };

        // A leading '/' anchors the pattern to the scope root. Since every
        // candidate path we test is already relative to that scope, the
        // anchor has no further effect once stripped.
        body = body.strip_prefix('/').unwrap_or(body);

        let dir_only = body.len() > 1 && body.ends_with('/');
        let body = if dir_only {
            body.strip_suffix('/').unwrap_or(body)
        } else {
            body
        };

        let basename_only = !body.contains('/');
        let dot_option = body.starts_with('.');

        let translated = translate_body(body, dot_option)?;

        let full = if dir_only {
            format!("^{translated}(?:/.*)?$")
        } else {
            format!("^{translated}$")
        };

        let regex = Regex::new(&full).map_err(|source| GlobError::InvalidRegex {
            pattern: raw.clone(),
            source,
        })?;

        Ok(Self {
            raw,
            negated,
            dir_only,
            basename_only,
            regex,
        })
    }

    /// Test a relative, forward-slash-normalized path against this pattern.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Translate a slash-containing glob body (no leading `!`, no leading `/`,
/// no trailing `/`) into a regex fragment that can be wrapped in `^...$`.
fn translate_body(body: &str, dot_option: bool) -> Result<String, GlobError> {
    let chars: Vec<char> = body.chars().collect();
    let n = chars.len();
    let mut out = String::new();
    let mut i = 0usize;
    // true at the start of the pattern or immediately after a literal '/'
    // or a globstar separator — governs the leading-dot rule for * and ?.
    let mut at_segment_start = true;

    while i < n {
        match chars[i] {
            '*' if i + 1 < n && chars[i + 1] == '*' => {
                let is_head = i == 0;
                let is_tail = i + 2 == n;
                let mut j = i + 2;
                let followed_by_slash = j < n && chars[j] == '/';
                if followed_by_slash {
                    j += 1;
                }

                if is_head && followed_by_slash {
                    out.push_str("(?:.*/)?");
                    i = j;
                } else if is_tail {
                    if out.ends_with('/') {
                        out.pop();
                        out.push_str("(?:/.*)?");
                    } else {
                        out.push_str(".*");
                    }
                    i = j;
                } else {
                    // Bare `**` in the middle is equivalent to `**/`.
                    out.push_str("(?:.*/)?");
                    i = if followed_by_slash { j } else { i + 2 };
                }
                at_segment_start = true;
            }
            '*' => {
                if at_segment_start && !dot_option {
                    out.push_str("(?:[^/.][^/]*)?");
                } else {
                    out.push_str("[^/]*");
                }
                i += 1;
                at_segment_start = false;
            }
            '?' => {
                if at_segment_start && !dot_option {
                    out.push_str("[^/.]");
                } else {
                    out.push_str("[^/]");
                }
                i += 1;
                at_segment_start = false;
            }
            '[' => {
                let mut j = i + 1;
                let mut class = String::from("[");
                if j < n && (chars[j] == '!' || chars[j] == '^') {
                    class.push('^');
                    j += 1;
                }
                if j < n && chars[j] == ']' {
                    class.push_str("\\]");
                    j += 1;
                }
                while j < n && chars[j] != ']' {
                    let c = chars[j];
                    if c == '\\' || c == '[' {
                        class.push('\\');
                    }
                    class.push(c);
                    j += 1;
                }
                if j >= n {
                    return Err(GlobError::UnterminatedClass(body.to_string()));
                }
                class.push(']');
                out.push_str(&class);
                i = j + 1;
                at_segment_start = false;
            }
            '{' => {
                let mut j = i + 1;
                let mut alts: Vec<String> = Vec::new();
                let mut cur = String::new();
                while j < n && chars[j] != '}' {
                    if chars[j] == ',' {
                        alts.push(std::mem::take(&mut cur));
                    } else {
                        cur.push(chars[j]);
                    }
                    j += 1;
                }
                if j >= n {
                    return Err(GlobError::UnterminatedBrace(body.to_string()));
                }
                alts.push(cur);
                out.push_str("(?:");
                for (k, alt) in alts.iter().enumerate() {
                    if k > 0 {
                        out.push('|');
                    }
                    out.push_str(&translate_body(&alt, dot_option)?);
                }
                out.push(')');
                i = j + 1;
                at_segment_start = false;
            }
            '/' => {
                out.push('/');
                i += 1;
                at_segment_start = true;
            }
            c => {
                if "\\.+^$()|".contains(c) {
                    out.push('\\');
                }
                out.push(c);
                i += 1;
                at_segment_start = false;
            }
        }
    }

    Ok(out)
}
