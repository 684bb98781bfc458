//! MODULE: CLEANER (spec.md §4.4)
//!
//! Ordered, idempotent textual transforms. Purely regex-based — it does
//! not parse, and false positives on these patterns are accepted in
//! exchange for language-agnosticism. Ordering is the contract: later
//! patterns must not re-match the output of earlier ones (spec.md §9,
//! "Pattern-set ordering").

use regex::Regex;

use crate::config::CustomPattern;
use crate::error::PipelineError;

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct CustomRule {
    regex: Regex,
    replacement: String,
}

/// The ordered Cleaner pipeline: built-in rules followed by any
/// caller-supplied custom patterns, compiled once and reused across files.
pub struct Cleaner {
    builtins: Vec<Rule>,
    custom: Vec<CustomRule>,
}

impl Cleaner {
    /// Compile the built-in rules and `custom_patterns`, in the order
    /// given. The only failure mode is a caller-supplied pattern that
    /// doesn't compile as a regex — spec.md §7's sole Fatal case.
    pub fn new(custom_patterns: &[CustomPattern]) -> Result<Self, PipelineError> {
        let builtins = vec![
            Rule {
                regex: Regex::new(r"//[^\n]*").expect("built-in cleaner pattern is valid"),
                replacement: "",
            },
            Rule {
                regex: Regex::new(r"(?s)/\*.*?\*/").expect("built-in cleaner pattern is valid"),
                replacement: "",
            },
            Rule {
                regex: Regex::new(r"console\.(?:log|error|warn|info)\([^)]*\)\s*;?")
                    .expect("built-in cleaner pattern is valid"),
                replacement: "",
            },
            Rule {
                regex: Regex::new(r"(?m)^[ \t]*import\s+.*$\r?\n?")
                    .expect("built-in cleaner pattern is valid"),
                replacement: "",
            },
            Rule {
                regex: Regex::new(r"(?m)[ \t]+$").expect("built-in cleaner pattern is valid"),
                replacement: "",
            },
            Rule {
                regex: Regex::new(r"\n{3,}").expect("built-in cleaner pattern is valid"),
                replacement: "\n\n",
            },
        ];

        let mut custom = Vec::with_capacity(custom_patterns.len());
        for p in custom_patterns {
            let regex = Regex::new(&p.pattern).map_err(|source| PipelineError::CustomPatternCompile {
                pattern: p.pattern.clone(),
                source,
            })?;
            custom.push(CustomRule {
                regex,
                replacement: p.replacement.clone(),
            });
        }

        Ok(Self { builtins, custom })
    }

    /// Apply every rule in order. Idempotent: `clean(clean(x)) == clean(x)`
    /// (spec.md §8 invariant 4) because each rule's output contains no
    /// further matches for that same rule or any rule after it.
    #[must_use]
    pub fn clean(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.builtins {
            out = rule.regex.replace_all(&out, rule.replacement).into_owned();
        }
        for rule in &self.custom {
            out = rule.regex.replace_all(&out, rule.replacement.as_str()).into_owned();
        }
        out
    }
}
