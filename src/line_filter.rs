//! MODULE: LINE FILTER (spec.md §4.5 "Post-pass line filter", §8 invariant 9)
//!
//! Runs immediately after the Redactor and drops lines that carry no
//! information once their secret has been replaced by a sentinel — both
//! a pure sentinel-only line, and a declaration/assignment skeleton whose
//! only remaining payload is a sentinel (the `const k = "[REDACTED]";`
//! case called out by spec.md §4.5).

use std::sync::LazyLock;

use regex::Regex;

/// A line consisting of nothing but sentinel tokens and whitespace.
static SENTINEL_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:\[REDACTED(?:_[A-Z]+)?\][ \t]*)+$").expect("sentinel-only pattern is valid")
});

/// A declaration/assignment whose value is nothing but a sentinel:
/// optional `export`/visibility/binding keywords, an identifier, `:` or
/// `=`, an optionally-quoted sentinel, and optional trailing punctuation.
static SENTINEL_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^[ \t]*(?:export[ \t]+)?(?:const|let|var|public|private|protected|static|readonly|final)?[ \t]*[A-Za-z_$][\w$]*[ \t]*[:=][ \t]*(?:"\[REDACTED(?:_[A-Z]+)?\]"|'\[REDACTED(?:_[A-Z]+)?\]'|\[REDACTED(?:_[A-Z]+)?\])[ \t]*[;,]?[ \t]*$"#,
    )
    .expect("sentinel-assignment pattern is valid")
});

/// Drop every line that matches either shape, preserving the order and
/// the original line terminators of the lines that survive.
#[must_use]
pub fn filter(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let trimmed = line.strip_suffix('\n').unwrap_or(line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        if SENTINEL_ONLY.is_match(trimmed) || SENTINEL_ASSIGNMENT.is_match(trimmed) {
            continue;
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_pure_sentinel_line() {
        assert_eq!(filter("before\n[REDACTED]\nafter\n"), "before\nafter\n");
    }

    #[test]
    fn drops_multiple_sentinels_on_one_line() {
        assert_eq!(filter("[REDACTED] [REDACTED_HASH]\nkeep\n"), "keep\n");
    }

    #[test]
    fn drops_secret_only_assignment_s4() {
        let input = "fn main() {}\nconst password=\"[REDACTED]\";\nok\n";
        assert_eq!(filter(input), "fn main() {}\nok\n");
    }

    #[test]
    fn drops_shell_style_assignment() {
        assert_eq!(filter("API_KEY=[REDACTED]\nkeep\n"), "keep\n");
    }

    #[test]
    fn keeps_lines_with_real_content_alongside_a_sentinel() {
        let input = "log(\"using key\", \"[REDACTED]\", extra)\n";
        assert_eq!(filter(input), input);
    }

    #[test]
    fn keeps_unrelated_lines_untouched() {
        let input = "fn add(a: i32, b: i32) -> i32 { a + b }\n";
        assert_eq!(filter(input), input);
    }

    #[test]
    fn filter_is_idempotent() {
        let input = "const password=\"[REDACTED]\";\nkeep\n[REDACTED]\n";
        let once = filter(input);
        let twice = filter(&once);
        assert_eq!(once, twice);
    }
}
