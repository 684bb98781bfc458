//! MODULE: CLI DEFINITIONS & CONFIGURATION
//!
//! Mirrors the teacher's `Cli` / `AppConfig` split: `clap` owns the process
//! argument surface, a plain-data `PipelineOptions` is what the core crate
//! actually consumes. `PipelineOptions` derives `Serialize`/`Deserialize` so
//! it can be built from a config file or a test fixture without going
//! through `clap` at all.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// `ctxpack` — turn a tracked source tree into a redacted, token-budgeted
/// Markdown prompt.
#[derive(Parser, Debug)]
#[command(
    name = "ctxpack",
    author,
    version,
    about = "Turns a tracked source tree into a single redacted, token-budgeted Markdown prompt.",
    long_about = "Enumerates git-tracked files, applies a layered exclusion model, cleans and redacts \
                  their contents, assembles a Markdown document, and splits it into token-bounded chunks."
)]
pub struct Cli {
    /// Repository root to start from.
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Where the caller will persist the assembled document.
    #[arg(long, default_value = "prompt.md")]
    pub output_file_path: PathBuf,

    /// Additional file extensions to reject (comma separated, no leading dot).
    #[arg(long, value_delimiter = ',')]
    pub file_type_exclusions: Vec<String>,

    /// Additional glob rules appended to the default pattern exclusion layer.
    #[arg(long, value_delimiter = ',')]
    pub file_exclusions: Vec<String>,

    /// Maximum tokens per emitted chunk.
    #[arg(long, default_value_t = 8000)]
    pub max_tokens: usize,

    /// Bounded worker count for parallel file processing (1 = sequential).
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,

    /// Reduce progress output to errors only.
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Free-form text appended to the document after a horizontal rule.
    #[arg(long)]
    pub prompt: Option<String>,
}

/// Runtime configuration the pipeline actually consumes.
///
/// Distinct from [`Cli`] so the core never depends on `clap`: a test, a
/// library caller, or a future config-file loader can build one of these
/// directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Repository root; must contain a `.git` directory.
    pub dir: PathBuf,

    /// Where the caller intends to persist the resulting document. The core
    /// never writes here itself (spec.md §6 — persistence is out of scope).
    pub output_file_path: PathBuf,

    /// Additional file extensions (lowercase, no leading dot) to reject.
    #[serde(default)]
    pub file_type_exclusions: Vec<String>,

    /// Additional glob rules appended to the default pattern exclusion set.
    #[serde(default)]
    pub file_exclusions: Vec<String>,

    /// Additional Cleaner rules, appended after the built-ins, applied in order.
    #[serde(default)]
    pub custom_patterns: Vec<CustomPattern>,

    /// Additional Redactor rules, appended after the built-ins, applied in order.
    #[serde(default)]
    pub custom_secret_patterns: Vec<CustomPattern>,

    /// Maximum tokens per emitted [`crate::chunker::FileChunk`].
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Worker count for the bounded-parallelism mode of spec.md §5. `1`
    /// forces the sequential, enumeration-ordered path.
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Toggle progress emission.
    #[serde(default = "default_true")]
    pub verbose: bool,

    /// Free-form appendix text, separated from the Sections by a horizontal rule.
    #[serde(default)]
    pub todo_prompt: Option<String>,
}

/// A single caller-supplied regex rule with its replacement template.
///
/// Used for both `customPatterns` (Cleaner) and `customSecretPatterns`
/// (Redactor) — the two lists share this shape in spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPattern {
    pub pattern: String,
    pub replacement: String,
}

fn default_max_tokens() -> usize {
    8000
}

fn default_jobs() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            output_file_path: PathBuf::from("prompt.md"),
            file_type_exclusions: Vec::new(),
            file_exclusions: Vec::new(),
            custom_patterns: Vec::new(),
            custom_secret_patterns: Vec::new(),
            max_tokens: default_max_tokens(),
            jobs: default_jobs(),
            verbose: true,
            todo_prompt: None,
        }
    }
}

impl PipelineOptions {
    /// Translate the parsed CLI surface into the plain-data options the
    /// pipeline consumes. Infallible: there's nothing here that can fail to
    /// compile the way a custom regex pattern can.
    #[must_use]
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            dir: cli.dir,
            output_file_path: cli.output_file_path,
            file_type_exclusions: normalize_extensions(cli.file_type_exclusions),
            file_exclusions: cli.file_exclusions,
            custom_patterns: Vec::new(),
            custom_secret_patterns: Vec::new(),
            max_tokens: cli.max_tokens,
            jobs: cli.jobs.max(1),
            verbose: !cli.quiet,
            todo_prompt: cli.prompt,
        }
    }
}

fn normalize_extensions(exts: Vec<String>) -> Vec<String> {
    exts.into_iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cli_normalizes_extensions() {
        let cli = Cli {
            dir: PathBuf::from("."),
            output_file_path: PathBuf::from("prompt.md"),
            file_type_exclusions: vec![".PNG".into(), "Jpg".into(), "".into()],
            file_exclusions: vec![],
            max_tokens: 8000,
            jobs: 1,
            quiet: false,
            prompt: None,
        };
        let opts = PipelineOptions::from_cli(cli);
        assert_eq!(opts.file_type_exclusions, vec!["png", "jpg"]);
    }

    #[test]
    fn quiet_flips_verbose() {
        let cli = Cli {
            dir: PathBuf::from("."),
            output_file_path: PathBuf::from("prompt.md"),
            file_type_exclusions: vec![],
            file_exclusions: vec![],
            max_tokens: 8000,
            jobs: 1,
            quiet: true,
            prompt: None,
        };
        let opts = PipelineOptions::from_cli(cli);
        assert!(!opts.verbose);
    }

    #[test]
    fn default_jobs_is_sequential() {
        assert_eq!(PipelineOptions::default().jobs, 1);
    }
}
