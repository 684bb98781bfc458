//! Error taxonomy for the content pipeline.
//!
//! Most stage-internal plumbing uses `anyhow::Result` with `.context(...)`,
//! matching the teacher CLI's style. `PipelineError` exists so the boundary
//! the core exposes to callers (`{success, tokenCount, error}`, spec.md §7)
//! carries a typed taxonomy instead of an opaque string.

use std::path::PathBuf;

use thiserror::Error;

/// The error taxonomy from spec.md §7.
///
/// Only `CustomPatternCompile` is ever returned as a hard failure from
/// [`crate::pipeline::run_pipeline`] — `Environment` and `Io` are recorded as
/// soft failures (logged, then skipped) and never propagate; `Config` is
/// likewise a warning. The variants still exist so call sites that want to
/// match on "what kind of problem was this" have something to match on.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The version-control collaborator is missing or the directory is not
    /// a repository. Soft: the Enumerator yields an empty sequence.
    #[error("version-control collaborator unavailable for {root}: {reason}")]
    Environment { root: PathBuf, reason: String },

    /// A tracked file could not be read. Soft: the path is skipped.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An unrecognized configuration option name. Soft: the option is
    /// ignored.
    #[error("unknown configuration option `{name}` ignored")]
    Config { name: String },

    /// A caller-supplied custom Cleaner or Redactor pattern failed to
    /// compile. Fatal: the only error variant that aborts the run.
    #[error("custom pattern `{pattern}` failed to compile: {source}")]
    CustomPatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
