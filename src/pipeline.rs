//! Orchestration: wires the Enumerator, Exclusion Resolver, Reader,
//! Cleaner, Redactor, Line Filter, Chunker, and Assembler into the single
//! entry point the CLI (and any other caller) uses.
//!
//! Sequential processing (`options.jobs == 1`) is the default and the
//! path every other module's tests exercise indirectly. `options.jobs >
//! 1` switches the per-file stage to `rayon`'s bounded thread pool;
//! collecting a `rayon` `IndexedParallelIterator` over a `Vec` already
//! preserves source order (`rayon`'s docs guarantee this for
//! `ParallelIterator::collect` on indexed sources), so no separate
//! reorder buffer is needed beyond that guarantee — the same pattern
//! `junovhs-warden` and `JsonKnight-Xcontext` rely on for their own
//! bounded-parallelism fan-out.

use rayon::prelude::*;

use crate::assembler::{Document, Section};
use crate::chunker::{self, FileChunk};
use crate::cleaner::Cleaner;
use crate::config::PipelineOptions;
use crate::enumerator;
use crate::error::PipelineError;
use crate::exclusion::{self, ExclusionResolver};
use crate::line_filter;
use crate::reader;
use crate::redactor::Redactor;
use crate::tokenizer::{Cl100kTokenizer, Tokenizer};

/// The result the CLI (or any other caller) observes for a run, matching
/// spec.md §7's `{success, tokenCount, error}` shape plus the rendered
/// document and its chunk metadata, which the boundary sketch leaves
/// implicit but a real caller needs to do anything useful with the run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub success: bool,
    pub token_count: usize,
    pub error: Option<String>,
    pub rendered: String,
    pub chunks: Vec<FileChunk>,
}

impl PipelineReport {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            token_count: 0,
            error: Some(message.into()),
            rendered: String::new(),
            chunks: Vec::new(),
        }
    }
}

/// Run the full pipeline for `options`. Never panics: a fatal condition
/// (a custom pattern that fails to compile, a resolver that can't be
/// built, a tokenizer backend that fails to load) is reported through
/// `PipelineReport::error` rather than propagated, matching the
/// `{success, tokenCount, error}` boundary of spec.md §7. Per-file
/// problems (an unreadable path, an empty file) are soft failures:
/// logged and skipped, never surfaced here.
#[must_use]
pub fn run_pipeline(options: &PipelineOptions) -> PipelineReport {
    let resolver = match ExclusionResolver::build(&options.dir, &options.file_type_exclusions, &options.file_exclusions) {
        Ok(resolver) => resolver,
        Err(err) => return PipelineReport::failed(format!("{err:#}")),
    };

    if let Some(output_name) = options.output_file_path.file_name().and_then(|n| n.to_str()) {
        if let Err(err) = exclusion::ensure_vcs_ignore_entry(&options.dir, output_name) {
            log::warn!("failed to update VCS ignore state: {err:#}");
        }
    }

    let cleaner = match Cleaner::new(&options.custom_patterns) {
        Ok(cleaner) => cleaner,
        Err(err) => return PipelineReport::failed(err.to_string()),
    };

    let redactor = match Redactor::new(&options.custom_secret_patterns) {
        Ok(redactor) => redactor,
        Err(err) => return PipelineReport::failed(err.to_string()),
    };

    let tokenizer = match Cl100kTokenizer::new() {
        Ok(tokenizer) => tokenizer,
        Err(err) => return PipelineReport::failed(format!("{err:#}")),
    };

    let admitted: Vec<String> = enumerator::enumerate(&options.dir)
        .into_iter()
        .filter(|path| resolver.admit(path))
        .collect();

    let process_one = |path: &String| -> Option<(String, String)> {
        process_file(&options.dir, path, &cleaner, &redactor)
    };

    let processed: Vec<(String, String)> = if options.jobs > 1 {
        admitted.par_iter().filter_map(process_one).collect()
    } else {
        admitted.iter().filter_map(process_one).collect()
    };

    // The rendered document (one fenced Section per file) and the chunk
    // list (one or more framed FileChunks per file, budgeted to
    // `options.max_tokens`) are two independent views over the same
    // cleaned-and-redacted text — the Assembler doesn't consult the
    // Chunker, and a FileChunk's own framing is self-contained, so
    // neither wraps the other's output.
    let mut sections = Vec::with_capacity(processed.len());
    let mut chunks = Vec::new();
    for (path, text) in processed {
        sections.push(Section::new(path.clone(), text.clone()));
        chunks.extend(chunker::split_by_tokens(&path, &text, options.max_tokens, &tokenizer));
    }

    let document = Document {
        title: Some("Project Context".to_string()),
        sections,
        appendix: options.todo_prompt.clone(),
    };
    let rendered = document.render();
    let token_count = tokenizer.count(&rendered);

    PipelineReport {
        success: true,
        token_count,
        error: None,
        rendered,
        chunks,
    }
}

/// Read → clean → redact → filter one admitted path. `None` means the
/// file contributes nothing to the document: missing/unreadable (soft
/// `PipelineError::Io`, logged), empty/whitespace-only, or reduced to
/// nothing by the Line Filter.
fn process_file(root: &std::path::Path, rel_path: &str, cleaner: &Cleaner, redactor: &Redactor) -> Option<(String, String)> {
    let raw = match reader::read(root, rel_path) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(source) => {
            let err = PipelineError::Io { path: root.join(rel_path), source };
            log::warn!("{err}");
            return None;
        }
    };

    let cleaned = cleaner.clean(&raw.text);
    let redacted = redactor.redact(&cleaned);
    let filtered = line_filter::filter(&redacted);

    if filtered.trim().is_empty() {
        return None;
    }

    Some((raw.path, filtered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command;
    use tempfile::tempdir;

    fn git(root: &std::path::Path, args: &[&str]) {
        let status = Command::new("git").args(args).current_dir(root).status().expect("git on PATH");
        assert!(status.success());
    }

    fn init_repo() -> tempfile::TempDir {
        let dir = tempdir().expect("tempdir");
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["config", "user.name", "test"]);
        dir
    }

    #[test]
    fn run_appends_output_file_to_existing_gitignore() {
        let dir = init_repo();
        fs::write(dir.path().join(".gitignore"), "target/\n").expect("write gitignore");
        let options = PipelineOptions {
            dir: dir.path().to_path_buf(),
            output_file_path: dir.path().join("prompt.md"),
            ..PipelineOptions::default()
        };
        let report = run_pipeline(&options);
        assert!(report.success);
        let gitignore = fs::read_to_string(dir.path().join(".gitignore")).expect("read gitignore");
        assert!(gitignore.contains("prompt.md"));
    }

    #[test]
    fn empty_repository_yields_empty_document() {
        let dir = init_repo();
        let options = PipelineOptions { dir: dir.path().to_path_buf(), ..PipelineOptions::default() };
        let report = run_pipeline(&options);
        assert!(report.success);
        assert!(report.rendered.trim().is_empty() || report.rendered.starts_with("# Project Context"));
        assert!(report.chunks.is_empty());
    }

    #[test]
    fn tracked_file_is_cleaned_redacted_and_assembled() {
        let dir = init_repo();
        fs::write(
            dir.path().join("main.rs"),
            "// a comment\nconst password = \"SuperSecret123!\";\nfn main() {}\n",
        )
        .expect("write");
        git(dir.path(), &["add", "main.rs"]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);

        let options = PipelineOptions { dir: dir.path().to_path_buf(), ..PipelineOptions::default() };
        let report = run_pipeline(&options);

        assert!(report.success);
        assert!(report.rendered.contains("main.rs"));
        assert!(report.rendered.contains("fn main() {}"));
        assert!(!report.rendered.contains("SuperSecret123!"));
        assert!(!report.rendered.contains("a comment"));
    }

    #[test]
    fn excluded_file_never_reaches_the_document() {
        let dir = init_repo();
        fs::write(dir.path().join("logo.png"), "not really a png").expect("write");
        fs::write(dir.path().join("keep.rs"), "fn keep() {}\n").expect("write");
        git(dir.path(), &["add", "logo.png", "keep.rs"]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);

        let options = PipelineOptions { dir: dir.path().to_path_buf(), ..PipelineOptions::default() };
        let report = run_pipeline(&options);

        assert!(report.success);
        assert!(!report.rendered.contains("logo.png"));
        assert!(report.rendered.contains("keep.rs"));
    }

    #[test]
    fn invalid_custom_pattern_is_a_fatal_soft_failure() {
        let dir = init_repo();
        let options = PipelineOptions {
            dir: dir.path().to_path_buf(),
            custom_patterns: vec![crate::config::CustomPattern {
                pattern: "(unclosed".to_string(),
                replacement: String::new(),
            }],
            ..PipelineOptions::default()
        };
        let report = run_pipeline(&options);
        assert!(!report.success);
        assert!(report.error.is_some());
    }

    #[test]
    fn sequential_and_parallel_modes_agree() {
        let dir = init_repo();
        for i in 0..5 {
            fs::write(dir.path().join(format!("f{i}.rs")), format!("fn f{i}() {{}}\n")).expect("write");
        }
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);

        let sequential = PipelineOptions { dir: dir.path().to_path_buf(), jobs: 1, ..PipelineOptions::default() };
        let parallel = PipelineOptions { dir: dir.path().to_path_buf(), jobs: 4, ..PipelineOptions::default() };

        let seq_report = run_pipeline(&sequential);
        let par_report = run_pipeline(&parallel);
        assert_eq!(seq_report.rendered, par_report.rendered);
    }
}
