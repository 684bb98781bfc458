//! MODULE: EXCLUSION RESOLVER (spec.md §4.2)
//!
//! Composes four ordered layers into a single `admit(path) -> bool`
//! predicate: extension exclusion, global pattern exclusion, hierarchical
//! ignore files (last-match-wins per file, deeper overrides shallower), and
//! the root override that seeds `.toak-ignore` with a minimum line set.
//!
//! Represented as a plain tagged record rather than a class hierarchy, per
//! the design note in spec.md §9: a map from directory to compiled rule
//! list, walked root-down.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};

use crate::glob::CompiledGlob;

/// Filename used for the hierarchical ignore file at every directory scope,
/// including the root override.
pub const IGNORE_FILE_NAME: &str = ".toak-ignore";

/// Lines the root `.toak-ignore` must contain at minimum (spec.md §4.2,
/// layer 4 — "Root override").
const ROOT_MINIMUM_LINES: [&str; 2] = ["todo", "prompt.md"];

/// One directory's contribution to the hierarchical ignore tree: an ordered
/// list of rules, each applying only within this directory's subtree.
#[derive(Debug, Clone, Default)]
pub struct IgnoreLayer {
    pub rules: Vec<CompiledGlob>,
}

impl IgnoreLayer {
    /// Load the ignore file at `dir` if present. A missing file yields an
    /// empty (but present) layer — idempotent with repeated loads.
    fn load(dir: &Path) -> Self {
        let path = dir.join(IGNORE_FILE_NAME);
        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };

        let mut rules = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match CompiledGlob::compile(line) {
                Ok(glob) => rules.push(glob),
                Err(err) => warn!("ignoring malformed rule `{line}` in {}: {err}", path.display()),
            }
        }
        debug!("loaded {} rule(s) from {}", rules.len(), path.display());
        Self { rules }
    }

    /// The last matching rule's polarity, or `None` if nothing in this
    /// layer matches `relative_to_scope`.
    fn verdict(&self, relative_to_scope: &str) -> Option<bool> {
        let mut verdict = None;
        for rule in &self.rules {
            if rule.is_match(relative_to_scope) {
                verdict = Some(!rule.negated);
            }
        }
        verdict
    }
}

/// Default file-extension exclusions: binary, media, archive, font, and
/// database artifacts that are never useful in an LLM prompt.
fn default_excluded_extensions() -> &'static [&'static str] {
    &[
        // images
        "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "psd", "ai",
        // audio/video
        "mp3", "mp4", "mov", "avi", "mkv", "wav", "flac", "ogg", "webm",
        // fonts
        "woff", "woff2", "ttf", "otf", "eot",
        // archives
        "zip", "tar", "gz", "bz2", "7z", "rar", "xz", "zst",
        // compiled/binary
        "exe", "dll", "so", "dylib", "bin", "class", "jar", "wasm", "pyc", "o", "obj", "a", "lib",
        // documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
        // databases
        "db", "sqlite", "sqlite3",
    ]
}

/// Default glob pattern exclusions: dependency dirs, build outputs, VCS
/// metadata, lockfiles, env files, IDE dirs, test dirs, docs, and
/// configuration dotfiles (spec.md §4.2, layer 2).
fn default_excluded_patterns() -> &'static [&'static str] {
    &[
        // dependency dirs
        "node_modules/",
        "vendor/",
        "target/",
        ".venv/",
        "venv/",
        "__pycache__/",
        "bower_components/",
        "Pods/",
        // build outputs
        "dist/",
        "build/",
        "out/",
        "bin/",
        "obj/",
        ".next/",
        ".nuxt/",
        // VCS metadata
        ".git/",
        ".hg/",
        ".svn/",
        // lockfiles
        "Cargo.lock",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "poetry.lock",
        "Gemfile.lock",
        "composer.lock",
        // env files
        ".env",
        ".env.*",
        "*.env",
        // IDE dirs
        ".idea/",
        ".vscode/",
        ".vs/",
        // test dirs
        "test/",
        "tests/",
        "__tests__/",
        "spec/",
        // docs
        "docs/",
        "doc/",
        // configuration dotfiles
        ".eslintrc",
        ".eslintrc.*",
        ".prettierrc",
        ".prettierrc.*",
        ".editorconfig",
        ".npmrc",
        ".babelrc",
        ".babelrc.*",
        ".nvmrc",
        ".dockerignore",
        ".gitattributes",
        ".gitmodules",
    ]
}

/// The composed admit predicate plus the shared, lazily-loaded ignore tree
/// it consults. Compiled pattern sets are immutable after construction and
/// shared freely (spec.md §5); the ignore layer cache is the one piece of
/// interior mutability, guarded by a mutex for the bounded-parallelism mode.
#[derive(Debug)]
pub struct ExclusionResolver {
    root: PathBuf,
    excluded_extensions: Vec<String>,
    excluded_patterns: Vec<CompiledGlob>,
    layers: Mutex<HashMap<PathBuf, std::sync::Arc<IgnoreLayer>>>,
}

impl ExclusionResolver {
    /// Build the resolver for `root`, extending the defaults with
    /// `options.fileTypeExclusions` / `options.fileExclusions`, and ensure
    /// the root ignore file exists with its minimum line set.
    pub fn build(
        root: &Path,
        extra_extensions: &[String],
        extra_patterns: &[String],
    ) -> anyhow::Result<Self> {
        ensure_root_ignore_file(root)?;

        let mut excluded_extensions: Vec<String> =
            default_excluded_extensions().iter().map(|s| (*s).to_string()).collect();
        excluded_extensions.extend(extra_extensions.iter().cloned());

        let mut excluded_patterns = Vec::new();
        for pattern in default_excluded_patterns() {
            excluded_patterns.push(CompiledGlob::compile(pattern)?);
        }
        for pattern in extra_patterns {
            excluded_patterns.push(CompiledGlob::compile(pattern)?);
        }

        Ok(Self {
            root: root.to_path_buf(),
            excluded_extensions,
            excluded_patterns,
            layers: Mutex::new(HashMap::new()),
        })
    }

    /// Decide whether `path` (relative to `root`, forward-slash
    /// normalized) survives the full exclusion pipeline.
    #[must_use]
    pub fn admit(&self, path: &str) -> bool {
        if self.rejected_by_extension(path) {
            return false;
        }
        if self.rejected_by_pattern(path) {
            return false;
        }
        !self.rejected_by_hierarchical_ignore(path)
    }

    fn rejected_by_extension(&self, path: &str) -> bool {
        let Some(basename) = path.rsplit('/').next() else {
            return false;
        };
        let Some(ext) = extension_of(basename) else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.excluded_extensions.iter().any(|e| *e == ext)
    }

    fn rejected_by_pattern(&self, path: &str) -> bool {
        self.excluded_patterns.iter().any(|p| p.is_match(path))
    }

    fn rejected_by_hierarchical_ignore(&self, path: &str) -> bool {
        let mut overall: Option<bool> = None;
        for scope in ancestor_scopes(path) {
            let layer = self.layer_for(&scope);
            let relative = path.strip_prefix(&scope).map_or(path, |rest| rest.trim_start_matches('/'));
            if let Some(verdict) = layer.verdict(relative) {
                overall = Some(verdict);
            }
        }
        // Some(false) = last matching rule was a plain (non-negated) pattern: excluded.
        // Some(true) = last matching rule was negated: explicitly re-admitted.
        // None = no opinion: not excluded.
        matches!(overall, Some(false))
    }

    fn layer_for(&self, scope: &str) -> std::sync::Arc<IgnoreLayer> {
        let dir = if scope.is_empty() {
            self.root.clone()
        } else {
            self.root.join(scope)
        };

        let mut layers = self.layers.lock().expect("ignore layer cache poisoned");
        if let Some(existing) = layers.get(&dir) {
            return existing.clone();
        }
        let loaded = std::sync::Arc::new(IgnoreLayer::load(&dir));
        layers.insert(dir, loaded.clone());
        loaded
    }
}

/// Ancestor directory scopes of `path`, root-first, as scope-relative
/// strings (`""` for the root, then each intermediate directory).
fn ancestor_scopes(path: &str) -> Vec<String> {
    let mut scopes = vec![String::new()];
    let mut acc = String::new();
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop(); // drop the file's own basename; it's not a directory scope
    for seg in segments {
        if !acc.is_empty() {
            acc.push('/');
        }
        acc.push_str(seg);
        scopes.push(acc.clone());
    }
    scopes
}

/// Replicates `std::path::Path::extension()`'s semantics for a bare
/// basename string: no extension for a leading-dot name with no other dot
/// (`.gitignore`), otherwise everything after the final dot.
fn extension_of(basename: &str) -> Option<&str> {
    let last_dot = basename.rfind('.')?;
    if last_dot == 0 {
        return None;
    }
    Some(&basename[last_dot + 1..])
}

/// The only mutation the resolver performs: create `.toak-ignore` at
/// `root` with its minimum line set if it doesn't already exist.
fn ensure_root_ignore_file(root: &Path) -> anyhow::Result<()> {
    let path = root.join(IGNORE_FILE_NAME);
    if path.exists() {
        return Ok(());
    }
    let contents = ROOT_MINIMUM_LINES.join("\n") + "\n";
    fs::write(&path, contents)?;
    debug!("created {} with default entries", path.display());
    Ok(())
}

/// Filename of the repository's own VCS-ignore file, appended to (not
/// created) so the rendered output artifact doesn't get committed by
/// accident (spec.md §6, "Persisted state").
const VCS_IGNORE_FILE_NAME: &str = ".gitignore";

/// Ensure `output_file_name` has a line of its own in the root
/// `.gitignore`. A missing `.gitignore` is left alone — this crate only
/// ever appends to VCS ignore state, it never creates the VCS's own
/// configuration from nothing the way it does for `.toak-ignore`.
pub fn ensure_vcs_ignore_entry(root: &Path, output_file_name: &str) -> anyhow::Result<()> {
    let path = root.join(VCS_IGNORE_FILE_NAME);
    let Ok(existing) = fs::read_to_string(&path) else {
        return Ok(());
    };
    if existing.lines().any(|line| line.trim() == output_file_name) {
        return Ok(());
    }

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(output_file_name);
    updated.push('\n');
    fs::write(&path, updated)?;
    debug!("appended `{output_file_name}` to {}", path.display());
    Ok(())
}
