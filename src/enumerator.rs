//! MODULE: ENUMERATOR (spec.md §4.1)
//!
//! `enumerate(root) -> Vec<Path>` — the set of paths the version-control
//! collaborator reports as tracked, relative to `root`, sorted
//! lexicographically. Tracked-only semantics are load-bearing: untracked,
//! ignored, and deleted paths are excluded by virtue of never appearing in
//! `git ls-files`'s output.
//!
//! Grounded in the way `aungsiminhtet-layer`'s `git.rs` shells out to `git`
//! and parses its stdout rather than reimplementing the index format.

use std::path::Path;
use std::process::Command;

use log::warn;

/// List the paths `git` considers tracked under `root`, forward-slash
/// separated and relative to `root`, sorted for determinism.
///
/// Never raises: a missing `git` binary, a non-zero exit (not a
/// repository), or non-UTF-8 output are all soft failures that yield an
/// empty sequence, matching spec.md §4.1 and the `Environment` branch of
/// the error taxonomy in spec.md §7.
#[must_use]
pub fn enumerate(root: &Path) -> Vec<String> {
    let output = match Command::new("git").arg("ls-files").arg("-z").current_dir(root).output() {
        Ok(output) => output,
        Err(err) => {
            warn!("git collaborator unavailable for {}: {err}", root.display());
            return Vec::new();
        }
    };

    if !output.status.success() {
        warn!(
            "git ls-files exited with {} for {}; treating as no files",
            output.status,
            root.display()
        );
        return Vec::new();
    }

    let Ok(stdout) = String::from_utf8(output.stdout) else {
        warn!("git ls-files output for {} was not UTF-8", root.display());
        return Vec::new();
    };

    let mut paths: Vec<String> = stdout
        .split('\0')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.replace('\\', "/"))
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command as StdCommand;
    use tempfile::tempdir;

    fn git(root: &Path, args: &[&str]) {
        let status = StdCommand::new("git")
            .args(args)
            .current_dir(root)
            .status()
            .expect("git must be on PATH for this test");
        assert!(status.success(), "git {args:?} failed");
    }

    #[test]
    fn enumerate_returns_sorted_tracked_paths() {
        let dir = tempdir().expect("tempdir");
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["config", "user.name", "test"]);

        fs::create_dir(dir.path().join("src")).expect("mkdir");
        fs::write(dir.path().join("src").join("b.rs"), "fn b() {}").expect("write");
        fs::write(dir.path().join("a.rs"), "fn a() {}").expect("write");
        fs::write(dir.path().join("untracked.rs"), "fn u() {}").expect("write");

        git(dir.path(), &["add", "a.rs", "src/b.rs"]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);

        let files = enumerate(dir.path());
        assert_eq!(files, vec!["a.rs".to_string(), "src/b.rs".to_string()]);
    }

    #[test]
    fn enumerate_returns_empty_outside_a_repository() {
        let dir = tempdir().expect("tempdir");
        assert!(enumerate(dir.path()).is_empty());
    }
}
