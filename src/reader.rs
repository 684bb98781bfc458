//! MODULE: READER (spec.md §4.3)
//!
//! Loads a file's bytes, decodes as UTF-8 with replacement of invalid
//! sequences, and short-circuits empty or whitespace-only files. Read
//! failures are soft: the caller logs and drops the path.

use std::io;
use std::path::Path;

/// A file's content once decoded, immediately before the Cleaner stage.
/// Raw bytes are not retained past decoding — spec.md §3 marks `FileRecord`
/// as owned exclusively by whichever stage is processing it and released
/// once that stage emits its derived value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub path: String,
    pub text: String,
}

/// Read `root.join(rel_path)`. Returns `Ok(None)` for an empty or
/// whitespace-only file (the Assembler never emits a Section for one
/// anyway, so the Cleaner/Redactor stages are skipped entirely). Returns
/// `Err` only for a genuine I/O failure; callers treat that as a soft,
/// per-file error (spec.md §7) and continue with the next path.
pub fn read(root: &Path, rel_path: &str) -> io::Result<Option<RawFile>> {
    let bytes = std::fs::read(root.join(rel_path))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    if text.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(RawFile {
        path: rel_path.to_string(),
        text,
    }))
}
