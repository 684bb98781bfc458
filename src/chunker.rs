//! MODULE: CHUNKER (spec.md §4.7)
//!
//! Splits one file's already-cleaned-and-redacted text into ordered
//! pieces, each a complete, self-contained Markdown section fragment —
//! heading, opening fence, buffered body, closing fence — that fits a
//! caller-supplied token budget (spec.md §3: `FileChunk.content` is "the
//! full Markdown section fragment"). Greedy line accumulation; a single
//! line that alone exceeds the budget is hard-split at the character
//! level rather than dropped, so coverage (spec.md §8 invariant 6) holds
//! for the body text even when a line can't fit on its own.

use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMeta {
    pub tokens: usize,
    pub chunk_index: usize,
    pub chunk_count: usize,
    /// Set when this chunk could not honor `maxTokens` — either a single
    /// line exceeded the content budget and had to be hard-split, or the
    /// file's own framing overhead left no room for content at all
    /// (spec.md §4.7 steps 2 and 4).
    pub overflow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChunk {
    pub file_name: String,
    pub content: String,
    pub meta: ChunkMeta,
}

/// The heading + opening fence / closing fence framing wrapped around a
/// chunk's buffered body. `chunk_count > 1` adds the `(chunk i/n)`
/// qualifier to the heading so sibling chunks of the same file are
/// distinguishable; a lone chunk gets a plain heading.
fn frame_strings(file_name: &str, chunk_number: usize, chunk_count: usize) -> (String, String) {
    let header = if chunk_count > 1 {
        format!("\n## {file_name} (chunk {chunk_number}/{chunk_count})\n~~~\n")
    } else {
        format!("\n## {file_name}\n~~~\n")
    };
    (header, "\n~~~\n".to_string())
}

/// A conservative estimate of the framing overhead for budgeting: the
/// widest heading form (`(chunk 99/99)`), so the real framing — whatever
/// the eventual chunk index/count turn out to be, up to two digits each —
/// never costs more tokens than this estimate already reserved.
fn frame_overhead(file_name: &str, tokenizer: &dyn Tokenizer) -> (usize, usize) {
    let (header, footer) = frame_strings(file_name, 99, 99);
    (tokenizer.count(&header), tokenizer.count(&footer))
}

/// Split `content` into token-budgeted chunks for `file_name`. Each
/// emitted [`FileChunk::content`] is a complete, independently renderable
/// Markdown section fragment — not just the buffered body.
///
/// `max_tokens` bounds the whole rendered chunk including frame overhead.
/// If the frame alone would consume the entire budget (`header + footer
/// >= max_tokens`), the file cannot be chunked at all (spec.md §4.7 step
/// 2): a single chunk carrying only the framing is emitted, with no body,
/// and `overflow` is set.
#[must_use]
pub fn split_by_tokens(file_name: &str, content: &str, max_tokens: usize, tokenizer: &dyn Tokenizer) -> Vec<FileChunk> {
    let (header_tokens, footer_tokens) = frame_overhead(file_name, tokenizer);

    if header_tokens + footer_tokens >= max_tokens {
        let (header, footer) = frame_strings(file_name, 1, 1);
        let rendered = format!("{header}{footer}");
        let tokens = tokenizer.count(&rendered);
        return vec![FileChunk {
            file_name: file_name.to_string(),
            content: rendered,
            meta: ChunkMeta { tokens, chunk_index: 0, chunk_count: 1, overflow: true },
        }];
    }

    let content_budget = max_tokens - header_tokens - footer_tokens;

    let mut raw_chunks: Vec<(String, bool)> = Vec::new();
    let mut current = String::new();
    let mut current_tokens = 0usize;

    for line in content.split_inclusive('\n') {
        let line_tokens = tokenizer.count(line);

        if line_tokens > content_budget {
            if !current.is_empty() {
                raw_chunks.push((std::mem::take(&mut current), false));
                current_tokens = 0;
            }
            for piece in hard_split_line(line, content_budget, tokenizer) {
                raw_chunks.push((piece, true));
            }
            continue;
        }

        if current_tokens + line_tokens > content_budget && !current.is_empty() {
            raw_chunks.push((std::mem::take(&mut current), false));
            current_tokens = 0;
        }

        current.push_str(line);
        current_tokens += line_tokens;
    }

    if !current.is_empty() || raw_chunks.is_empty() {
        raw_chunks.push((current, false));
    }

    let chunk_count = raw_chunks.len();
    raw_chunks
        .into_iter()
        .enumerate()
        .map(|(i, (body, line_overflow))| {
            let (header, footer) = frame_strings(file_name, i + 1, chunk_count);
            let rendered = format!("{header}{body}{footer}");
            let tokens = tokenizer.count(&rendered);
            FileChunk {
                file_name: file_name.to_string(),
                content: rendered,
                meta: ChunkMeta { tokens, chunk_index: i, chunk_count, overflow: line_overflow },
            }
        })
        .collect()
}

/// Hard-split a single line too large to fit any chunk on its own,
/// character by character, each piece staying within `budget` tokens.
fn hard_split_line(line: &str, budget: usize, tokenizer: &dyn Tokenizer) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if tokenizer.count(&candidate) > budget && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WhitespaceTokenizer;

    fn body_of(chunk: &FileChunk, chunk_number: usize) -> String {
        let (header, footer) = frame_strings(&chunk.file_name, chunk_number, chunk.meta.chunk_count);
        chunk
            .content
            .strip_prefix(&header)
            .and_then(|rest| rest.strip_suffix(&footer))
            .expect("chunk content wraps body in the expected framing")
            .to_string()
    }

    #[test]
    fn small_content_fits_in_a_single_chunk() {
        let chunks = split_by_tokens("a.rs", "fn a() {}\n", 1000, &WhitespaceTokenizer);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].meta.chunk_index, 0);
        assert_eq!(chunks[0].meta.chunk_count, 1);
        assert!(chunks[0].content.contains("## a.rs\n"));
        assert!(chunks[0].content.contains("~~~\nfn a() {}\n~~~"));
        assert_eq!(body_of(&chunks[0], 1), "fn a() {}\n");
    }

    #[test]
    fn splits_across_chunks_when_budget_exceeded() {
        let content = "one two\nthree four\nfive six\nseven eight\n";
        let chunks = split_by_tokens("a.rs", content, 8, &WhitespaceTokenizer);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.meta.tokens <= 8);
        }
    }

    #[test]
    fn chunk_count_metadata_matches_across_all_chunks() {
        let content = "one two\nthree four\nfive six\n";
        let chunks = split_by_tokens("a.rs", content, 8, &WhitespaceTokenizer);
        let count = chunks.len();
        for chunk in &chunks {
            assert_eq!(chunk.meta.chunk_count, count);
        }
    }

    #[test]
    fn chunk_indices_are_contiguous_and_zero_based() {
        let content = "one two\nthree four\nfive six\n";
        let chunks = split_by_tokens("a.rs", content, 8, &WhitespaceTokenizer);
        let indices: Vec<usize> = chunks.iter().map(|c| c.meta.chunk_index).collect();
        assert_eq!(indices, (0..chunks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn concatenation_of_chunk_bodies_reconstructs_original_content() {
        let content = "line one\nline two\nline three\n";
        let chunks = split_by_tokens("a.rs", content, 8, &WhitespaceTokenizer);
        let joined: String = chunks.iter().enumerate().map(|(i, c)| body_of(c, i + 1)).collect();
        assert_eq!(joined, content);
    }

    #[test]
    fn every_chunk_is_a_complete_markdown_fragment() {
        let content = "one two\nthree four\nfive six\n";
        let chunks = split_by_tokens("src/a.rs", content, 8, &WhitespaceTokenizer);
        for chunk in &chunks {
            assert!(chunk.content.contains("## src/a.rs"));
            assert!(chunk.content.contains("~~~"));
        }
    }

    struct CharTokenizer;
    impl Tokenizer for CharTokenizer {
        fn count(&self, text: &str) -> usize {
            text.chars().count()
        }
    }

    #[test]
    fn oversized_single_line_is_hard_split_without_losing_characters() {
        let content = format!("{}\n", "x".repeat(50));
        let chunks = split_by_tokens("a.rs", &content, 40, &CharTokenizer);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().any(|c| c.meta.overflow));
        for chunk in &chunks {
            assert!(chunk.meta.tokens <= 40);
        }
        let joined: String = chunks.iter().enumerate().map(|(i, c)| body_of(c, i + 1)).collect();
        assert_eq!(joined, content);
    }

    #[test]
    fn frame_too_large_for_budget_yields_framing_only_overflow_chunk() {
        let chunks = split_by_tokens("a.rs", "fn a() {}\n", 2, &CharTokenizer);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].meta.overflow);
        assert!(!chunks[0].content.contains("fn a()"));
        assert!(chunks[0].content.contains("## a.rs"));
    }

    #[test]
    fn empty_content_still_yields_one_chunk() {
        let chunks = split_by_tokens("a.rs", "", 1000, &WhitespaceTokenizer);
        assert_eq!(chunks.len(), 1);
        assert_eq!(body_of(&chunks[0], 1), "");
    }
}
