//! MODULE: TOKENIZER (spec.md §4.8)
//!
//! The Chunker depends on token counting only through the sub-additive
//! property `tokens(a + b) <= tokens(a) + tokens(b) + c` for some small
//! constant `c` — it never depends on a specific vocabulary. Nothing in
//! this pack loads a real LLaMA-3 BPE vocabulary, so the counting
//! backend here is `tiktoken-rs`'s `cl100k_base` encoder, documented as
//! an approximation (see DESIGN.md). Swapping in an exact LLaMA-3
//! tokenizer later only touches this module.

use std::sync::Arc;

use tiktoken_rs::CoreBPE;

/// Anything that can estimate how many tokens a string costs.
pub trait Tokenizer: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// `cl100k_base`-backed tokenizer, the production default.
pub struct Cl100kTokenizer {
    bpe: Arc<CoreBPE>,
}

impl Cl100kTokenizer {
    pub fn new() -> anyhow::Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()?;
        Ok(Self { bpe: Arc::new(bpe) })
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

impl Clone for Cl100kTokenizer {
    fn clone(&self) -> Self {
        Self { bpe: Arc::clone(&self.bpe) }
    }
}

/// Deterministic whitespace-based stand-in used by the Chunker's own
/// tests, so those tests don't pay for loading a real BPE vocabulary and
/// stay pinned to exact, hand-checkable counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}
