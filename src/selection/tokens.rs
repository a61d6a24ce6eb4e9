use crate::types::Language;

/// Deterministic token-count approximation.
///
/// Not an exact tokenizer for any model; callers must treat estimates as
/// upper-bound-oriented, and the selector biases toward under-inclusion.
pub trait TokenCounter {
    fn estimate(&self, content: &str, language: Language) -> usize;
}

/// Character-count heuristic: prose averages ~4 chars per token, dense
/// symbolic code closer to 3.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproxTokenCounter;

pub(crate) const CODE_CHARS_PER_TOKEN: usize = 3;
pub(crate) const PROSE_CHARS_PER_TOKEN: usize = 4;

impl TokenCounter for ApproxTokenCounter {
    fn estimate(&self, content: &str, language: Language) -> usize {
        if content.is_empty() {
            return 0;
        }
        let divisor = if language.is_code() {
            CODE_CHARS_PER_TOKEN
        } else {
            PROSE_CHARS_PER_TOKEN
        };
        content.len().div_ceil(divisor)
    }
}
