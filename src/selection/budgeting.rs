//! Greedy budget-constrained selection.
//!
//! Files arrive sorted by (score desc, path asc) and are included while the
//! token and file-count ceilings hold. A file that no longer fits is skipped
//! rather than truncated to a useless fragment. The one exception is the
//! single highest-scored file, which is truncated (at a line boundary) when
//! nothing would otherwise fit.

use tracing::debug;

use crate::selection::tokens::{TokenCounter, CODE_CHARS_PER_TOKEN};
use crate::types::{ContextBudget, ScoredFile, SelectedFile};

#[derive(Debug)]
pub struct BudgetResult {
    pub selected: Vec<SelectedFile>,
    pub tokens_used: usize,
    pub files_selected: usize,
    pub files_excluded_by_budget: usize,
}

/// Apply the budget to scored files, preserving their order.
///
/// Guarantees: `tokens_used <= budget.max_tokens`, at most
/// `budget.max_files` files, every output path comes from the input, and no
/// selected content exceeds `budget.max_chars_per_file`.
pub fn apply_budget<T: TokenCounter>(
    scored: Vec<ScoredFile<'_>>,
    budget: &ContextBudget,
    tokenizer: &T,
) -> BudgetResult {
    let mut selected: Vec<SelectedFile> = Vec::new();
    let mut tokens_used = 0usize;
    let mut files_excluded_by_budget = 0usize;

    for (rank, sfile) in scored.into_iter().enumerate() {
        let Some(content) = sfile.record.content.as_deref() else {
            continue;
        };

        if selected.len() >= budget.max_files {
            files_excluded_by_budget += 1;
            continue;
        }

        let (clipped, mut truncated) = clip_to_chars(content, budget.max_chars_per_file);
        if truncated && clipped.is_empty() {
            // First line alone exceeds the per-file cap; an empty entry
            // would waste a file slot.
            files_excluded_by_budget += 1;
            continue;
        }
        let mut tokens = if truncated {
            tokenizer.estimate(clipped, sfile.record.language)
        } else {
            sfile.token_estimate
        };
        let remaining = budget.max_tokens - tokens_used;

        let mut clipped = clipped;
        if tokens > remaining {
            // Only the top-scored file earns a partial inclusion, and only
            // when nothing has been selected yet.
            if rank != 0 || !selected.is_empty() {
                files_excluded_by_budget += 1;
                continue;
            }
            let char_budget = remaining.saturating_mul(CODE_CHARS_PER_TOKEN);
            let (partial, _) = clip_to_chars(clipped, char_budget);
            if partial.is_empty() {
                files_excluded_by_budget += 1;
                continue;
            }
            clipped = partial;
            truncated = true;
            tokens = tokenizer.estimate(clipped, sfile.record.language);
            debug_assert!(tokens <= remaining);
        }

        if truncated {
            debug!(
                "truncating {} to {} chars",
                sfile.record.path,
                clipped.len()
            );
        }

        tokens_used += tokens;
        selected.push(SelectedFile {
            path: sfile.record.path.clone(),
            content: clipped.to_string(),
            score: sfile.score,
            tokens,
            truncated,
            reasons: sfile.reasons,
        });
    }

    BudgetResult {
        files_selected: selected.len(),
        selected,
        tokens_used,
        files_excluded_by_budget,
    }
}

/// Clip `content` to at most `max_chars`, backing off to the previous line
/// boundary so no syntactically broken fragment is emitted. Returns the
/// clipped slice and whether clipping happened. The clipped slice is empty
/// when even the first line does not fit.
fn clip_to_chars(content: &str, max_chars: usize) -> (&str, bool) {
    if content.len() <= max_chars {
        return (content, false);
    }

    let mut end = max_chars;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    match content[..end].rfind('\n') {
        Some(pos) => (&content[..=pos], true),
        None => ("", true),
    }
}
