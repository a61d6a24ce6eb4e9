use serde::{Deserialize, Serialize};

use crate::types::file_record::FileRecord;

/// Hard ceilings for one context request. Immutable once supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBudget {
    pub max_tokens: usize,
    pub max_files: usize,
    pub max_chars_per_file: usize,
    pub max_depth: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            max_tokens: 15_000,
            max_files: 20,
            max_chars_per_file: 10_000,
            max_depth: 3,
        }
    }
}

/// Which signals contributed to a file's score, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    PathKeyword,
    ContentKeyword,
    LanguagePrior,
    DepthPrior,
    ConfigFile,
    EntryPoint,
    GraphNeighbor,
}

/// Internal: a file that has been scored and tokenized but not yet selected.
/// Borrows the record to avoid cloning content before selection decides.
#[derive(Debug, Clone)]
pub struct ScoredFile<'a> {
    pub record: &'a FileRecord,
    pub score: f32,
    pub reasons: Vec<MatchReason>,
    pub token_estimate: usize,
}

/// A selected file in the output bundle. Fully self-contained and
/// serializable; content may be truncated at a line boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub path: String,
    /// Owned here because it is part of the final output payload.
    pub content: String,
    pub score: f32,
    pub tokens: usize,
    pub truncated: bool,
    pub reasons: Vec<MatchReason>,
}

/// Aggregate outcome of scanning and selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleStats {
    pub files_considered: usize,
    pub files_selected: usize,
    pub files_excluded_by_budget: usize,
    pub tokens_used: usize,
    /// Set when a scan deadline or read failure degraded the result.
    pub partial: bool,
}

/// The engine's sole output artifact. Immutable once produced; files appear
/// in selection (score) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub files: Vec<SelectedFile>,
    pub stats: BundleStats,
}

impl ContextBundle {
    pub fn total_tokens_estimated(&self) -> usize {
        self.stats.tokens_used
    }

    pub fn files_considered_count(&self) -> usize {
        self.stats.files_considered
    }
}
