pub mod context_bundle;
pub mod file_record;
pub mod identifiers;

pub use context_bundle::{
    BundleStats, ContextBudget, ContextBundle, MatchReason, ScoredFile, SelectedFile,
};
pub use file_record::{FileRecord, Language};
pub use identifiers::{PromptHash, RepoId, TreeVersion};
