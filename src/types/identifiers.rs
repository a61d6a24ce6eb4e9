use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Opaque identity of a repository, as supplied by the caller.
///
/// The engine never interprets this string; it only participates in cache
/// keys. A remote URL, a local path, or a project slug all work equally well
/// as long as the caller is consistent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(String);

impl RepoId {
    pub fn new(id: impl Into<String>) -> Self {
        RepoId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stable identifier for the working tree's content state.
///
/// Typically a commit hash from the component that materialized the tree;
/// used only for cache invalidation. When no version-control identifier is
/// available, [`TreeVersion::from_content`] derives one from arbitrary bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeVersion(String);

impl TreeVersion {
    pub fn new(version: impl Into<String>) -> Self {
        TreeVersion(version.into())
    }

    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);

        let hash = hasher.finalize();
        TreeVersion(format!("sha256:{}", hex::encode(hash)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hash of a task prompt's cache identity, used as the third cache key
/// component.
///
/// The identity covers the normalized prompt text (case-folded, whitespace
/// collapsed) and the weighted keyword set extracted from the raw prompt.
/// Prompts that differ only in spacing or casing share a hash exactly when
/// they also extract the same keywords; identifier casing changes the
/// extraction, so such prompts never share a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptHash(String);

impl PromptHash {
    pub fn from_extraction<'a, I>(prompt: &str, terms: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut hasher = Sha256::new();
        hasher.update(normalize_prompt(prompt).as_bytes());
        for (term, weight) in terms {
            hasher.update([0u8]);
            hasher.update(term.as_bytes());
            hasher.update(weight.to_bits().to_le_bytes());
        }

        let hash = hasher.finalize();
        PromptHash(format!("sha256:{}", hex::encode(hash)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Case-fold and collapse all whitespace runs to single spaces.
pub fn normalize_prompt(prompt: &str) -> String {
    prompt
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
