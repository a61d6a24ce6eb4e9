//! Cross-request memoization of context bundles.
//!
//! Entries are keyed by `(repo, tree version, prompt hash)` and never
//! mutated after insertion. Concurrency discipline: one `Mutex` around the
//! whole LRU map, held only for individual get/put calls. Two concurrent
//! misses for the same key compute independently and the later `put`
//! overwrites an identical bundle.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;
use tracing::debug;

use crate::types::{ContextBundle, PromptHash, RepoId, TreeVersion};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub repo: RepoId,
    pub tree_version: TreeVersion,
    pub prompt: PromptHash,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    bundle: ContextBundle,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// LRU eviction kicks in past this entry count.
    pub capacity: NonZeroUsize,
    /// Entries older than this are treated as misses (lazy expiry).
    pub entry_lifetime: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(16).expect("nonzero capacity"),
            entry_lifetime: Duration::from_secs(300),
        }
    }
}

/// LRU cache of completed bundles. Tree-version changes need no proactive
/// invalidation: the version participates in the key, so a changed tree is
/// simply a miss and stale entries age out of the LRU tail.
pub struct ContextCache {
    inner: Mutex<LruCache<CacheKey, CacheEntry>>,
    entry_lifetime: Duration,
}

impl ContextCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(config.capacity)),
            entry_lifetime: config.entry_lifetime,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<ContextBundle> {
        let mut cache = self.inner.lock().expect("context cache lock");

        let expired = match cache.peek(key) {
            None => return None,
            Some(entry) => {
                let age = Utc::now().signed_duration_since(entry.created_at);
                age.to_std().map_or(true, |age| age >= self.entry_lifetime)
            }
        };
        if expired {
            debug!("evicting expired cache entry for {}", key.prompt.as_str());
            cache.pop(key);
            return None;
        }

        // `get_mut` refreshes LRU recency.
        let entry = cache.get_mut(key)?;
        entry.last_accessed_at = Utc::now();
        Some(entry.bundle.clone())
    }

    pub fn put(&self, key: CacheKey, bundle: ContextBundle) {
        let now = Utc::now();
        let entry = CacheEntry {
            bundle,
            created_at: now,
            last_accessed_at: now,
        };
        self.inner
            .lock()
            .expect("context cache lock")
            .put(key, entry);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("context cache lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BundleStats;

    fn key(repo: &str, version: &str, prompt: &str) -> CacheKey {
        let keywords = crate::keywords::extract(prompt);
        CacheKey {
            repo: RepoId::new(repo),
            tree_version: TreeVersion::new(version),
            prompt: PromptHash::from_extraction(prompt, keywords.iter()),
        }
    }

    fn bundle(tokens: usize) -> ContextBundle {
        ContextBundle {
            files: Vec::new(),
            stats: BundleStats {
                files_considered: 1,
                files_selected: 0,
                files_excluded_by_budget: 0,
                tokens_used: tokens,
                partial: false,
            },
        }
    }

    fn cache_with_capacity(n: usize) -> ContextCache {
        ContextCache::new(CacheConfig {
            capacity: NonZeroUsize::new(n).unwrap(),
            ..CacheConfig::default()
        })
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = cache_with_capacity(4);
        let k = key("repo", "v1", "fix login");
        cache.put(k.clone(), bundle(42));
        assert_eq!(cache.get(&k), Some(bundle(42)));
    }

    #[test]
    fn tree_version_change_is_a_miss() {
        let cache = cache_with_capacity(4);
        cache.put(key("repo", "v1", "fix login"), bundle(42));
        assert_eq!(cache.get(&key("repo", "v2", "fix login")), None);
    }

    #[test]
    fn prompt_normalization_shares_entries() {
        let cache = cache_with_capacity(4);
        cache.put(key("repo", "v1", "Fix   Login"), bundle(42));
        assert_eq!(cache.get(&key("repo", "v1", "fix login")), Some(bundle(42)));
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = cache_with_capacity(2);
        let a = key("repo", "v1", "a");
        let b = key("repo", "v1", "b");
        let c = key("repo", "v1", "c");

        cache.put(a.clone(), bundle(1));
        cache.put(b.clone(), bundle(2));
        assert!(cache.get(&a).is_some()); // refresh a
        cache.put(c.clone(), bundle(3)); // evicts b

        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn expired_entries_are_misses() {
        let cache = ContextCache::new(CacheConfig {
            capacity: NonZeroUsize::new(4).unwrap(),
            entry_lifetime: Duration::ZERO,
        });
        let k = key("repo", "v1", "a");
        cache.put(k.clone(), bundle(1));
        assert_eq!(cache.get(&k), None);
        assert!(cache.is_empty());
    }
}
