//! Pipeline orchestration: keyword extraction, cache lookup, scan,
//! dependency mapping, scoring, selection.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::cache::{CacheConfig, CacheKey, ContextCache};
use crate::graph::DependencyGraph;
use crate::keywords;
use crate::scan::{ScanConfig, ScanError, Scanner};
use crate::scoring::{RelevanceScorer, ScoreWeights};
use crate::selection::{apply_budget, ApproxTokenCounter};
use crate::types::{
    BundleStats, ContextBudget, ContextBundle, PromptHash, RepoId, TreeVersion,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scan: ScanConfig,
    pub weights: ScoreWeights,
    pub cache: CacheConfig,
    /// Wall-clock ceiling for scanning and dependency mapping. Past it the
    /// engine returns a partial bundle rather than hanging.
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            weights: ScoreWeights::default(),
            cache: CacheConfig::default(),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// The repository context engine.
///
/// Holds the shared bundle cache; everything else is per-request. Requests
/// for different prompts or repositories run fully independently aside from
/// that cache.
pub struct ContextEngine {
    config: EngineConfig,
    scorer: RelevanceScorer,
    tokenizer: ApproxTokenCounter,
    cache: ContextCache,
}

impl Default for ContextEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ContextEngine {
    pub fn new(config: EngineConfig) -> Self {
        let scorer = RelevanceScorer::new(config.weights.clone());
        let cache = ContextCache::new(config.cache.clone());
        Self {
            config,
            scorer,
            tokenizer: ApproxTokenCounter,
            cache,
        }
    }

    /// Build a context bundle for `prompt` against the working tree at
    /// `root`. `tree_version` is the caller's stable identifier for the
    /// tree's state and only drives cache invalidation.
    ///
    /// Only an unreadable root aborts; every other degradation (timeout,
    /// unreadable files, unresolved imports) shrinks the bundle or flags it
    /// partial.
    pub fn build_context(
        &self,
        root: &Path,
        repo: &RepoId,
        tree_version: &TreeVersion,
        prompt: &str,
        budget: &ContextBudget,
    ) -> Result<ContextBundle, ScanError> {
        // Extraction runs before the cache lookup: the keyword set is part
        // of the cache identity, so prompts that extract differently never
        // share an entry.
        let keywords = keywords::extract(prompt);
        let key = CacheKey {
            repo: repo.clone(),
            tree_version: tree_version.clone(),
            prompt: PromptHash::from_extraction(prompt, keywords.iter()),
        };
        if let Some(bundle) = self.cache.get(&key) {
            debug!("cache hit for {}", repo.as_str());
            return Ok(bundle);
        }

        let started = Instant::now();
        let deadline = self.config.timeout.map(|t| started + t);

        let scanner = Scanner::new(root, self.config.scan.clone());
        let outcome = scanner.scan(budget.max_depth, deadline)?;

        let graph = DependencyGraph::build(&outcome.files, deadline);

        let scored = self
            .scorer
            .score(&outcome.files, &keywords, &graph, &self.tokenizer);
        let files_considered = scored.len();

        let result = apply_budget(scored, budget, &self.tokenizer);
        let bundle = ContextBundle {
            files: result.selected,
            stats: BundleStats {
                files_considered,
                files_selected: result.files_selected,
                files_excluded_by_budget: result.files_excluded_by_budget,
                tokens_used: result.tokens_used,
                partial: outcome.partial,
            },
        };

        info!(
            "context for {} in {:?}: {} of {} files, ~{} tokens{}",
            repo.as_str(),
            started.elapsed(),
            bundle.stats.files_selected,
            bundle.stats.files_considered,
            bundle.stats.tokens_used,
            if bundle.stats.partial { " (partial)" } else { "" },
        );

        // A partial bundle reflects a degraded scan, not the tree's state;
        // caching it would pin the degradation until the tree changes.
        if !bundle.stats.partial {
            self.cache.put(key, bundle.clone());
        }

        Ok(bundle)
    }

    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }
}
