//! Relevance scoring: keyword signals, structural priors, and one bounded
//! propagation pass over the dependency graph.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::graph::DependencyGraph;
use crate::keywords::KeywordSet;
use crate::selection::tokens::TokenCounter;
use crate::types::{FileRecord, MatchReason, ScoredFile};

/// Well-known project manifests and docs that usually belong in a bundle.
const CONFIG_FILES: &[&str] = &[
    "package.json",
    "requirements.txt",
    "cargo.toml",
    "go.mod",
    "pom.xml",
    "gemfile",
    "composer.json",
    "pyproject.toml",
    "setup.py",
    "build.gradle",
    "cmakelists.txt",
    "makefile",
    "dockerfile",
    "docker-compose.yml",
    "tsconfig.json",
    "readme.md",
];

/// Conventional entry-point file names.
const ENTRY_POINTS: &[&str] = &[
    "main.py", "app.py", "main.rs", "lib.rs", "main.go", "index.js", "index.ts", "server.js",
    "app.js",
];

#[derive(Debug, Clone)]
pub struct ScoreWeights {
    /// Multiplier for keyword matches in the path/filename.
    pub path_match: f32,
    /// Multiplier for keyword matches in content, log-saturated.
    pub content_match: f32,
    /// Bonus when the file's language is named in the prompt.
    pub language_prior: f32,
    /// Per-level bonus for shallow files. Tie-break favor, not a signal.
    pub depth_prior: f32,
    pub config_bonus: f32,
    pub entry_bonus: f32,
    /// Files at or above this base score donate to graph neighbors.
    pub seed_threshold: f32,
    /// Fraction of a seed's score donated per neighbor.
    pub propagation_fraction: f32,
    /// Multiplicative decay per additional hop.
    pub propagation_decay: f32,
    /// Bounded hop count; propagation never recurses into the graph.
    pub propagation_hops: usize,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            path_match: 3.0,
            content_match: 1.0,
            language_prior: 2.0,
            depth_prior: 0.25,
            config_bonus: 1.5,
            entry_bonus: 1.0,
            seed_threshold: 3.0,
            propagation_fraction: 0.3,
            propagation_decay: 0.5,
            propagation_hops: 1,
        }
    }
}

pub struct RelevanceScorer {
    weights: ScoreWeights,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl RelevanceScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Score every record and return them sorted by (score desc, path asc).
    pub fn score<'a, T: TokenCounter>(
        &self,
        records: &'a [FileRecord],
        keywords: &KeywordSet,
        graph: &DependencyGraph,
        tokenizer: &T,
    ) -> Vec<ScoredFile<'a>> {
        let named_languages = keywords.named_languages();

        let mut scored: Vec<ScoredFile<'a>> = records
            .iter()
            .map(|record| {
                let (score, reasons) = self.base_score(record, keywords, &named_languages);
                let token_estimate = record
                    .content
                    .as_deref()
                    .map(|c| tokenizer.estimate(c, record.language))
                    .unwrap_or(0);
                ScoredFile {
                    record,
                    score,
                    reasons,
                    token_estimate,
                }
            })
            .collect();

        self.propagate(&mut scored, graph);

        scored.sort_by(|a, b| {
            let by_score = b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);
            by_score.then_with(|| a.record.path.cmp(&b.record.path))
        });

        debug_assert!(scored.windows(2).all(|w| {
            w[0].score > w[1].score
                || (w[0].score == w[1].score && w[0].record.path <= w[1].record.path)
        }));

        debug!(
            "scored {} files, top score {:.2}",
            scored.len(),
            scored.first().map(|s| s.score).unwrap_or(0.0)
        );
        scored
    }

    fn base_score(
        &self,
        record: &FileRecord,
        keywords: &KeywordSet,
        named_languages: &[crate::types::Language],
    ) -> (f32, Vec<MatchReason>) {
        let w = &self.weights;
        let mut score = 0.0f32;
        let mut reasons = Vec::new();

        let path_lower = record.path.to_lowercase();
        let content_lower = record.content.as_deref().map(str::to_lowercase);

        let mut path_hit = false;
        let mut content_hit = false;
        for (term, weight) in keywords.iter() {
            if path_lower.contains(term) {
                score += w.path_match * weight;
                path_hit = true;
            }
            if let Some(content) = content_lower.as_deref() {
                let count = content.matches(term).count();
                if count > 0 {
                    score += w.content_match * weight * (1.0 + count as f32).ln();
                    content_hit = true;
                }
            }
        }
        if path_hit {
            reasons.push(MatchReason::PathKeyword);
        }
        if content_hit {
            reasons.push(MatchReason::ContentKeyword);
        }

        if named_languages.contains(&record.language) {
            score += w.language_prior;
            reasons.push(MatchReason::LanguagePrior);
        }

        let shallowness = 4usize.saturating_sub(record.depth) as f32;
        if shallowness > 0.0 {
            score += w.depth_prior * shallowness;
            reasons.push(MatchReason::DepthPrior);
        }

        let name = record.file_name().to_lowercase();
        if CONFIG_FILES.contains(&name.as_str()) {
            score += w.config_bonus;
            reasons.push(MatchReason::ConfigFile);
        }
        if ENTRY_POINTS.contains(&name.as_str()) {
            score += w.entry_bonus;
            reasons.push(MatchReason::EntryPoint);
        }

        (score, reasons)
    }

    /// Seeds donate a fraction of their base score to graph neighbors in
    /// both directions, for a bounded number of hops with per-hop decay.
    /// Boosts are capped below the seed threshold so a file with no direct
    /// signal can never outrank a genuinely matched one. Cycle-safe: each
    /// seed's traversal carries its own visited set, and termination is by
    /// hop count, never recursion into the graph.
    fn propagate(&self, scored: &mut [ScoredFile<'_>], graph: &DependencyGraph) {
        let w = &self.weights;
        if w.propagation_hops == 0 || graph.edge_count() == 0 {
            return;
        }

        let index: BTreeMap<&str, usize> = scored
            .iter()
            .enumerate()
            .map(|(i, s)| (s.record.path.as_str(), i))
            .collect();

        let boost_cap = (w.seed_threshold - 0.01).max(0.0);
        let mut boosts = vec![0.0f32; scored.len()];

        // BTreeMap iteration keeps seed order deterministic.
        for (&path, &seed_idx) in &index {
            let seed_score = scored[seed_idx].score;
            if seed_score < w.seed_threshold {
                continue;
            }

            let mut visited: HashSet<&str> = HashSet::new();
            visited.insert(path);
            let mut frontier: Vec<&str> = vec![path];

            for hop in 0..w.propagation_hops {
                let donation =
                    seed_score * w.propagation_fraction * w.propagation_decay.powi(hop as i32);
                let mut next: Vec<&str> = Vec::new();

                for &node in &frontier {
                    for neighbor in graph.neighbors(node) {
                        if !visited.insert(neighbor) {
                            continue;
                        }
                        if let Some(&n_idx) = index.get(neighbor) {
                            boosts[n_idx] += donation;
                            next.push(neighbor);
                        }
                    }
                }

                if next.is_empty() {
                    break;
                }
                frontier = next;
            }
        }

        for (file, boost) in scored.iter_mut().zip(boosts) {
            if boost > 0.0 {
                file.score += boost.min(boost_cap);
                file.reasons.push(MatchReason::GraphNeighbor);
            }
        }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords;
    use crate::selection::tokens::ApproxTokenCounter;
    use crate::types::Language;

    fn record(path: &str, language: Language, content: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            language,
            size_bytes: content.len() as u64,
            depth: path.split('/').count(),
            content: Some(content.to_string()),
        }
    }

    fn score_all<'a>(records: &'a [FileRecord], prompt: &str) -> Vec<ScoredFile<'a>> {
        let keywords = keywords::extract(prompt);
        let graph = DependencyGraph::build(records, None);
        RelevanceScorer::default().score(records, &keywords, &graph, &ApproxTokenCounter)
    }

    #[test]
    fn path_and_content_matches_rank_above_unrelated_files() {
        let records = vec![
            record("auth/login.py", Language::Python, "def login(): pass"),
            record("docs/notes.md", Language::Markdown, "meeting notes"),
        ];
        let scored = score_all(&records, "fix the login flow");
        assert_eq!(scored[0].record.path, "auth/login.py");
        assert!(scored[0].reasons.contains(&MatchReason::PathKeyword));
        assert!(scored[0].score > scored[1].score);
    }

    #[test]
    fn content_stuffing_saturates() {
        let stuffed = "login ".repeat(500);
        let records = vec![
            record("a.py", Language::Python, &stuffed),
            record("b.py", Language::Python, "login login login"),
        ];
        let scored = score_all(&records, "login");
        let a = scored.iter().find(|s| s.record.path == "a.py").unwrap();
        let b = scored.iter().find(|s| s.record.path == "b.py").unwrap();
        // 500 occurrences vs 3 must not yield a 150x score gap.
        assert!(a.score < b.score * 6.0);
    }

    #[test]
    fn language_prior_applies_when_prompt_names_a_language() {
        let records = vec![
            record("tool.py", Language::Python, "x = 1"),
            record("tool.rb", Language::Ruby, "x = 1"),
        ];
        let scored = score_all(&records, "update the python tool");
        let py = scored.iter().find(|s| s.record.path == "tool.py").unwrap();
        assert!(py.reasons.contains(&MatchReason::LanguagePrior));
        assert_eq!(scored[0].record.path, "tool.py");
    }

    #[test]
    fn neighbors_of_seeds_get_a_bounded_boost() {
        let records = vec![
            record(
                "auth/login.py",
                Language::Python,
                "from auth.tokens import verify\nlogin login",
            ),
            record("auth/tokens.py", Language::Python, "def verify(): pass"),
            record("zz/unrelated.py", Language::Python, "nothing here"),
        ];
        let scored = score_all(&records, "fix the login bug");

        let tokens = scored
            .iter()
            .find(|s| s.record.path == "auth/tokens.py")
            .unwrap();
        let unrelated = scored
            .iter()
            .find(|s| s.record.path == "zz/unrelated.py")
            .unwrap();
        let login = scored
            .iter()
            .find(|s| s.record.path == "auth/login.py")
            .unwrap();

        assert!(tokens.reasons.contains(&MatchReason::GraphNeighbor));
        assert!(tokens.score > unrelated.score);
        // Propagation must not let the neighbor outrank the direct match.
        assert!(login.score > tokens.score);
    }

    #[test]
    fn cyclic_graphs_terminate() {
        let records = vec![
            record("a.py", Language::Python, "import b\nalpha alpha alpha"),
            record("b.py", Language::Python, "import a\n"),
        ];
        let scored = score_all(&records, "alpha");
        assert_eq!(scored.len(), 2);
    }

    #[test]
    fn equal_scores_fall_back_to_lexical_path_order() {
        let records = vec![
            record("b/same.py", Language::Python, "x"),
            record("a/same.py", Language::Python, "x"),
        ];
        let scored = score_all(&records, "");
        assert_eq!(scored[0].record.path, "a/same.py");
        assert_eq!(scored[1].record.path, "b/same.py");
    }

    #[test]
    fn empty_keyword_set_scores_on_structural_priors() {
        let records = vec![
            record("main.py", Language::Python, "entry"),
            record("deep/nested/module/util.py", Language::Python, "entry"),
        ];
        let scored = score_all(&records, "");
        assert_eq!(scored[0].record.path, "main.py");
        assert!(scored[0].reasons.contains(&MatchReason::EntryPoint));
    }
}
