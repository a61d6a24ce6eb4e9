//! Lightweight file-to-file dependency mapping.
//!
//! A per-language pattern scan over the head of each file yields raw import
//! references; each is resolved against the scanned file set and unresolved
//! references are silently dropped. The resulting directed graph may contain
//! cycles, so traversals must guard with a visited set.

pub mod resolve;
pub mod rules;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use tracing::debug;

use crate::types::FileRecord;

/// How much of a file's head is scanned for import statements. Imports sit
/// at the top of a file in every supported language.
const IMPORT_SCAN_BYTES: usize = 4096;

/// Directed file-to-file graph: `from → to` means "from imports to".
/// Both directions are queryable.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    forward: BTreeMap<String, BTreeSet<String>>,
    reverse: BTreeMap<String, BTreeSet<String>>,
    edge_count: usize,
}

impl DependencyGraph {
    /// Build the graph from scanned records. Deadline-aware: when the
    /// request deadline expires mid-build, the graph covers a prefix of the
    /// file set, which only weakens propagation, never correctness.
    pub fn build(records: &[FileRecord], deadline: Option<Instant>) -> Self {
        let known: BTreeSet<String> = records.iter().map(|r| r.path.clone()).collect();
        let mut graph = DependencyGraph::default();

        for record in records {
            if !record.language.has_import_syntax() {
                continue;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                debug!("dependency mapping stopped at deadline");
                break;
            }
            let Some(content) = record.content.as_deref() else {
                continue;
            };

            let head = head_slice(content, IMPORT_SCAN_BYTES);
            for reference in rules::extract_references(head, record.language) {
                let Some(target) =
                    resolve::resolve(&reference, &record.path, record.language, &known)
                else {
                    continue;
                };
                if target != record.path {
                    graph.add_edge(&record.path, &target);
                }
            }
        }

        debug!(
            "dependency graph: {} nodes, {} edges",
            graph.forward.len(),
            graph.edge_count
        );
        graph
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        let inserted = self
            .forward
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
        if inserted {
            self.reverse
                .entry(to.to_string())
                .or_default()
                .insert(from.to_string());
            self.edge_count += 1;
        }
    }

    /// Files that `path` imports.
    pub fn imports_of(&self, path: &str) -> impl Iterator<Item = &str> {
        self.forward
            .get(path)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Files that import `path`.
    pub fn imported_by(&self, path: &str) -> impl Iterator<Item = &str> {
        self.reverse
            .get(path)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Neighbors in both directions, deduplicated, in lexical order.
    pub fn neighbors(&self, path: &str) -> Vec<&str> {
        let mut all: BTreeSet<&str> = self.imports_of(path).collect();
        all.extend(self.imported_by(path));
        all.into_iter().collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

fn head_slice(content: &str, max_bytes: usize) -> &str {
    if content.len() <= max_bytes {
        return content;
    }
    let mut end = max_bytes;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn edges_resolve_against_the_file_set() {
        let records = vec![
            record(
                "auth/login.py",
                Language::Python,
                "from auth.tokens import verify\nimport os\n",
            ),
            record("auth/tokens.py", Language::Python, "import hashlib\n"),
        ];
        let graph = DependencyGraph::build(&records, None);

        assert_eq!(
            graph.imports_of("auth/login.py").collect::<Vec<_>>(),
            vec!["auth/tokens.py"]
        );
        assert_eq!(
            graph.imported_by("auth/tokens.py").collect::<Vec<_>>(),
            vec!["auth/login.py"]
        );
        // `os` and `hashlib` do not resolve; no dangling nodes appear.
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn mutual_imports_form_a_cycle() {
        let records = vec![
            record("a.py", Language::Python, "import b\n"),
            record("b.py", Language::Python, "import a\n"),
        ];
        let graph = DependencyGraph::build(&records, None);

        assert_eq!(graph.neighbors("a.py"), vec!["b.py"]);
        assert_eq!(graph.neighbors("b.py"), vec!["a.py"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn self_imports_are_ignored() {
        let records = vec![record("a.py", Language::Python, "import a\n")];
        let graph = DependencyGraph::build(&records, None);
        assert_eq!(graph.edge_count(), 0);
    }
}
