//! Relevance-ranked repository context selection for LLM prompts.
//!
//! `repo-context` takes a materialized working tree and a natural-language
//! task prompt and produces a bounded, relevance-ranked bundle of files to
//! hand to a language model as grounding context. The pipeline is lexical and
//! structural (keyword extraction, import-graph score propagation,
//! token-budgeted selection) with memoization keyed by repository state and
//! prompt. All phases are deterministic: identical inputs always produce
//! identical bundles, including ordering.

pub mod cache;
pub mod engine;
pub mod graph;
pub mod keywords;
pub mod scan;
pub mod scoring;
pub mod selection;
pub mod types;
