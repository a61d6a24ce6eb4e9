//! Per-language import pattern registry.
//!
//! Each supported language group maps to a fixed set of regular expressions
//! whose first capture group is the referenced module or path string. Adding
//! a language means adding a registry entry, nothing else.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Language;

struct RuleSet {
    languages: &'static [Language],
    patterns: Lazy<Vec<Regex>>,
}

macro_rules! rule_set {
    ($langs:expr, [$($pat:expr),+ $(,)?]) => {
        RuleSet {
            languages: $langs,
            patterns: Lazy::new(|| vec![$(Regex::new($pat).expect("import pattern")),+]),
        }
    };
}

static RULES: [RuleSet; 7] = [
    rule_set!(
        &[Language::Python],
        [
            r"(?m)^\s*from\s+([A-Za-z_][A-Za-z0-9_.]*)\s+import",
            r"(?m)^\s*import\s+([A-Za-z_][A-Za-z0-9_.]*)",
        ]
    ),
    rule_set!(
        &[Language::JavaScript, Language::TypeScript],
        [
            r#"import\s+[^;]*?from\s+["']([^"']+)["']"#,
            r#"require\(\s*["']([^"']+)["']\s*\)"#,
            r#"import\(\s*["']([^"']+)["']\s*\)"#,
        ]
    ),
    rule_set!(
        &[Language::Java, Language::Kotlin],
        [r"(?m)^\s*import\s+([A-Za-z_][A-Za-z0-9_.]*)\s*;?"]
    ),
    rule_set!(
        &[Language::Go],
        [r#"(?m)^\s*import\s+"([^"]+)""#, r#"(?m)^\s+"([^"]+)"\s*$"#]
    ),
    rule_set!(
        &[Language::C, Language::Cpp],
        [r#"(?m)^\s*#include\s+["<]([^">]+)[">]"#]
    ),
    rule_set!(
        &[Language::Rust],
        [
            r"(?m)^\s*(?:pub\s+)?mod\s+([A-Za-z_][A-Za-z0-9_]*)\s*;",
            r"(?m)^\s*use\s+crate::([A-Za-z0-9_:]+)",
        ]
    ),
    rule_set!(
        &[Language::Ruby],
        [r#"(?m)^\s*require(?:_relative)?\s+["']([^"']+)["']"#]
    ),
];

/// Extract raw reference strings from `content` for `language`. Empty for
/// languages with no registered rule set.
pub fn extract_references(content: &str, language: Language) -> Vec<String> {
    let Some(set) = RULES.iter().find(|r| r.languages.contains(&language)) else {
        return Vec::new();
    };

    let mut refs = Vec::new();
    for pattern in set.patterns.iter() {
        for cap in pattern.captures_iter(content) {
            if let Some(m) = cap.get(1) {
                let reference = m.as_str().trim();
                if !reference.is_empty() {
                    refs.push(reference.to_string());
                }
            }
        }
    }
    refs
}
