use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileRecordError {
    #[error("Path is outside the scan root")]
    OutsideRoot,
    #[error("Path involves invalid UTF-8")]
    InvalidUtf8,
    #[error("Path contains a parent-directory traversal segment")]
    ParentTraversal,
}

/// Source language inferred from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Kotlin,
    C,
    Cpp,
    CSharp,
    Php,
    Ruby,
    Go,
    Rust,
    Swift,
    Scala,
    Sql,
    Shell,
    Yaml,
    Json,
    Xml,
    Html,
    Css,
    Markdown,
    Terraform,
    Dockerfile,
    Unknown,
}

/// Extensions the scanner recognizes, kept in sync with [`Language::from_path`].
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "mjs", "cjs", "ts", "tsx", "java", "kt", "kts", "c", "h", "cpp", "cc",
    "cxx", "hpp", "cs", "php", "rb", "go", "rs", "swift", "scala", "sql", "sh", "bash", "zsh",
    "yml", "yaml", "json", "xml", "html", "css", "scss", "md", "tf",
];

impl Language {
    pub fn from_path(path: &Path) -> Self {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.eq_ignore_ascii_case("dockerfile") {
                return Language::Dockerfile;
            }
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Language::Unknown;
        };

        match ext.to_lowercase().as_str() {
            "py" | "pyw" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "java" => Language::Java,
            "kt" | "kts" => Language::Kotlin,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" => Language::Cpp,
            "cs" => Language::CSharp,
            "php" => Language::Php,
            "rb" => Language::Ruby,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "swift" => Language::Swift,
            "scala" => Language::Scala,
            "sql" => Language::Sql,
            "sh" | "bash" | "zsh" => Language::Shell,
            "yml" | "yaml" => Language::Yaml,
            "json" => Language::Json,
            "xml" => Language::Xml,
            "html" | "htm" => Language::Html,
            "css" | "scss" | "sass" | "less" => Language::Css,
            "md" | "mdx" | "markdown" => Language::Markdown,
            "tf" | "tfvars" => Language::Terraform,
            _ => Language::Unknown,
        }
    }

    /// Map a prompt token to a language when it names one (by name, alias,
    /// or bare extension). Drives the language prior in scoring.
    pub fn from_keyword(term: &str) -> Option<Self> {
        let lang = match term {
            "python" | "py" => Language::Python,
            "javascript" | "js" | "node" => Language::JavaScript,
            "typescript" | "ts" => Language::TypeScript,
            "java" => Language::Java,
            "kotlin" | "kt" => Language::Kotlin,
            "cpp" | "c++" => Language::Cpp,
            "csharp" | "cs" => Language::CSharp,
            "php" => Language::Php,
            "ruby" | "rb" => Language::Ruby,
            "go" | "golang" => Language::Go,
            "rust" | "rs" => Language::Rust,
            "swift" => Language::Swift,
            "scala" => Language::Scala,
            "sql" => Language::Sql,
            "shell" | "bash" | "sh" => Language::Shell,
            "yaml" | "yml" => Language::Yaml,
            "json" => Language::Json,
            "xml" => Language::Xml,
            "html" => Language::Html,
            "css" => Language::Css,
            "markdown" | "md" => Language::Markdown,
            "terraform" | "tf" => Language::Terraform,
            "dockerfile" | "docker" => Language::Dockerfile,
            _ => return None,
        };
        Some(lang)
    }

    /// Languages whose content is dense symbol soup rather than prose.
    /// Token estimation uses a smaller chars-per-token divisor for these.
    pub fn is_code(self) -> bool {
        !matches!(
            self,
            Language::Markdown | Language::Unknown | Language::Yaml | Language::Json
        )
    }

    /// Whether the dependency mapper has an import rule set for this language.
    pub fn has_import_syntax(self) -> bool {
        matches!(
            self,
            Language::Python
                | Language::JavaScript
                | Language::TypeScript
                | Language::Java
                | Language::Kotlin
                | Language::C
                | Language::Cpp
                | Language::Go
                | Language::Rust
                | Language::Ruby
        )
    }
}

/// One file discovered by the scanner.
///
/// `path` is relative to the scan root, `/`-separated, and unique within one
/// scan. `content` is loaded by the scanner's read phase and may be absent
/// when the read failed or the scan deadline expired first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub language: Language,
    pub size_bytes: u64,
    pub depth: usize,
    pub content: Option<String>,
}

impl FileRecord {
    /// Build a record for `source` relative to `root`.
    ///
    /// This is the only way to construct a record: it enforces that the path
    /// stays inside the root and carries no `..` segments.
    pub fn new(root: &Path, source: &Path, size_bytes: u64) -> Result<Self, FileRecordError> {
        let rel = source
            .strip_prefix(root)
            .map_err(|_| FileRecordError::OutsideRoot)?;

        let path = normalize_rel_path(rel)?;
        let depth = path.split('/').count();
        let language = Language::from_path(source);

        Ok(FileRecord {
            path,
            language,
            size_bytes,
            depth,
            content: None,
        })
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

fn normalize_rel_path(path: &Path) -> Result<String, FileRecordError> {
    let s = path.to_str().ok_or(FileRecordError::InvalidUtf8)?;
    let normalized = s.replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./");

    if trimmed.split('/').any(|seg| seg == "..") {
        return Err(FileRecordError::ParentTraversal);
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn record_paths_are_relative_and_slash_separated() {
        let root = PathBuf::from("/repo");
        let rec = FileRecord::new(&root, &root.join("src").join("main.rs"), 10).unwrap();
        assert_eq!(rec.path, "src/main.rs");
        assert_eq!(rec.depth, 2);
        assert_eq!(rec.language, Language::Rust);
    }

    #[test]
    fn parent_traversal_is_rejected() {
        let root = PathBuf::from("/repo");
        let err = FileRecord::new(&root, &root.join("..").join("etc"), 0);
        assert!(err.is_err());
    }

    #[test]
    fn dockerfile_is_recognized_without_extension() {
        assert_eq!(
            Language::from_path(Path::new("deploy/Dockerfile")),
            Language::Dockerfile
        );
    }
}
