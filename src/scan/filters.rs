use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Directory names never descended into, regardless of caller overrides.
/// Version-control metadata, dependency/vendor trees, and build artifacts.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    // VCS / tooling
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    // caches / builds
    "__pycache__",
    ".cache",
    ".mypy_cache",
    ".pytest_cache",
    "node_modules",
    ".next",
    ".nuxt",
    "target",
    "build",
    "dist",
    "coverage",
    "htmlcov",
    // environments / vendor
    "vendor",
    "third_party",
    "venv",
    ".venv",
    "env",
    ".env",
];

/// File name patterns never read: logs, lockfiles, and compiled artifacts
/// that survive the binary sniff as text.
pub const DEFAULT_IGNORED_FILES: &[&str] = &[
    "*.log",
    "*.tmp",
    "*.cache",
    "*.lock",
    "package-lock.json",
    "*.pyc",
    "*.pyo",
    "*.class",
    "*.o",
    "*.so",
    "*.dylib",
    "*.dll",
    "*.exe",
];

/// Caller-supplied exclusion patterns compiled on top of the fixed default
/// directory and file-pattern lists.
#[derive(Debug)]
pub struct ExcludeSet {
    default_files: GlobSet,
    globs: GlobSet,
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self, globset::Error> {
        let mut defaults = GlobSetBuilder::new();
        for pattern in DEFAULT_IGNORED_FILES {
            defaults.add(Glob::new(pattern)?);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            default_files: defaults.build()?,
            globs: builder.build()?,
        })
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        DEFAULT_IGNORED_DIRS.iter().any(|d| *d == name)
            || name.starts_with('.')
            || self.globs.is_match(name)
    }

    pub fn is_excluded_file(&self, rel_path: &Path) -> bool {
        if let Some(name) = rel_path.file_name().and_then(|n| n.to_str()) {
            // Hidden files are noise except for a couple of conventional ones.
            if name.starts_with('.') && name != ".gitignore" && name != ".env.example" {
                return true;
            }
            // Default patterns match the file name alone.
            if self.default_files.is_match(name) {
                return true;
            }
        }
        self.globs.is_match(rel_path)
    }
}

/// Null-byte sniff over the head of a file.
pub fn looks_binary(head: &[u8]) -> bool {
    let window = &head[..head.len().min(1024)];
    window.contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_dirs_are_excluded() {
        let ex = ExcludeSet::new(&[]).unwrap();
        assert!(ex.is_excluded_dir("node_modules"));
        assert!(ex.is_excluded_dir(".git"));
        assert!(!ex.is_excluded_dir("src"));
    }

    #[test]
    fn default_file_patterns_are_excluded() {
        let ex = ExcludeSet::new(&[]).unwrap();
        assert!(ex.is_excluded_file(&PathBuf::from("Cargo.lock")));
        assert!(ex.is_excluded_file(&PathBuf::from("package-lock.json")));
        assert!(ex.is_excluded_file(&PathBuf::from("logs/server.log")));
        assert!(!ex.is_excluded_file(&PathBuf::from("Cargo.toml")));
        assert!(!ex.is_excluded_file(&PathBuf::from("src/main.rs")));
    }

    #[test]
    fn caller_patterns_extend_the_defaults() {
        let ex = ExcludeSet::new(&["*.snap".to_string()]).unwrap();
        assert!(ex.is_excluded_file(&PathBuf::from("ui.snap")));
        assert!(!ex.is_excluded_file(&PathBuf::from("ui.rs")));
    }

    #[test]
    fn null_byte_marks_binary() {
        assert!(looks_binary(b"\x7fELF\x00\x01"));
        assert!(!looks_binary(b"fn main() {}"));
    }
}
