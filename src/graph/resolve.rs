//! Best-effort resolution of raw import references against the scanned file
//! set. Resolution order: relative path, then known extension suffixes, then
//! index/module-root files for directory-style imports. Anything that does
//! not land on a scanned file is dropped.

use std::collections::BTreeSet;

use crate::types::Language;

fn extensions_for(language: Language) -> &'static [&'static str] {
    match language {
        Language::Python => &[".py"],
        Language::JavaScript | Language::TypeScript => {
            &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"]
        }
        Language::Java | Language::Kotlin => &[".java", ".kt"],
        Language::Go => &[".go"],
        Language::C | Language::Cpp => &[".h", ".hpp", ".c", ".cc", ".cpp"],
        Language::Rust => &[".rs"],
        Language::Ruby => &[".rb"],
        _ => &[],
    }
}

fn uses_dotted_modules(language: Language) -> bool {
    matches!(
        language,
        Language::Python | Language::Java | Language::Kotlin
    )
}

/// Resolve one reference from `from_path` to a path in `files`, or `None`.
pub fn resolve(
    reference: &str,
    from_path: &str,
    language: Language,
    files: &BTreeSet<String>,
) -> Option<String> {
    let dir = parent_dir(from_path);
    let mut bases: Vec<String> = Vec::new();

    if reference.starts_with("./") || reference.starts_with("../") {
        bases.extend(join_normalized(dir, reference));
    } else {
        let slashed = if uses_dotted_modules(language) {
            reference.replace('.', "/")
        } else {
            reference.to_string()
        };

        if language == Language::Rust {
            // `mod foo;` and `use crate::...` resolve against the module tree.
            bases.extend(join_normalized(dir, &slashed));
            let root_segment = slashed.split("::").next().unwrap_or(&slashed);
            bases.push(format!("src/{root_segment}"));
        } else {
            // Sibling files first, then treat the reference as root-relative.
            if !dir.is_empty() {
                bases.extend(join_normalized(dir, &slashed));
            }
            bases.push(slashed);
        }
    }

    for base in &bases {
        if files.contains(base) {
            return Some(base.clone());
        }
        for ext in extensions_for(language) {
            let candidate = format!("{base}{ext}");
            if files.contains(&candidate) {
                return Some(candidate);
            }
        }
    }

    // Directory-style imports: index/module-root files.
    for base in &bases {
        for ext in extensions_for(language) {
            let candidate = format!("{base}/index{ext}");
            if files.contains(&candidate) {
                return Some(candidate);
            }
        }
        for root_file in ["mod.rs", "__init__.py"] {
            let candidate = format!("{base}/{root_file}");
            if files.contains(&candidate) {
                return Some(candidate);
            }
        }
    }

    None
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Join `rel` onto `dir`, resolving `.` and `..` segments. Returns `None`
/// when the result would escape the tree root.
fn join_normalized(dir: &str, rel: &str) -> Option<String> {
    let mut segments: Vec<&str> = if dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    };

    for seg in rel.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
