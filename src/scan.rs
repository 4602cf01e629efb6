//! Corpus Discovery
//!
//! Walks the input paths for AsciiDoc sources, applies the configured
//! exclusion patterns, and reads the survivors. Discovery order is
//! sorted so reports are stable across platforms.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::corpus::SourceFile;

/// Extensions recognized as document sources.
pub const SOURCE_EXTENSIONS: [&str; 3] = ["adoc", "asciidoc", "asc"];

/// Exclusion patterns compiled once per run. Supports `*` (within a path
/// component), `**` (across components) and `?`; a pattern matches at any
/// component boundary of the path.
pub struct ExcludeSet {
    patterns: Vec<Regex>,
}

impl ExcludeSet {
    pub fn compile(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(&glob_to_regex(p))
                    .with_context(|| format!("invalid exclude pattern '{p}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, path: &Path) -> bool {
        let text = path.to_string_lossy().replace('\\', "/");
        self.patterns.iter().any(|re| re.is_match(&text))
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("(^|/)");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    // `**/` also swallows the separator.
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    out
}

/// Discover document sources under the given roots.
///
/// Explicit file arguments are always included; directories are walked
/// recursively and filtered by extension. Excluded paths are dropped in
/// both cases.
pub fn discover(roots: &[PathBuf], exclude: &ExcludeSet) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for root in roots {
        if root.is_file() {
            if !exclude.matches(root) {
                found.push(root.clone());
            }
            continue;
        }
        if !root.exists() {
            anyhow::bail!("input path {} does not exist", root.display());
        }
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_source = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
            if is_source && !exclude.matches(path) {
                found.push(path.to_path_buf());
            }
        }
    }

    found.sort();
    found.dedup();
    debug!("discovered {} source files", found.len());
    Ok(found)
}

/// Read every discovered file into memory.
///
/// # Errors
///
/// Fails on the first unreadable file; discovery already proved the
/// paths exist, so a failure here is a real I/O problem.
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(SourceFile {
                path: path.clone(),
                text,
            })
        })
        .collect()
}
