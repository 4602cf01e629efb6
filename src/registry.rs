//! Identifier Registry
//!
//! Corpus-wide id table built serially between the two passes. Every
//! declared id registers, valid format or not, so duplicate detection
//! and resolution see the same view of the corpus. Frozen before any
//! resolution happens.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::core::diagnostics::{Diagnostic, DiagnosticKind, Location};

/// Required id format: lowercase alphanumerics and hyphens.
pub fn is_valid_id(id: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").expect("valid regex"))
        .is_match(id)
}

/// One document that declared an id.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredId {
    /// `:forgepoint-type:` of the declaring document, when present.
    pub doc_type: Option<String>,
    pub source: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    ids: HashMap<String, Vec<RegisteredId>>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, doc_type: Option<String>, source: &Path) {
        self.ids.entry(id.to_string()).or_default().push(RegisteredId {
            doc_type,
            source: source.to_path_buf(),
        });
    }

    pub fn lookup(&self, id: &str) -> Option<&[RegisteredId]> {
        self.ids.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// One error per declaring document of each duplicated id, attributed
    /// to that document and naming the other declaring paths, so either
    /// file's report is independently actionable. Ids and paths are sorted
    /// so the output does not depend on registration order.
    pub fn duplicate_diagnostics(&self) -> Vec<Diagnostic> {
        let mut ids: Vec<(&String, &Vec<RegisteredId>)> =
            self.ids.iter().filter(|(_, occ)| occ.len() > 1).collect();
        ids.sort_by_key(|(id, _)| id.as_str());

        let mut diagnostics = Vec::new();
        for (id, occurrences) in ids {
            let mut paths: Vec<&Path> =
                occurrences.iter().map(|occ| occ.source.as_path()).collect();
            paths.sort();
            for own in &paths {
                let others: Vec<String> = paths
                    .iter()
                    .filter(|p| *p != own)
                    .map(|p| p.display().to_string())
                    .collect();
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::DuplicateId,
                        format!("id '{id}' is also declared by {}", others.join(", ")),
                    )
                    .at(Location::at_path(own)),
                );
            }
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        assert!(is_valid_id("auth-login"));
        assert!(is_valid_id("q3-2025"));
        assert!(!is_valid_id("Auth-Login"));
        assert!(!is_valid_id("auth_login"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("spaced id"));
    }

    #[test]
    fn test_duplicates_attributed_to_each_declaring_document() {
        let mut registry = IdentifierRegistry::new();
        registry.register("x", Some("adr".to_string()), &PathBuf::from("a.adoc"));
        registry.register("x", Some("rfc".to_string()), &PathBuf::from("b.adoc"));
        registry.register("x", Some("prd".to_string()), &PathBuf::from("c.adoc"));

        let diags = registry.duplicate_diagnostics();
        assert_eq!(diags.len(), 3);

        let for_path = |name: &str| {
            diags
                .iter()
                .find(|d| d.location.path.as_deref() == Some(Path::new(name)))
                .unwrap_or_else(|| panic!("no diagnostic attributed to {name}"))
        };
        let a = for_path("a.adoc");
        assert!(a.message.contains("b.adoc") && a.message.contains("c.adoc"));
        assert!(!a.message.contains("a.adoc"));
        assert!(for_path("b.adoc").message.contains("a.adoc, c.adoc"));
    }

    #[test]
    fn test_duplicate_detection_order_independent() {
        let mut forward = IdentifierRegistry::new();
        forward.register("x", Some("adr".to_string()), &PathBuf::from("a.adoc"));
        forward.register("x", Some("rfc".to_string()), &PathBuf::from("b.adoc"));

        let mut reverse = IdentifierRegistry::new();
        reverse.register("x", Some("rfc".to_string()), &PathBuf::from("b.adoc"));
        reverse.register("x", Some("adr".to_string()), &PathBuf::from("a.adoc"));

        let d1 = forward.duplicate_diagnostics();
        let d2 = reverse.duplicate_diagnostics();
        assert_eq!(d1.len(), 2);
        assert_eq!(d1, d2);
        assert_eq!(
            d1[0].location.path.as_deref(),
            Some(Path::new("a.adoc"))
        );
        assert!(d1[0].message.contains("b.adoc"));
        assert!(d1[1].message.contains("a.adoc"));
    }

    #[test]
    fn test_unique_ids_produce_no_diagnostics() {
        let mut registry = IdentifierRegistry::new();
        registry.register("a", None, &PathBuf::from("a.adoc"));
        registry.register("b", None, &PathBuf::from("b.adoc"));
        assert!(registry.duplicate_diagnostics().is_empty());
    }

    #[test]
    fn test_invalid_format_ids_still_register() {
        let mut registry = IdentifierRegistry::new();
        registry.register("Bad_Id", None, &PathBuf::from("a.adoc"));
        registry.register("Bad_Id", None, &PathBuf::from("b.adoc"));
        assert_eq!(registry.duplicate_diagnostics().len(), 2);
    }
}
