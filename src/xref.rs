//! Cross-Reference Extraction and Resolution
//!
//! Scans every block's text for `xref:` tokens, classifies them as
//! internal or external, and resolves internal references against the
//! frozen identifier registry. Extraction is idempotent over the parsed
//! model; it never mutates the document.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::core::diagnostics::{Diagnostic, DiagnosticKind, Location};
use crate::core::document::Document;
use crate::registry::IdentifierRegistry;
use crate::schema::types::is_semver;

/// Internal: `xref:<docType>:<id>(#fragment)?([linkText])?`.
fn internal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^xref:([a-z][a-z-]*):([a-z0-9-]+)(?:#([A-Za-z0-9_-]+))?(?:\[([^\]]*)\])?")
            .expect("valid regex")
    })
}

/// External: `xref:<host>/<org>/<repo>#<docType>:<id>(@version)?(#fragment)?([linkText])?`.
fn external_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^xref:([a-z0-9.-]+/[A-Za-z0-9._-]+/[A-Za-z0-9._-]+)#([a-z][a-z-]*):([a-z0-9-]+)(?:@([A-Za-z0-9.-]+))?(?:#([A-Za-z0-9_-]+))?(?:\[([^\]]*)\])?",
        )
        .expect("valid regex")
    })
}

/// What an xref token points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum XrefTarget {
    /// Same-corpus reference, resolved in the second pass.
    Internal { doc_type: String, id: String },
    /// Reference into another repository. Checked for syntax only;
    /// resolution would need the other corpus.
    External {
        locator: String,
        doc_type: String,
        id: String,
        version: Option<String>,
    },
}

/// One well-formed xref occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Xref {
    pub target: XrefTarget,
    pub fragment: Option<String>,
    /// `Some` only when a non-empty `[...]` suffix was present.
    pub link_text: Option<String>,
    pub location: Location,
}

/// Extract every xref occurrence from a document's blocks.
///
/// Malformed occurrences (an `xref:` token neither grammar accepts, or
/// an external version that is not a semantic version) produce one
/// syntax warning each and are dropped from the result.
pub fn extract(document: &Document) -> (Vec<Xref>, Vec<Diagnostic>) {
    let mut xrefs = Vec::new();
    let mut diagnostics = Vec::new();

    for section in &document.sections {
        for block in &section.blocks {
            let text = block.text_content();
            scan_text(&text, section, document, &mut xrefs, &mut diagnostics);
        }
    }

    (xrefs, diagnostics)
}

fn scan_text(
    text: &str,
    section: &crate::core::document::Section,
    document: &Document,
    xrefs: &mut Vec<Xref>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let location = || Location {
        path: Some(document.source_path.clone()),
        section: (!section.heading.is_empty()).then(|| section.heading.clone()),
        line: None,
    };

    for (offset, _) in text.match_indices("xref:") {
        let rest = &text[offset..];

        // External first: its locator shape is a superset of nothing the
        // internal grammar accepts, but try the more specific form first.
        if let Some(cap) = external_re().captures(rest) {
            let version = cap.get(4).map(|m| m.as_str().to_string());
            if let Some(v) = &version {
                let bare = v.strip_prefix('v').unwrap_or(v);
                if !is_semver(bare) {
                    diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticKind::ReferenceSyntax,
                            format!("malformed reference version '{v}' in `{}`", &cap[0]),
                        )
                        .at(location()),
                    );
                    continue;
                }
            }
            xrefs.push(Xref {
                target: XrefTarget::External {
                    locator: cap[1].to_string(),
                    doc_type: cap[2].to_string(),
                    id: cap[3].to_string(),
                    version,
                },
                fragment: cap.get(5).map(|m| m.as_str().to_string()),
                link_text: cap
                    .get(6)
                    .map(|m| m.as_str().to_string())
                    .filter(|t| !t.is_empty()),
                location: location(),
            });
            continue;
        }

        if let Some(cap) = internal_re().captures(rest) {
            xrefs.push(Xref {
                target: XrefTarget::Internal {
                    doc_type: cap[1].to_string(),
                    id: cap[2].to_string(),
                },
                fragment: cap.get(3).map(|m| m.as_str().to_string()),
                link_text: cap
                    .get(4)
                    .map(|m| m.as_str().to_string())
                    .filter(|t| !t.is_empty()),
                location: location(),
            });
            continue;
        }

        let token: String = rest.chars().take_while(|c| !c.is_whitespace()).collect();
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::ReferenceSyntax,
                format!("malformed reference `{token}`"),
            )
            .at(location()),
        );
    }
}

/// Resolve internal references against the frozen registry.
///
/// A missing target id is a broken-reference error attributed to the
/// referencing document. An id present only under other document types
/// is a type-mismatch warning. External references resolve to nothing.
pub fn resolve(xrefs: &[Xref], registry: &IdentifierRegistry) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for xref in xrefs {
        let XrefTarget::Internal { doc_type, id } = &xref.target else {
            continue;
        };

        let Some(occurrences) = registry.lookup(id) else {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticKind::BrokenReference,
                    format!("reference to unknown id '{id}' (as {doc_type})"),
                )
                .at(xref.location.clone()),
            );
            continue;
        };

        let type_matches = occurrences
            .iter()
            .any(|occ| occ.doc_type.as_deref() == Some(doc_type.as_str()));
        if !type_matches {
            let actual: Vec<&str> = occurrences
                .iter()
                .filter_map(|occ| occ.doc_type.as_deref())
                .collect();
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "reference to '{id}' as {doc_type}, but the id belongs to {}",
                        if actual.is_empty() {
                            "a document with no declared type".to_string()
                        } else {
                            actual.join(", ")
                        }
                    ),
                )
                .at(xref.location.clone()),
            );
        }
    }

    diagnostics
}
