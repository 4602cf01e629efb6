//! Corpus Pipeline
//!
//! Two passes over the whole document set. Pass one parses and
//! structurally validates each file independently, in parallel, and
//! extracts its references. Pass two runs serially: it registers every
//! declared id, freezes the registry, then resolves all references
//! against the frozen table. No resolution result can depend on file
//! order.

use std::path::PathBuf;

use log::debug;
use rayon::prelude::*;

use crate::config::Rules;
use crate::core::diagnostics::{
    Diagnostic, DiagnosticKind, DocumentReport, Location, RunReport, aggregate,
};
use crate::parser;
use crate::registry::{IdentifierRegistry, is_valid_id};
use crate::schema::SchemaRegistry;
use crate::validation::validate_document;
use crate::xref::{self, Xref};

/// One file to lint: path for attribution, text already read.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

/// Everything pass one produces for a single file.
struct DocumentOutcome {
    report: DocumentReport,
    /// Declared id plus type, registered in pass two.
    declared: Option<(String, Option<String>)>,
    xrefs: Vec<Xref>,
}

/// Lint a corpus end to end and aggregate the report.
pub fn lint_corpus(files: &[SourceFile], schemas: &SchemaRegistry, rules: &Rules) -> RunReport {
    debug!("pass one: {} files", files.len());
    let outcomes: Vec<DocumentOutcome> = files
        .par_iter()
        .map(|file| lint_file(file, schemas, rules))
        .collect();

    debug!("pass two: registering ids and resolving references");
    let mut registry = IdentifierRegistry::new();
    for outcome in &outcomes {
        if let Some((id, doc_type)) = &outcome.declared {
            registry.register(id, doc_type.clone(), &outcome.report.path);
        }
    }

    let mut corpus_diagnostics = Vec::new();
    if rules.check_id_uniqueness {
        corpus_diagnostics.extend(registry.duplicate_diagnostics());
    }
    if rules.validate_references {
        for outcome in &outcomes {
            corpus_diagnostics.extend(xref::resolve(&outcome.xrefs, &registry));
        }
    }

    aggregate(
        outcomes.into_iter().map(|o| o.report).collect(),
        corpus_diagnostics,
    )
}

fn lint_file(file: &SourceFile, schemas: &SchemaRegistry, rules: &Rules) -> DocumentOutcome {
    let (document, mut diagnostics) = match parser::parse_document(&file.text, &file.path) {
        Ok(parsed) => parsed,
        Err(err) => {
            return DocumentOutcome {
                report: DocumentReport {
                    path: file.path.clone(),
                    doc_type: None,
                    doc_id: None,
                    diagnostics: vec![
                        Diagnostic::error(DiagnosticKind::Parse, err.to_string())
                            .at(Location::at_path(&file.path)),
                    ],
                },
                declared: None,
                xrefs: Vec::new(),
            };
        }
    };

    let doc_type = document.doc_type().map(str::to_string);
    let doc_id = document.id().map(str::to_string);

    if rules.require_id {
        match &doc_id {
            None => diagnostics.push(
                Diagnostic::error(
                    DiagnosticKind::Structure,
                    "missing required attribute ':id:'",
                )
                .at(Location::at_path(&file.path)),
            ),
            Some(id) if !is_valid_id(id) => diagnostics.push(
                Diagnostic::error(
                    DiagnosticKind::Structure,
                    format!("id '{id}' must be lowercase alphanumerics and hyphens"),
                )
                .at(Location::at_path(&file.path)),
            ),
            Some(_) => {}
        }
    }

    if rules.enforce_structure {
        match &doc_type {
            None => diagnostics.push(
                Diagnostic::error(
                    DiagnosticKind::UnknownType,
                    "missing required attribute ':forgepoint-type:'",
                )
                .at(Location::at_path(&file.path)),
            ),
            Some(name) => match schemas.schema_for(name) {
                Some(schema) => {
                    for diag in validate_document(&document, schema) {
                        diagnostics.push(attribute_path(diag, &file.path));
                    }
                }
                None => diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::UnknownType,
                        format!("unknown document type '{name}'"),
                    )
                    .at(Location::at_path(&file.path)),
                ),
            },
        }
    }

    let xrefs = if rules.validate_references {
        let (xrefs, syntax_diags) = xref::extract(&document);
        diagnostics.extend(syntax_diags);
        xrefs
    } else {
        Vec::new()
    };

    DocumentOutcome {
        report: DocumentReport {
            path: file.path.clone(),
            doc_type,
            doc_id: doc_id.clone(),
            diagnostics,
        },
        // Registration is unconditional so resolution and uniqueness see
        // every declared id, whatever its format.
        declared: doc_id.map(|id| (id, document.doc_type().map(str::to_string))),
        xrefs,
    }
}

fn attribute_path(mut diag: Diagnostic, path: &std::path::Path) -> Diagnostic {
    if diag.location.path.is_none() {
        diag.location.path = Some(path.to_path_buf());
    }
    diag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;

    fn file(name: &str, text: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(name),
            text: text.to_string(),
        }
    }

    fn story(id: &str, extra: &str) -> String {
        format!(
            "= Story {id}\n:forgepoint-type: story\n:id: {id}\n\
             :schema-version: 1.0\n:status: draft\n\n\
             == Narrative\n\nAs a user.\n\n== Acceptance Criteria\n\n* [ ] works\n{extra}"
        )
    }

    fn lint(files: &[SourceFile]) -> RunReport {
        lint_corpus(files, &SchemaRegistry::embedded(), &Rules::default())
    }

    #[test]
    fn test_clean_corpus() {
        let report = lint(&[
            file("a.adoc", &story("story-a", "")),
            file("b.adoc", &story("story-b", "\nSee xref:story:story-a[].\n")),
        ]);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.warning_count, 0);
        assert!(report.is_clean(false));
    }

    #[test]
    fn test_unparsable_file_isolated() {
        let report = lint(&[
            file("bad.adoc", "no title here\n"),
            file("good.adoc", &story("story-a", "")),
        ]);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.documents[0].diagnostics[0].kind, DiagnosticKind::Parse);
        assert!(report.documents[1].is_valid());
    }

    #[test]
    fn test_reports_keep_input_order() {
        let files: Vec<SourceFile> = (0..16)
            .map(|i| file(&format!("doc-{i:02}.adoc"), &story(&format!("story-{i}"), "")))
            .collect();
        let report = lint(&files);
        let paths: Vec<_> = report.documents.iter().map(|d| d.path.clone()).collect();
        let expected: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_duplicate_ids_reported_per_document() {
        let report = lint(&[
            file("a.adoc", &story("shared", "")),
            file("b.adoc", &story("shared", "")),
        ]);
        let dups: Vec<_> = report
            .corpus_diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::DuplicateId)
            .collect();
        assert_eq!(dups.len(), 2);

        let a = dups
            .iter()
            .find(|d| d.location.path.as_deref() == Some(std::path::Path::new("a.adoc")))
            .expect("diagnostic attributed to a.adoc");
        assert!(a.message.contains("b.adoc"));
        let b = dups
            .iter()
            .find(|d| d.location.path.as_deref() == Some(std::path::Path::new("b.adoc")))
            .expect("diagnostic attributed to b.adoc");
        assert!(b.message.contains("a.adoc"));
    }

    #[test]
    fn test_broken_reference_attributed_to_referencing_doc() {
        let report = lint(&[file(
            "a.adoc",
            &story("story-a", "\nSee xref:story:nowhere[].\n"),
        )]);
        let broken = report
            .corpus_diagnostics
            .iter()
            .find(|d| d.kind == DiagnosticKind::BrokenReference)
            .unwrap();
        assert_eq!(
            broken.location.path.as_deref(),
            Some(PathBuf::from("a.adoc").as_path())
        );
    }

    #[test]
    fn test_missing_type_is_unknown_type() {
        let report = lint(&[file("a.adoc", "= T\n:id: t\n\n== S\n\nx\n")]);
        assert!(
            report.documents[0]
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnknownType)
        );
    }

    #[test]
    fn test_rules_disable_components() {
        let a = file("a.adoc", "= T\n\n== S\n\nxref:story:nowhere[] and xref:bad\n");
        let b = file("b.adoc", "= U\n:id: t\n\n== S\n\nx\n");

        let rules = Rules {
            require_id: false,
            enforce_structure: false,
            validate_references: false,
            check_id_uniqueness: false,
        };
        let report = lint_corpus(&[a, b], &SchemaRegistry::embedded(), &rules);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.warning_count, 0);
    }

    #[test]
    fn test_invalid_id_format_flagged_but_registered() {
        let text = "= T\n:forgepoint-type: spike\n:id: Bad_Id\n\
                    :schema-version: 1.0\n:status: draft\n\n== Question\n\nWhy?\n";
        let dup = text.to_string();
        let report = lint(&[file("a.adoc", text), file("b.adoc", &dup)]);

        assert!(
            report.documents[0]
                .diagnostics
                .iter()
                .any(|d| d.message.contains("lowercase"))
        );
        // Both declare the same malformed id; uniqueness still sees it.
        assert!(
            report
                .corpus_diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::DuplicateId)
        );
    }

    #[test]
    fn test_syntax_warning_does_not_fail_run() {
        let report = lint(&[file(
            "a.adoc",
            &story("story-a", "\nBroken xref:Nope here.\n"),
        )]);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.warning_count, 1);
        assert!(report.is_clean(false));
        assert!(!report.is_clean(true));
        assert!(
            report.documents[0]
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::ReferenceSyntax
                    && d.severity == Severity::Warning)
        );
    }
}
