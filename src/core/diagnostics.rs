//! Diagnostic Model
//!
//! Findings, per-document reports, and the pure corpus-level merge.
//! Every condition the engine detects becomes a collected value here;
//! nothing in the engine aborts the run with an error.

use std::path::PathBuf;

use serde::Serialize;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// The taxonomy of findings the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Document could not be parsed into a model at all.
    Parse,
    /// Missing/invalid required attribute, missing required section,
    /// or a failed section shape constraint.
    Structure,
    /// `forgepoint-type` missing or not present in the schema registry.
    UnknownType,
    /// Malformed xref token text; the occurrence is dropped from resolution.
    ReferenceSyntax,
    /// Internal xref whose target id is absent from the corpus.
    BrokenReference,
    /// Internal xref whose target id exists under a different document type.
    TypeMismatch,
    /// Same id registered by two or more documents.
    DuplicateId,
}

/// Optional context for a finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Location {
    pub fn in_section(section: &str) -> Self {
        Self {
            section: Some(section.to_string()),
            ..Self::default()
        }
    }

    pub fn at_path(path: &std::path::Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        }
    }
}

/// One reported finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            location: Location::default(),
            message: message.into(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            location: Location::default(),
            message: message.into(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// Findings for a single source file, in validator order.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub doc_type: Option<String>,
    pub doc_id: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }
}

/// Aggregate of one whole run: per-document reports in discovery order,
/// then corpus-level findings grouped by kind, plus summary counts.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub documents: Vec<DocumentReport>,
    pub corpus_diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl RunReport {
    /// Whether the run should exit zero: warnings alone never fail a run
    /// unless promoted by `fail_on_warnings`.
    pub fn is_clean(&self, fail_on_warnings: bool) -> bool {
        self.error_count == 0 && !(fail_on_warnings && self.warning_count > 0)
    }
}

/// Pure merge of both passes into the final report.
///
/// Documents keep their discovery order. Corpus diagnostics are appended
/// after all per-document diagnostics, grouped by kind: duplicate ids first,
/// then broken references, then type mismatches, each group preserving the
/// order it was produced in.
pub fn aggregate(documents: Vec<DocumentReport>, corpus: Vec<Diagnostic>) -> RunReport {
    let mut grouped = Vec::with_capacity(corpus.len());
    for kind in [
        DiagnosticKind::DuplicateId,
        DiagnosticKind::BrokenReference,
        DiagnosticKind::TypeMismatch,
    ] {
        grouped.extend(corpus.iter().filter(|d| d.kind == kind).cloned());
    }
    // Anything outside the expected corpus kinds still surfaces at the end.
    grouped.extend(
        corpus
            .iter()
            .filter(|d| {
                !matches!(
                    d.kind,
                    DiagnosticKind::DuplicateId
                        | DiagnosticKind::BrokenReference
                        | DiagnosticKind::TypeMismatch
                )
            })
            .cloned(),
    );

    let count = |severity: Severity| {
        documents
            .iter()
            .flat_map(|doc| doc.diagnostics.iter())
            .chain(grouped.iter())
            .filter(|d| d.severity == severity)
            .count()
    };

    let error_count = count(Severity::Error);
    let warning_count = count(Severity::Warning);

    RunReport {
        documents,
        corpus_diagnostics: grouped,
        error_count,
        warning_count,
    }
}
