//! Report Renderers
//!
//! Three renderings of a RunReport: human-readable text, JSON for
//! tooling, and JUnit XML for CI ingestion. Rendering is pure; the CLI
//! decides where the output goes and what the exit code is.

use std::fmt::Write as _;

use anyhow::Result;

use crate::config::OutputFormat;
use crate::core::diagnostics::{Diagnostic, RunReport, Severity};

pub fn render(report: &RunReport, format: OutputFormat, verbose: bool) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, verbose)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Junit => Ok(render_junit(report)),
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

fn format_diagnostic(diag: &Diagnostic) -> String {
    let mut line = format!("  {}: {}", severity_label(diag.severity), diag.message);
    if let Some(section) = &diag.location.section {
        let _ = write!(line, " (section '{section}')");
    }
    if let Some(line_no) = diag.location.line {
        let _ = write!(line, " [line {line_no}]");
    }
    line
}

fn render_text(report: &RunReport, verbose: bool) -> String {
    let mut out = String::new();

    for doc in &report.documents {
        if doc.diagnostics.is_empty() {
            if verbose {
                let _ = writeln!(out, "{}: ok", doc.path.display());
            }
            continue;
        }
        let _ = writeln!(out, "{}:", doc.path.display());
        for diag in &doc.diagnostics {
            let _ = writeln!(out, "{}", format_diagnostic(diag));
        }
    }

    if !report.corpus_diagnostics.is_empty() {
        let _ = writeln!(out, "corpus:");
        for diag in &report.corpus_diagnostics {
            let mut line = format_diagnostic(diag);
            if let Some(path) = &diag.location.path {
                let _ = write!(line, " [{}]", path.display());
            }
            let _ = writeln!(out, "{line}");
        }
    }

    let _ = writeln!(
        out,
        "{} documents checked, {} errors, {} warnings",
        report.documents.len(),
        report.error_count,
        report.warning_count
    );
    out
}

fn render_junit(report: &RunReport) -> String {
    let mut out = String::new();
    let failures: usize = report
        .documents
        .iter()
        .map(|d| d.error_count())
        .sum::<usize>()
        + report
            .corpus_diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
    let tests = report.documents.len() + usize::from(!report.corpus_diagnostics.is_empty());

    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<testsuites><testsuite name="forgepoint" tests="{tests}" failures="{failures}">"#
    );

    for doc in &report.documents {
        let name = xml_escape(&doc.path.display().to_string());
        if doc.diagnostics.is_empty() {
            let _ = writeln!(out, r#"  <testcase name="{name}"/>"#);
            continue;
        }
        let _ = writeln!(out, r#"  <testcase name="{name}">"#);
        for diag in &doc.diagnostics {
            write_junit_finding(&mut out, diag);
        }
        let _ = writeln!(out, "  </testcase>");
    }

    if !report.corpus_diagnostics.is_empty() {
        let _ = writeln!(out, r#"  <testcase name="corpus">"#);
        for diag in &report.corpus_diagnostics {
            write_junit_finding(&mut out, diag);
        }
        let _ = writeln!(out, "  </testcase>");
    }

    let _ = writeln!(out, "</testsuite></testsuites>");
    out
}

fn write_junit_finding(out: &mut String, diag: &Diagnostic) {
    let tag = match diag.severity {
        Severity::Error => "failure",
        Severity::Warning => "skipped",
    };
    let _ = writeln!(
        out,
        r#"    <{tag} message="{}"/>"#,
        xml_escape(&diag.message)
    );
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
