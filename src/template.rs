//! Document Scaffolding
//!
//! Generates a starter document from a type schema: header with every
//! required attribute pre-filled, then each required section with a
//! placeholder body matching its shape constraint.

use std::fmt::Write as _;

use crate::schema::types::{SectionShape, TypeSchema, ValueConstraint};

/// Placeholder for a required value the schema gives a usable default for.
fn attribute_placeholder(constraint: Option<&ValueConstraint>) -> String {
    match constraint {
        Some(ValueConstraint::Semver) => "1.0".to_string(),
        Some(ValueConstraint::Enum { values }) => {
            values.first().cloned().unwrap_or_else(|| "TBD".to_string())
        }
        // Date-shaped patterns get a date the schema will accept.
        Some(ValueConstraint::Pattern { pattern }) if pattern.contains(r"\d{4}-\d{2}-\d{2}") => {
            "2025-01-01".to_string()
        }
        Some(ValueConstraint::Pattern { .. }) | Some(ValueConstraint::Text) | None => {
            "TBD".to_string()
        }
    }
}

/// Build the scaffold text for one document.
pub fn scaffold(
    schema: &TypeSchema,
    id: &str,
    title: Option<&str>,
    author: Option<&str>,
) -> String {
    let mut out = String::new();

    let title = title.map(str::to_string).unwrap_or_else(|| {
        format!("{} {}", schema.display, id)
    });
    let _ = writeln!(out, "= {title}");
    let _ = writeln!(out, ":forgepoint-type: {}", schema.name);
    let _ = writeln!(out, ":id: {id}");
    for rule in &schema.attributes {
        if !rule.required {
            continue;
        }
        let _ = writeln!(
            out,
            ":{}: {}",
            rule.name,
            attribute_placeholder(rule.constraint.as_ref())
        );
    }
    if let Some(author) = author {
        let _ = writeln!(out, ":owner: {author}");
    }

    for rule in &schema.sections {
        if !rule.required {
            continue;
        }
        let _ = writeln!(out, "\n== {}", rule.heading);
        let _ = writeln!(out);
        match &rule.shape {
            Some(SectionShape::Checklist { min_items, .. }) => {
                for n in 1..=(*min_items).max(1) {
                    let _ = writeln!(out, "* [ ] item {n}");
                }
            }
            Some(SectionShape::Gherkin) => {
                let _ = writeln!(out, "[source,gherkin]");
                let _ = writeln!(out, "----");
                let _ = writeln!(out, "Feature: {title}");
                let _ = writeln!(out, "  Scenario: describe the behavior");
                let _ = writeln!(out, "    Given a starting state");
                let _ = writeln!(out, "    When something happens");
                let _ = writeln!(out, "    Then the outcome is observed");
                let _ = writeln!(out, "----");
            }
            Some(SectionShape::Table) => {
                let _ = writeln!(out, "|===");
                let _ = writeln!(out, "| Column | Column");
                let _ = writeln!(out, "| value  | value");
                let _ = writeln!(out, "|===");
            }
            None => {
                let _ = writeln!(out, "Write the {} here.", rule.heading.to_lowercase());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;
    use crate::corpus::{SourceFile, lint_corpus};
    use crate::schema::SchemaRegistry;
    use std::path::PathBuf;

    fn scaffold_type(doc_type: &str, id: &str) -> String {
        let registry = SchemaRegistry::embedded();
        let schema = registry.schema_for(doc_type).expect("known type");
        scaffold(schema, id, None, Some("sam"))
    }

    #[test]
    fn test_scaffold_header() {
        let text = scaffold_type("story", "auth-login");
        assert!(text.starts_with("= User Story auth-login\n"));
        assert!(text.contains(":forgepoint-type: story\n"));
        assert!(text.contains(":id: auth-login\n"));
        assert!(text.contains(":schema-version: 1.0\n"));
        assert!(text.contains(":status: draft\n"));
        assert!(text.contains(":owner: sam\n"));
    }

    #[test]
    fn test_scaffold_required_sections_only() {
        let text = scaffold_type("story", "auth-login");
        assert!(text.contains("== Narrative"));
        assert!(text.contains("== Acceptance Criteria"));
        // Scenarios is optional on story, so not scaffolded.
        assert!(!text.contains("== Scenarios"));
    }

    #[test]
    fn test_scaffolds_lint_clean_for_every_type() {
        let registry = SchemaRegistry::embedded();
        let files: Vec<SourceFile> = registry
            .types()
            .enumerate()
            .map(|(i, schema)| SourceFile {
                path: PathBuf::from(format!("{}.adoc", schema.name)),
                text: scaffold(schema, &format!("sample-{i}"), None, None),
            })
            .collect();

        let report = lint_corpus(&files, &registry, &Rules::default());
        assert_eq!(report.error_count, 0, "{:#?}", report.documents);
    }
}
