//! Validation Engine
//!
//! One generic interpreter of type schema data. Diagnostics come out in
//! schema order: attribute rules first, then section rules, each with
//! nested shape findings directly after the owning section's findings.

use crate::core::diagnostics::{Diagnostic, DiagnosticKind, Location};
use crate::core::document::{Block, Document, Section};
use crate::schema::types::{SectionShape, TypeSchema};

/// Validate one document against its schema. Pure function of its
/// inputs; the registry lookup and id rules live with the caller.
pub fn validate_document(document: &Document, schema: &TypeSchema) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for rule in &schema.attributes {
        match document.attributes.get(&rule.name) {
            None => {
                if rule.required {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticKind::Structure,
                        format!("missing required attribute ':{}:'", rule.name),
                    ));
                }
            }
            Some(value) if value.is_empty() => {
                if rule.required {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticKind::Structure,
                        format!("required attribute ':{}:' is empty", rule.name),
                    ));
                }
            }
            Some(value) => {
                if let Err(message) = rule.check(value) {
                    diagnostics.push(Diagnostic::error(DiagnosticKind::Structure, message));
                }
            }
        }
    }

    for rule in &schema.sections {
        let Some(section) = document.section(&rule.heading) else {
            if rule.required {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::Structure,
                    format!("missing required section '{}'", rule.heading),
                ));
            }
            // Shape constraints apply only to sections that exist.
            continue;
        };

        if let Some(shape) = &rule.shape {
            check_shape(section, shape, &mut diagnostics);
        }
    }

    diagnostics
}

fn check_shape(section: &Section, shape: &SectionShape, diagnostics: &mut Vec<Diagnostic>) {
    let location = || Location {
        section: Some(section.heading.clone()),
        line: Some(section.line),
        ..Location::default()
    };

    match shape {
        SectionShape::Checklist {
            min_items,
            max_items,
        } => {
            let count = section.checklist_items().len();
            if count < *min_items || count > *max_items {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::Structure,
                        format!(
                            "section '{}' must contain between {min_items} and {max_items} \
                             checklist items, found {count}",
                            section.heading
                        ),
                    )
                    .at(location()),
                );
            }
        }
        SectionShape::Gherkin => {
            let mut tagged = 0usize;
            for block in section.gherkin_blocks() {
                tagged += 1;
                let Block::Code {
                    gherkin: Some(parsed),
                    ..
                } = block
                else {
                    // Malformed gherkin was already warned about at parse time.
                    continue;
                };
                for outline in parsed.outlines() {
                    let missing = match &outline.examples {
                        None => true,
                        Some(table) => table.is_empty(),
                    };
                    if missing {
                        diagnostics.push(
                            Diagnostic::error(
                                DiagnosticKind::Structure,
                                format!(
                                    "scenario outline '{}' has no Examples rows",
                                    outline.name
                                ),
                            )
                            .at(location()),
                        );
                    }
                }
            }
            if tagged == 0 {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::Structure,
                        format!(
                            "section '{}' must contain at least one gherkin code block",
                            section.heading
                        ),
                    )
                    .at(location()),
                );
            }
        }
        SectionShape::Table => {
            let has_table = section
                .blocks
                .iter()
                .any(|b| matches!(b, Block::Table { .. }));
            if !has_table {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::Structure,
                        format!("section '{}' must contain a table", section.heading),
                    )
                    .at(location()),
                );
            }
        }
    }
}
