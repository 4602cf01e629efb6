//! Schema-driven structural validation through the library API.

use std::path::PathBuf;

use forgepoint::config::Rules;
use forgepoint::corpus::{SourceFile, lint_corpus};
use forgepoint::schema::SchemaRegistry;
use forgepoint::{DiagnosticKind, RunReport, Severity};

fn lint_one(text: &str) -> RunReport {
    let files = [SourceFile {
        path: PathBuf::from("doc.adoc"),
        text: text.to_string(),
    }];
    lint_corpus(&files, &SchemaRegistry::embedded(), &Rules::default())
}

fn okr_with_key_results(items: usize) -> String {
    let checklist: String = (0..items)
        .map(|i| format!("* [ ] key result {i}\n"))
        .collect();
    format!(
        "= Q3 Goals\n:forgepoint-type: okr\n:id: q3-goals\n\
         :schema-version: 1.0\n:status: draft\n\n\
         == Objective\n\nGrow activation.\n\n== Key Results\n\n{checklist}"
    )
}

#[test]
fn okr_key_results_bounds() {
    for (items, ok) in [(0, false), (1, true), (5, true), (6, false)] {
        let report = lint_one(&okr_with_key_results(items));
        assert_eq!(
            report.error_count == 0,
            ok,
            "{items} key results should be {}",
            if ok { "accepted" } else { "rejected" }
        );
    }
}

#[test]
fn missing_required_section_reported_exactly_once() {
    let report = lint_one(
        "= Q3 Goals\n:forgepoint-type: okr\n:id: q3-goals\n\
         :schema-version: 1.0\n:status: draft\n\n\
         == Objective\n\nGrow activation.\n",
    );
    let matching: Vec<_> = report.documents[0]
        .diagnostics
        .iter()
        .filter(|d| d.message.contains("'Key Results'"))
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].severity, Severity::Error);
}

#[test]
fn unknown_type_reported_against_the_catalogue() {
    let report = lint_one(
        "= T\n:forgepoint-type: whitepaper\n:id: t\n\
         :schema-version: 1.0\n:status: draft\n\n== S\n\nx\n",
    );
    let unknown = report.documents[0]
        .diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::UnknownType)
        .expect("unknown type reported");
    assert!(unknown.message.contains("whitepaper"));
}

#[test]
fn outline_with_unreferenced_examples_parses_but_warns() {
    let report = lint_one(
        "= Lockout Case\n:forgepoint-type: test-case\n:id: lockout-case\n\
         :schema-version: 1.0\n:status: draft\n\n== Scenarios\n\n\
         [source,gherkin]\n----\n\
         Feature: Lockout\n\
           Scenario Outline: Repeated failures\n\
             When the user fails five times\n\
             Then the account locks\n\
         \n\
           Examples:\n\
             | attempts |\n\
             | 5        |\n\
         ----\n",
    );

    assert_eq!(report.error_count, 0);
    assert_eq!(report.warning_count, 1);
    let warning = &report.documents[0].diagnostics[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert!(warning.message.contains("'attempts'"));
    assert_eq!(warning.location.section.as_deref(), Some("Scenarios"));
}

#[test]
fn outline_without_examples_is_a_validation_error() {
    let report = lint_one(
        "= Lockout Case\n:forgepoint-type: test-case\n:id: lockout-case\n\
         :schema-version: 1.0\n:status: draft\n\n== Scenarios\n\n\
         [source,gherkin]\n----\n\
         Feature: Lockout\n\
           Scenario Outline: Repeated failures\n\
             When the user fails <attempts> times\n\
         ----\n",
    );
    assert_eq!(report.error_count, 1);
    assert!(
        report.documents[0]
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error && d.message.contains("no Examples rows"))
    );
}

#[test]
fn attribute_constraints_enforced_per_schema() {
    // release-notes requires a semver release-version.
    let report = lint_one(
        "= v2 Notes\n:forgepoint-type: release-notes\n:id: v2-notes\n\
         :schema-version: 1.0\n:status: approved\n:release-version: two-point-oh\n\n\
         == Highlights\n\nFaster.\n",
    );
    assert!(
        report.documents[0]
            .diagnostics
            .iter()
            .any(|d| d.message.contains("release-version"))
    );

    // bug-report severity is a closed enum.
    let report = lint_one(
        "= Crash\n:forgepoint-type: bug-report\n:id: crash-on-save\n\
         :schema-version: 1.0\n:status: draft\n:severity: catastrophic\n\n\
         == Steps to Reproduce\n\nSave.\n\n== Expected Behavior\n\nNo crash.\n\n\
         == Actual Behavior\n\nCrash.\n",
    );
    assert!(
        report.documents[0]
            .diagnostics
            .iter()
            .any(|d| d.message.contains("'severity'"))
    );
}

#[test]
fn disabling_structure_enforcement_removes_all_structural_diagnostics() {
    let rules = Rules {
        enforce_structure: false,
        ..Rules::default()
    };
    let files = [SourceFile {
        path: PathBuf::from("doc.adoc"),
        text: okr_with_key_results(0),
    }];
    let report = lint_corpus(&files, &SchemaRegistry::embedded(), &rules);
    assert_eq!(report.error_count, 0);
}

#[test]
fn every_catalogue_type_is_exercisable() {
    let registry = SchemaRegistry::embedded();
    assert_eq!(registry.types().count(), 37);
    for schema in registry.types() {
        // Omitting every attribute and section must flag each required rule.
        let text = format!(
            "= Empty {}\n:forgepoint-type: {}\n:id: empty-{}\n\n== Placeholder\n\nx\n",
            schema.name, schema.name, schema.name
        );
        let files = [SourceFile {
            path: PathBuf::from("doc.adoc"),
            text,
        }];
        let report = lint_corpus(&files, &registry, &Rules::default());
        let required = schema.attributes.iter().filter(|a| a.required).count()
            + schema.sections.iter().filter(|s| s.required).count();
        assert_eq!(
            report.error_count, required,
            "type {} reported {} errors for {} required rules",
            schema.name, report.error_count, required
        );
    }
}
