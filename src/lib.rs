//! Forgepoint
//!
//! A linter for corpora of structured AsciiDoc documents following the
//! Forgepoint convention: typed documents (`:forgepoint-type:`) with
//! unique ids, schema-driven structural rules, and `xref:` references
//! resolved across the whole corpus.
//!
//! The library surface is the corpus pipeline:
//!
//! ```no_run
//! use forgepoint::config::Rules;
//! use forgepoint::corpus::{SourceFile, lint_corpus};
//! use forgepoint::schema::SchemaRegistry;
//!
//! let files = vec![SourceFile {
//!     path: "story.adoc".into(),
//!     text: std::fs::read_to_string("story.adoc").unwrap(),
//! }];
//! let report = lint_corpus(&files, &SchemaRegistry::embedded(), &Rules::default());
//! assert!(report.is_clean(false));
//! ```

pub mod config;
pub mod core;
pub mod corpus;
pub mod format;
pub mod parser;
pub mod registry;
pub mod scan;
pub mod schema;
pub mod template;
pub mod validation;
pub mod xref;

pub use crate::config::{Config, Rules};
pub use crate::core::{Diagnostic, DiagnosticKind, DocumentReport, RunReport, Severity};
pub use crate::corpus::{SourceFile, lint_corpus};
pub use crate::schema::SchemaRegistry;
