//! Core Data Model
//!
//! Document structure and diagnostic types shared by every engine component.

pub mod diagnostics;
pub mod document;

pub use diagnostics::{Diagnostic, DiagnosticKind, DocumentReport, RunReport, Severity};
pub use document::{AttributeMap, Block, ChecklistItem, Document, Section};
