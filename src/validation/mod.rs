//! Structural Validation
//!
//! Checks one parsed document against its type schema: attribute
//! presence and value constraints, required sections, and section
//! shape constraints.

pub mod engine;

pub use engine::validate_document;
