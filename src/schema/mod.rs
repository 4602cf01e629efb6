//! Schema Catalogue
//!
//! Loading and lookup of document type schemas. The built-in catalogue
//! ships embedded in the binary; additional or replacement catalogues
//! load from TOML files on disk.

pub mod registry;
pub mod types;

pub use registry::SchemaRegistry;
pub use types::{
    AttributeRule, Category, SectionRule, SectionShape, TypeSchema, ValueConstraint,
};
