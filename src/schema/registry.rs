//! Schema Registry
//!
//! Holds every known document type schema, keyed by type name. Built
//! once at startup and never mutated afterwards, so lookups during
//! validation are read-only and safe to share across worker threads.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{debug, info};

use super::types::{SchemaFile, TypeSchema};

/// The built-in catalogue, compiled into the binary.
const EMBEDDED_CATALOGUE: &str = include_str!("../../resources/schemas/forgepoint.toml");

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, TypeSchema>,
    /// Declaration order, for stable `list-types` output.
    order: Vec<String>,
}

impl SchemaRegistry {
    /// Load the embedded catalogue. The embedded file is validated by
    /// the test suite, so a parse failure here is a build defect.
    pub fn embedded() -> Self {
        let mut registry = Self {
            schemas: HashMap::new(),
            order: Vec::new(),
        };
        registry
            .add_catalogue_str(EMBEDDED_CATALOGUE, "<embedded>")
            .expect("embedded schema catalogue is well-formed");
        debug!("loaded {} embedded type schemas", registry.len());
        registry
    }

    /// Load schemas from a `.toml` file, or from every `.toml` file in a
    /// directory. Later files override earlier types with the same name.
    ///
    /// # Errors
    ///
    /// Fails on unreadable paths or malformed catalogue files.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut registry = Self {
            schemas: HashMap::new(),
            order: Vec::new(),
        };
        registry.load_path(path)?;
        if registry.schemas.is_empty() {
            bail!("no type schemas found under {}", path.display());
        }
        Ok(registry)
    }

    fn load_path(&mut self, path: &Path) -> Result<()> {
        if path.is_dir() {
            let mut entries: Vec<_> = std::fs::read_dir(path)
                .with_context(|| format!("reading schema directory {}", path.display()))?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
                .collect();
            entries.sort();
            for entry in entries {
                self.load_file(&entry)?;
            }
            Ok(())
        } else {
            self.load_file(path)
        }
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading schema file {}", path.display()))?;
        self.add_catalogue_str(&text, &path.display().to_string())?;
        info!("loaded schema catalogue from {}", path.display());
        Ok(())
    }

    fn add_catalogue_str(&mut self, text: &str, origin: &str) -> Result<()> {
        let file: SchemaFile = toml::from_str(text)
            .with_context(|| format!("parsing schema catalogue {origin}"))?;
        for def in file.types {
            let schema = TypeSchema::from_def(def, &file.common);
            if !self.schemas.contains_key(&schema.name) {
                self.order.push(schema.name.clone());
            }
            self.schemas.insert(schema.name.clone(), schema);
        }
        Ok(())
    }

    pub fn schema_for(&self, doc_type: &str) -> Option<&TypeSchema> {
        self.schemas.get(doc_type)
    }

    pub fn contains(&self, doc_type: &str) -> bool {
        self.schemas.contains_key(doc_type)
    }

    /// Schemas in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeSchema> {
        self.order.iter().filter_map(|name| self.schemas.get(name))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{Category, SectionShape, ValueConstraint};

    #[test]
    fn test_embedded_catalogue_loads() {
        let registry = SchemaRegistry::embedded();
        assert_eq!(registry.len(), 37);
    }

    #[test]
    fn test_embedded_catalogue_covers_all_categories() {
        let registry = SchemaRegistry::embedded();
        for category in Category::ALL {
            assert!(
                registry.types().any(|s| s.category == category),
                "no types in category {}",
                category.as_str()
            );
        }
    }

    #[test]
    fn test_common_attributes_merged_into_every_type() {
        let registry = SchemaRegistry::embedded();
        for schema in registry.types() {
            let version = schema
                .attributes
                .iter()
                .find(|a| a.name == "schema-version")
                .unwrap_or_else(|| panic!("{} lacks schema-version", schema.name));
            assert!(version.required);
            assert_eq!(version.constraint, Some(ValueConstraint::Semver));
        }
    }

    #[test]
    fn test_okr_key_results_checklist_bounds() {
        let registry = SchemaRegistry::embedded();
        let okr = registry.schema_for("okr").expect("okr schema");
        let key_results = okr
            .sections
            .iter()
            .find(|s| s.heading == "Key Results")
            .expect("Key Results section rule");
        assert!(key_results.required);
        assert_eq!(
            key_results.shape,
            Some(SectionShape::Checklist {
                min_items: 1,
                max_items: 5
            })
        );
    }

    #[test]
    fn test_declaration_order_is_stable() {
        let registry = SchemaRegistry::embedded();
        let names: Vec<_> = registry.types().map(|s| s.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"prfaq"));
        assert!(names.contains(&"story"));
        assert!(names.contains(&"support-playbook"));
    }

    #[test]
    fn test_unknown_type_lookup() {
        let registry = SchemaRegistry::embedded();
        assert!(registry.schema_for("banana").is_none());
    }

    #[test]
    fn test_from_path_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.toml");
        std::fs::write(
            &path,
            r#"
[registry]
name = "extra"

[[types]]
name = "memo"
display = "Memo"
category = "discovery"
"#,
        )
        .unwrap();
        let registry = SchemaRegistry::from_path(&path).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("memo"));
    }
}
