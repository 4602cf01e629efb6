//! Type Schema Definitions
//!
//! Declarative rule records for the 37 document types. One generic
//! validator interprets these tables; there is no per-type code path.

use regex::Regex;
use serde::Deserialize;

/// Root schema catalogue file structure (matches TOML).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SchemaFile {
    pub registry: RegistryMeta,
    #[serde(default)]
    pub common: CommonRules,
    pub types: Vec<TypeSchemaDef>,
}

/// Catalogue metadata.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegistryMeta {
    pub name: String,
    pub version: Option<String>,
}

/// Rules shared by every document type in the file, merged into each
/// type at load so schemas stay declarative without 37-fold repetition.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CommonRules {
    #[serde(default)]
    pub attributes: Vec<AttributeRule>,
}

/// One document type as written in the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TypeSchemaDef {
    pub name: String,
    pub display: String,
    pub category: Category,
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeRule>,
    #[serde(default)]
    pub sections: Vec<SectionRule>,
}

/// Lifecycle category a document type belongs to.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Discovery,
    Design,
    Development,
    Testing,
    Release,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Discovery,
        Category::Design,
        Category::Development,
        Category::Testing,
        Category::Release,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Discovery => "discovery",
            Category::Design => "design",
            Category::Development => "development",
            Category::Testing => "testing",
            Category::Release => "release",
        }
    }
}

/// Runtime schema for one document type, common rules merged in.
/// Immutable process-wide configuration after load.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    pub name: String,
    pub display: String,
    pub category: Category,
    pub description: Option<String>,
    /// Common attributes first, then type-specific, in declared order.
    /// A type-specific rule with the same name replaces the common one.
    pub attributes: Vec<AttributeRule>,
    pub sections: Vec<SectionRule>,
}

impl TypeSchema {
    /// Merge a type definition with the file's common rules.
    pub fn from_def(def: TypeSchemaDef, common: &CommonRules) -> Self {
        let mut attributes: Vec<AttributeRule> = common.attributes.clone();
        for rule in def.attributes {
            if let Some(existing) = attributes.iter_mut().find(|a| a.name == rule.name) {
                *existing = rule;
            } else {
                attributes.push(rule);
            }
        }

        Self {
            name: def.name,
            display: def.display,
            category: def.category,
            description: def.description,
            attributes,
            sections: def.sections,
        }
    }
}

/// Rule for one header attribute.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AttributeRule {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    pub constraint: Option<ValueConstraint>,
}

impl AttributeRule {
    /// Validate a present value. Presence itself is the validator's job.
    pub fn check(&self, value: &str) -> Result<(), String> {
        match &self.constraint {
            None | Some(ValueConstraint::Text) => Ok(()),
            Some(constraint) => constraint.check(&self.name, value),
        }
    }
}

/// Constraint on an attribute's value.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ValueConstraint {
    /// Free text, always valid.
    Text,
    /// Exact membership in a fixed value set.
    Enum { values: Vec<String> },
    /// Full-match regular expression.
    Pattern { pattern: String },
    /// Semantic version `MAJOR.MINOR[.PATCH]`.
    Semver,
}

impl ValueConstraint {
    /// Human-readable form for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ValueConstraint::Text => "free text".to_string(),
            ValueConstraint::Enum { values } => format!("one of: {}", values.join(", ")),
            ValueConstraint::Pattern { pattern } => format!("matching `{pattern}`"),
            ValueConstraint::Semver => "a semantic version (MAJOR.MINOR[.PATCH])".to_string(),
        }
    }

    fn check(&self, name: &str, value: &str) -> Result<(), String> {
        match self {
            ValueConstraint::Text => Ok(()),
            ValueConstraint::Enum { values } => {
                if values.iter().any(|v| v == value) {
                    Ok(())
                } else {
                    Err(format!(
                        "attribute '{name}' value '{value}' not {}",
                        self.describe()
                    ))
                }
            }
            ValueConstraint::Pattern { pattern } => {
                let anchored = format!("^(?:{pattern})$");
                let re = Regex::new(&anchored)
                    .map_err(|e| format!("attribute '{name}' has an invalid schema pattern: {e}"))?;
                if re.is_match(value) {
                    Ok(())
                } else {
                    Err(format!(
                        "attribute '{name}' value '{value}' does not match `{pattern}`"
                    ))
                }
            }
            ValueConstraint::Semver => {
                if is_semver(value) {
                    Ok(())
                } else {
                    Err(format!(
                        "attribute '{name}' value '{value}' is not a semantic version"
                    ))
                }
            }
        }
    }
}

/// `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`, digits only.
pub fn is_semver(value: &str) -> bool {
    let mut parts = value.split('.');
    let count = value.split('.').count();
    if !(2..=3).contains(&count) {
        return false;
    }
    parts.all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Rule for one section heading.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SectionRule {
    /// Exact heading text, case-sensitive.
    pub heading: String,
    #[serde(default)]
    pub required: bool,
    pub shape: Option<SectionShape>,
}

/// Shape constraint attached to a section rule. Checked only when the
/// section itself is present.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SectionShape {
    /// Total checklist item count across the section's checklist blocks.
    Checklist { min_items: usize, max_items: usize },
    /// At least one `[source,gherkin]` code block, with well-formed outlines.
    Gherkin,
    /// At least one `|===` table.
    Table,
}
