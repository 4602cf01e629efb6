//! Document Model
//!
//! Pure data representation of a parsed Forgepoint document.
//! No validation logic - the validator interprets this structure
//! against a type schema.

use std::path::PathBuf;

use serde::Serialize;

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Title from the top-level `= ` heading.
    pub title: String,
    /// Header attributes, insertion order preserved.
    pub attributes: AttributeMap,
    /// Sections in document order.
    pub sections: Vec<Section>,
    /// Where the document came from. Diagnostics only, never semantics.
    pub source_path: PathBuf,
}

impl Document {
    /// The `:forgepoint-type:` attribute, if present.
    pub fn doc_type(&self) -> Option<&str> {
        self.attributes.get("forgepoint-type")
    }

    /// The `:id:` attribute, if present.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id")
    }

    /// Find a section by exact heading text.
    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

/// A heading-delimited region of the document body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Heading text without the `==` marker.
    pub heading: String,
    /// Nesting depth: `==` is level 2, `===` level 3, and so on.
    pub level: usize,
    /// Blocks in section order.
    pub blocks: Vec<Block>,
    /// One-based line number of the heading.
    pub line: usize,
}

impl Section {
    /// All checklist items in this section, across every checklist block.
    pub fn checklist_items(&self) -> Vec<&ChecklistItem> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Checklist(items) => Some(items.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Gherkin blocks in this section (code blocks tagged `gherkin`).
    pub fn gherkin_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| {
            matches!(b, Block::Code { language: Some(lang), .. } if lang == "gherkin")
        })
    }
}

/// A content block inside a section, recognized by its leading marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    /// Default block type: contiguous non-empty lines.
    Paragraph { text: String },
    /// Consecutive `* [ ]` / `* [x]` lines.
    Checklist(Vec<ChecklistItem>),
    /// `[source,lang]` + `----` delimited listing. When the language tag is
    /// `gherkin` and the content parses, the structured form is attached.
    Code {
        language: Option<String>,
        text: String,
        gherkin: Option<crate::parser::gherkin::GherkinBlock>,
    },
    /// `|===` delimited table, one row per `|`-prefixed line.
    Table { rows: Vec<Vec<String>> },
    /// `NOTE:` / `TIP:` / `IMPORTANT:` / `WARNING:` / `CAUTION:` line.
    Admonition { kind: AdmonitionKind, text: String },
}

impl Block {
    /// Raw text content for xref scanning. Every block kind can carry
    /// references, including table cells and checklist item text.
    pub fn text_content(&self) -> String {
        match self {
            Block::Paragraph { text } => text.clone(),
            Block::Checklist(items) => items
                .iter()
                .map(|i| i.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Code { text, .. } => text.clone(),
            Block::Table { rows } => rows
                .iter()
                .map(|r| r.join(" "))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Admonition { text, .. } => text.clone(),
        }
    }
}

/// Admonition label prefixes recognized by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdmonitionKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AdmonitionKind {
    /// Match a line prefix like `NOTE:` to its kind.
    pub fn from_prefix(line: &str) -> Option<(Self, &str)> {
        for (prefix, kind) in [
            ("NOTE:", Self::Note),
            ("TIP:", Self::Tip),
            ("IMPORTANT:", Self::Important),
            ("WARNING:", Self::Warning),
            ("CAUTION:", Self::Caution),
        ] {
            if let Some(rest) = line.strip_prefix(prefix) {
                return Some((kind, rest.trim_start()));
            }
        }
        None
    }
}

/// One `* [ ] text` or `* [x] text` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistItem {
    pub checked: bool,
    /// Free text; embedded metrics are not further parsed.
    pub text: String,
}

/// Attribute map with header semantics: insertion order preserved,
/// later duplicate keys overwrite the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeMap {
    entries: Vec<(String, String)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An existing key keeps its original position.
    pub fn insert(&mut self, key: String, value: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for AttributeMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
