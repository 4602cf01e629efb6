//! Document Parser
//!
//! Turns raw AsciiDoc text into the Document model: title, header
//! attributes, sections with nesting levels, and typed blocks. Single
//! purpose by design - xref extraction happens later, in the resolver
//! pass, so extraction stays idempotent.

pub mod blocks;
pub mod gherkin;

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::core::diagnostics::Diagnostic;
use crate::core::document::{AttributeMap, Document, Section};

/// Failure severe enough that no Document model can be produced.
/// Never aborts the run: the caller records one diagnostic for the file
/// and continues with the rest of the corpus.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no top-level `= ` title heading found")]
    MissingTitle,
    #[error("document is empty")]
    Empty,
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^=\s+(.+)$").expect("valid regex"))
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(={2,})\s+(.+)$").expect("valid regex"))
}

fn attribute_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^:([A-Za-z0-9_][A-Za-z0-9_-]*):\s*(.*)$").expect("valid regex"))
}

/// Parse raw text into a Document plus any degradation warnings
/// (malformed gherkin blocks and the like).
///
/// # Errors
///
/// Returns `ParseError` when no document model can be built at all.
pub fn parse_document(
    text: &str,
    source_path: &Path,
) -> Result<(Document, Vec<Diagnostic>), ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut title: Option<String> = None;
    let mut attributes = AttributeMap::new();
    let mut diagnostics = Vec::new();

    // Heading line plus collected body lines, finalized in a second step
    // so block parsing sees the complete section at once.
    struct RawSection {
        heading: String,
        level: usize,
        line: usize,
        body: Vec<(usize, String)>,
    }
    let mut raw_sections: Vec<RawSection> = Vec::new();
    let mut preamble: Vec<(usize, String)> = Vec::new();

    // Lines inside a `----` fence are opaque: a fenced line never becomes
    // a title, heading, or attribute. The delimiters themselves stay in
    // the body so block parsing sees the complete fence.
    let mut in_fence = false;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if line.trim() == "----" {
            in_fence = !in_fence;
        } else if !in_fence {
            if title.is_none() {
                if let Some(cap) = title_re().captures(line) {
                    title = Some(cap[1].trim().to_string());
                    continue;
                }
            }

            if let Some(cap) = section_re().captures(line) {
                raw_sections.push(RawSection {
                    heading: cap[2].trim().to_string(),
                    level: cap[1].len(),
                    line: line_no,
                    body: Vec::new(),
                });
                continue;
            }

            // Attribute lines are recorded wherever they appear; placement
            // after content is lenient, not flagged.
            if let Some(cap) = attribute_re().captures(line) {
                attributes.insert(cap[1].to_string(), cap[2].trim().to_string());
                continue;
            }
        }

        match raw_sections.last_mut() {
            Some(section) => section.body.push((line_no, line.to_string())),
            None => preamble.push((line_no, line.to_string())),
        }
    }

    let Some(title) = title else {
        return Err(ParseError::MissingTitle);
    };

    let mut sections = Vec::with_capacity(raw_sections.len() + 1);

    // Content between the header and the first heading still participates
    // in xref extraction; it lives in an unnamed section that no schema
    // section rule can match.
    if preamble.iter().any(|(_, l)| !l.trim().is_empty()) {
        let (parsed_blocks, mut block_diags) = blocks::parse_blocks(&preamble);
        for d in &mut block_diags {
            d.location.path = Some(source_path.to_path_buf());
        }
        diagnostics.append(&mut block_diags);
        sections.push(Section {
            heading: String::new(),
            level: 1,
            line: preamble.first().map(|(n, _)| *n).unwrap_or(1),
            blocks: parsed_blocks,
        });
    }

    for raw in raw_sections {
        let (parsed_blocks, block_diags) = blocks::parse_blocks(&raw.body);
        for mut d in block_diags {
            d.location.section = Some(raw.heading.clone());
            d.location.path = Some(source_path.to_path_buf());
            diagnostics.push(d);
        }
        sections.push(Section {
            heading: raw.heading,
            level: raw.level,
            line: raw.line,
            blocks: parsed_blocks,
        });
    }

    let document = Document {
        title,
        attributes,
        sections,
        source_path: source_path.to_path_buf(),
    };

    Ok((document, diagnostics))
}
