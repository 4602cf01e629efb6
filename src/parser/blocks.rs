//! Block Recognition
//!
//! Splits a section body into blocks by leading marker: checklist,
//! fenced code (with language tag), table, admonition, paragraph.
//! Gherkin-tagged code gets a secondary parse; failure degrades to an
//! opaque block plus a warning.

use regex::Regex;
use std::sync::OnceLock;

use super::gherkin;
use crate::core::diagnostics::{Diagnostic, DiagnosticKind};
use crate::core::document::{AdmonitionKind, Block, ChecklistItem};

fn checklist_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\s+\[([ xX])\]\s+(.+)$").expect("valid regex"))
}

fn source_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[source(?:,\s*([A-Za-z0-9_+-]+))?\]$").expect("valid regex"))
}

/// Parse the lines of one section body into blocks.
///
/// `lines` carries one-based line numbers for diagnostics. Warnings from
/// gherkin degradation are returned alongside; the caller attaches the
/// owning section to their location.
pub fn parse_blocks(lines: &[(usize, String)]) -> (Vec<Block>, Vec<Diagnostic>) {
    let mut blocks = Vec::new();
    let mut diagnostics = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let (line_no, line) = (&lines[i].0, lines[i].1.trim_end());
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        // Checklist: consecutive `* [ ]` / `* [x]` lines.
        if checklist_re().is_match(trimmed) {
            let mut items = Vec::new();
            while i < lines.len() {
                let candidate = lines[i].1.trim();
                let Some(cap) = checklist_re().captures(candidate) else {
                    break;
                };
                items.push(ChecklistItem {
                    checked: cap[1].eq_ignore_ascii_case("x"),
                    text: cap[2].trim().to_string(),
                });
                i += 1;
            }
            blocks.push(Block::Checklist(items));
            continue;
        }

        // Code listing: `[source,lang]` attribute line then `----` fence,
        // or a bare `----` fence with no language.
        if let Some(cap) = source_attr_re().captures(trimmed) {
            let language = cap.get(1).map(|m| m.as_str().to_string());
            // Skip blank lines between the attribute and the fence.
            let mut j = i + 1;
            while j < lines.len() && lines[j].1.trim().is_empty() {
                j += 1;
            }
            if j < lines.len() && lines[j].1.trim() == "----" {
                let (block, warning, next) = consume_code_fence(lines, j + 1, language);
                if let Some(message) = warning {
                    diagnostics.push(
                        Diagnostic::warning(DiagnosticKind::Structure, message).at(
                            crate::core::diagnostics::Location {
                                line: Some(*line_no),
                                ..Default::default()
                            },
                        ),
                    );
                }
                blocks.push(block);
                i = next;
                continue;
            }
            // Attribute line without a fence: fall through to paragraph.
        }

        if trimmed == "----" {
            let (block, warning, next) = consume_code_fence(lines, i + 1, None);
            if let Some(message) = warning {
                diagnostics.push(Diagnostic::warning(DiagnosticKind::Structure, message).at(
                    crate::core::diagnostics::Location {
                        line: Some(*line_no),
                        ..Default::default()
                    },
                ));
            }
            blocks.push(block);
            i = next;
            continue;
        }

        // Table: `|===` delimited.
        if trimmed == "|===" {
            let mut rows = Vec::new();
            i += 1;
            while i < lines.len() {
                let row_line = lines[i].1.trim();
                i += 1;
                if row_line == "|===" {
                    break;
                }
                if let Some(cells) = row_line.strip_prefix('|') {
                    rows.push(
                        cells
                            .split('|')
                            .map(|c| c.trim().to_string())
                            .collect::<Vec<_>>(),
                    );
                }
            }
            blocks.push(Block::Table { rows });
            continue;
        }

        // Admonition: single labelled line.
        if let Some((kind, rest)) = AdmonitionKind::from_prefix(trimmed) {
            blocks.push(Block::Admonition {
                kind,
                text: rest.to_string(),
            });
            i += 1;
            continue;
        }

        // Paragraph: contiguous lines until a blank line or block marker.
        let mut text_lines = Vec::new();
        while i < lines.len() {
            let para_line = lines[i].1.trim();
            if para_line.is_empty()
                || checklist_re().is_match(para_line)
                || source_attr_re().is_match(para_line)
                || para_line == "----"
                || para_line == "|==="
                || AdmonitionKind::from_prefix(para_line).is_some()
            {
                break;
            }
            text_lines.push(para_line.to_string());
            i += 1;
        }
        blocks.push(Block::Paragraph {
            text: text_lines.join("\n"),
        });
    }

    (blocks, diagnostics)
}

/// Consume lines until the closing `----` and build the code block.
/// An unterminated fence runs to the end of the section.
fn consume_code_fence(
    lines: &[(usize, String)],
    start: usize,
    language: Option<String>,
) -> (Block, Option<String>, usize) {
    let mut body = Vec::new();
    let mut i = start;
    while i < lines.len() {
        if lines[i].1.trim() == "----" {
            i += 1;
            break;
        }
        body.push(lines[i].1.clone());
        i += 1;
    }
    let text = body.join("\n");

    let mut warning = None;
    let gherkin = if language.as_deref() == Some("gherkin") {
        match gherkin::parse(&text) {
            Ok(parsed) => {
                for w in parsed.warnings {
                    // Surface placeholder cross-check findings from the sub-parse.
                    warning = Some(match warning {
                        None => w,
                        Some(prev) => format!("{prev}; {w}"),
                    });
                }
                Some(parsed.block)
            }
            Err(reason) => {
                warning = Some(format!("gherkin block is not well-formed: {reason}"));
                None
            }
        }
    } else {
        None
    };

    (
        Block::Code {
            language,
            text,
            gherkin,
        },
        warning,
        i,
    )
}
