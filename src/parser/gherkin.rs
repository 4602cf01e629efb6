//! Gherkin Sub-Parser
//!
//! Secondary parse of `[source,gherkin]` code blocks into
//! Feature/Background/Scenario structure. Malformation never fails the
//! document parse: callers turn an `Err` into a warning diagnostic and
//! keep the block as opaque text.

use serde::Serialize;

/// A parsed `gherkin`-tagged code block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GherkinBlock {
    pub features: Vec<Feature>,
}

impl GherkinBlock {
    /// All scenario outlines across every feature.
    pub fn outlines(&self) -> impl Iterator<Item = &Scenario> {
        self.features
            .iter()
            .flat_map(|f| f.scenarios.iter())
            .filter(|s| s.outline)
    }
}

/// One `Feature:` unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub name: String,
    /// Steps of the optional `Background:` block.
    pub background: Vec<Step>,
    /// Scenarios and scenario outlines, in order.
    pub scenarios: Vec<Scenario>,
}

/// A `Scenario:` or `Scenario Outline:` with its ordered steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub outline: bool,
    pub steps: Vec<Step>,
    /// Present only for outlines that declared an `Examples:` table.
    pub examples: Option<ExamplesTable>,
}

/// One Given/When/Then/And/But line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub keyword: StepKeyword,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepKeyword {
    Given,
    When,
    Then,
    And,
    But,
}

impl StepKeyword {
    fn from_line(line: &str) -> Option<(Self, &str)> {
        for (prefix, keyword) in [
            ("Given ", Self::Given),
            ("When ", Self::When),
            ("Then ", Self::Then),
            ("And ", Self::And),
            ("But ", Self::But),
        ] {
            if let Some(rest) = line.strip_prefix(prefix) {
                return Some((keyword, rest.trim()));
            }
        }
        None
    }
}

/// Header row plus data rows of an `Examples:` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamplesTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExamplesTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }
}

/// Result of a successful gherkin parse: the structure plus any
/// well-formedness warnings (placeholder cross-check failures).
#[derive(Debug, Clone)]
pub struct ParsedGherkin {
    pub block: GherkinBlock,
    pub warnings: Vec<String>,
}

/// Parse the text of a gherkin code block.
///
/// Returns `Err(reason)` when the text is not recognizably Gherkin; the
/// caller degrades to an opaque code block with a warning.
pub fn parse(text: &str) -> Result<ParsedGherkin, String> {
    let mut features: Vec<Feature> = Vec::new();
    // Where subsequent step lines attach.
    enum Context {
        None,
        Background,
        Scenario,
        Examples,
    }
    let mut context = Context::None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix("Feature:") {
            features.push(Feature {
                name: name.trim().to_string(),
                background: Vec::new(),
                scenarios: Vec::new(),
            });
            context = Context::None;
            continue;
        }

        let Some(feature) = features.last_mut() else {
            return Err(format!("expected `Feature:` before `{line}`"));
        };

        if line.strip_prefix("Background:").is_some() {
            context = Context::Background;
            continue;
        }
        if let Some(name) = line.strip_prefix("Scenario Outline:") {
            feature.scenarios.push(Scenario {
                name: name.trim().to_string(),
                outline: true,
                steps: Vec::new(),
                examples: None,
            });
            context = Context::Scenario;
            continue;
        }
        if let Some(name) = line.strip_prefix("Scenario:") {
            feature.scenarios.push(Scenario {
                name: name.trim().to_string(),
                outline: false,
                steps: Vec::new(),
                examples: None,
            });
            context = Context::Scenario;
            continue;
        }
        if line.strip_prefix("Examples:").is_some() {
            let Some(scenario) = feature.scenarios.last_mut() else {
                return Err("`Examples:` outside a scenario".to_string());
            };
            scenario.examples = Some(ExamplesTable {
                headers: Vec::new(),
                rows: Vec::new(),
            });
            context = Context::Examples;
            continue;
        }

        if let Some((keyword, rest)) = StepKeyword::from_line(line) {
            let step = Step {
                keyword,
                text: rest.to_string(),
            };
            match context {
                Context::Background => feature.background.push(step),
                Context::Scenario => {
                    // A scenario always exists in this context.
                    if let Some(scenario) = feature.scenarios.last_mut() {
                        scenario.steps.push(step);
                    }
                }
                Context::None | Context::Examples => {
                    return Err(format!("step `{line}` outside a scenario"));
                }
            }
            continue;
        }

        if line.starts_with('|') {
            if !matches!(context, Context::Examples) {
                return Err(format!("table row `{line}` outside `Examples:`"));
            }
            let cells = split_table_row(line);
            if let Some(table) = feature
                .scenarios
                .last_mut()
                .and_then(|s| s.examples.as_mut())
            {
                if table.headers.is_empty() {
                    table.headers = cells;
                } else {
                    table.rows.push(cells);
                }
            }
            continue;
        }

        // Free description lines are only valid directly under a declaration.
        match context {
            Context::None => continue,
            _ => return Err(format!("unexpected line `{line}`")),
        }
    }

    if features.is_empty() {
        return Err("no `Feature:` found".to_string());
    }

    let block = GherkinBlock { features };
    let warnings = placeholder_warnings(&block);
    Ok(ParsedGherkin { block, warnings })
}

/// Cross-check Examples headers against `<name>` placeholders in steps.
/// An outline whose table columns are never referenced still parses, but
/// is reported as a well-formedness warning.
fn placeholder_warnings(block: &GherkinBlock) -> Vec<String> {
    let mut warnings = Vec::new();

    for scenario in block.outlines() {
        let Some(examples) = &scenario.examples else {
            continue; // missing Examples is the validator's error, not ours
        };
        let unreferenced: Vec<&str> = examples
            .headers
            .iter()
            .filter(|header| {
                let placeholder = format!("<{header}>");
                !scenario.steps.iter().any(|s| s.text.contains(&placeholder))
            })
            .map(String::as_str)
            .collect();

        if !unreferenced.is_empty() {
            warnings.push(format!(
                "scenario outline '{}': Examples column(s) {} never referenced by a step placeholder",
                scenario.name,
                unreferenced
                    .iter()
                    .map(|h| format!("'{h}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
    }

    warnings
}

fn split_table_row(line: &str) -> Vec<String> {
    line.trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}
