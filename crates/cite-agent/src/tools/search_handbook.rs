use std::path::PathBuf;
use std::sync::Arc;

use cite_agent_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use tokio::task::spawn_blocking;

const MAX_RESULTS: usize = 5;

#[derive(Deserialize, JsonSchema)]
pub struct SearchHandbookParameters {
    #[schemars(description = "The user's question or search query.")]
    query: String,
}

#[derive(Clone)]
enum Source {
    Path(PathBuf),
    Content(Arc<str>),
}

/// A tool for searching a local handbook document.
///
/// The handbook is a markdown file with numbered section headings (e.g.
/// `## 2.1 Algorithm Register`). Matching is deterministic for a fixed
/// document and query, so repeated searches always return the same
/// excerpts in the same order.
pub struct SearchHandbookTool {
    source: Source,
    parameter_schema: Value,
}

impl SearchHandbookTool {
    /// Creates a tool that reads the handbook from a file.
    #[inline]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        SearchHandbookTool {
            source: Source::Path(path.into()),
            parameter_schema: schema_for!(SearchHandbookParameters).to_value(),
        }
    }

    /// Creates a tool over an in-memory handbook.
    #[inline]
    pub fn with_content<S: Into<Arc<str>>>(content: S) -> Self {
        SearchHandbookTool {
            source: Source::Content(content.into()),
            parameter_schema: schema_for!(SearchHandbookParameters).to_value(),
        }
    }
}

impl Tool for SearchHandbookTool {
    type Input = SearchHandbookParameters;

    fn name(&self) -> &str {
        "search_handbook"
    }

    fn description(&self) -> &str {
        r#"
Searches the AI implementation handbook and returns the matching sections.
Use this when the user asks about AI implementation requirements, regulations,
or procedures for government organizations. Cite the returned section numbers."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: SearchHandbookParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let source = self.source.clone();
        async move {
            let content = match source {
                Source::Content(content) => content,
                Source::Path(path) => {
                    let read = spawn_blocking(move || {
                        std::fs::read_to_string(&path).map_err(|err| {
                            ToolError::execution_error().with_reason(format!(
                                "could not read handbook file: {err}"
                            ))
                        })
                    })
                    .await
                    .map_err(|_| {
                        ToolError::execution_error()
                            .with_reason("failed to read handbook")
                    })??;
                    Arc::from(read.as_str())
                }
            };

            let matches = search_sections(&content, &input.query);
            if matches.is_empty() {
                return Ok(
                    "No matching sections found for this query.".to_owned()
                );
            }
            Ok(format_sections(&matches))
        }
    }
}

struct Section {
    id: String,
    title: String,
    body: String,
}

/// Splits a markdown document into sections at its headings.
///
/// A heading whose text starts with a dotted number (`## 2.1 Foo`) gets
/// that number as its identifier; other headings use their text. Text
/// before the first heading becomes an `introduction` section.
fn parse_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;
    let mut preamble = String::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        let is_heading = trimmed.starts_with('#');
        if !is_heading {
            match &mut current {
                Some(section) => {
                    section.body.push_str(line);
                    section.body.push('\n');
                }
                None => {
                    preamble.push_str(line);
                    preamble.push('\n');
                }
            }
            continue;
        }

        if let Some(section) = current.take() {
            sections.push(section);
        }
        let text = trimmed.trim_start_matches('#').trim();
        let (id, title) = match heading_number(text) {
            Some(number) => {
                (number.to_owned(), text[number.len()..].trim().to_owned())
            }
            None => (text.to_owned(), text.to_owned()),
        };
        current = Some(Section {
            id,
            title,
            body: String::new(),
        });
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }

    if !preamble.trim().is_empty() {
        sections.insert(
            0,
            Section {
                id: "introduction".to_owned(),
                title: "Introduction".to_owned(),
                body: preamble,
            },
        );
    }
    sections
}

/// Returns the leading dotted-number token of a heading, if any.
fn heading_number(text: &str) -> Option<&str> {
    let token = text.split_whitespace().next()?;
    let token = token.trim_end_matches('.');
    if !token.is_empty()
        && token.chars().all(|c| c.is_ascii_digit() || c == '.')
        && token.starts_with(|c: char| c.is_ascii_digit())
    {
        Some(token)
    } else {
        None
    }
}

fn query_tokens(query: &str) -> Vec<String> {
    const STOPWORDS: &[&str] = &[
        "the", "and", "for", "are", "was", "what", "when", "how", "can",
        "does", "need", "this", "that", "with", "about", "have", "must",
    ];
    query
        .split(|c: char| !c.is_alphanumeric())
        .map(|word| word.to_lowercase())
        .filter(|word| word.len() >= 3 && !STOPWORDS.contains(&word.as_str()))
        .collect()
}

/// A query token matches a document word when either is a prefix of the
/// other, so "registering" finds "register" and "system" finds
/// "systems".
fn token_matches_word(token: &str, word: &str) -> bool {
    word.starts_with(token) || token.starts_with(word)
}

fn section_score(section: &Section, tokens: &[String]) -> usize {
    let words = format!("{} {}", section.title, section.body)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() >= 3)
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>();
    tokens
        .iter()
        .filter(|token| {
            words.iter().any(|word| token_matches_word(token, word))
        })
        .count()
}

/// Ranks the document's sections against the query.
///
/// Sections are ranked by the number of distinct matched query tokens,
/// with document order as the tie-break.
fn search_sections(content: &str, query: &str) -> Vec<Section> {
    let tokens = query_tokens(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut scored = parse_sections(content)
        .into_iter()
        .map(|section| {
            let score = section_score(&section, &tokens);
            (section, score)
        })
        .filter(|(_, score)| *score > 0)
        .collect::<Vec<_>>();
    // Stable sort keeps document order for equal scores.
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(section, _)| section)
        .collect()
}

fn format_sections(sections: &[Section]) -> String {
    let mut result = String::new();
    for section in sections {
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(&format!(
            "Section {}: {}\n{}",
            section.id,
            section.title,
            section.body.trim()
        ));
        result.push('\n');
    }
    result
}
