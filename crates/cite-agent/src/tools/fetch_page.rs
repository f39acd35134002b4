use cite_agent_core::tool::{
    Error as ToolError, Tool, ToolResult, truncate_output,
};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::task::spawn_blocking;

/// Pages are trimmed aggressively, the model doesn't need 50k chars of
/// boilerplate.
const MAX_CONTENT_LEN: usize = 20_000;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Deserialize, JsonSchema)]
pub struct FetchPageParameters {
    #[schemars(description = "The http(s) URL of the page to fetch.")]
    url: String,
}

/// A tool for fetching a web page and extracting its readable text.
pub struct FetchPageTool {
    client: reqwest::Client,
    parameter_schema: Value,
}

impl FetchPageTool {
    /// Creates a new fetch page tool.
    pub fn new() -> Self {
        FetchPageTool {
            client: reqwest::Client::new(),
            parameter_schema: schema_for!(FetchPageParameters).to_value(),
        }
    }
}

impl Default for FetchPageTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FetchPageTool {
    type Input = FetchPageParameters;

    fn name(&self) -> &str {
        "fetch_page"
    }

    fn description(&self) -> &str {
        r#"
Fetches a web page and returns its content converted to readable plain text.
Use after a web search to read a full article. Cite the page URL for any
excerpt taken from the returned content."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: FetchPageParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            if !input.url.starts_with("http://")
                && !input.url.starts_with("https://")
            {
                return Err(ToolError::execution_error()
                    .with_reason("`url` must start with http:// or https://"));
            }

            let resp = client
                .get(&input.url)
                .timeout(FETCH_TIMEOUT)
                .send()
                .await
                .map_err(|err| {
                    ToolError::execution_error()
                        .with_reason(format!("could not fetch page: {err}"))
                })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(ToolError::execution_error().with_reason(
                    format!("page fetch failed with status {status}"),
                ));
            }

            let content_type = resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_owned();
            if !content_type.contains("text/html")
                && !content_type.contains("text/plain")
            {
                return Err(ToolError::execution_error().with_reason(
                    format!("unsupported content type: {content_type}"),
                ));
            }

            let body = resp.text().await.map_err(|err| {
                ToolError::execution_error()
                    .with_reason(format!("could not read page body: {err}"))
            })?;

            let text = if content_type.contains("text/html") {
                // `scraper` documents are not `Send`, parse on a
                // blocking thread and only move strings across.
                spawn_blocking(move || html_to_text(&body)).await.map_err(
                    |_| {
                        ToolError::execution_error()
                            .with_reason("failed to convert page")
                    },
                )?
            } else {
                body
            };
            Ok(truncate_output(text, MAX_CONTENT_LEN))
        }
    }
}

fn html_to_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let mut parts = Vec::new();

    if let Ok(body_selector) = scraper::Selector::parse("body") {
        if let Some(body) = document.select(&body_selector).next() {
            extract_text(&body, &mut parts);
        }
    }

    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| {
            // Drop very short noise lines and pure symbol runs.
            !s.is_empty()
                && s.len() > 3
                && s.chars().any(|c| c.is_alphabetic())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_text(element: &scraper::ElementRef, parts: &mut Vec<String>) {
    let tag = element.value().name();
    if matches!(
        tag,
        "script" | "style" | "nav" | "footer" | "header" | "aside" | "noscript"
    ) {
        return;
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim().to_string();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        } else if let Some(child_ref) = scraper::ElementRef::wrap(child) {
            extract_text(&child_ref, parts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_extracts_readable_content() {
        let html = r#"
<html>
  <head><title>Ignored</title><style>body { color: red }</style></head>
  <body>
    <nav>Home | About | Contact</nav>
    <h1>EU AI Act</h1>
    <p>The first regulation on artificial intelligence.</p>
    <script>analytics();</script>
    <footer>Copyright notice</footer>
  </body>
</html>"#;
        let text = html_to_text(html);
        assert!(text.contains("EU AI Act"));
        assert!(text.contains("first regulation on artificial intelligence"));
        assert!(!text.contains("analytics"));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_long_pages_are_truncated() {
        let text = "a".repeat(MAX_CONTENT_LEN + 100);
        let truncated = truncate_output(text, MAX_CONTENT_LEN);
        assert!(truncated.len() < MAX_CONTENT_LEN + 100);
        assert!(truncated.contains("[truncated"));

        let short = truncate_output("short".to_owned(), MAX_CONTENT_LEN);
        assert_eq!(short, "short");
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let tool = FetchPageTool::new();
        let err = tool
            .execute(FetchPageParameters {
                url: "ftp://example.com/file".to_owned(),
            })
            .await
            .unwrap_err();
        assert!(err.reason().contains("http"));
    }
}
