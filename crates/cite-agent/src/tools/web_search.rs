use cite_agent_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

const BRAVE_API_BASE: &str = "https://api.search.brave.com/res/v1";

const MAX_RESULTS: usize = 10;

#[derive(Deserialize, JsonSchema)]
pub struct WebSearchParameters {
    #[schemars(description = "The search query.")]
    query: String,
    #[schemars(description = "Domains to restrict the search to. Must be a \
                              subset of the tool's allowed domains; omit to \
                              use all of them.")]
    domains: Option<Vec<String>>,
}

/// A tool for searching the web, restricted to an allowed set of
/// domains.
///
/// Results whose URL is not within the allowed domains are dropped, so
/// the model can only cite sources the operator trusts.
pub struct WebSearchTool {
    client: reqwest::Client,
    api_key: String,
    allowed_domains: Vec<String>,
    parameter_schema: Value,
}

impl WebSearchTool {
    /// Creates a new web search tool.
    ///
    /// `allowed_domains` are bare domains like `rijksoverheid.nl`;
    /// subdomains of an allowed domain are allowed too.
    pub fn new<S: Into<String>>(
        api_key: S,
        allowed_domains: Vec<String>,
    ) -> Self {
        WebSearchTool {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            allowed_domains,
            parameter_schema: schema_for!(WebSearchParameters).to_value(),
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    web: Option<WebResults>,
}

#[derive(Deserialize)]
struct WebResults {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: Option<String>,
    url: String,
    description: Option<String>,
}

impl Tool for WebSearchTool {
    type Input = WebSearchParameters;

    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        r#"
Searches the web and returns snippets with their URLs, restricted to the
allowed domains. Use for questions the handbook cannot answer. Cite the
URL of every result you rely on."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: WebSearchParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        // The input may narrow the domain set but never escape it.
        let domains = match input.domains {
            Some(requested) => requested
                .into_iter()
                .filter(|d| self.allowed_domains.contains(d))
                .collect(),
            None => self.allowed_domains.clone(),
        };

        async move {
            if domains.is_empty() {
                return Err(ToolError::execution_error()
                    .with_reason("no allowed domains to search"));
            }

            let resp = client
                .get(format!("{BRAVE_API_BASE}/web/search"))
                .header("Accept", "application/json")
                .header("X-Subscription-Token", &api_key)
                .query(&[
                    ("q", input.query.as_str()),
                    ("count", "20"),
                    ("text_decorations", "false"),
                ])
                .send()
                .await
                .map_err(|err| {
                    ToolError::execution_error()
                        .with_reason(format!("search request failed: {err}"))
                })?;

            let status = resp.status();
            if !status.is_success() {
                return Err(ToolError::execution_error().with_reason(
                    format!("search failed with status {status}"),
                ));
            }

            let data: SearchResponse = resp.json().await.map_err(|err| {
                ToolError::execution_error()
                    .with_reason(format!("malformed search response: {err}"))
            })?;

            let hits = data.web.map(|web| web.results).unwrap_or_default();
            let allowed = hits
                .into_iter()
                .filter(|hit| domain_allowed(&hit.url, &domains))
                .take(MAX_RESULTS)
                .collect::<Vec<_>>();
            Ok(format_results(&input.query, &allowed))
        }
    }
}

/// Returns `true` when the URL's host is one of the allowed domains or
/// a subdomain of one.
fn domain_allowed(url: &str, domains: &[String]) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    domains.iter().any(|domain| {
        host == domain.as_str() || host.ends_with(&format!(".{domain}"))
    })
}

fn format_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!(
            "No results for '{query}' within the allowed domains."
        );
    }

    let mut output = format!("Search results for '{query}':\n\n");
    for (i, hit) in hits.iter().enumerate() {
        output.push_str(&format!(
            "{}. {}\n   URL: {}\n",
            i + 1,
            hit.title.as_deref().unwrap_or("No title"),
            hit.url
        ));
        if let Some(description) = &hit.description {
            if !description.is_empty() {
                output.push_str(&format!("   {description}\n"));
            }
        }
        output.push('\n');
    }
    output
}
