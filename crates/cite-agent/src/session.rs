use std::path::PathBuf;

use cite_agent_core::tool::{DuplicateToolError, Registry, Tool};
use cite_agent_core::{Agent, AgentAnswer, AgentBuilder, AskError};
use cite_agent_groq_model::{GroqConfig, GroqProvider};
use cite_agent_model::ModelProvider;

use crate::tools::*;

const SYSTEM_PROMPT: &str = "\
You are a policy research assistant for government organizations. You answer \
questions about AI implementation policies and regulations, using the \
available tools to consult the handbook and official web sources. If asked \
what you can do, simply explain your capabilities without using any tool.

Your final output MUST be a JSON object with an `answer` string and a \
`citations` array. Each citation has an `excerpt` (a brief quote from the \
consulted material) and a `source` (the handbook section number or the page \
URL the excerpt came from). Include only the most important citations (2-4 \
maximum). When you answered without using any tool, `citations` MUST be an \
empty array.";

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    registry: Registry,
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder").finish_non_exhaustive()
    }
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider)
            .with_system_prompt(SYSTEM_PROMPT);
        Self {
            agent_builder,
            registry: Registry::new(),
        }
    }

    /// Creates a session builder backed by the Groq API.
    pub fn with_groq(config: GroqConfig) -> Self {
        Self::with_model_provider(GroqProvider::new(config))
    }

    /// Installs the handbook search tool over the given markdown file.
    pub fn with_handbook<P: Into<PathBuf>>(
        self,
        path: P,
    ) -> Result<Self, DuplicateToolError> {
        self.with_tool(SearchHandbookTool::new(path))
    }

    /// Installs the web page fetch tool.
    pub fn with_fetch_page(self) -> Result<Self, DuplicateToolError> {
        self.with_tool(FetchPageTool::new())
    }

    /// Installs the web search tool restricted to the given domains.
    pub fn with_web_search<S: Into<String>>(
        self,
        api_key: S,
        allowed_domains: Vec<String>,
    ) -> Result<Self, DuplicateToolError> {
        self.with_tool(WebSearchTool::new(api_key, allowed_domains))
    }

    /// Registers a custom tool.
    pub fn with_tool<T: Tool>(
        mut self,
        tool: T,
    ) -> Result<Self, DuplicateToolError> {
        self.registry.register(tool)?;
        Ok(self)
    }

    /// Bounds the number of model calls within one `ask` invocation.
    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.agent_builder =
            self.agent_builder.with_max_iterations(max_iterations);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        let agent =
            self.agent_builder.with_registry(self.registry).build();
        Session { agent }
    }
}

/// A research session that answers questions with citation-annotated
/// answers.
///
/// The session holds a fully configured agent that you can use directly,
/// and it is basically a wrapper around [`Agent`].
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Submits a query and returns the structured answer.
    #[inline]
    pub async fn ask(&mut self, query: &str) -> Result<AgentAnswer, AskError> {
        self.agent.ask(query).await
    }

    /// Clears the conversation history.
    #[inline]
    pub fn reset(&mut self) {
        self.agent.reset();
    }

    /// Returns the underlying agent.
    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}
