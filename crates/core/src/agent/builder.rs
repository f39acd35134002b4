use cite_agent_model::ModelProvider;

use super::{Agent, DEFAULT_MAX_ITERATIONS};
use crate::answer::AgentAnswer;
use crate::model_client::ModelClient;
use crate::tool::Registry;

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    system_prompt: Option<String>,
    registry: Registry,
    max_iterations: usize,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: None,
            registry: Registry::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Sets the system prompt for the agent.
    ///
    /// The prompt is agent configuration, not a conversation item: it
    /// is prepended to every model request but never appears in the
    /// conversation history.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Attaches a tool registry.
    #[inline]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Bounds the number of model calls within one `ask` invocation.
    ///
    /// Defaults to [`DEFAULT_MAX_ITERATIONS`].
    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        Agent {
            model_client: self.model_client,
            registry: self.registry,
            conversation: Default::default(),
            system_prompt: self.system_prompt,
            max_iterations: self.max_iterations,
            output_schema: AgentAnswer::output_schema(),
        }
    }
}
