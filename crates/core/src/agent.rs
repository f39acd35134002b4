//! The dispatch loop that alternates between querying the model and
//! executing requested tools until a final answer is produced.

mod builder;
mod error;

use cite_agent_model::{ModelMessage, ModelRequest, ToolCallResult};
use serde_json::Value;
use tracing::Instrument;

pub use builder::AgentBuilder;
pub use error::AskError;

use crate::answer::AgentAnswer;
use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::tool::{Registry, truncate_output};

/// The default bound on model calls within one `ask` invocation.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Maximum characters of a tool result fed back to the model.
const MAX_TOOL_RESULT_LEN: usize = 20_000;

/// A session-scoped request/response mediator around a model provider
/// and a set of callable tools.
///
/// One instance owns one conversation. `ask` takes `&mut self`, so the
/// single-writer rule is enforced by the borrow checker; callers that
/// need concurrent access must serialize it themselves.
pub struct Agent {
    model_client: ModelClient,
    registry: Registry,
    conversation: Conversation,
    system_prompt: Option<String>,
    max_iterations: usize,
    output_schema: Value,
}

impl Agent {
    /// Submits a query and drives the dispatch loop until the model
    /// produces a final structured answer.
    ///
    /// A failing tool call never aborts the loop: the failure is fed
    /// back to the model as a tool result so it can retry, pick another
    /// tool, or answer without it. Backend and schema failures are not
    /// retried here, they propagate to the caller.
    pub async fn ask(&mut self, query: &str) -> Result<AgentAnswer, AskError> {
        self.conversation
            .push(ModelMessage::User(query.to_owned()), query.to_owned());

        for iteration in 0..self.max_iterations {
            debug!("dispatch iteration {iteration}");

            let request = self.build_model_request();
            let resp = self
                .model_client
                .send_request(request)
                .await
                .map_err(AskError::Backend)?;

            // Whether this turn requests tools is decided by the explicit
            // tool-call field alone, never by inspecting the text.
            if resp.tool_calls.is_empty() {
                let answer = AgentAnswer::from_json(&resp.transcript)
                    .map_err(|err| AskError::Schema {
                        reason: err.to_string(),
                    })?;
                let transcript = resp.transcript;
                self.conversation.push(
                    ModelMessage::Assistant {
                        content: transcript.clone(),
                        tool_calls: vec![],
                    },
                    transcript,
                );
                return Ok(answer);
            }

            let transcript = resp.transcript.clone();
            self.conversation.push(
                ModelMessage::Assistant {
                    content: resp.transcript,
                    tool_calls: resp.tool_calls.clone(),
                },
                transcript,
            );

            // Execute sequentially in request order; result items are
            // appended in that same order.
            for call in resp.tool_calls {
                let span =
                    debug_span!("tool call", name = %call.name, id = %call.id);
                let invoke_fut = self
                    .registry
                    .invoke(&call.name, call.arguments)
                    .instrument(span);
                let content = match invoke_fut.await {
                    Ok(output) => {
                        truncate_output(output, MAX_TOOL_RESULT_LEN)
                    }
                    Err(err) => {
                        warn!("tool call failed: {err}");
                        format!("error: {}", err.reason())
                    }
                };
                self.conversation.push(
                    ModelMessage::Tool(ToolCallResult {
                        id: call.id,
                        content: content.clone(),
                    }),
                    content,
                );
            }
        }

        Err(AskError::Exhausted {
            iterations: self.max_iterations,
        })
    }

    /// Clears the conversation to empty.
    ///
    /// An `ask` after a reset behaves exactly as on a freshly built
    /// agent.
    pub fn reset(&mut self) {
        debug!("resetting conversation");
        self.conversation.clear();
    }

    /// Returns the conversation history.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    fn build_model_request(&self) -> ModelRequest {
        let mut messages =
            Vec::with_capacity(self.conversation.items.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(ModelMessage::System(prompt.clone()));
        }
        messages
            .extend(self.conversation.items.iter().map(|i| i.msg.clone()));

        ModelRequest {
            messages,
            tools: self.registry.definitions(),
            output_schema: Some(self.output_schema.clone()),
        }
    }
}
