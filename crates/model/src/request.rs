use serde_json::Value;

use crate::response::ToolCallRequest;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRequest {
    /// The input messages.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
    /// When set, the provider should constrain the final text output
    /// to a JSON document conforming to this schema.
    ///
    /// Providers that support a native structured-output mode (e.g.
    /// `response_format` on OpenAI-compatible APIs) should use it;
    /// others may embed the schema into the system instructions.
    pub output_schema: Option<Value>,
}

/// A complete message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// An assistant turn.
    ///
    /// The requested tool calls are carried explicitly so the history
    /// can be replayed to providers that require the complete tool-call
    /// message. Whether a turn requests tools is decided by this field
    /// alone, never by inspecting `content`.
    Assistant {
        /// The assistant text, possibly empty for pure tool-call turns.
        content: String,
        /// Tool calls requested during this turn.
        tool_calls: Vec<ToolCallRequest>,
    },
    /// A tool call result.
    Tool(ToolCallResult),
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCallResult {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The result of the tool call.
    pub content: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters definition of the tool.
    ///
    /// For most model providers, the parameters should typically be
    /// defined by a [JSON schema](https://json-schema.org/).
    pub parameters: Value,
}
