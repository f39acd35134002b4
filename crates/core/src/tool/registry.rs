use std::collections::HashMap;
use std::pin::Pin;

use cite_agent_model::ModelTool;
use serde_json::Value;

use crate::tool::{
    AnyTool, DuplicateToolError, Error, Tool, ToolObject, ToolResult,
};

/// The set of callable capabilities presented to the model.
///
/// Descriptors are kept in registration order, so
/// [`definitions`](Self::definitions) is stable across calls within a
/// process lifetime.
#[derive(Default)]
pub struct Registry {
    tools: Vec<Box<dyn ToolObject>>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// Fails if a tool with the same name is already registered.
    pub fn register<T: Tool>(
        &mut self,
        tool: T,
    ) -> Result<(), DuplicateToolError> {
        let name = tool.name().to_owned();
        if self.by_name.contains_key(&name) {
            return Err(DuplicateToolError { name });
        }
        self.by_name.insert(name, self.tools.len());
        self.tools.push(Box::new(AnyTool(tool)));
        Ok(())
    }

    /// Returns the tool descriptors in registration order.
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools
            .iter()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect()
    }

    /// Dispatches a tool call to the named tool.
    ///
    /// An unregistered name fails with an `UnknownTool` error, it never
    /// silently no-ops. Argument decoding failures and underlying tool
    /// failures are reported through the returned [`ToolResult`]; this
    /// method itself never panics on bad requests.
    pub fn invoke(
        &self,
        name: &str,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> {
        let Some(&idx) = self.by_name.get(name) else {
            warn!("tool not found: {name}");
            let err = Error::unknown_tool()
                .with_reason(format!("no tool named `{name}` is registered"));
            return Box::pin(std::future::ready(Err(err)));
        };
        trace!("invoking tool `{name}` with args: {arguments:?}");
        self.tools[idx].execute(arguments)
    }

    /// Returns the number of registered tools.
    #[inline]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use serde_json::json;

    use super::*;
    use crate::tool::ErrorKind;

    struct TestTool {
        name: &'static str,
        schema: Value,
    }

    impl TestTool {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                schema: json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string" }
                    },
                    "required": ["query"]
                }),
            }
        }
    }

    #[derive(serde::Deserialize)]
    struct TestToolInput {
        query: String,
    }

    impl Tool for TestTool {
        type Input = TestToolInput;

        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "A test tool"
        }

        fn parameter_schema(&self) -> &Value {
            &self.schema
        }

        fn execute(
            &self,
            input: Self::Input,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Ok(format!("result for {}", input.query)))
        }
    }

    #[tokio::test]
    async fn test_invoke() {
        let mut registry = Registry::new();
        registry.register(TestTool::new("test_tool")).unwrap();

        let result = registry
            .invoke("test_tool", json!({ "query": "registration" }))
            .await
            .unwrap();
        assert_eq!(result, "result for registration");
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let registry = Registry::new();
        let err = registry
            .invoke("missing_tool", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);
    }

    #[tokio::test]
    async fn test_invoke_invalid_arguments() {
        let mut registry = Registry::new();
        registry.register(TestTool::new("test_tool")).unwrap();

        let err = registry
            .invoke("test_tool", json!({ "query": 42 }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = Registry::new();
        registry.register(TestTool::new("test_tool")).unwrap();
        let err = registry.register(TestTool::new("test_tool")).unwrap_err();
        assert_eq!(err.name(), "test_tool");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let mut registry = Registry::new();
        registry.register(TestTool::new("tool_c")).unwrap();
        registry.register(TestTool::new("tool_a")).unwrap();
        registry.register(TestTool::new("tool_b")).unwrap();

        let names = |defs: Vec<ModelTool>| {
            defs.into_iter().map(|d| d.name).collect::<Vec<_>>()
        };
        let first = names(registry.definitions());
        assert_eq!(first, ["tool_c", "tool_a", "tool_b"]);
        // Stable across calls.
        assert_eq!(first, names(registry.definitions()));
    }
}
