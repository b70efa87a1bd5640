//! Tool implementations for the showtime assistant
//!
//! Tools are stateless singletons; everything a call needs is injected via
//! `ToolContext`. The registry is static: the three tools it holds are the
//! only capabilities the model can request.

mod movie_info;
mod resolve_dates;
mod timetable;

pub use movie_info::RetrieveMovieInfoTool;
pub use resolve_dates::ResolveRelativeDatesTool;
pub use timetable::QueryTimetableTool;

use crate::external::{Clock, SqlEngine, VectorStore};
use crate::llm::{ModelInvoker, ToolDefinition};
use crate::store::{Message, ToolCall};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;

/// Result from tool execution
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }

    /// Render as tool-result content. Failures become text the model can
    /// read and react to on its next invocation.
    pub fn into_result_text(self) -> String {
        if self.success {
            self.output
        } else {
            format!("Tool execution failed: {}", self.output)
        }
    }
}

/// All context needed for a tool invocation.
///
/// Tools are stateless and derive all collaborator access from this struct.
#[derive(Clone)]
pub struct ToolContext {
    pub invoker: ModelInvoker,
    pub clock: Arc<dyn Clock>,
    pub vectors: Arc<dyn VectorStore>,
    pub sql: Arc<dyn SqlEngine>,
}

/// Trait for tools the model may call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for the model
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool with all context provided via `ToolContext`
    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput;
}

/// Static collection of the tools available to conversations
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create the standard registry
    pub fn standard() -> Self {
        Self {
            tools: vec![
                Arc::new(ResolveRelativeDatesTool),
                Arc::new(RetrieveMovieInfoTool),
                Arc::new(QueryTimetableTool),
            ],
        }
    }

    #[cfg(test)]
    pub fn with_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Get all tool definitions for the model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Execute every call from one assistant message concurrently and join
    /// on all of them. Each result is tagged with its originating call id,
    /// whatever order the tools finish in. A failing or unknown tool yields
    /// failure text as its result, never a crash.
    pub async fn dispatch(&self, calls: &[ToolCall], ctx: &ToolContext) -> Vec<Message> {
        let futures = calls.iter().map(|call| {
            let ctx = ctx.clone();
            async move {
                let output = match self.find(&call.name) {
                    Some(tool) => tool.run(call.arguments.clone(), ctx).await,
                    None => ToolOutput::error(format!("Unknown tool: {}", call.name)),
                };
                tracing::debug!(
                    tool = %call.name,
                    call_id = %call.id,
                    success = output.success,
                    "tool call finished"
                );
                Message::tool(call.id.clone(), output.into_result_text())
            }
        });
        join_all(futures).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::test_context;
    use serde_json::json;
    use std::time::Duration;

    /// Echoes its label after an optional delay
    struct EchoTool {
        label: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.label
        }

        fn description(&self) -> String {
            "test echo".to_string()
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn run(&self, _input: Value, _ctx: ToolContext) -> ToolOutput {
            tokio::time::sleep(self.delay).await;
            ToolOutput::success(format!("echo from {}", self.label))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> String {
            "always fails".to_string()
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn run(&self, _input: Value, _ctx: ToolContext) -> ToolOutput {
            ToolOutput::error("upstream service unavailable")
        }
    }

    #[test]
    fn test_standard_registry_definitions() {
        let registry = ToolRegistry::standard();
        let names: Vec<_> = registry
            .definitions()
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(
            names,
            vec!["resolve_relative_dates", "retrieve_movie_info", "query_timetable"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_pairs_results_regardless_of_completion_order() {
        // The first call takes much longer than the second; results must
        // still come back aligned with their originating call ids.
        let registry = ToolRegistry::with_tools(vec![
            Arc::new(EchoTool {
                label: "slow",
                delay: Duration::from_secs(5),
            }),
            Arc::new(EchoTool {
                label: "fast",
                delay: Duration::from_millis(1),
            }),
        ]);
        let calls = vec![
            ToolCall::new("call_slow", "slow", json!({})),
            ToolCall::new("call_fast", "fast", json!({})),
        ];

        let results = registry.dispatch(&calls, &test_context()).await;

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0],
            Message::tool("call_slow", "echo from slow")
        );
        assert_eq!(
            results[1],
            Message::tool("call_fast", "echo from fast")
        );
    }

    #[tokio::test]
    async fn test_dispatch_converts_failure_to_result_text() {
        let registry = ToolRegistry::with_tools(vec![Arc::new(FailingTool)]);
        let calls = vec![ToolCall::new("c1", "failing", json!({}))];

        let results = registry.dispatch(&calls, &test_context()).await;
        assert_eq!(
            results[0].text(),
            "Tool execution failed: upstream service unavailable"
        );
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::with_tools(vec![]);
        let calls = vec![ToolCall::new("c1", "no_such_tool", json!({}))];

        let results = registry.dispatch(&calls, &test_context()).await;
        assert_eq!(
            results[0].text(),
            "Tool execution failed: Unknown tool: no_such_tool"
        );
    }
}
