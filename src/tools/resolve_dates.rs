//! Relative date resolution tool
//!
//! Rewrites the user's question so relative expressions become explicit
//! dates, using one model call parameterized by the injected clock.

use super::{Tool, ToolContext, ToolOutput};
use crate::llm::ChatRequest;
use crate::prompts;
use crate::store::Message;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct ResolveRelativeDatesTool;

#[derive(Debug, Deserialize)]
struct ResolveDatesInput {
    question: String,
}

#[async_trait]
impl Tool for ResolveRelativeDatesTool {
    fn name(&self) -> &str {
        "resolve_relative_dates"
    }

    fn description(&self) -> String {
        "Rewrites the user's question resolving all relative date and time expressions (\"tonight\", \"tomorrow\", \"this weekend\") into explicit dates. Use this before querying the timetable whenever the question contains a relative date or time.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["question"],
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The user's question containing relative date or time expressions"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let input: ResolveDatesInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let now = ctx.clock.now();
        let prompt = prompts::resolve_dates(
            &now.format("%Y-%m-%d").to_string(),
            &now.format("%H:%M").to_string(),
            &now.format("%A").to_string(),
            &input.question,
        );

        let request = ChatRequest::new(vec![Message::human(prompt)]);
        match ctx.invoker.invoke(&request).await {
            Ok(response) => ToolOutput::success(response.content),
            Err(e) => ToolOutput::error(format!("Date resolution failed: {e}")),
        }
    }
}
