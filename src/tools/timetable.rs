//! Timetable query tool
//!
//! Two steps: the model generates a structured query against the engine's
//! dialect and schema, then the engine executes it. Both steps go through
//! the invoker and so share its retry contract.

use super::{Tool, ToolContext, ToolOutput};
use crate::llm::ChatRequest;
use crate::prompts;
use crate::store::Message;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct QueryTimetableTool;

#[derive(Debug, Deserialize)]
struct TimetableInput {
    question: String,
}

/// Structured output of the generation step
#[derive(Debug, Deserialize)]
struct QueryOutput {
    query: String,
}

#[async_trait]
impl Tool for QueryTimetableTool {
    fn name(&self) -> &str {
        "query_timetable"
    }

    fn description(&self) -> String {
        "Access the showtime database to find when and where movies are playing. This tool first generates an SQL query from the user's question and then executes it against the timetable.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["question"],
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The showtime question, with dates already resolved to explicit form"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let input: TimetableInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let table_info = match ctx.sql.table_info().await {
            Ok(info) => info,
            Err(e) => return ToolOutput::error(format!("Schema lookup failed: {e}")),
        };

        let prompt = prompts::generate_sql(ctx.sql.dialect(), &table_info, &input.question);
        let request = ChatRequest::new(vec![Message::human(prompt)]).json();
        let response = match ctx.invoker.invoke(&request).await {
            Ok(response) => response,
            Err(e) => return ToolOutput::error(format!("Query generation failed: {e}")),
        };

        let generated: QueryOutput = match serde_json::from_str(&response.content) {
            Ok(generated) => generated,
            Err(e) => {
                return ToolOutput::error(format!(
                    "Query generation returned malformed output: {e}"
                ))
            }
        };
        tracing::debug!(query = %generated.query, "generated timetable query");

        match ctx.sql.execute(&generated.query).await {
            Ok(rows) => ToolOutput::success(rows),
            Err(e) => ToolOutput::error(format!("Query execution failed: {e}")),
        }
    }
}
