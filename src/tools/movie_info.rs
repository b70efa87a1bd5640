//! Semantic movie lookup tool

use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Number of passages returned per lookup
const TOP_K: usize = 3;

pub struct RetrieveMovieInfoTool;

#[derive(Debug, Deserialize)]
struct MovieInfoInput {
    question: String,
}

#[async_trait]
impl Tool for RetrieveMovieInfoTool {
    fn name(&self) -> &str {
        "retrieve_movie_info"
    }

    fn description(&self) -> String {
        "Retrieve information about movies: genre, release dates, durations, ratings, cast, directors, and other movie-related details. Do not use this tool for showtimes or timetables. This tool returns accurate passages from the movie database rather than general knowledge.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["question"],
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The movie-related question to look up"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let input: MovieInfoInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let docs = match ctx.vectors.similarity_search(&input.question, TOP_K).await {
            Ok(docs) => docs,
            Err(e) => return ToolOutput::error(format!("Movie lookup failed: {e}")),
        };

        let serialized = docs
            .iter()
            .map(|doc| format!("Source: {}\nContent: {}", doc.metadata, doc.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        ToolOutput::success(serialized)
    }
}
