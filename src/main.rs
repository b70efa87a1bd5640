//! Marquee - cinema showtime assistant
//!
//! A terminal chat loop over an agent orchestration engine: per-thread
//! conversation checkpoints, history condensation, tool-equipped model
//! invocation with bounded retry.

mod agent;
mod config;
mod external;
mod llm;
mod prompts;
mod store;
mod tools;

use agent::Orchestrator;
use config::Config;
use external::{ChromaStore, MistralEmbeddings, SqliteTimetable, SystemClock};
use llm::{LoggingService, MistralService, ModelInvoker};
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;
use store::SqliteStore;
use tokio::io::AsyncBufReadExt;
use tools::{ToolContext, ToolRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The terminal front end is a single conversation
const TERMINAL_THREAD_ID: &str = "terminal";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let Some(api_key) = config.mistral_api_key.clone() else {
        tracing::error!("No Mistral API key configured. Set MISTRAL_API_KEY.");
        return Err("MISTRAL_API_KEY is required".into());
    };

    for db_path in [&config.conversations_db, &config.timetable_db] {
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    tracing::info!(path = %config.conversations_db, "opening conversation store");
    let store = Arc::new(SqliteStore::open(&config.conversations_db)?);

    tracing::info!(path = %config.timetable_db, "opening timetable");
    let timetable = Arc::new(SqliteTimetable::open(&config.timetable_db)?);

    let service = Arc::new(LoggingService::new(Arc::new(MistralService::new(
        api_key.clone(),
        config.chat_model.clone(),
    ))));
    let invoker = ModelInvoker::new(service);

    let embeddings = MistralEmbeddings::new(api_key, config.embed_model.clone());
    let vectors = Arc::new(ChromaStore::new(
        config.chroma_url.clone(),
        config.chroma_collection.clone(),
        embeddings,
    ));

    let tool_context = ToolContext {
        invoker: invoker.clone(),
        clock: Arc::new(SystemClock),
        vectors,
        sql: timetable,
    };
    let orchestrator = Orchestrator::new(store, invoker, ToolRegistry::standard(), tool_context);

    tracing::info!(model = %config.chat_model, "ready");
    println!("Ask about movies and showtimes (\"exit\" to quit).");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        match orchestrator.handle_turn(TERMINAL_THREAD_ID, input).await {
            Ok(answer) => println!("Agent: {answer}"),
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                println!("Agent: something went wrong, please try again.");
            }
        }
    }

    Ok(())
}
