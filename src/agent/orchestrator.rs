//! The per-conversation turn loop

use super::phase::{self, TurnPhase};
use super::{AgentError, HistoryCondenser};
use crate::llm::{ChatRequest, ModelInvoker};
use crate::prompts;
use crate::store::{ConversationStore, Message};
use crate::tools::{ToolContext, ToolRegistry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Ceiling on AGENT->TOOLS cycles per turn. A model that keeps requesting
/// tools past this point aborts the turn instead of looping forever.
const MAX_TOOL_ROUNDS: usize = 8;

/// Ties the store, condenser, invoker and tool registry into the turn
/// state machine. All collaborators are injected at construction.
pub struct Orchestrator {
    store: Arc<dyn ConversationStore>,
    invoker: ModelInvoker,
    condenser: HistoryCondenser,
    tools: ToolRegistry,
    tool_context: ToolContext,
    turn_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        invoker: ModelInvoker,
        tools: ToolRegistry,
        tool_context: ToolContext,
    ) -> Self {
        Self {
            store,
            condenser: HistoryCondenser::new(invoker.clone()),
            invoker,
            tools,
            tool_context,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run one full turn and return the assistant's final answer.
    ///
    /// Turns for the same thread id are serialized in arrival order; turns
    /// for distinct thread ids never block each other. The checkpoint is
    /// replaced only after the turn completes, so a failed turn leaves the
    /// stored conversation exactly as it was.
    pub async fn handle_turn(&self, thread_id: &str, user_text: &str) -> Result<String, AgentError> {
        let _turn = self.turn_lock(thread_id).lock_owned().await;

        let mut messages = self.store.load(thread_id).await?;
        messages.push(Message::human(user_text));
        tracing::info!(thread_id, history = messages.len(), "turn started");

        let mut current = TurnPhase::Agent;
        let mut tool_rounds = 0usize;
        let answer = loop {
            match current {
                TurnPhase::Agent => {
                    if let Some(condensed) = self.condenser.condense(&messages).await {
                        messages = condensed;
                    }

                    let request = ChatRequest::new(messages.clone())
                        .with_system(prompts::ASSISTANT)
                        .with_tools(self.tools.definitions());
                    let assistant = self.invoker.invoke(&request).await?.into_message();

                    current = phase::advance(current, &assistant);
                    messages.push(assistant);
                }
                TurnPhase::Tools => {
                    tool_rounds += 1;
                    if tool_rounds > MAX_TOOL_ROUNDS {
                        tracing::error!(thread_id, tool_rounds, "turn exceeded tool-round ceiling");
                        return Err(AgentError::TurnLimitExceeded(MAX_TOOL_ROUNDS));
                    }

                    let calls = messages
                        .last()
                        .map(|m| m.tool_calls().to_vec())
                        .unwrap_or_default();
                    let results = self.tools.dispatch(&calls, &self.tool_context).await;
                    messages.extend(results);
                    current = TurnPhase::Agent;
                }
                TurnPhase::End => {
                    break messages
                        .last()
                        .map(|m| m.text().to_string())
                        .unwrap_or_default();
                }
            }
        };

        self.store.replace(thread_id, &messages).await?;
        tracing::info!(thread_id, tool_rounds, "turn completed");
        Ok(answer)
    }

    /// Per-thread turn lock; tokio's mutex hands it out in arrival order.
    fn turn_lock(&self, thread_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.turn_locks.lock().unwrap();
        locks.entry(thread_id.to_string()).or_default().clone()
    }
}
