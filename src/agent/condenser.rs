//! History condensation
//!
//! Long conversations are compressed into a model-written summary plus the
//! latest user message. The replacement sequence is built immutably and
//! swapped in whole; a failed summarization leaves the history untouched.

use crate::llm::{ChatRequest, ModelInvoker};
use crate::prompts;
use crate::store::Message;

/// Condense once the log reaches this many messages
pub const CONDENSE_THRESHOLD: usize = 10;

pub struct HistoryCondenser {
    invoker: ModelInvoker,
}

impl HistoryCondenser {
    pub fn new(invoker: ModelInvoker) -> Self {
        Self { invoker }
    }

    /// Condense iff the log is long enough and the latest message is
    /// human-authored. Mid-turn tool exchanges are never summarized.
    pub fn should_condense(messages: &[Message]) -> bool {
        messages.len() >= CONDENSE_THRESHOLD && messages.last().is_some_and(Message::is_human)
    }

    /// Produce the replacement sequence `[summary, last human message]`,
    /// or `None` when condensation does not apply or the summarization
    /// call failed (the turn then proceeds on the full history).
    pub async fn condense(&self, messages: &[Message]) -> Option<Vec<Message>> {
        if !Self::should_condense(messages) {
            return None;
        }
        let (last, history) = messages.split_last()?;

        let mut to_summarize = history.to_vec();
        to_summarize.push(Message::human(prompts::DIALOGUE_SUMMARY));

        match self.invoker.invoke(&ChatRequest::new(to_summarize)).await {
            Ok(response) => {
                tracing::info!(
                    condensed = messages.len(),
                    "condensed conversation history"
                );
                Some(vec![Message::assistant(response.content), last.clone()])
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "history condensation failed, keeping full history"
                );
                None
            }
        }
    }
}
