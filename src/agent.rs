//! Agent orchestration engine
//!
//! One turn: load the conversation, append the user message, condense if
//! the history is long, then loop model invocation and tool dispatch until
//! the model stops requesting tools. The checkpoint is written back only
//! when the turn completes.

mod condenser;
mod orchestrator;
mod phase;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub(crate) mod testing;

pub use condenser::HistoryCondenser;
pub use orchestrator::Orchestrator;
pub use phase::TurnPhase;

use crate::llm::LlmError;
use crate::store::StoreError;
use thiserror::Error;

/// Failures that abort a turn and surface to the caller. Tool and
/// condensation failures are recovered inside the turn and never appear
/// here.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model provider failure: {0}")]
    Provider(#[from] LlmError),
    #[error("conversation store failure: {0}")]
    Persistence(#[from] StoreError),
    #[error("turn aborted after {0} tool rounds without a final answer")]
    TurnLimitExceeded(usize),
}
