//! Pure turn-phase transition
//!
//! A turn walks `Agent -> (Tools -> Agent)* -> End`. The transition is a
//! pure function of the current phase and the latest message, so the loop's
//! control flow can be tested without any I/O.

use crate::store::Message;

/// Where the turn loop stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Invoke the model next
    Agent,
    /// Dispatch the pending tool calls next
    Tools,
    /// Turn complete
    End,
}

/// Advance the phase given the message that step produced.
///
/// After `Agent` the deciding message is the assistant's: tool calls mean
/// the tools run next, none means the answer is final. `Tools` always hands
/// back to `Agent` — the model must see the results before finishing.
pub fn advance(phase: TurnPhase, latest: &Message) -> TurnPhase {
    match phase {
        TurnPhase::Agent => {
            if latest.tool_calls().is_empty() {
                TurnPhase::End
            } else {
                TurnPhase::Tools
            }
        }
        TurnPhase::Tools => TurnPhase::Agent,
        TurnPhase::End => TurnPhase::End,
    }
}
