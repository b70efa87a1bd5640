//! Property tests for the condensation predicate and phase transition

use super::condenser::{HistoryCondenser, CONDENSE_THRESHOLD};
use super::phase::{advance, TurnPhase};
use crate::store::{Message, ToolCall};
use proptest::prelude::*;

proptest! {
    /// Condensation fires iff the log is at the threshold and the latest
    /// message is human-authored, for any length and last author.
    #[test]
    fn condense_iff_threshold_and_human_last(len in 0usize..30, last_human: bool) {
        let mut messages: Vec<Message> = (0..len)
            .map(|i| Message::assistant(format!("answer {i}")))
            .collect();
        if let Some(slot) = messages.last_mut() {
            *slot = if last_human {
                Message::human("latest")
            } else {
                Message::tool("c1", "rows")
            };
        }

        let expected = len >= CONDENSE_THRESHOLD && last_human;
        prop_assert_eq!(HistoryCondenser::should_condense(&messages), expected);
    }

    /// An assistant message ends the turn exactly when it carries no tool
    /// calls, however many calls it otherwise carries.
    #[test]
    fn agent_phase_ends_iff_no_calls(n_calls in 0usize..5) {
        let calls: Vec<ToolCall> = (0..n_calls)
            .map(|i| ToolCall::new(format!("call_{i}"), "query_timetable", serde_json::json!({})))
            .collect();
        let assistant = Message::assistant_with_calls("", calls);

        let expected = if n_calls == 0 { TurnPhase::End } else { TurnPhase::Tools };
        prop_assert_eq!(advance(TurnPhase::Agent, &assistant), expected);
    }
}
