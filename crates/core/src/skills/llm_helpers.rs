//! # LLM Helpers
//!
//! Shared prompt-history construction and reply bookkeeping for all skills.

use crate::llm::ChatTurn;
use crate::state::{AgentId, Message, Role, WorkflowState};

/// Max chars of a previous task result quoted back into the context turn
pub const CONTEXT_PREVIEW_LIMIT: usize = 200;

/// Conversation history for a backend call.
///
/// Every user/assistant message in order (system messages are not replayed),
/// then a synthesized user turn carrying the request and previous results.
pub fn build_history(state: &WorkflowState) -> Vec<ChatTurn> {
    let mut history: Vec<ChatTurn> = state
        .messages()
        .iter()
        .filter_map(|msg| match msg.role {
            Role::User => Some(ChatTurn::user(msg.content.clone())),
            Role::Assistant => Some(ChatTurn::assistant(msg.content.clone())),
            Role::System => None,
        })
        .collect();

    let context = build_context(state);
    if !context.is_empty() {
        history.push(ChatTurn::user(context));
    }

    history
}

/// Context turn: the user request and a digest of previous task results
pub fn build_context(state: &WorkflowState) -> String {
    let mut parts = Vec::new();

    if !state.user_request().is_empty() {
        parts.push(format!("User request: {}", state.user_request()));
    }

    if !state.task_results().is_empty() {
        parts.push("\nPrevious task results:".to_string());
        for result in state.task_results() {
            parts.push(format!("- {}: {}", result.agent, result.status.as_str()));
            if !result.output.is_empty() {
                let preview: String = result.output.chars().take(CONTEXT_PREVIEW_LIMIT).collect();
                parts.push(format!("  Output: {}...", preview));
            }
        }
    }

    parts.join("\n")
}

/// Append the agent's reply and mark it as the current agent
pub fn record_reply(state: &mut WorkflowState, agent: AgentId, reply: &str) {
    state.push_message(Message::assistant(agent, reply));
    state.current_agent = agent;
}
