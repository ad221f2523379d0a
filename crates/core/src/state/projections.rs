//! Read-only views of a finished run, as returned to callers.

use super::workflow_state::{
    AgentId, Message, NodeOperation, TaskResult, WorkflowStage, WorkflowState,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reply used when a run produced no messages at all
pub const EMPTY_RUN_REPLY: &str = "An error occurred while processing the request.";

/// Single-message summary of a run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ChatSummary {
    pub content: String,
    pub agent_type: AgentId,
    pub workflow_stage: WorkflowStage,
    pub risk_score: i64,
}

impl ChatSummary {
    pub fn from_state(state: &WorkflowState) -> Self {
        let (content, agent_type) = match state.last_message() {
            Some(msg) => (
                msg.content.clone(),
                msg.agent_type.unwrap_or(AgentId::Orchestrator),
            ),
            None => (EMPTY_RUN_REPLY.to_string(), AgentId::Orchestrator),
        };

        Self {
            content,
            agent_type,
            workflow_stage: state.workflow_stage,
            risk_score: state.risk_score(),
        }
    }
}

/// Full dump of a run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct WorkflowDump {
    pub messages: Vec<Message>,
    pub workflow_stage: WorkflowStage,
    pub task_results: Vec<TaskResult>,
    pub node_operations: Vec<NodeOperation>,
    pub risk_score: i64,
}

impl WorkflowDump {
    pub fn from_state(state: &WorkflowState) -> Self {
        Self {
            messages: state.messages().to_vec(),
            workflow_stage: state.workflow_stage,
            task_results: state.task_results().to_vec(),
            node_operations: state.node_operations().to_vec(),
            risk_score: state.risk_score(),
        }
    }
}

impl From<&WorkflowState> for ChatSummary {
    fn from(state: &WorkflowState) -> Self {
        Self::from_state(state)
    }
}

impl From<&WorkflowState> for WorkflowDump {
    fn from(state: &WorkflowState) -> Self {
        Self::from_state(state)
    }
}

/// JSON schema of `WorkflowState` for API consumers
pub fn state_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(WorkflowState);
    serde_json::to_value(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Payload;

    #[test]
    fn test_summary_uses_last_message() {
        let mut state = WorkflowState::new("Add login", Payload::new());
        state.push_message(Message::assistant(AgentId::Architect, "Node: LoginForm"));
        state.workflow_stage = WorkflowStage::Coding;

        let summary = ChatSummary::from_state(&state);
        assert_eq!(summary.content, "Node: LoginForm");
        assert_eq!(summary.agent_type, AgentId::Architect);
        assert_eq!(summary.workflow_stage, WorkflowStage::Coding);
        assert_eq!(summary.risk_score, 0);
    }

    #[test]
    fn test_summary_of_user_only_state_defaults_agent() {
        let state = WorkflowState::new("hello", Payload::new());
        let summary = ChatSummary::from(&state);
        assert_eq!(summary.content, "hello");
        assert_eq!(summary.agent_type, AgentId::Orchestrator);
    }

    #[test]
    fn test_dump_copies_collections() {
        let mut state = WorkflowState::new("x", Payload::new());
        state.push_message(Message::assistant(AgentId::Orchestrator, "ok"));
        let dump = WorkflowDump::from_state(&state);
        assert_eq!(dump.messages.len(), 2);
        assert!(dump.task_results.is_empty());
        assert!(dump.node_operations.is_empty());
    }

    #[test]
    fn test_state_schema_names_fields() {
        let schema = state_schema().to_string();
        assert!(schema.contains("workflow_stage"));
        assert!(schema.contains("node_operations"));
    }
}
