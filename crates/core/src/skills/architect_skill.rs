//! # Architect Skill
//!
//! Turns the architect's reply into pending `create` operations for the
//! canvas graph. Node declarations look like `Node: UserTable` (or
//! `노드: 좋아요 버튼`); the label runs to the end of the line or the next
//! comma. Always hands off to coding.

use crate::skills::agent_definitions::Skill;
use crate::skills::llm_helpers::record_reply;
use crate::skills::prompts;
use crate::skills::rules::NODE_TYPE_RULES;
use crate::state::{
    AgentId, NodeOperation, NodeType, OperationKind, Payload, TaskResult, TaskStatus,
    WorkflowStage, WorkflowState,
};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum node declarations considered per reply
pub const MAX_NODES: usize = 10;

fn node_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:노드|node)[:\s]+([^\n,]+)").expect("valid regex"))
}

/// Architect skill for designing the node graph
pub struct ArchitectSkill {
    system_prompt: String,
}

impl Default for ArchitectSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchitectSkill {
    pub fn new() -> Self {
        Self::with_prompt(prompts::ARCHITECT)
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: prompt.into(),
        }
    }

    /// Node type implied by a label
    pub fn infer_node_type(label: &str) -> NodeType {
        NODE_TYPE_RULES.classify(label)
    }

    /// One `create` operation per node declaration, in order of appearance.
    /// `order` is the declaration's index among the first `MAX_NODES` matches.
    pub fn parse_node_operations(response: &str) -> Vec<NodeOperation> {
        node_pattern()
            .captures_iter(response)
            .take(MAX_NODES)
            .enumerate()
            .filter_map(|(order, caps)| {
                let label = caps.get(1)?.as_str().trim();
                if label.is_empty() {
                    return None;
                }

                let mut data = Payload::new();
                data.insert("created_by".to_string(), AgentId::Architect.as_str().into());
                data.insert("order".to_string(), order.into());

                Some(NodeOperation {
                    operation: OperationKind::Create,
                    node_type: Some(Self::infer_node_type(label)),
                    node_id: None,
                    label: Some(label.to_string()),
                    data,
                })
            })
            .collect()
    }
}

impl Skill for ArchitectSkill {
    fn id(&self) -> AgentId {
        AgentId::Architect
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn apply_response(&self, mut state: WorkflowState, reply: &str) -> WorkflowState {
        record_reply(&mut state, AgentId::Architect, reply);

        state.push_task_result(TaskResult::new(
            AgentId::Architect,
            TaskStatus::Completed,
            reply,
        ));

        let ops = Self::parse_node_operations(reply);
        tracing::debug!(count = ops.len(), "Architect proposed node operations");
        state.extend_node_operations(ops);

        state.workflow_stage = WorkflowStage::Coding;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_extraction_and_types() {
        let reply = "Design:\nNode: UserTable\nNode: ValidateInput\nEdges: input flows to table.";
        let ops = ArchitectSkill::parse_node_operations(reply);

        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].operation, OperationKind::Create);
        assert_eq!(ops[0].label.as_deref(), Some("UserTable"));
        assert_eq!(ops[0].node_type, Some(NodeType::Data));
        assert_eq!(ops[0].data["order"], json!(0));
        assert_eq!(ops[0].data["created_by"], json!("architect"));

        assert_eq!(ops[1].label.as_deref(), Some("ValidateInput"));
        assert_eq!(ops[1].node_type, Some(NodeType::Function));
        assert_eq!(ops[1].data["order"], json!(1));
    }

    #[test]
    fn test_parse_is_repeatable() {
        let reply = "Node: LoginForm, Node: AuthHandler\n노드: 세션 테이블";
        let first = ArchitectSkill::parse_node_operations(reply);
        assert_eq!(first.len(), 3);
        assert_eq!(first, ArchitectSkill::parse_node_operations(reply));
    }

    #[test]
    fn test_label_stops_at_comma() {
        let ops = ArchitectSkill::parse_node_operations("node: LikeButton, then more text");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].label.as_deref(), Some("LikeButton"));
        assert_eq!(ops[0].node_type, Some(NodeType::Action));
    }

    #[test]
    fn test_korean_marker() {
        let ops = ArchitectSkill::parse_node_operations("노드: 좋아요 데이터 저장\n노드: 입력 검증");
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].node_type, Some(NodeType::Data));
        assert_eq!(ops[1].node_type, Some(NodeType::Function));
    }

    #[test]
    fn test_caps_at_ten_nodes() {
        let reply: String = (0..15).map(|i| format!("Node: Step{}\n", i)).collect();
        let ops = ArchitectSkill::parse_node_operations(&reply);
        assert_eq!(ops.len(), MAX_NODES);
        assert_eq!(ops[9].label.as_deref(), Some("Step9"));
    }

    #[test]
    fn test_apply_always_moves_to_coding() {
        let skill = ArchitectSkill::new();
        let state = WorkflowState::new("Add likes", crate::state::Payload::new());

        let next = skill.apply_response(state, "I could not design anything.");

        assert_eq!(next.workflow_stage, WorkflowStage::Coding);
        assert!(next.node_operations().is_empty());
        assert_eq!(next.task_results().len(), 1);
        assert_eq!(next.task_results()[0].agent, AgentId::Architect);
        assert_eq!(next.current_agent, AgentId::Architect);
    }
}
