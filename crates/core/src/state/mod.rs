pub mod projections;
pub mod workflow_state;

pub use projections::{state_schema, ChatSummary, WorkflowDump, EMPTY_RUN_REPLY};
pub use workflow_state::{
    summarize_output, AgentId, Artifact, CodeArtifact, IssueArtifact, Message, NodeOperation,
    NodeType, OperationKind, Payload, PendingStatus, Role, Severity, Task, TaskResult, TaskStatus,
    WorkflowStage, WorkflowState, OUTPUT_SUMMARY_LIMIT,
};
