//! # Pipeline Routing
//!
//! Pure mapping from (agent that just ran, stage it left) to the next agent.
//! The stage is the only routing key.
//!
//! ```text
//! orchestrator ──design──▶ architect ─┐
//!      ▲       ──coding──▶ coder ─────┤ (any stage but complete)
//!      │       ──qa──────▶ qa ────────┤
//!      └──────────────────────────────┘
//! ```

use crate::state::{AgentId, WorkflowStage};
use serde::{Deserialize, Serialize};

/// Routing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "step", content = "agent")]
pub enum NextStep {
    Agent(AgentId),
    Terminate,
}

/// Next step after `from` left the workflow in `stage`
pub fn route(from: AgentId, stage: WorkflowStage) -> NextStep {
    match from {
        AgentId::Orchestrator => route_from_orchestrator(stage),
        AgentId::Architect | AgentId::Coder | AgentId::Qa => route_back_to_orchestrator(stage),
    }
}

fn route_from_orchestrator(stage: WorkflowStage) -> NextStep {
    match stage {
        WorkflowStage::Design => NextStep::Agent(AgentId::Architect),
        WorkflowStage::Coding => NextStep::Agent(AgentId::Coder),
        WorkflowStage::Qa => NextStep::Agent(AgentId::Qa),
        WorkflowStage::Complete => NextStep::Terminate,
        // Wait for new user input
        WorkflowStage::Idle | WorkflowStage::Planning => NextStep::Terminate,
    }
}

fn route_back_to_orchestrator(stage: WorkflowStage) -> NextStep {
    match stage {
        WorkflowStage::Complete => NextStep::Terminate,
        WorkflowStage::Idle
        | WorkflowStage::Planning
        | WorkflowStage::Design
        | WorkflowStage::Coding
        | WorkflowStage::Qa => NextStep::Agent(AgentId::Orchestrator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_is_total() {
        for agent in AgentId::all() {
            for stage in WorkflowStage::all() {
                // Every pair yields a decision; complete always terminates
                let step = route(agent, stage);
                if stage == WorkflowStage::Complete {
                    assert_eq!(step, NextStep::Terminate);
                }
            }
        }
    }

    #[test]
    fn test_orchestrator_fan_out() {
        let from = AgentId::Orchestrator;
        assert_eq!(
            route(from, WorkflowStage::Design),
            NextStep::Agent(AgentId::Architect)
        );
        assert_eq!(
            route(from, WorkflowStage::Coding),
            NextStep::Agent(AgentId::Coder)
        );
        assert_eq!(route(from, WorkflowStage::Qa), NextStep::Agent(AgentId::Qa));
        assert_eq!(route(from, WorkflowStage::Idle), NextStep::Terminate);
        assert_eq!(route(from, WorkflowStage::Planning), NextStep::Terminate);
    }

    #[test]
    fn test_workers_return_to_orchestrator() {
        for agent in [AgentId::Architect, AgentId::Coder, AgentId::Qa] {
            for stage in WorkflowStage::all() {
                let expected = if stage == WorkflowStage::Complete {
                    NextStep::Terminate
                } else {
                    NextStep::Agent(AgentId::Orchestrator)
                };
                assert_eq!(route(agent, stage), expected);
            }
        }
    }
}
