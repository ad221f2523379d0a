//! # Swarm Orchestration
//!
//! Coordinates the agent pipeline for OpenDev.
//!
//! ## Pipeline Flow
//!
//! ```text
//! User Request → Orchestrator ⟷ { Architect | Coder | QA } → Complete
//! ```

pub mod coordinator;
pub mod events;
pub mod pipeline;

pub use coordinator::{
    Coordinator, CoordinatorConfig, RunRequest, WorkflowError, DEFAULT_MAX_HOPS,
    DEFAULT_RUN_TIMEOUT_SECS,
};
pub use events::{WorkflowEvent, WorkflowEventKind};
pub use pipeline::{route, NextStep};
