//! # OpenDev Core
//!
//! The "Brain" of the OpenDev agent service - the four role agents, the
//! routing table between them, and the engine that drives a run.
//!
//! ## Architecture
//!
//! - `llm` - Text-generation seam (`TextGenerator`) and its backends
//! - `models` - LLM provider configuration
//! - `skills/` - Orchestrator, Architect, Coder and QA agents
//! - `state/` - The shared `WorkflowState` and its API projections
//! - `swarm/` - Routing and the workflow coordinator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use opendev_core::models::ModelConfig;
//! use opendev_core::swarm::{Coordinator, CoordinatorConfig, RunRequest};
//!
//! let llm = ModelConfig::from_env().create_llm()?;
//! let coordinator = Coordinator::new(CoordinatorConfig::default(), llm);
//! let state = coordinator.run(RunRequest::new("Add a like button")).await?;
//! ```

pub mod llm;
pub mod models;
pub mod skills;
pub mod state;
pub mod swarm;
