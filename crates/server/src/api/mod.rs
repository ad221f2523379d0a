//! # HTTP API
//!
//! Thin transport over the core engine. Every request builds its own
//! `Coordinator`, so concurrent runs never share workflow state.

pub mod workflow;
pub mod ws;

use axum::{
    routing::{get, post},
    Json, Router,
};
use opendev_core::llm::TextGenerator;
use opendev_core::swarm::{Coordinator, CoordinatorConfig};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::mock::mock_llm;

/// Where agent replies come from
pub enum Backend {
    /// A shared text-generation client
    Live(Arc<dyn TextGenerator>),
    /// Canned replies, fresh per run
    Mock,
}

impl Backend {
    pub fn llm(&self) -> Arc<dyn TextGenerator> {
        match self {
            Backend::Live(llm) => llm.clone(),
            Backend::Mock => Arc::new(mock_llm()),
        }
    }
}

/// Application state
pub struct AppState {
    backend: Backend,
    config: CoordinatorConfig,
}

impl AppState {
    pub fn new(backend: Backend, config: CoordinatorConfig) -> Self {
        Self { backend, config }
    }

    /// A coordinator for one run
    pub fn coordinator(&self) -> Coordinator {
        Coordinator::new(self.config.clone(), self.backend.llm())
    }
}

pub type SharedState = Arc<AppState>;

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OpenDev Agents API",
        version = "1.0.0",
        description = "Multi-agent workflow engine: Orchestrator, Architect, Coder and QA"
    ),
    paths(
        workflow::health,
        workflow::chat,
        workflow::run_workflow,
        workflow::workflow_schema
    ),
    components(schemas(
        workflow::ChatRequest,
        workflow::HealthResponse,
        workflow::ErrorBody
    )),
    tags(
        (name = "system", description = "Service health"),
        (name = "workflow", description = "Agent workflow runs")
    )
)]
pub struct ApiDoc;

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router(state: SharedState) -> Router {
    let workflow_routes = Router::new()
        .route("/run", post(workflow::run_workflow))
        .route("/schema", get(workflow::workflow_schema));

    Router::new()
        .route("/health", get(workflow::health))
        .route("/api/chat", post(workflow::chat))
        .nest("/api/workflow", workflow_routes)
        .route("/api/openapi.json", get(serve_openapi))
        .route("/ws/workflow", get(ws::workflow_socket))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for path in ["/health", "/api/chat", "/api/workflow/run", "/api/workflow/schema"] {
            assert!(paths.iter().any(|p| p == path), "missing {}", path);
        }
    }

    #[test]
    fn test_mock_backend_is_fresh_per_run() {
        let state = AppState::new(Backend::Mock, CoordinatorConfig::default());
        let a = state.backend.llm();
        let b = state.backend.llm();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
