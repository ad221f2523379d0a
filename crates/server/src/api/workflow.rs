//! # Workflow API
//!
//! Run endpoints and the mapping from `WorkflowError` to HTTP status.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opendev_core::state::{state_schema, ChatSummary, Payload, WorkflowDump};
use opendev_core::swarm::{RunRequest, WorkflowError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SharedState;

// === API Types ===

/// A user message for the agent team
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub project_id: String,
    pub message: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub project_context: Payload,
}

impl ChatRequest {
    pub fn into_run_request(self) -> RunRequest {
        RunRequest::new(self.message).with_context(self.project_context)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_stage: Option<String>,
}

/// A failed run as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub WorkflowError);

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::Backend { .. } => StatusCode::BAD_GATEWAY,
        WorkflowError::HopLimitExceeded { .. } => StatusCode::LOOP_DETECTED,
        WorkflowError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        WorkflowError::MissingSkill(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        tracing::warn!(%status, error = %self.0, "Workflow run failed");

        let body = ErrorBody {
            error: self.0.to_string(),
            workflow_stage: self.0.last_stage().map(|stage| stage.as_str().to_string()),
        };
        (status, Json(body)).into_response()
    }
}

// === API Handlers ===

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "opendev-agents".to_string(),
    })
}

/// Run the workflow and return the last message
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "workflow",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Summary of the finished run", body = serde_json::Value),
        (status = 502, description = "Text-generation backend failed", body = ErrorBody),
        (status = 504, description = "Run exceeded its time budget", body = ErrorBody),
        (status = 508, description = "Hop limit reached", body = ErrorBody)
    )
)]
pub async fn chat(
    State(state): State<SharedState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatSummary>, ApiError> {
    tracing::info!(project_id = %req.project_id, "Chat request");
    let final_state = state
        .coordinator()
        .run_with_timeout(req.into_run_request())
        .await?;
    Ok(Json(ChatSummary::from_state(&final_state)))
}

/// Run the workflow and return the full state dump
#[utoipa::path(
    post,
    path = "/api/workflow/run",
    tag = "workflow",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Messages, task results and node operations", body = serde_json::Value),
        (status = 502, description = "Text-generation backend failed", body = ErrorBody),
        (status = 504, description = "Run exceeded its time budget", body = ErrorBody),
        (status = 508, description = "Hop limit reached", body = ErrorBody)
    )
)]
pub async fn run_workflow(
    State(state): State<SharedState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<WorkflowDump>, ApiError> {
    tracing::info!(project_id = %req.project_id, "Workflow run request");
    let final_state = state
        .coordinator()
        .run_with_timeout(req.into_run_request())
        .await?;
    Ok(Json(WorkflowDump::from_state(&final_state)))
}

/// JSON schema of the workflow state
#[utoipa::path(
    get,
    path = "/api/workflow/schema",
    tag = "workflow",
    responses(
        (status = 200, description = "JSON schema of WorkflowState", body = serde_json::Value)
    )
)]
pub async fn workflow_schema() -> impl IntoResponse {
    Json(state_schema())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AppState, Backend};
    use opendev_core::llm::ScriptedLlm;
    use opendev_core::skills::prompts;
    use opendev_core::state::{AgentId, WorkflowStage, WorkflowState};
    use opendev_core::swarm::CoordinatorConfig;
    use std::sync::Arc;

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            project_id: "p-1".to_string(),
            message: message.to_string(),
            project_context: Payload::new(),
        }
    }

    fn live_state(llm: ScriptedLlm) -> SharedState {
        Arc::new(AppState::new(
            Backend::Live(Arc::new(llm)),
            CoordinatorConfig::default(),
        ))
    }

    async fn error_body(response: Response) -> ErrorBody {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "opendev-agents");
    }

    #[tokio::test]
    async fn test_chat_with_mock_backend_completes() {
        let state = Arc::new(AppState::new(Backend::Mock, CoordinatorConfig::default()));

        let Json(summary) = chat(State(state), Json(request("Add a signup form")))
            .await
            .unwrap();

        assert_eq!(summary.workflow_stage, WorkflowStage::Complete);
        assert_eq!(summary.agent_type, AgentId::Qa);
        assert_eq!(summary.risk_score, 0);
    }

    #[tokio::test]
    async fn test_run_workflow_dumps_state() {
        let state = Arc::new(AppState::new(Backend::Mock, CoordinatorConfig::default()));

        let Json(dump) = run_workflow(State(state), Json(request("Add a signup form")))
            .await
            .unwrap();

        assert_eq!(dump.workflow_stage, WorkflowStage::Complete);
        assert_eq!(dump.node_operations.len(), 3);
        assert_eq!(dump.task_results.len(), 3);
    }

    #[tokio::test]
    async fn test_hop_limit_maps_to_508_with_stage() {
        let llm = ScriptedLlm::new()
            .always(prompts::ORCHESTRATOR, &["architect, start the design"])
            .always(prompts::ARCHITECT, &["Node: Loop"]);

        let err = chat(State(live_state(llm)), Json(request("loop")))
            .await
            .unwrap_err();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::LOOP_DETECTED);
        let body = error_body(response).await;
        assert_eq!(body.workflow_stage.as_deref(), Some("design"));
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_502() {
        let err = chat(State(live_state(ScriptedLlm::new())), Json(request("x")))
            .await
            .unwrap_err();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = error_body(response).await;
        assert!(body.workflow_stage.is_none());
        assert!(body.error.contains("orchestrator"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&WorkflowError::Timeout { secs: 120 }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&WorkflowError::MissingSkill(AgentId::Qa)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let state = WorkflowState::new("x", Payload::new());
        assert_eq!(
            status_for(&WorkflowError::HopLimitExceeded {
                hops: 25,
                stage: state.workflow_stage,
                state: Box::new(state),
            }),
            StatusCode::LOOP_DETECTED
        );
    }

    #[test]
    fn test_chat_request_context_is_optional() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"project_id": "p", "message": "hi"}"#).unwrap();
        assert!(req.project_context.is_empty());
    }
}
