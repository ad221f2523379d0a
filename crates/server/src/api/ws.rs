//! # Workflow WebSocket
//!
//! The client sends one `ChatRequest` as a text frame. The server streams
//! `{type: "event"}` frames while the run progresses, then one
//! `{type: "result"}` (or `{type: "error"}`) frame, and closes.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use opendev_core::state::{ChatSummary, WorkflowDump, WorkflowState};
use opendev_core::swarm::{WorkflowError, WorkflowEvent};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::workflow::ChatRequest;
use super::SharedState;

/// Buffered events per socket before the run waits on the client
const EVENT_BUFFER: usize = 64;

pub async fn workflow_socket(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_workflow_socket(socket, state))
}

async fn handle_workflow_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();

    let request = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ChatRequest>(&text) {
                Ok(request) => break request,
                Err(e) => {
                    let frame = error_frame(&format!("invalid request: {}", e), None);
                    let _ = sender.send(Message::Text(frame.to_string())).await;
                    return;
                }
            },
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "WebSocket receive failed");
                return;
            }
        }
    };

    tracing::info!(project_id = %request.project_id, "Workflow socket run");

    let (tx, mut rx) = mpsc::channel::<WorkflowEvent>(EVENT_BUFFER);
    let coordinator = state.coordinator().with_event_channel(tx);
    let run = tokio::spawn(async move {
        coordinator
            .run_with_timeout(request.into_run_request())
            .await
    });

    // The channel closes once the run finishes and drops the coordinator
    while let Some(event) = rx.recv().await {
        if sender
            .send(Message::Text(event_frame(&event).to_string()))
            .await
            .is_err()
        {
            tracing::debug!("Client went away, run continues without streaming");
            break;
        }
    }
    drop(rx);

    let frame = match run.await {
        Ok(result) => result_frame(result),
        Err(e) => error_frame(&format!("run task failed: {}", e), None),
    };
    let _ = sender.send(Message::Text(frame.to_string())).await;
    let _ = sender.close().await;
}

/// Events carry the agent's UI label next to its id
fn event_frame(event: &WorkflowEvent) -> Value {
    json!({
        "type": "event",
        "agent_name": event.agent.map(|agent| agent.display_name()),
        "event": event,
    })
}

fn result_frame(result: Result<WorkflowState, WorkflowError>) -> Value {
    match result {
        Ok(state) => json!({
            "type": "result",
            "summary": ChatSummary::from_state(&state),
            "workflow": WorkflowDump::from_state(&state),
        }),
        Err(err) => error_frame(
            &err.to_string(),
            err.last_stage().map(|stage| stage.as_str()),
        ),
    }
}

fn error_frame(message: &str, workflow_stage: Option<&str>) -> Value {
    json!({
        "type": "error",
        "error": message,
        "workflow_stage": workflow_stage,
    })
}
