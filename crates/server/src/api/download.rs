//! Bundle downloads streamed as server-sent events.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::StreamExt;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use songbundle_core::{
    progress_channel, DownloadRequest, InputError, PipelineError, ProgressEvent,
};

use super::handlers::ErrorResponse;
use crate::metrics::{record_pipeline_outcome, PIPELINES_ACTIVE, PROGRESS_EVENTS_SENT};
use crate::state::AppState;

/// Interval between keep-alive comments on an idle stream.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// POST /download
///
/// Validates the body, then runs the pipeline in its own task and streams
/// its progress. Input errors are answered with 400 before any work starts.
pub async fn start_download(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let request = match parse_request(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected download request: {}", e);
            let error = PipelineError::from(e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(error.to_string())),
            )
                .into_response();
        }
    };

    info!(
        "Starting download of {} songs (format: {})",
        request.songs.len(),
        request
            .format
            .map(|f| f.to_string())
            .unwrap_or_else(|| "default".to_string())
    );

    let (reporter, rx) = progress_channel(state.config().pipeline.event_buffer);
    let pipeline = state.pipeline();
    tokio::spawn(async move {
        PIPELINES_ACTIVE.inc();
        let started = Instant::now();
        let outcome = pipeline.run(request, reporter).await;
        PIPELINES_ACTIVE.dec();
        record_pipeline_outcome(&outcome, started.elapsed());
    });

    let stream = ReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(to_sse_event(&event)));
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
        .into_response()
}

fn parse_request(payload: Result<Json<Value>, JsonRejection>) -> Result<DownloadRequest, InputError> {
    let Json(body) = payload.map_err(|rejection| InputError::Malformed(rejection.body_text()))?;
    DownloadRequest::from_json(&body)
}

/// SSE event named after the stage, carrying the event as JSON.
fn to_sse_event(event: &ProgressEvent) -> Event {
    let stage = event.stage.as_str();
    PROGRESS_EVENTS_SENT.with_label_values(&[stage]).inc();
    match Event::default().event(stage).json_data(event) {
        Ok(sse) => sse,
        Err(e) => {
            warn!("Failed to serialize {} event: {}", stage, e);
            Event::default().event(stage).comment("unserializable event")
        }
    }
}
