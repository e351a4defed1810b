use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::metrics::MetricsSnapshot;
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// True once any trajectory has been stored.
    pub ready: bool,
    pub subscribers: usize,
    pub metrics: MetricsSnapshot,
}

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Pipeline status", body = StatusResponse)
    ),
    tag = "status"
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let pipeline = &state.pipeline;
    Json(StatusResponse {
        ready: pipeline.gate().is_ready(),
        subscribers: pipeline.hub().subscriber_count(),
        metrics: pipeline.metrics().snapshot(),
    })
}
