use axum::{extract::State, Json};

use crate::catalog::OrbitalElementRecord;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    post,
    path = "/api/elements/ingest",
    responses(
        (status = 200, description = "Feed ingested", body = String, content_type = "text/plain"),
        (status = 422, description = "Feed is malformed", body = ErrorResponse),
        (status = 502, description = "Feed could not be fetched", body = ErrorResponse)
    ),
    tag = "elements"
)]
pub async fn ingest(State(state): State<AppState>) -> ApiResult<String> {
    let count = state.pipeline.ingestor().ingest().await?;
    Ok(format!("Ingested {} element sets", count))
}

#[utoipa::path(
    get,
    path = "/api/elements",
    responses(
        (status = 200, description = "Stored element sets, by catalog number", body = Vec<OrbitalElementRecord>),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "elements"
)]
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<OrbitalElementRecord>>> {
    Ok(Json(state.pipeline.ingestor().records()?))
}
