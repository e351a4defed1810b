use axum::{
    extract::{Path, State},
    Json,
};

use crate::trajectory::{TrajectoryBatchReport, TrajectoryRecord};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    post,
    path = "/api/trajectories/generate",
    responses(
        (status = 200, description = "Trajectories recomputed", body = TrajectoryBatchReport),
        (status = 500, description = "Element sets could not be read", body = ErrorResponse)
    ),
    tag = "trajectories"
)]
pub async fn generate(State(state): State<AppState>) -> ApiResult<Json<TrajectoryBatchReport>> {
    let report = state.pipeline.trajectories().compute_and_store_all().await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/trajectories/{catalog_id}",
    params(
        ("catalog_id" = u32, Path, description = "NORAD catalog number")
    ),
    responses(
        (status = 200, description = "Stored trajectory", body = TrajectoryRecord),
        (status = 404, description = "No trajectory for this object", body = ErrorResponse)
    ),
    tag = "trajectories"
)]
pub async fn get_trajectory(
    State(state): State<AppState>,
    Path(catalog_id): Path<u32>,
) -> ApiResult<Json<TrajectoryRecord>> {
    state
        .pipeline
        .trajectories()
        .get_by_catalog_id(catalog_id)?
        .map(Json)
        .ok_or(ApiError::NotFound("trajectory_not_found"))
}
