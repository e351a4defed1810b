use axum::{
    extract::{Path, State},
    Json,
};

use crate::live::{cache_key, CachedPosition, CycleOutcome};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    post,
    path = "/api/positions/compute",
    responses(
        (status = 200, description = "Outcome of the triggered live cycle", body = CycleOutcome)
    ),
    tag = "positions"
)]
pub async fn compute(State(state): State<AppState>) -> Json<CycleOutcome> {
    Json(state.pipeline.live().run_cycle().await)
}

#[utoipa::path(
    get,
    path = "/api/positions/{name}",
    params(
        ("name" = String, Path, description = "Object name as it appears in the feed")
    ),
    responses(
        (status = 200, description = "Latest cached position", body = CachedPosition),
        (status = 404, description = "No position cached, or it has expired", body = ErrorResponse)
    ),
    tag = "positions"
)]
pub async fn get_position(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<CachedPosition>> {
    let value = state
        .pipeline
        .cache()
        .get(&cache_key(&name))
        .ok_or(ApiError::NotFound("position_not_found"))?;
    Ok(Json(serde_json::from_str(&value)?))
}
