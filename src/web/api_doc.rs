use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::status::StatusResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::elements::ingest,
        super::api::elements::list,
        super::api::trajectories::generate,
        super::api::trajectories::get_trajectory,
        super::api::positions::compute,
        super::api::positions::get_position,
        super::api::status::status,
    ),
    components(
        schemas(
            ErrorResponse,
            StatusResponse,
            crate::catalog::OrbitalElementRecord,
            crate::trajectory::TrajectoryRecord,
            crate::trajectory::TrajectoryBatchReport,
            crate::batch::RecordFailure,
            crate::propagation::GeodeticPosition,
            crate::live::CachedPosition,
            crate::live::CycleOutcome,
            crate::live::CycleSummary,
            crate::live::LivePositionSnapshot,
            crate::broadcast::PositionBroadcast,
            crate::metrics::MetricsSnapshot,
        )
    ),
    info(
        title = "Sat-O-Cast API",
        description = "Element set ingestion, ground-track trajectories and live satellite positions. \
                       Live cycles are also pushed over the WebSocket at /ws/positions.",
        version = "0.1.0"
    ),
    tags(
        (name = "elements", description = "Element set ingestion"),
        (name = "trajectories", description = "Stored ground tracks"),
        (name = "positions", description = "Live positions"),
        (name = "status", description = "Pipeline status")
    )
)]
pub struct ApiDoc;
