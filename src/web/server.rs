use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::propagation::Sgp4Engine;

use super::api::elements as element_handlers;
use super::api::positions as position_handlers;
use super::api::status as status_handlers;
use super::api::trajectories as trajectory_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;
use super::ws;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Element sets
        .route("/api/elements", get(element_handlers::list))
        .route("/api/elements/ingest", post(element_handlers::ingest))
        // Trajectories
        .route(
            "/api/trajectories/generate",
            post(trajectory_handlers::generate),
        )
        .route(
            "/api/trajectories/{catalog_id}",
            get(trajectory_handlers::get_trajectory),
        )
        // Live positions
        .route("/api/positions/compute", post(position_handlers::compute))
        .route("/api/positions/{name}", get(position_handlers::get_position))
        .route("/ws/positions", get(ws::positions))
        .route("/api/status", get(status_handlers::status))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API and runs the pipeline: startup ingest and trajectory run in the
/// background, the live loop from the first tick and, when `feed.refresh` is set, the
/// refresh loop. Returns after Ctrl-C.
pub async fn run_server(config: Config, pipeline: Pipeline<Sgp4Engine>) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    let state = AppState {
        config: Arc::new(config),
        pipeline: Arc::new(pipeline),
    };

    let live = state.pipeline.spawn_live_loop(state.config.live.period);
    let refresh = state
        .config
        .feed
        .refresh
        .map(|period| state.pipeline.spawn_refresh_loop(period));

    let startup = {
        let pipeline = state.pipeline.clone();
        let config = state.config.clone();
        tokio::spawn(async move { pipeline.startup(&config.startup).await })
    };

    log::info!("Starting server on {}", bind_addr);

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    startup.abort();
    live.stop().await;
    if let Some(refresh) = refresh {
        refresh.stop().await;
    }
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticFeed;
    use reqwest::StatusCode;

    const ISS: &str = "\
ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537
";

    struct TestServer {
        base: String,
        client: reqwest::Client,
        pipeline: Arc<Pipeline<Sgp4Engine>>,
    }

    impl TestServer {
        async fn start(feed: &str) -> Self {
            let config = Config::default();
            let pipeline =
                Arc::new(Pipeline::with_feed(&config, Box::new(StaticFeed::new(feed))).unwrap());
            let state = AppState {
                config: Arc::new(config),
                pipeline: pipeline.clone(),
            };

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, router(state)).await });

            TestServer {
                base: format!("http://{}", addr),
                client: reqwest::Client::new(),
                pipeline,
            }
        }

        async fn send(&self, method: reqwest::Method, path: &str) -> (StatusCode, String) {
            let response = self
                .client
                .request(method, format!("{}{}", self.base, path))
                .send()
                .await
                .unwrap();
            let status = response.status();
            (status, response.text().await.unwrap())
        }

        async fn get(&self, path: &str) -> (StatusCode, String) {
            self.send(reqwest::Method::GET, path).await
        }

        async fn post(&self, path: &str) -> (StatusCode, String) {
            self.send(reqwest::Method::POST, path).await
        }
    }

    #[tokio::test]
    async fn ingest_reports_count_and_lists_records() {
        let server = TestServer::start(ISS).await;

        let (status, body) = server.post("/api/elements/ingest").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Ingested 1 element sets");

        let (status, body) = server.get("/api/elements").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#""catalog_id":25544"#));
        assert!(body.contains("ISS (ZARYA)"));
    }

    #[tokio::test]
    async fn malformed_feed_is_unprocessable() {
        let server = TestServer::start("BROKEN\n1 ABCDEU\n2 ABCDE\n").await;
        let (status, body) = server.post("/api/elements/ingest").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("feed_malformed"));
    }

    #[tokio::test]
    async fn unknown_trajectory_is_not_found() {
        let server = TestServer::start(ISS).await;
        let (status, body) = server.get("/api/trajectories/99999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"trajectory_not_found"}"#);
    }

    #[tokio::test]
    async fn manual_cycle_before_any_trajectory_is_not_ready() {
        let server = TestServer::start(ISS).await;
        let (status, body) = server.post("/api/positions/compute").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"outcome":"not_ready"}"#);
        assert!(server.pipeline.cache().get("sat:ISS (ZARYA)").is_none());

        let (status, _) = server.get("/api/positions/ISS%20(ZARYA)").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_reports_readiness_and_counters() {
        let server = TestServer::start(ISS).await;
        server.post("/api/elements/ingest").await;

        let (status, body) = server.get("/api/status").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["ready"], false);
        assert_eq!(json["metrics"]["records_ingested"], 1);
    }
}
