use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::live::LiveView;

use super::api::aircraft as aircraft_handlers;
use super::api::scene as scene_handlers;
use super::api::selection as selection_handlers;
use super::api::status as status_handlers;
use super::api_doc::ApiDoc;
use super::config::{Config, ConfigError};
use super::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("live view: {0}")]
    Live(#[from] crate::live::LiveError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.config.web.static_dir.clone();

    let mut app = Router::new()
        .route("/api/aircraft", get(aircraft_handlers::list_aircraft))
        .route("/api/aircraft/{id}", get(aircraft_handlers::get_aircraft))
        .route("/api/scene", get(scene_handlers::get_scene))
        .route(
            "/api/selection",
            get(selection_handlers::get_selection).put(selection_handlers::put_selection),
        )
        .route("/api/status", get(status_handlers::get_status))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    if let Some(dir) = static_dir {
        app = app.nest_service("/viewer", ServeDir::new(dir));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<(), ServerError> {
    let bind_addr = config.web.bind.clone();
    let feed = config.feed.source()?;

    let mut live = LiveView::from_config(&config);
    live.start(feed)?;

    let state = AppState {
        config: Arc::new(config),
        live: live.handle(),
    };
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    log::info!("Stopping live view");
    live.stop().await;
    let status = live.status();
    log::info!(
        "live view stopped after {} polls and {} frames",
        status.polls,
        status.frames
    );
    served.map_err(ServerError::from)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {}", e);
    }
}
