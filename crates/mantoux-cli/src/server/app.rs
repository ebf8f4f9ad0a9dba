//! Axum application setup.

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Analyses
        .route("/analysis/:kind", get(handlers::run_analysis))
        .route("/chart/:kind", get(handlers::chart))
        // Dataset
        .route("/data", get(handlers::data_preview))
        .route("/overview", get(handlers::overview))
        .route("/quality", get(handlers::quality))
        .route("/top-countries", get(handlers::top_countries))
        .route("/regions", get(handlers::region_summary))
        // Lifecycle
        .route("/refresh-data", get(handlers::refresh_data))
        .route("/export/csv", get(handlers::export_csv));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
