use crate::storage::JobStore;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error};

/// Welcome endpoint
async fn home() -> impl IntoResponse {
    "Welcome to the Job Search API! Navigate to /jobs to see the job listings."
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "job-ingest",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Return every stored listing. The response field names and order are the
/// committed external contract; payload contents are never logged.
async fn list_jobs(Extension(store): Extension<Arc<dyn JobStore>>) -> impl IntoResponse {
    match store.scan_all().await {
        Ok(listings) => {
            debug!(count = listings.len(), "Serving stored job listings");
            Json(listings).into_response()
        }
        Err(e) => {
            error!("Failed to scan job listings: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Create the read-side HTTP service with all routes
pub fn create_server(store: Arc<dyn JobStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/jobs", get(list_jobs))
        .layer(Extension(store))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    store: Arc<dyn JobStore>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("HTTP server running on http://localhost:{port}");
    println!("Health check: http://localhost:{port}/health");
    println!("Job listings: http://localhost:{port}/jobs");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
