mod handlers;
mod state;

use axum::Router;
use axum::routing::post;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::engine::ShadeEngine;

pub fn build_router(engine: ShadeEngine) -> Router {
    let state = Arc::new(AppState { engine });

    Router::new()
        .route("/api/shade", post(handlers::shade))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, engine: ShadeEngine) {
    let app = build_router(engine);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Shadeside server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}
