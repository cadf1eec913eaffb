use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::services::images::placeholder::placeholder_svg;
use crate::services::images::{ImageResolver, ResolvedImage};

pub struct AppState {
    pub resolver: Arc<ImageResolver>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    #[serde(default)]
    name: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceholderParams {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    image: String,
    kind: &'static str,
    strategy: String,
}

pub fn create_router(resolver: Arc<ImageResolver>) -> Router {
    let state = Arc::new(AppState { resolver });

    Router::new()
        .route("/health", get(health_check))
        .route("/images/resolve", get(resolve_image))
        .route("/images/placeholder", get(placeholder_image))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves in the background. Returns the bound address.
pub async fn spawn(addr: &str, resolver: Arc<ImageResolver>) -> Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let app = create_router(resolver);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("❌ HTTP server stopped: {}", e);
        }
    });

    log::info!("🌐 HTTP server listening on {}", local_addr);
    Ok((local_addr, handle))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Always answers 200; the worst case is an inline placeholder.
async fn resolve_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveParams>,
) -> Json<ResolveResponse> {
    log::info!("🔎 Image requested for '{}'", params.name);

    let resolution = state
        .resolver
        .resolve_traced(&params.name, params.description.as_deref())
        .await;

    let strategy = resolution
        .strategy()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "placeholder".to_string());
    let kind = match resolution.image {
        ResolvedImage::Url(_) => "url",
        ResolvedImage::Inline(_) => "inline",
    };

    Json(ResolveResponse {
        image: resolution.image.into_src(),
        kind,
        strategy,
    })
}

async fn placeholder_image(Query(params): Query<PlaceholderParams>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], placeholder_svg(&params.name))
}
