use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{field, Span};

use crate::images::services::IMAGES_ENDPOINT;
use crate::state::AppState;
use crate::{auth, listings, users};

/// Every request gets a span; `user_id` is filled in once the bearer token resolves.
fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri(),
        status = field::Empty,
        user_id = field::Empty
    )
}

fn log_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", field::display(status));
    let latency_ms = latency.as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%status, latency_ms, "response");
    } else {
        tracing::info!(%status, latency_ms, "response");
    }
}

pub fn build_app(state: AppState) -> Router {
    let images = ServeDir::new(&state.config.images.folder_path);
    let max_picture_bytes = state.config.images.max_size_bytes();

    Router::new()
        .merge(users::router(max_picture_bytes))
        .merge(auth::router())
        .merge(listings::router())
        .route("/health", get(|| async { "ok" }))
        .nest_service(IMAGES_ENDPOINT, images)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(log_response),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port = std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into());
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "marketplace listening");
    axum::serve(listener, app).await?;
    Ok(())
}
