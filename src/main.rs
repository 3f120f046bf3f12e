mod app;
mod auth;
mod config;
mod error;
mod extract;
mod guards;
mod images;
mod listings;
mod state;
mod storage;
mod store;
mod users;


/// `RUST_LOG` picks the filter, `LOG_FORMAT=json` switches to structured output.
fn init_tracing() {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "marketplace=debug,axum=info,tower_http=info".to_string());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.with_target(false).json().init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let state = state::AppState::init().await?;
    app::serve(app::build_app(state)).await
}
