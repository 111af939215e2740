mod app;
mod auth;
mod config;
mod db;
mod error;
#[cfg(test)]
mod memory;
mod state;
mod todos;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "todo_api=debug,axum=info,tower_http=info,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;
    let config = app_state.config.clone();

    let app = app::build_app(app_state);
    app::serve(app, &config).await
}
