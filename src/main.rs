mod app;
mod appointments;
mod config;
mod error;
mod extractors;
mod health;
mod state;
mod users;
mod validator;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "lockit=debug,axum=info,tower_http=info".to_string());
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

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr();
    tracing::info!(environment = %config.environment, version = %config.version, "starting server");

    let app_state = AppState::init(config).await?;
    tracing::info!("database connection established");

    app::serve(app::build_app(app_state), &addr).await
}
