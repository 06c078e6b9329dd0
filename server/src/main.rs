// src/main.rs

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia::Result as AppResult;
use trivia::catalog::load_catalog;
use trivia::config::load_settings;
use trivia::state::AppState;
use trivia::store::QuizStore;
use trivia::web::run_server;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=info,tower_http=debug,{}::store=debug",
                    env!("CARGO_CRATE_NAME"),
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_settings = load_settings()?;
    tracing::info!("Configuration loaded: {:?}", app_settings);

    let catalog = load_catalog(&app_settings.catalog).await?;
    let store = Arc::new(QuizStore::new(catalog));
    tracing::info!(
        question.count = store.catalog_len(),
        "Question store initialized"
    );

    let app_state = AppState::new(store, app_settings.quiz);

    run_server(app_state, app_settings.server).await?;

    Ok(())
}
