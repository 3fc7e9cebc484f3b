//! Lifeline API server entry point.

use std::sync::Arc;
use std::time::Duration;

use lifeline_api::config::AppConfig;
use lifeline_api::error::AppError;
use lifeline_api::persistence::{self, FileStore};
use lifeline_api::presentation::CueOutbox;
use lifeline_api::state::AppState;
use lifeline_api::{driver, routes};
use lifeline_content::application::command_handlers::{builtin_catalog, ingest_catalog};
use lifeline_content::domain::catalog::ScenarioCatalog;
use lifeline_core::clock::SystemClock;
use lifeline_core::rng::SystemRng;
use lifeline_progression::application::command_handlers::load_progression;
use lifeline_session::domain::aggregates::{EngineCollaborators, SessionEngine};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn load_catalog(config: &AppConfig) -> Result<ScenarioCatalog, AppError> {
    let Some(path) = config.scenarios_path.as_ref() else {
        return Ok(builtin_catalog()?);
    };
    let source = tokio::fs::read_to_string(path).await?;
    let ingested = ingest_catalog(&source)?;
    info!(
        path = %path.display(),
        issues = ingested.issues.len(),
        "loaded scenario asset"
    );
    Ok(ingested.catalog)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting Lifeline API server");

    let config = AppConfig::from_env()?;
    let catalog = load_catalog(&config).await?;
    info!(
        version = catalog.version(),
        scenarios = catalog.scenarios().len(),
        "scenario catalog ready"
    );

    // Saved progress and settings degrade to defaults when unreadable.
    let store = Arc::new(FileStore::new(config.save_dir.clone()));
    let ledger = load_progression(store.as_ref()).await;
    let settings = persistence::load_settings(store.as_ref()).await;

    let outbox = CueOutbox::new();
    let mut engine = SessionEngine::new(
        Arc::new(catalog),
        ledger,
        settings,
        EngineCollaborators {
            clock: Arc::new(SystemClock),
            rng: Box::new(SystemRng::from_entropy()),
            narrator: Arc::new(outbox.clone()),
            audio: Arc::new(outbox.clone()),
        },
    );
    engine.set_dev_override(config.dev_unlock);

    let app_state = AppState::new(engine, outbox, store.clone(), store);
    let _ticker = driver::spawn_ticker(app_state.clone(), Duration::from_millis(config.tick_ms));

    // TODO: Replace CorsLayer::permissive() with the presentation client's origin.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = config.bind_addr()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
