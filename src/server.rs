use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::api;
use crate::config::AppConfig;
use crate::enrichment::{ChangeFeed, EnrichmentWorker, TaskScheduler};
use crate::llm::{ChatCompletionsClient, TextGenerator};
use crate::persistence::{
    NoteStore,
    providers::{memory::MemoryStore, postgres::PostgresProvider},
};
use crate::security::{JwtVerifier, middleware::auth_middleware};
use crate::service::NotesService;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Wire the store, generator and scheduler into shared handler state.
pub fn build_state(
    config: Arc<AppConfig>,
    store: Arc<dyn NoteStore>,
    generator: Arc<dyn TextGenerator>,
) -> AppState {
    let feed = ChangeFeed::new();
    let worker = EnrichmentWorker::new(
        Arc::clone(&store),
        generator,
        feed.clone(),
        config.llm.max_tokens,
    );
    let scheduler = TaskScheduler::new(
        worker,
        Duration::from_millis(config.enrichment.schedule_delay_ms),
        Duration::from_secs(config.enrichment.task_retention_secs),
    );

    AppState {
        notes: NotesService::new(store, scheduler, feed),
        jwt: Arc::new(JwtVerifier::new(&config.security.jwt_secret)),
        config,
    }
}

/// Build the full router: public health check plus the authenticated API.
pub fn build_app(state: AppState) -> Router {
    let timeout_duration = Duration::from_secs(state.config.server.request_timeout_secs);

    let api = api::build_router().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                // Event streams outlive any request timeout.
                if req.uri().path().ends_with("/events") {
                    return next.run(req).await;
                }
                match tokio::time::timeout(timeout_duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Select the configured storage provider.
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn NoteStore>> {
    let store: Arc<dyn NoteStore> = match config.persistence.provider.as_str() {
        "postgres" => {
            let provider = PostgresProvider::new(
                &config.persistence.database_url,
                config.persistence.max_connections,
            )
            .await?;
            info!("Postgres persistence enabled.");
            Arc::new(provider)
        }
        "memory" => {
            info!("In-memory persistence enabled; data is lost on restart.");
            Arc::new(MemoryStore::new())
        }
        other => anyhow::bail!("Unknown persistence provider '{other}'"),
    };
    Ok(store)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let settings = config.llm_settings();
    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        max_tokens = settings.max_tokens,
        "LLM configuration loaded"
    );

    let store = open_store(&config).await?;
    let generator: Arc<dyn TextGenerator> = Arc::new(ChatCompletionsClient::new(settings)?);

    let state = build_state(Arc::clone(&config), store, generator);
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
