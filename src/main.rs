use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use branching_tales::agent::OllamaStoryAgent;
use branching_tales::config::AppConfig;
use branching_tales::db::PgStoryRepository;
use branching_tales::routes;
use branching_tales::service::StoryService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "branching_tales=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env().context("copy .env.example to .env")?;

    // ── Database ──────────────────────────────────────────────────────────────
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    info!("Database connection established and migrations applied");

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let agent = OllamaStoryAgent::new(&config.ollama_base_url, &config.model)?;
    let store = PgStoryRepository::new(pool.clone());
    let service = StoryService::new(Arc::new(agent), Arc::new(store), config.generation_timeout);
    let _sweep = service.spawn_idle_sweep(config.session_ttl);

    info!(
        model = %config.model,
        ollama = %config.ollama_base_url,
        timeout_secs = config.generation_timeout.as_secs(),
        session_ttl_secs = config.session_ttl.as_secs(),
        "Story generator configured"
    );

    let app = routes::router(service, config.cors_allow_origin.as_deref());

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
