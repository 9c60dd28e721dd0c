use tracing_subscriber::EnvFilter;

use kural_search::api;
use kural_search::config::Config;
use kural_search::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Corpus: {}", config.corpus_path.display());
    tracing::info!("Retrieval mode: {:?}", config.mode);
    tracing::info!(
        "Embedding provider: {} ({})",
        config.embedding.provider,
        config.embedding.base_url
    );

    let state = AppState::new(config.clone())?;

    // Indexes build in the background; /api/health reports progress and
    // search returns 503 until they are ready. A failed build is fatal.
    let init_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = init_state.initialize().await {
            tracing::error!("Search engine failed to build: {e}");
            std::process::exit(1);
        }
    });

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
