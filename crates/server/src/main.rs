use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use learncrafter_core::{
    create_llm_client, load_config, validate_config, ContentGenerator, ContentValidator,
    CoursePublisher, CourseStore, JobTracker, LlmContentGenerator, PromptFormatter, PromptStore,
    SqliteCourseStore, SqlitePromptStore, StepPacer,
};

use learncrafter_server::api::create_router;
use learncrafter_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("LEARNCRAFTER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        config = ?learncrafter_core::SanitizedConfig::from(&config),
        "Effective configuration"
    );

    // Stores share one SQLite file
    let store: Arc<dyn CourseStore> = Arc::new(
        SqliteCourseStore::new(&config.database.path).context("Failed to create course store")?,
    );
    info!("Course store initialized");

    let prompt_store: Arc<dyn PromptStore> = Arc::new(
        SqlitePromptStore::new(&config.database.path).context("Failed to create prompt store")?,
    );
    info!("Prompt store initialized");

    // LLM client and content generator
    let llm_client = create_llm_client(&config.llm).context("Failed to create LLM client")?;
    info!(
        provider = llm_client.provider(),
        model = llm_client.model(),
        "LLM client initialized"
    );
    let generator: Arc<dyn ContentGenerator> =
        Arc::new(LlmContentGenerator::new(llm_client, &config.llm));

    let formatter = Arc::new(PromptFormatter::new(Arc::clone(&prompt_store)));
    let validator = ContentValidator::new(config.content.max_content_length);

    // Publish job machinery
    let tracker = Arc::new(JobTracker::new());
    let pacer = StepPacer::new(Duration::from_secs_f64(config.llm.request_delay_secs));
    let publisher = Arc::new(CoursePublisher::new(
        Arc::clone(&store),
        Arc::clone(&formatter),
        Arc::clone(&generator),
        Arc::clone(&tracker),
        pacer,
    ));

    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        prompt_store,
        formatter,
        generator,
        validator,
        tracker,
        publisher,
    ));

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
