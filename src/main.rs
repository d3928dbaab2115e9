use std::sync::Arc;
use zuckky::{handlers, AppState, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging()?;

    let config = Config::from_env()?;

    if let Err(e) = tokio::fs::create_dir_all(&config.upload_dir).await {
        tracing::warn!("Failed to create uploads directory {}: {}", config.upload_dir.display(), e);
    } else {
        tracing::info!("Uploads directory ready: {}", config.upload_dir.display());
    }

    tracing::info!(
        "Configuration - Gemini AI: {}, Gateway: {}, Tick: {}ms, Final delay: {}ms",
        if config.gemini_api_key.is_some() { "✅" } else { "❌ (keyword replies)" },
        config.gateway_url.as_deref().unwrap_or("in-process"),
        config.simulator.tick_period.as_millis(),
        config.simulator.final_delay.as_millis(),
    );

    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState::from_config(config)?);
    let app = handlers::app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service_with_connect_info::<std::net::SocketAddr>()).await?;

    Ok(())
}

// Production-grade logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "info,zuckky=debug,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,zuckky=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    // JSON for log aggregation, human-readable otherwise
    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    tracing::info!("🎬 Zuckky starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Build mode: {}", if cfg!(debug_assertions) { "development" } else { "production" });
    tracing::info!("Log level: {}", log_level);

    Ok(())
}
