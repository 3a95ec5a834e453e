//! Tripdesk Server - travel agency catalog and admin API
//!
//! `tripdesk-server` serves the API; `tripdesk-server hash-password <password>`
//! prints an Argon2 hash for `auth.admin_password_hash`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use tripdesk_server::{
    api,
    config::{AppConfig, LoggingConfig, ServerConfig},
    repository::Repository,
    services::{
        auth::{hash_password, StaticAdminCredentials},
        chat::OpenAiCompletionClient,
        media::CloudinaryStore,
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    if let Some(command) = args.next() {
        return match (command.as_str(), args.next()) {
            ("hash-password", Some(password)) => {
                println!("{}", hash_password(&password)?);
                Ok(())
            }
            _ => anyhow::bail!("usage: tripdesk-server [hash-password <password>]"),
        };
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging)?;

    tracing::info!("Starting Tripdesk Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let credentials = StaticAdminCredentials::from_config(&config.auth)?;
    let media_store = CloudinaryStore::new(config.media.clone())?;
    let completion = OpenAiCompletionClient::new(config.chat.clone())?;

    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        &config,
        Arc::new(media_store),
        Arc::new(completion),
        Arc::new(credentials),
    );

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );
    let cors = cors_layer(&config.server)?;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app: Router = api::router(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Console logging (pretty or json) plus an optional daily rolling file
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("tripdesk_server={},tower_http=info", logging.level).into()
        })
    };

    let console = if logging.format == "json" {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().pretty().boxed()
    };

    let (file, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "tripdesk-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console.with_filter(filter()))
        .with(file)
        .try_init()
        .context("Failed to initialize tracing")?;

    Ok(guard)
}

/// Any origin unless `server.cors_origins` lists some; credentials only for listed origins
fn cors_layer(server: &ServerConfig) -> anyhow::Result<CorsLayer> {
    if server.cors_origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = server
        .cors_origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid CORS origin")?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
