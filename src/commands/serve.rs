//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::events::{spawn_dispatcher, EventQueue};
use crate::infra::{Database, LocalFileStore};
use crate::jobs::EmailJob;
use crate::services::Services;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Initialize database
    let db = Arc::new(Database::connect(&config).await);
    tracing::info!("Database connected");

    // Job storage for outbound emails (processed by `jobs work`)
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job storage: {}", e)))?;
    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;
    let email_storage: PostgresStorage<EmailJob> = PostgresStorage::new(pool);

    // Service container and file storage
    let services = Arc::new(Services::from_connection(db.get_connection(), config.clone()));
    let files = Arc::new(LocalFileStore::new(config.upload_dir.clone()));

    // Event queue: handlers publish, the dispatcher turns events into emails
    let (events, receiver) = EventQueue::channel();
    let _dispatcher = spawn_dispatcher(receiver, services.tokens(), email_storage, config.clone());

    let app_state = AppState::new(services, files, Arc::new(events), db, config);

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
