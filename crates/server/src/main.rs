//! gofarm-rs server entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
};
use gofarm_api::{AppState, StreamingState, auth_middleware, router as api_router, streaming_handler};
use gofarm_common::{Config, LocalStorage, StorageService};
use gofarm_core::{
    CropService, MAX_PRODUCT_FILE_BYTES, MAX_PRODUCT_IMAGES, MAX_PRODUCT_VIDEOS, PostService,
    ProductService, UploadResolver, UserService,
};
use gofarm_db::repositories::{CropRepository, PostRepository, ProductRepository, UserRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Room for form fields around the largest accepted product upload.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match config.server.client_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(e)) => {
            warn!(error = %e, "Invalid client_url; allowing any origin");
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gofarm=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting gofarm-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(gofarm_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    gofarm_db::migrate(&db).await?;
    info!("Migrations completed");

    // Upload storage
    tokio::fs::create_dir_all(&config.storage.base_path).await?;
    let storage: StorageService = Arc::new(LocalStorage::new(
        config.storage.base_path.clone(),
        config.storage.base_url.clone(),
    ));
    let uploads = UploadResolver::new(storage)
        .with_timeout(Duration::from_secs(config.storage.upload_timeout_secs));

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let product_repo = ProductRepository::new(Arc::clone(&db));
    let crop_repo = CropRepository::new(Arc::clone(&db));

    // Broadcast channel shared by WebSocket and SSE connections
    let streaming = StreamingState::with_capacity(config.streaming.channel_capacity);

    // Initialize services
    let user_service = UserService::new(user_repo.clone());
    let mut post_service = PostService::new(post_repo, user_repo.clone(), uploads.clone());
    post_service.set_event_publisher(Arc::new(streaming.clone()));
    let mut product_service = ProductService::new(product_repo, user_repo.clone(), uploads);
    product_service.set_event_publisher(Arc::new(streaming.clone()));
    let crop_service = CropService::new(crop_repo, user_repo);

    let state = AppState {
        user_service,
        post_service,
        product_service,
        crop_service,
        streaming,
    };

    let body_limit = MAX_PRODUCT_FILE_BYTES * (MAX_PRODUCT_IMAGES + MAX_PRODUCT_VIDEOS)
        + FORM_OVERHEAD_BYTES;

    // Build router
    let mut app = Router::new()
        .route("/socket", get(streaming_handler))
        .nest("/api", api_router());

    if config.storage.base_url.starts_with('/') {
        app = app.nest_service(
            &config.storage.base_url,
            ServeDir::new(&config.storage.base_path),
        );
    } else {
        info!(base_url = %config.storage.base_url, "Uploads are served externally");
    }

    let app = app
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
