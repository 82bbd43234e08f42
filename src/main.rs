use lifo_queue::handlers::{
    add_item, fifo_pop, handle_404, health_check, lifo_pop, list_items, queue_stats,
};
use lifo_queue::{Config, ItemQueue, ItemStore};

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::str::FromStr;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    init_logging();

    info!("Starting LIFO queue service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            info!("  +----------- Bind host: {}", config.bind_host());
            info!("  +-------- Database URL: {}", config.database_url);
            info!("  +----- Max connections: {}", config.max_connections);
            info!("  +----- Max text length: {}", config.max_text_length);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Open the item store and create the schema
    let store = match ItemStore::connect(&config).await {
        Ok(store) => {
            info!("Item store ready");
            store
        }
        Err(e) => {
            error!("Failed to open item store {}: {}", config.database_url, e);
            std::process::exit(1);
        }
    };

    let queue = ItemQueue::new(store, &config);

    // Build the application router
    let app = build_router(queue.clone());

    // Parse server address
    let addr = match SocketAddr::from_str(&config.server_address()) {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid server address {}: {}", config.server_address(), e);
            std::process::exit(1);
        }
    };

    // Bind the listener
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Server bound to {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start server with graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    // Release the database pool
    queue.shutdown().await;
    info!("LIFO queue service stopped");
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lifo_queue=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_router(queue: ItemQueue) -> Router {
    Router::new()
        // Queue routes
        .route("/", get(list_items))
        .route("/add", post(add_item))
        .route("/lifo-pop", get(lifo_pop))
        .route("/fifo-pop", get(fifo_pop))
        // Health and monitoring routes
        .route("/health", get(health_check))
        .route("/stats", get(queue_stats))
        // 404 handler
        .fallback(handle_404)
        // Add shared state
        .with_state(queue)
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CorsLayer::permissive()),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
