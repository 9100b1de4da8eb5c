//! Encore Admin API
//!
//! Admin dashboard service for subscription management and revenue reporting.
//!
//! ## REST Endpoints
//!
//! All `/api/v1/admin` routes require `Authorization: Bearer <ADMIN_API_TOKEN>`
//! and an `X-Admin-Id` header.
//!
//! - `GET /api/v1/admin/users?status=premium|trial|expired|expiring` - List users by status
//! - `GET /api/v1/admin/users/stats` - Per-status user counts
//! - `GET /api/v1/admin/users/{id}/subscription` - Subscription, status and history
//! - `POST /api/v1/admin/users/{id}/subscription/grant` - Grant monthly/yearly/lifetime
//! - `POST /api/v1/admin/users/{id}/subscription/extend` - Extend the end date
//! - `POST /api/v1/admin/users/{id}/subscription/revoke` - Revoke premium
//! - `POST /api/v1/admin/users/{id}/trial/reset` - Reset the standard trial
//! - `POST /api/v1/admin/users/{id}/trial/custom` - Start a custom-length trial
//! - `GET /api/v1/admin/revenue?days=N` or `?from=..&to=..` - Revenue report
//! - `POST /webhooks/notifications` - Signed provider notifications
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

mod config;
mod error;
mod extractors;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use encore_db::Repositories;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("admin_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Encore Admin API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        catalog_products = config.core.revenue.catalog.len(),
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Stores: PostgreSQL when configured, otherwise process-local
    let state = match config.database_url.clone() {
        Some(url) => {
            let pool = encore_db::create_pool(&url, config.database_max_connections).await?;
            encore_db::run_migrations(&pool).await?;
            tracing::info!("Database pool created and migrations applied");
            AppState::postgres(Repositories::new(pool), config.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            AppState::in_memory(config.clone())
        }
    };

    let app = build_router(state, metrics_handle);

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    run_http_server(app, http_addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    // API v1 admin routes
    let api_v1 = Router::new()
        // User listing
        .route("/admin/users", get(handlers::list_users))
        .route("/admin/users/stats", get(handlers::user_stats))
        // Subscription lifecycle
        .route(
            "/admin/users/{id}/subscription",
            get(handlers::get_user_subscription),
        )
        .route(
            "/admin/users/{id}/subscription/grant",
            post(handlers::grant_subscription),
        )
        .route(
            "/admin/users/{id}/subscription/extend",
            post(handlers::extend_subscription),
        )
        .route(
            "/admin/users/{id}/subscription/revoke",
            post(handlers::revoke_subscription),
        )
        .route("/admin/users/{id}/trial/reset", post(handlers::reset_trial))
        .route(
            "/admin/users/{id}/trial/custom",
            post(handlers::grant_custom_trial),
        )
        // Revenue
        .route("/admin/revenue", get(handlers::get_revenue));

    // Webhook route (separate - uses raw body, no JSON parsing)
    let webhook_routes = Router::new().route(
        "/webhooks/notifications",
        post(handlers::notification_webhook),
    );

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    // Combine all routes
    Router::new()
        .nest("/api/v1", api_v1)
        .merge(webhook_routes)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .merge(metrics_route) // Metrics route without timeout
        .with_state(state)
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Admin operations are store round-trips; revenue reports fold many events
    let admin_latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("admin_operation_duration_seconds".to_string()),
            admin_latency_buckets,
        )?
        .install_recorder()?;

    // Register metrics with descriptions
    metrics::describe_counter!(
        "admin_mutations_total",
        "Admin subscription commands by command and outcome"
    );
    metrics::describe_counter!(
        "webhook_notifications_total",
        "Provider notifications by ingestion outcome"
    );
    metrics::describe_histogram!(
        "admin_operation_duration_seconds",
        "Admin operation latency in seconds by operation and result"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = ?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
