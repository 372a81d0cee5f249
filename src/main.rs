// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ozone_charts::application::request_cache::RequestCache;
use ozone_charts::infrastructure::config::{load_service_config, seed_group_store};
use ozone_charts::infrastructure::o3as_repository::O3asRepository;
use ozone_charts::presentation::app_state::AppState;
use ozone_charts::presentation::handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_service_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(O3asRepository::new(config.api.base_url.clone()));

    // Create services (application layer)
    let request_cache = RequestCache::new(repository, config.cache.key_scope);
    let group_store = seed_group_store(&config.groups);

    // Collections every view needs; plot data is fetched on demand
    let models_task = request_cache.fetch_models();
    let plot_types_task = request_cache.fetch_plot_types();
    tokio::spawn(async move {
        let (models, plot_types) = futures::future::join(models_task, plot_types_task).await;
        if models.is_err() || plot_types.is_err() {
            tracing::error!("Startup fetch task panicked");
        }
    });

    let state = Arc::new(AppState::new(request_cache, group_store));

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(handlers::health_check))
        .route("/api/models", get(handlers::get_models))
        .route("/api/models/fetch", post(handlers::fetch_models))
        .route("/api/plot-types", get(handlers::get_plot_types))
        .route("/api/plot-types/fetch", post(handlers::fetch_plot_types))
        .route("/api/plots/:plot_type/fetch", post(handlers::fetch_plot_data))
        .route("/api/plots/:plot_type/active", get(handlers::active_plot_data))
        .route("/api/plots/:plot_type/cache", get(handlers::cached_plot_keys))
        .route("/api/plots/:plot_type/chart", get(handlers::plot_chart))
        .route(
            "/api/groups",
            get(handlers::list_groups).post(handlers::create_group),
        )
        .route(
            "/api/groups/:id",
            get(handlers::get_group)
                .put(handlers::set_group_models)
                .delete(handlers::delete_group),
        )
        .route(
            "/api/groups/:id/models",
            put(handlers::update_group_model_properties),
        )
        .route(
            "/api/groups/:id/statistics/:stat",
            put(handlers::set_group_stat_value_visibility),
        )
        .route("/api/groups/:id/visibility", put(handlers::set_group_visibility))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        "Starting ozone-charts service on {} (data service {})",
        config.server.bind_address,
        config.api.base_url
    );

    axum::serve(listener, router).await?;

    Ok(())
}
