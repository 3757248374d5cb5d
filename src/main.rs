//! LabTrack Server - laboratory asset management
//!
//! REST API server for laboratory inventory, maintenance and requests.

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labtrack_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("labtrack_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting LabTrack Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone());
    services.users.ensure_bootstrap_admin().await?;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Users
        .route("/users", get(api::users::list_users).post(api::users::create_user))
        .route(
            "/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        // Laboratories
        .route(
            "/laboratories",
            get(api::laboratories::list_laboratories).post(api::laboratories::create_laboratory),
        )
        .route(
            "/laboratories/:id",
            get(api::laboratories::get_laboratory)
                .put(api::laboratories::update_laboratory)
                .delete(api::laboratories::delete_laboratory),
        )
        .route("/laboratories/:id/custodian", put(api::laboratories::assign_custodian))
        // Workstations
        .route(
            "/workstations",
            get(api::workstations::list_workstations).post(api::workstations::create_workstation),
        )
        .route(
            "/workstations/:id",
            get(api::workstations::get_workstation)
                .put(api::workstations::update_workstation)
                .delete(api::workstations::delete_workstation),
        )
        .route("/workstations/:id/service-logs", get(api::workstations::list_service_logs))
        // Inventory
        .route("/inventory", get(api::inventory::list_assets).post(api::inventory::create_asset))
        .route("/inventory/batch", post(api::inventory::create_asset_batch))
        .route("/inventory/statuses", get(api::inventory::list_statuses))
        .route("/inventory/summary", get(api::inventory::status_summary))
        .route(
            "/inventory/:id",
            get(api::inventory::get_asset)
                .put(api::inventory::update_asset)
                .delete(api::inventory::delete_asset),
        )
        // Maintenance
        .route(
            "/maintenance/pmc",
            get(api::maintenance::list_reports).post(api::maintenance::submit_report),
        )
        .route("/maintenance/pmc/status", get(api::maintenance::quarter_status))
        .route("/maintenance/pmc/repair", post(api::maintenance::create_repair_log))
        .route("/maintenance/pmc/:id", get(api::maintenance::get_report))
        .route("/maintenance/pmc/:id/export", get(api::maintenance::export_report))
        // Procedures
        .route(
            "/procedures",
            get(api::procedures::list_procedures).post(api::procedures::create_procedure),
        )
        .route(
            "/procedures/:id",
            put(api::procedures::update_procedure).delete(api::procedures::delete_procedure),
        )
        // Daily reports
        .route(
            "/daily-reports",
            get(api::daily_reports::list_daily_reports).post(api::daily_reports::create_daily_report),
        )
        .route(
            "/daily-reports/:id",
            get(api::daily_reports::get_daily_report).delete(api::daily_reports::delete_daily_report),
        )
        // Forms
        .route("/forms", get(api::forms::list_forms))
        .route("/forms/:id", get(api::forms::get_form))
        .route("/forms/:id/approve", post(api::forms::approve_form))
        .route("/forms/:id/reject", post(api::forms::reject_form))
        // Public forms
        .route("/public-forms/lab-requests", post(api::public_forms::submit_lab_request))
        .route(
            "/public-forms/equipment-borrows",
            post(api::public_forms::submit_equipment_borrow),
        )
        .route(
            "/public-forms/software-installations",
            post(api::public_forms::submit_software_installation),
        )
        .route("/public-forms/laboratories", get(api::public_forms::list_laboratories))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}
