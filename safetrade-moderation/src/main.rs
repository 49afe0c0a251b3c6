use axum::routing::{get, patch, post};
use axum::Router;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::pg::PgConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod classifier;
mod clients;
mod config;
mod detection;
mod events;
mod lifecycle;
mod models;
mod routes;
mod schema;

use classifier::ContentClassifier;
use clients::{CatalogClient, UserDirectoryClient};
use config::AppConfig;
use safetrade_shared::clients::email::EmailClient;
use safetrade_shared::clients::rabbitmq::RabbitMQClient;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub email: EmailClient,
    pub catalog: CatalogClient,
    pub users: UserDirectoryClient,
    pub classifier: ContentClassifier,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    safetrade_shared::middleware::init_tracing("safetrade-moderation");

    let config = AppConfig::load()?;
    let port = config.port;

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let email = EmailClient::new(&config.resend_api_key, &config.from_email, "SafeTrade");
    let catalog = CatalogClient::new(&config.catalog_url);
    let users = UserDirectoryClient::new(&config.auth_url);
    let classifier = ContentClassifier::new(
        config.banned_word_list(),
        config.profanity_word_list(),
    );

    let metrics_handle = safetrade_shared::middleware::init_metrics();

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        email,
        catalog,
        users,
        classifier,
        metrics_handle,
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/moderation/report", post(routes::report_routes::create_report))
        .route("/moderation/incidents", get(routes::incident_routes::list_incidents))
        .route("/moderation/incidents/:status", get(routes::incident_routes::list_incidents_by_status))
        .route("/moderation/incident/:id/status", patch(routes::incident_routes::update_incident_status))
        .route("/moderation/incident/:id/assign/:moderator_id", patch(routes::incident_routes::assign_moderator))
        .route("/moderation/incident/:id/appeal", patch(routes::report_routes::appeal_incident))
        .route("/moderation/incident/:id/resolve", patch(routes::incident_routes::resolve_incident))
        .route("/moderation/detect-dangerous", get(routes::detection_routes::detect_dangerous_products))
        .route("/internal/detection/:product_id", post(routes::detection_routes::detect_product))
        .layer(axum::middleware::from_fn(safetrade_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "safetrade-moderation starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
