use axum::routing::{delete, get, patch, post};
use axum::Router;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::pg::PgConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod clients;
mod config;
mod events;
mod models;
mod routes;
mod schema;

use clients::ModerationClient;
use config::AppConfig;
use safetrade_shared::clients::geocoding::GeocodingClient;
use safetrade_shared::clients::minio::MinioClient;
use safetrade_shared::clients::rabbitmq::RabbitMQClient;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub minio: MinioClient,
    pub geocoder: GeocodingClient,
    pub moderation: ModerationClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    safetrade_shared::middleware::init_tracing("safetrade-catalog");

    let config = AppConfig::load()?;
    let port = config.port;

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let minio = MinioClient::new(
        &config.minio_endpoint,
        &config.minio_access_key,
        &config.minio_secret_key,
        &config.minio_bucket,
        &config.minio_public_url,
    )
    .await;
    let geocoder = GeocodingClient::new(&config.geocoding_url);
    let moderation = ModerationClient::new(&config.moderation_url);

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        minio,
        geocoder,
        moderation,
    });

    let internal_routes = Router::new()
        .route("/products/active", get(routes::internal::active_products))
        .route("/products/batch", post(routes::internal::batch_products))
        .route("/products/:id", get(routes::internal::get_product))
        .route("/products/:id/status", patch(routes::internal::change_status));

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route(
            "/products/:id",
            get(routes::products::get_product)
                .put(routes::products::update_product)
                .delete(routes::products::delete_product),
        )
        .route("/products/:id/deactivate", post(routes::products::deactivate_product))
        .route("/products/:id/reactivate", post(routes::products::reactivate_product))
        .route(
            "/products/:id/like",
            get(routes::likes::check_like)
                .post(routes::likes::like_product)
                .delete(routes::likes::unlike_product),
        )
        .route("/products/:id/images", post(routes::images::upload_image))
        .route("/products/:id/images/:image_id", delete(routes::images::delete_image))
        .nest("/internal", internal_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "safetrade-catalog starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
