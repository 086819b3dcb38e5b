use crate::{
    db, index_handler, precipitation, routes, stations, temperature_stats,
    temperature_stats_from, tobs, ClimateData, Cli, SqliteStore,
};
use anyhow::Context;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub climate_db: Arc<dyn ClimateData>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::climate::climate_routes::precipitation,
        routes::climate::climate_routes::stations,
        routes::climate::climate_routes::tobs,
        routes::climate::climate_routes::temperature_stats_from,
        routes::climate::climate_routes::temperature_stats,
    ),
    components(
        schemas(
                db::DatedValue,
                db::TemperatureStats,
        )
    ),
    tags(
        (name = "hawaii climate api", description = "a read-only RESTful api over station precipitation and temperature observations")
    )
)]
struct ApiDoc;

pub async fn build_app_state(cli: &Cli) -> Result<AppState, anyhow::Error> {
    let database = cli.database();
    if !climate_core::path_exists(&database) {
        return Err(anyhow::anyhow!(
            "climate database not found at {}",
            database
        ));
    }
    if !climate_core::is_file(&database) {
        return Err(anyhow::anyhow!(
            "climate database path {} is not a file",
            database
        ));
    }

    let store = SqliteStore::open(&database, &cli.store_options()).await?;
    store
        .health_check()
        .await
        .with_context(|| format!("climate database at {} is not usable", database))?;

    Ok(AppState {
        remote_url: cli.remote_url(),
        climate_db: Arc::new(store),
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/{start_date}", get(temperature_stats_from))
        .route("/api/v1.0/{start_date}/{end_date}", get(temperature_stats))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default()
        .to_owned();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
