use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::{error, warn};
use std::sync::Arc;

use crate::{db, parse_date, AppState, DatedValue, TemperatureStats};

fn error_response(operation: &str, err: db::Error) -> (StatusCode, String) {
    match err {
        db::Error::InvalidDate(_) => {
            warn!("{}: {}", operation, err);
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        db::Error::NoData => {
            warn!("{}: {}", operation, err);
            (StatusCode::NOT_FOUND, err.to_string())
        }
        err if err.is_unavailable() => {
            error!("{}: climate database unavailable: {}", operation, err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Climate database unavailable: {}", err),
            )
        }
        err => {
            error!("{}: {}", operation, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to query climate data: {}", err),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation for every measurement as {date: prcp}", body = Vec<DatedValue>),
        (status = SERVICE_UNAVAILABLE, description = "Climate database unavailable"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query precipitation")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DatedValue>>, (StatusCode, String)> {
    state
        .climate_db
        .precipitation()
        .await
        .map(Json)
        .map_err(|e| error_response("precipitation", e))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "All station identifiers", body = Vec<String>),
        (status = SERVICE_UNAVAILABLE, description = "Climate database unavailable"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query stations")
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    state
        .climate_db
        .stations()
        .await
        .map(Json)
        .map_err(|e| error_response("stations", e))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Last 365 days of temperature observations for the most active station", body = Vec<DatedValue>),
        (status = NOT_FOUND, description = "No measurements available"),
        (status = SERVICE_UNAVAILABLE, description = "Climate database unavailable"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query temperature observations")
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DatedValue>>, (StatusCode, String)> {
    state
        .climate_db
        .temperature_observations_last_year()
        .await
        .map(Json)
        .map_err(|e| error_response("tobs", e))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start_date}",
    params(
         ("start_date" = String, Path, description = "First date to include, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Min/max/avg temperature from start_date onwards, nulls when nothing matches", body = Vec<TemperatureStats>),
        (status = BAD_REQUEST, description = "start_date is not YYYY-MM-DD"),
        (status = SERVICE_UNAVAILABLE, description = "Climate database unavailable"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query temperature stats")
    ))]
pub async fn temperature_stats_from(
    State(state): State<Arc<AppState>>,
    Path(start_date): Path<String>,
) -> Result<Json<Vec<TemperatureStats>>, (StatusCode, String)> {
    let start = parse_date(&start_date).map_err(|e| error_response("temperature stats", e))?;

    let stats = state
        .climate_db
        .temperature_stats_from(start)
        .await
        .map_err(|e| error_response("temperature stats", e))?;

    Ok(Json(vec![stats]))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start_date}/{end_date}",
    params(
         ("start_date" = String, Path, description = "First date to include, YYYY-MM-DD"),
         ("end_date" = String, Path, description = "Last date to include, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Min/max/avg temperature between both dates inclusive, nulls when nothing matches", body = Vec<TemperatureStats>),
        (status = BAD_REQUEST, description = "start_date or end_date is not YYYY-MM-DD"),
        (status = SERVICE_UNAVAILABLE, description = "Climate database unavailable"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query temperature stats")
    ))]
pub async fn temperature_stats(
    State(state): State<Arc<AppState>>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<Vec<TemperatureStats>>, (StatusCode, String)> {
    let start = parse_date(&start_date).map_err(|e| error_response("temperature stats", e))?;
    let end = parse_date(&end_date).map_err(|e| error_response("temperature stats", e))?;

    let stats = state
        .climate_db
        .temperature_stats(start, end)
        .await
        .map_err(|e| error_response("temperature stats", e))?;

    Ok(Json(vec![stats]))
}
