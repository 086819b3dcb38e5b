pub mod climate_data;
pub mod sqlite;

pub use climate_data::*;
pub use sqlite::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// One day's reading at one station, as stored in the `measurement` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Measurement {
    #[sqlx(rename = "station")]
    pub station_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    #[sqlx(rename = "prcp")]
    pub precipitation: Option<f64>,
    #[sqlx(rename = "tobs")]
    pub temperature_observation: Option<f64>,
}

/// A row of the `station` table. Only `station_id` is exposed by the API.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Station {
    #[sqlx(rename = "station")]
    pub station_id: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

/// A single-key JSON object mapping a date to a reading, e.g. `{"2017-08-23": 0.08}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct DatedValue(BTreeMap<String, Option<f64>>);

impl DatedValue {
    pub fn new(date: impl Into<String>, value: Option<f64>) -> Self {
        let mut entry = BTreeMap::new();
        entry.insert(date.into(), value);
        Self(entry)
    }

    pub fn date(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    pub fn value(&self) -> Option<f64> {
        self.0.values().next().copied().flatten()
    }
}

/// Min/max/avg temperature over a date range. All fields are `null` when no rows match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct TemperatureStats {
    #[serde(rename = "Min Temp")]
    pub min_temp: Option<f64>,
    #[serde(rename = "Max Temp")]
    pub max_temp: Option<f64>,
    #[serde(rename = "Avg Temp")]
    pub avg_temp: Option<f64>,
}
