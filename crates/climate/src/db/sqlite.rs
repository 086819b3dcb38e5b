use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    SqliteConnection,
};
use std::{future::Future, time::Duration};
use time::Date;

use super::{
    format_date, observation_window, ClimateData, DatedValue, Error, Measurement, Station,
    TemperatureStats,
};

/// Whole-number readings come back as INTEGER unless the column has REAL affinity.
const MEASUREMENT_COLUMNS: &str =
    "station, date, CAST(prcp AS REAL) AS prcp, CAST(tobs AS REAL) AS tobs";

const TEMPERATURE_STATS_SQL: &str = "SELECT CAST(MIN(tobs) AS REAL) AS min_temp,
            CAST(MAX(tobs) AS REAL) AS max_temp,
            AVG(tobs) AS avg_temp
     FROM measurement";

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub query_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(10),
        }
    }
}

/// Read-only access to the `measurement` and `station` tables of a SQLite database.
pub struct SqliteStore {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl SqliteStore {
    pub async fn open(path: &str, options: &StoreOptions) -> Result<Self> {
        let connect_options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("Failed to open climate database at {}", path))?;

        info!("SQLite climate database opened read-only at: {}", path);

        Ok(Self::from_pool(pool, options.query_timeout))
    }

    pub fn from_pool(pool: SqlitePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check connectivity and that both expected tables are present.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database connectivity check failed")?;

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'table' AND name IN ('measurement', 'station')",
        )
        .fetch_one(&self.pool)
        .await
        .context("Database schema check failed")?;

        if tables != 2 {
            return Err(anyhow::anyhow!(
                "Database is missing the measurement and/or station table"
            ));
        }

        Ok(())
    }

    async fn timed<T, F>(&self, query: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| Error::Timeout(self.query_timeout))?
    }

    async fn stats(&self, start: Date, end: Option<Date>) -> Result<TemperatureStats, Error> {
        let start = format_date(start)?;
        let stats = match end {
            Some(end) => {
                let end = format_date(end)?;
                debug!("temperature stats for {} to {}", start, end);
                let sql = format!("{} WHERE date >= ? AND date <= ?", TEMPERATURE_STATS_SQL);
                self.timed(async {
                    Ok::<_, Error>(sqlx::query_as::<_, TemperatureStats>(&sql)
                        .bind(&start)
                        .bind(&end)
                        .fetch_one(&self.pool)
                        .await?)
                })
                .await?
            }
            None => {
                debug!("temperature stats from {}", start);
                let sql = format!("{} WHERE date >= ?", TEMPERATURE_STATS_SQL);
                self.timed(async {
                    Ok::<_, Error>(sqlx::query_as::<_, TemperatureStats>(&sql)
                        .bind(&start)
                        .fetch_one(&self.pool)
                        .await?)
                })
                .await?
            }
        };
        Ok(stats)
    }
}

/// Station with the most measurement rows, ties going to the lowest identifier.
async fn most_active_station(conn: &mut SqliteConnection) -> Result<Option<String>, Error> {
    let row: Option<(String, i64)> = sqlx::query_as(
        "SELECT station, COUNT(date) AS measurement_count
         FROM measurement
         GROUP BY station
         ORDER BY measurement_count DESC, station ASC
         LIMIT 1",
    )
    .fetch_optional(conn)
    .await?;

    Ok(row.map(|(station, count)| {
        debug!("most active station {} with {} measurements", station, count);
        station
    }))
}

async fn latest_date(conn: &mut SqliteConnection) -> Result<Option<String>, Error> {
    Ok(sqlx::query_scalar("SELECT MAX(date) FROM measurement")
        .fetch_one(conn)
        .await?)
}

#[async_trait]
impl ClimateData for SqliteStore {
    async fn precipitation(&self) -> Result<Vec<DatedValue>, Error> {
        let rows = self
            .timed(async {
                let sql = format!(
                    "SELECT {} FROM measurement ORDER BY date, station",
                    MEASUREMENT_COLUMNS
                );
                Ok::<_, Error>(
                    sqlx::query_as::<_, Measurement>(&sql)
                        .fetch_all(&self.pool)
                        .await?,
                )
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| DatedValue::new(row.date, row.precipitation))
            .collect())
    }

    async fn stations(&self) -> Result<Vec<String>, Error> {
        let rows = self
            .timed(async {
                Ok::<_, Error>(sqlx::query_as::<_, Station>(
                    "SELECT station, name, latitude, longitude, elevation
                     FROM station ORDER BY station",
                )
                .fetch_all(&self.pool)
                .await?)
            })
            .await?;

        Ok(rows.into_iter().map(|row| row.station_id).collect())
    }

    async fn temperature_observations_last_year(&self) -> Result<Vec<DatedValue>, Error> {
        self.timed(async {
            let mut conn = self.pool.acquire().await?;

            let station = most_active_station(&mut conn)
                .await?
                .ok_or(Error::NoData)?;
            let latest = latest_date(&mut conn).await?.ok_or(Error::NoData)?;
            let (start, end) = observation_window(&latest)?;
            debug!(
                "temperature observations for {} from {} to {}",
                station, start, end
            );

            let sql = format!(
                "SELECT {} FROM measurement
                 WHERE station = ? AND date >= ? AND date <= ?
                 ORDER BY date",
                MEASUREMENT_COLUMNS
            );
            let rows = sqlx::query_as::<_, Measurement>(&sql)
                .bind(&station)
                .bind(&start)
                .bind(&end)
                .fetch_all(&mut *conn)
                .await?;

            Ok::<_, Error>(
                rows.into_iter()
                    .map(|row| DatedValue::new(row.date, row.temperature_observation))
                    .collect(),
            )
        })
        .await
    }

    async fn temperature_stats(&self, start: Date, end: Date) -> Result<TemperatureStats, Error> {
        self.stats(start, Some(end)).await
    }

    async fn temperature_stats_from(&self, start: Date) -> Result<TemperatureStats, Error> {
        self.stats(start, None).await
    }
}

