use async_trait::async_trait;
use std::time::Duration;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

use super::{DatedValue, TemperatureStats};

/// Dates are stored and accepted as zero-padded `YYYY-MM-DD`, so string order is date order.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Length of the "last year" temperature window, counted in calendar days.
pub const OBSERVATION_WINDOW_DAYS: i64 = 365;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query climate database: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Query did not finish within {0:?}")]
    Timeout(Duration),
    #[error("No measurements available")]
    NoData,
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Stored date '{0}' is not YYYY-MM-DD")]
    CorruptDate(String),
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),
    #[error("Failed to format date: {0}")]
    DateFormat(#[from] time::error::Format),
}

impl Error {
    /// True when the store itself could not be reached in time, as opposed to a bad query.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_)
                | Error::Query(sqlx::Error::PoolTimedOut)
                | Error::Query(sqlx::Error::PoolClosed)
                | Error::Query(sqlx::Error::Io(_))
        )
    }
}

#[async_trait]
pub trait ClimateData: Send + Sync {
    /// Every measurement as `{date: prcp}`, nulls preserved.
    async fn precipitation(&self) -> Result<Vec<DatedValue>, Error>;
    /// Every station identifier.
    async fn stations(&self) -> Result<Vec<String>, Error>;
    /// Temperature observations of the most active station over the
    /// [`OBSERVATION_WINDOW_DAYS`] ending on the latest measurement date.
    async fn temperature_observations_last_year(&self) -> Result<Vec<DatedValue>, Error>;
    /// Min/max/avg temperature for `start <= date <= end`.
    async fn temperature_stats(&self, start: Date, end: Date) -> Result<TemperatureStats, Error>;
    /// Min/max/avg temperature for `date >= start`.
    async fn temperature_stats_from(&self, start: Date) -> Result<TemperatureStats, Error>;
}

pub fn parse_date(value: &str) -> Result<Date, Error> {
    Date::parse(value, DATE_FORMAT).map_err(|_| Error::InvalidDate(value.to_owned()))
}

pub fn format_date(date: Date) -> Result<String, Error> {
    Ok(date.format(DATE_FORMAT)?)
}

/// Inclusive `(start, end)` window ending on `latest`, starting
/// [`OBSERVATION_WINDOW_DAYS`] calendar days earlier. `latest` comes from the
/// store, so a malformed value is a [`Error::CorruptDate`].
pub fn observation_window(latest: &str) -> Result<(String, String), Error> {
    let end =
        Date::parse(latest, DATE_FORMAT).map_err(|_| Error::CorruptDate(latest.to_owned()))?;
    let start = end
        .checked_sub(time::Duration::days(OBSERVATION_WINDOW_DAYS))
        .ok_or_else(|| Error::DateOutOfRange(latest.to_owned()))?;
    Ok((format_date(start)?, format_date(end)?))
}
