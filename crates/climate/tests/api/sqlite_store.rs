use crate::helpers::{memory_pool, seeded_store, seeded_store_with_schema};
use climate::{db::Error, ClimateData, DatedValue, SqliteStore, StoreOptions, TemperatureStats};
use std::time::Duration;
use time::macros::date;

#[tokio::test]
async fn precipitation_has_one_entry_per_row_and_keeps_nulls() {
    let store = seeded_store(
        &[
            ("USC00519397", "2010-01-02", None, Some(63.0)),
            ("USC00519397", "2010-01-01", Some(0.08), Some(65.0)),
            ("USC00513117", "2010-01-01", Some(0.28), Some(67.0)),
        ],
        &[],
    )
    .await;

    let precipitation = store.precipitation().await.unwrap();

    assert_eq!(
        precipitation,
        vec![
            DatedValue::new("2010-01-01", Some(0.28)),
            DatedValue::new("2010-01-01", Some(0.08)),
            DatedValue::new("2010-01-02", None),
        ]
    );
}

#[tokio::test]
async fn stations_are_listed_once_per_row() {
    let store = seeded_store(&[], &["USC00519397", "USC00513117", "USC00513117"]).await;

    let stations = store.stations().await.unwrap();

    assert_eq!(stations, vec!["USC00513117", "USC00513117", "USC00519397"]);
}

#[tokio::test]
async fn tobs_window_is_inclusive_of_both_ends() {
    let store = seeded_store(
        &[
            ("USC001", "2017-08-20", None, Some(79.0)),
            ("USC001", "2016-08-20", None, Some(77.0)),
            ("USC001", "2016-08-19", None, Some(75.0)),
            ("USC002", "2017-08-19", None, Some(81.0)),
        ],
        &["USC001", "USC002"],
    )
    .await;

    let tobs = store.temperature_observations_last_year().await.unwrap();

    assert_eq!(
        tobs,
        vec![
            DatedValue::new("2016-08-20", Some(77.0)),
            DatedValue::new("2017-08-20", Some(79.0)),
        ]
    );
}

#[tokio::test]
async fn tobs_window_ends_on_latest_date_of_any_station() {
    let store = seeded_store(
        &[
            ("USC001", "2017-01-01", None, Some(70.0)),
            ("USC001", "2017-01-02", None, Some(71.0)),
            ("USC002", "2018-01-01", None, Some(72.0)),
        ],
        &[],
    )
    .await;

    let tobs = store.temperature_observations_last_year().await.unwrap();

    // window is 2017-01-01..=2018-01-01, USC001 is the most active
    assert_eq!(
        tobs,
        vec![
            DatedValue::new("2017-01-01", Some(70.0)),
            DatedValue::new("2017-01-02", Some(71.0)),
        ]
    );
}

#[tokio::test]
async fn most_active_tie_goes_to_lowest_station_id() {
    let store = seeded_store(
        &[
            ("USC002", "2017-08-20", None, Some(80.0)),
            ("USC001", "2017-08-20", None, Some(79.0)),
        ],
        &[],
    )
    .await;

    let tobs = store.temperature_observations_last_year().await.unwrap();

    assert_eq!(tobs, vec![DatedValue::new("2017-08-20", Some(79.0))]);
}

#[tokio::test]
async fn tobs_without_measurements_is_no_data() {
    let store = seeded_store(&[], &["USC001"]).await;

    let result = store.temperature_observations_last_year().await;

    assert!(matches!(result, Err(Error::NoData)));
}

#[tokio::test]
async fn stats_over_a_bounded_range() {
    let store = seeded_store(
        &[
            ("USC001", "2017-01-01", None, Some(50.0)),
            ("USC001", "2017-01-15", None, Some(60.0)),
            ("USC002", "2017-01-31", None, Some(70.0)),
            ("USC002", "2017-02-01", None, Some(90.0)),
            ("USC002", "2016-12-31", None, Some(10.0)),
        ],
        &[],
    )
    .await;

    let stats = store
        .temperature_stats(date!(2017 - 01 - 01), date!(2017 - 01 - 31))
        .await
        .unwrap();

    assert_eq!(
        stats,
        TemperatureStats {
            min_temp: Some(50.0),
            max_temp: Some(70.0),
            avg_temp: Some(60.0),
        }
    );
}

#[tokio::test]
async fn stats_from_start_has_no_upper_bound() {
    let store = seeded_store(
        &[
            ("USC001", "2016-12-31", None, Some(10.0)),
            ("USC001", "2017-01-01", None, Some(50.0)),
            ("USC001", "2017-08-23", None, Some(90.0)),
        ],
        &[],
    )
    .await;

    let stats = store
        .temperature_stats_from(date!(2017 - 01 - 01))
        .await
        .unwrap();

    assert_eq!(
        stats,
        TemperatureStats {
            min_temp: Some(50.0),
            max_temp: Some(90.0),
            avg_temp: Some(70.0),
        }
    );
}

#[tokio::test]
async fn stats_over_empty_range_are_null() {
    let store = seeded_store(&[("USC001", "2017-01-01", None, Some(50.0))], &[]).await;

    let reversed = store
        .temperature_stats(date!(2017 - 01 - 31), date!(2017 - 01 - 01))
        .await
        .unwrap();
    let future = store
        .temperature_stats_from(date!(9999 - 01 - 01))
        .await
        .unwrap();

    assert_eq!(reversed, TemperatureStats::default());
    assert_eq!(future, TemperatureStats::default());
}

#[tokio::test]
async fn null_tobs_are_ignored_by_aggregates() {
    let store = seeded_store(
        &[
            ("USC001", "2017-01-01", None, Some(50.0)),
            ("USC001", "2017-01-02", None, None),
        ],
        &[],
    )
    .await;

    let stats = store
        .temperature_stats_from(date!(2017 - 01 - 01))
        .await
        .unwrap();

    assert_eq!(stats.avg_temp, Some(50.0));
}

#[tokio::test]
async fn health_check_requires_both_tables() {
    let store = seeded_store(&[], &[]).await;
    assert!(store.health_check().await.is_ok());

    let store = SqliteStore::from_pool(memory_pool().await, Duration::from_secs(5));
    assert!(store.health_check().await.is_err());
}

#[tokio::test]
async fn closed_pool_is_reported_as_unavailable() {
    let store = seeded_store(&[], &["USC001"]).await;
    store.pool().close().await;

    let err = store.stations().await.unwrap_err();

    assert!(err.is_unavailable());
}

#[tokio::test]
async fn open_fails_for_missing_database_file() {
    let result = SqliteStore::open(
        "/nonexistent/path/hawaii.sqlite",
        &StoreOptions {
            acquire_timeout: Duration::from_secs(1),
            ..StoreOptions::default()
        },
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn whole_number_readings_decode_without_real_affinity() {
    let store = seeded_store_with_schema(
        "CREATE TABLE measurement (
            id INTEGER PRIMARY KEY, station TEXT, date TEXT, prcp NUMERIC, tobs INTEGER
        )",
        &[("USC001", "2017-08-20", Some(1.0), Some(79.0))],
        &["USC001"],
    )
    .await;

    let tobs = store.temperature_observations_last_year().await.unwrap();
    let precipitation = store.precipitation().await.unwrap();

    assert_eq!(tobs, vec![DatedValue::new("2017-08-20", Some(79.0))]);
    assert_eq!(precipitation, vec![DatedValue::new("2017-08-20", Some(1.0))]);
}

#[tokio::test]
async fn malformed_stored_date_is_corrupt_data() {
    let store = seeded_store(&[("USC001", "2017-08-20 00:00:00", None, Some(79.0))], &[]).await;

    let result = store.temperature_observations_last_year().await;

    assert!(matches!(result, Err(Error::CorruptDate(date)) if date == "2017-08-20 00:00:00"));
}
