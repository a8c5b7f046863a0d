use chrono::NaiveDate;
use log::{Log, Metadata, Record as LogRecord};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Simple logger implementation
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &LogRecord) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// One row of movie metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub original_title: String,
    pub release_date: Option<NaiveDate>,
    pub release_year: Option<i32>,
    pub popularity: Option<f64>,
    pub vote_count: u64,
    pub vote_average: Option<f64>,
    pub budget: f64,
    pub revenue: f64,
    /// Revenue over budget, as delivered by the dataset.
    pub return_ratio: Option<f64>,
}

/// A cast or crew association between a person and a film.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditLink {
    pub film_id: i64,
    pub cast_name: Option<String>,
    pub crew_name: Option<String>,
    pub crew_job: Option<String>,
}

/// One (film, credit) pair of the inner join. Every row carries the full film.
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub film: Arc<Film>,
    pub credit: CreditLink,
}

/// Locations of the two source tables.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub movies: PathBuf,
    pub credits: PathBuf,
}
