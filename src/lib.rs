pub mod calendar;
pub mod catalog;
pub mod error;
pub mod load;
pub mod query;
pub mod server;
pub mod structs;

#[cfg(test)]
mod fixtures;

// Re-export public API
pub use catalog::Catalog;
pub use error::{DatasetLoadError, QueryError, Result, ServiceError};
pub use load::{load, read_credits, read_films};
pub use query::{
    actor_aggregate, director_aggregate, films_by_release_month, films_by_release_weekday,
    score_by_title, votes_by_title,
};
pub use structs::{CreditLink, DatasetPaths, Film, JoinedRecord, SimpleLogger};
