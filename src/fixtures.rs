//! Builders for in-memory test tables.

use crate::structs::{CreditLink, Film};
use chrono::{Datelike, NaiveDate};

pub fn film(id: i64, title: &str) -> Film {
    Film {
        id,
        title: title.to_string(),
        original_title: title.to_string(),
        release_date: None,
        release_year: None,
        popularity: Some(1.0),
        vote_count: 0,
        vote_average: None,
        budget: 0.0,
        revenue: 0.0,
        return_ratio: Some(0.0),
    }
}

pub fn released(id: i64, title: &str, year: i32, month: u32, day: u32) -> Film {
    let date = NaiveDate::from_ymd_opt(year, month, day);
    Film {
        release_date: date,
        release_year: date.map(|d| d.year()),
        ..film(id, title)
    }
}

pub fn cast(film_id: i64, name: &str) -> CreditLink {
    CreditLink {
        film_id,
        cast_name: Some(name.to_string()),
        crew_name: None,
        crew_job: None,
    }
}

pub fn crew(film_id: i64, name: &str, job: &str) -> CreditLink {
    CreditLink {
        film_id,
        cast_name: None,
        crew_name: Some(name.to_string()),
        crew_job: Some(job.to_string()),
    }
}
