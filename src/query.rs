//! The six read-only queries served by the API.
//!
//! Every function is a pure function of its input and the `Catalog`. Soft
//! outcomes (unknown title, person not found, too few votes) are variants of
//! the returned enums; only a bad month name is an error.

use crate::calendar::{parse_month, parse_weekday};
use crate::catalog::Catalog;
use crate::error::QueryError;
use crate::structs::JoinedRecord;
use chrono::{Datelike, Month, NaiveDate, Weekday};
use serde::Serialize;
use std::fmt::Display;

/// Films with fewer votes than this are not reported by `votes_by_title`.
pub const MIN_VOTE_COUNT: u64 = 2000;

const DIRECTOR_JOB: &str = "Director";

#[derive(Debug, Clone, PartialEq)]
pub struct MonthCount {
    pub month: Month,
    /// Month name as the caller wrote it.
    pub label: String,
    pub count: usize,
}

impl MonthCount {
    pub fn message(&self) -> String {
        format!(
            "{} películas fueron estrenadas en el mes de {}",
            self.count, self.label
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeekdayCount {
    Counted {
        weekday: Weekday,
        label: String,
        count: usize,
    },
    InvalidDay(QueryError),
}

impl WeekdayCount {
    pub fn message(&self) -> String {
        match self {
            WeekdayCount::Counted { label, count, .. } => format!(
                "{} cantidad de películas fueron estrenadas en los días {}.",
                count,
                capitalize(label)
            ),
            WeekdayCount::InvalidDay(err) => err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TitleScore {
    NotFound,
    Found {
        title: String,
        release_year: Option<i32>,
        popularity: Option<f64>,
    },
}

impl TitleScore {
    pub fn message(&self) -> String {
        match self {
            TitleScore::NotFound => "Película no encontrada".to_string(),
            TitleScore::Found {
                title,
                release_year,
                popularity,
            } => format!(
                "La película {} fue estrenada en el año {} con un score/popularidad de {}.",
                title,
                or_unknown(release_year),
                float_or_unknown(popularity)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TitleVotes {
    NotFound,
    BelowMinimum {
        title: String,
        vote_count: u64,
    },
    Found {
        title: String,
        release_year: Option<i32>,
        vote_count: u64,
        vote_average: Option<f64>,
    },
}

impl TitleVotes {
    pub fn message(&self) -> String {
        match self {
            TitleVotes::NotFound => "Película no encontrada.".to_string(),
            TitleVotes::BelowMinimum { .. } => format!(
                "La película no cumple con el mínimo de {} valoraciones.",
                MIN_VOTE_COUNT
            ),
            TitleVotes::Found {
                title,
                release_year,
                vote_count,
                vote_average,
            } => format!(
                "La película {} fue estrenada en el año {}. La misma cuenta con un total de {} valoraciones, con un promedio de {}.",
                title,
                or_unknown(release_year),
                vote_count,
                float_or_unknown(vote_average)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorSummary {
    #[serde(rename = "Actor")]
    pub actor: String,
    /// Credit rows, so an actor credited twice in one film counts twice.
    #[serde(rename = "Cantidad_peliculas")]
    pub film_count: usize,
    #[serde(rename = "Recaudación_total")]
    pub total_return: f64,
    #[serde(rename = "Recaudación_promedio")]
    pub mean_return: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActorReport {
    NotFound(String),
    Found(ActorSummary),
}

impl ActorReport {
    pub fn message(&self) -> String {
        match self {
            ActorReport::NotFound(name) => format!(
                "Actor: {} no encontrado. Verificá que el nombre y apellido estén con la primera letra en mayúscula y con acentos correctos.",
                name
            ),
            ActorReport::Found(summary) => format!(
                "{} participó en {} películas, con un retorno total de {} y un retorno promedio de {}.",
                summary.actor,
                summary.film_count,
                summary.total_return,
                summary.mean_return
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorFilm {
    #[serde(rename = "Título")]
    pub title: String,
    #[serde(rename = "Fecha de lanzamiento")]
    pub release_date: Option<NaiveDate>,
    #[serde(rename = "Retorno")]
    pub return_ratio: Option<f64>,
    #[serde(rename = "Costo")]
    pub budget: f64,
    #[serde(rename = "Ganancia")]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorSummary {
    pub director: String,
    #[serde(rename = "exito_total")]
    pub total_return: f64,
    #[serde(rename = "peliculas")]
    pub films: Vec<DirectorFilm>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectorReport {
    NotFound(String),
    Found(DirectorSummary),
}

impl DirectorReport {
    pub fn message(&self) -> String {
        match self {
            DirectorReport::NotFound(name) => format!(
                "Director: {} no encontrado. Verificá que el nombre y apellido estén bien escritos y con la primera letra en mayúscula",
                name
            ),
            DirectorReport::Found(summary) => format!(
                "{} dirigió {} películas, con un éxito total de {}.",
                summary.director,
                summary.films.len(),
                summary.total_return
            ),
        }
    }
}

/// Counts films released in the named Spanish month.
///
/// # Errors
/// Returns `QueryError::InvalidMonthName` when the name is not one of the
/// twelve month names.
pub fn films_by_release_month(catalog: &Catalog, month_name: &str) -> Result<MonthCount, QueryError> {
    let month = parse_month(month_name)?;
    let target = month.number_from_month();
    let count = catalog
        .films()
        .filter_map(|film| film.release_date)
        .filter(|date| date.month() == target)
        .count();

    Ok(MonthCount {
        month,
        label: month_name.to_string(),
        count,
    })
}

/// Counts films released on the named Spanish weekday. Unknown names yield
/// `WeekdayCount::InvalidDay` rather than an error.
pub fn films_by_release_weekday(catalog: &Catalog, day_name: &str) -> WeekdayCount {
    let weekday = match parse_weekday(day_name) {
        Ok(weekday) => weekday,
        Err(err) => return WeekdayCount::InvalidDay(err),
    };
    let count = catalog
        .films()
        .filter_map(|film| film.release_date)
        .filter(|date| date.weekday() == weekday)
        .count();

    WeekdayCount::Counted {
        weekday,
        label: day_name.to_string(),
        count,
    }
}

pub fn score_by_title(catalog: &Catalog, title: &str) -> TitleScore {
    match catalog.find_by_title(title) {
        None => TitleScore::NotFound,
        Some(film) => TitleScore::Found {
            title: film.title.clone(),
            release_year: film.release_year,
            popularity: film.popularity,
        },
    }
}

pub fn votes_by_title(catalog: &Catalog, title: &str) -> TitleVotes {
    let Some(film) = catalog.find_by_title(title) else {
        return TitleVotes::NotFound;
    };
    if film.vote_count < MIN_VOTE_COUNT {
        return TitleVotes::BelowMinimum {
            title: film.title.clone(),
            vote_count: film.vote_count,
        };
    }
    TitleVotes::Found {
        title: film.title.clone(),
        release_year: film.release_year,
        vote_count: film.vote_count,
        vote_average: film.vote_average,
    }
}

/// Aggregates the return ratio of every credit row naming `actor` as cast.
/// The name must match exactly, including case and accents.
pub fn actor_aggregate(catalog: &Catalog, actor: &str) -> ActorReport {
    let rows: Vec<&JoinedRecord> = catalog
        .joined()
        .iter()
        .filter(|row| row.credit.cast_name.as_deref() == Some(actor))
        .collect();
    if rows.is_empty() {
        return ActorReport::NotFound(actor.to_string());
    }

    let returns: Vec<f64> = rows.iter().filter_map(|row| row.film.return_ratio).collect();
    let total: f64 = returns.iter().sum();
    let mean = if returns.is_empty() {
        0.0
    } else {
        total / returns.len() as f64
    };

    ActorReport::Found(ActorSummary {
        actor: actor.to_string(),
        film_count: rows.len(),
        total_return: round2(total),
        mean_return: round2(mean),
    })
}

/// Lists the films `director` is credited on with the job "Director" and
/// sums their return ratio.
pub fn director_aggregate(catalog: &Catalog, director: &str) -> DirectorReport {
    let films: Vec<DirectorFilm> = catalog
        .joined()
        .iter()
        .filter(|row| {
            row.credit.crew_name.as_deref() == Some(director)
                && row.credit.crew_job.as_deref() == Some(DIRECTOR_JOB)
        })
        .map(|row| DirectorFilm {
            title: row.film.original_title.clone(),
            release_date: row.film.release_date,
            return_ratio: row.film.return_ratio,
            budget: row.film.budget,
            revenue: row.film.revenue,
        })
        .collect();
    if films.is_empty() {
        return DirectorReport::NotFound(director.to_string());
    }

    let total: f64 = films.iter().filter_map(|film| film.return_ratio).sum();
    DirectorReport::Found(DirectorSummary {
        director: director.to_string(),
        total_return: round2(total),
        films,
    })
}

/// Rounds to two decimals, sending halves to the even neighbour (0.125 -> 0.12).
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn or_unknown<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "desconocido".to_string(),
    }
}

// Whole numbers keep their ".0" so 7.0 is not printed as "7".
fn float_or_unknown(value: &Option<f64>) -> String {
    match value {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e16 => format!("{:.1}", value),
        _ => or_unknown(value),
    }
}

// Uppercases the first character and lowercases the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
