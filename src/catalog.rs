//! Read-only context shared by every query.
//!
//! A `Catalog` is built once after both tables are loaded and never changes
//! afterwards, so it can be shared across request handlers without locking.

use crate::structs::{CreditLink, Film, JoinedRecord};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct Catalog {
    films: Vec<Arc<Film>>,
    joined: Vec<JoinedRecord>,
    credit_rows: usize,
    // lowercased title -> index of the first film carrying it
    titles: HashMap<String, usize>,
}

impl Catalog {
    /// Builds the context from fully normalized tables and computes the join.
    pub fn new(films: Vec<Film>, credits: Vec<CreditLink>) -> Self {
        let films: Vec<Arc<Film>> = films.into_iter().map(Arc::new).collect();
        let credit_rows = credits.len();

        let mut titles = HashMap::with_capacity(films.len());
        for (index, film) in films.iter().enumerate() {
            titles.entry(film.title.to_lowercase()).or_insert(index);
        }

        let joined = join(&films, credits);
        debug!(
            "Catalog ready: {} films, {} credit rows, {} joined rows",
            films.len(),
            credit_rows,
            joined.len()
        );

        Self {
            films,
            joined,
            credit_rows,
            titles,
        }
    }

    pub fn films(&self) -> impl Iterator<Item = &Film> {
        self.films.iter().map(Arc::as_ref)
    }

    pub fn film_count(&self) -> usize {
        self.films.len()
    }

    pub fn credit_count(&self) -> usize {
        self.credit_rows
    }

    pub fn joined(&self) -> &[JoinedRecord] {
        &self.joined
    }

    /// Case-insensitive exact title lookup. When several films share a title
    /// the first one in table order wins.
    pub fn find_by_title(&self, title: &str) -> Option<&Film> {
        self.titles
            .get(&title.to_lowercase())
            .map(|&index| self.films[index].as_ref())
    }
}

/// Inner join of credits and films on the film identifier.
///
/// Output follows credit order; a credit matching several films (duplicate
/// identifiers) yields one row per film. Credits with no film are dropped.
pub fn join(films: &[Arc<Film>], credits: Vec<CreditLink>) -> Vec<JoinedRecord> {
    let mut by_id: HashMap<i64, Vec<&Arc<Film>>> = HashMap::with_capacity(films.len());
    for film in films {
        by_id.entry(film.id).or_default().push(film);
    }

    let mut joined = Vec::with_capacity(credits.len());
    let mut dropped = 0usize;
    for credit in credits {
        match by_id.get(&credit.film_id).map(Vec::as_slice) {
            None | Some([]) => dropped += 1,
            Some([film]) => joined.push(JoinedRecord {
                film: Arc::clone(*film),
                credit,
            }),
            Some(matches) => {
                for film in matches {
                    joined.push(JoinedRecord {
                        film: Arc::clone(*film),
                        credit: credit.clone(),
                    });
                }
            }
        }
    }

    if dropped > 0 {
        debug!("Dropped {} credit rows without a matching film", dropped);
    }
    joined
}
