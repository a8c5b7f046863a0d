use crate::catalog::Catalog;
use crate::error::{DatasetLoadError, Result};
use crate::structs::{CreditLink, DatasetPaths, Film};
use arrow_array::{Array, ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow_cast::cast::cast;
use arrow_schema::{DataType, SchemaRef};
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;
use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use std::{fs::File, path::Path};

// Slash dates without a leading year are month first.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const FILM_COLUMNS: [&str; 8] = [
    "id",
    "title",
    "release_date",
    "popularity",
    "vote_count",
    "vote_average",
    "budget",
    "revenue",
];

const CREDIT_COLUMNS: [&str; 1] = ["id"];

const RETURN_COLUMN: &str = "return";

/// Loads both tables and builds the query context.
///
/// # Errors
/// Returns `DatasetLoadError` if either file cannot be opened, is not valid
/// Parquet/CSV, or lacks a required column.
pub fn load(paths: &DatasetPaths) -> Result<Catalog> {
    info!("Loading films from {}", paths.movies.display());
    let films = read_films(&paths.movies)?;
    info!("Loading credits from {}", paths.credits.display());
    let credits = read_credits(&paths.credits)?;

    let catalog = Catalog::new(films, credits);
    info!(
        "Loaded {} films, {} credits ({} joined rows)",
        catalog.film_count(),
        catalog.credit_count(),
        catalog.joined().len()
    );
    Ok(catalog)
}

/// Parses a release date, returning `None` for anything unrecognized.
///
/// Date-time strings are accepted; only the date part is kept.
pub fn normalize_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    if date_part.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// Reads the film table from a `.csv` or Parquet file.
pub fn read_films(path: &Path) -> Result<Vec<Film>> {
    let (columns, raws) = if is_csv(path) {
        read_csv::<RawFilm>(path, &FILM_COLUMNS)?
    } else {
        let (schema, batches) = read_parquet(path, &FILM_COLUMNS)?;
        let mut raws = Vec::new();
        for batch in &batches {
            raws.extend(films_from_batch(batch)?);
        }
        (column_names(&schema), raws)
    };

    let derive_return = !columns.iter().any(|c| c == RETURN_COLUMN);
    if derive_return {
        debug!("No '{}' column, deriving revenue/budget", RETURN_COLUMN);
    }
    Ok(normalize_films(raws, derive_return))
}

/// Reads the credit table from a `.csv` or Parquet file.
pub fn read_credits(path: &Path) -> Result<Vec<CreditLink>> {
    let raws = if is_csv(path) {
        read_csv::<RawCredit>(path, &CREDIT_COLUMNS)?.1
    } else {
        let (_, batches) = read_parquet(path, &CREDIT_COLUMNS)?;
        let mut raws = Vec::new();
        for batch in &batches {
            raws.extend(credits_from_batch(batch)?);
        }
        raws
    };

    let total = raws.len();
    let credits: Vec<CreditLink> = raws
        .into_iter()
        .filter_map(|raw| {
            Some(CreditLink {
                film_id: raw.id?,
                cast_name: raw.cast_name,
                crew_name: raw.crew_name,
                crew_job: raw.crew_job,
            })
        })
        .collect();
    if credits.len() < total {
        warn!(
            "Skipped {} credit rows without a valid id",
            total - credits.len()
        );
    }
    Ok(credits)
}

/// Film row as stored, before date normalization.
#[derive(Debug, Deserialize)]
struct RawFilm {
    #[serde(default, deserialize_with = "whole_number_id")]
    id: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    release_year: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    popularity: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    vote_count: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    vote_average: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    budget: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    revenue: Option<f64>,
    #[serde(default, rename = "return", deserialize_with = "csv::invalid_option")]
    return_ratio: Option<f64>,
}

impl RawFilm {
    /// Returns the film plus whether a non-empty release date was discarded.
    fn into_film(self, derive_return: bool) -> Option<(Film, bool)> {
        let id = self.id?;
        let raw_date = self.release_date.as_deref().map(str::trim).unwrap_or("");
        let release_date = normalize_release_date(raw_date);
        let date_dropped = release_date.is_none() && !raw_date.is_empty();

        let budget = finite(self.budget).unwrap_or(0.0);
        let revenue = finite(self.revenue).unwrap_or(0.0);
        let return_ratio = if derive_return {
            Some(if budget > 0.0 { revenue / budget } else { 0.0 })
        } else {
            finite(self.return_ratio)
        };

        let title = self.title.unwrap_or_default();
        let original_title = self.original_title.unwrap_or_else(|| title.clone());

        let film = Film {
            id,
            original_title,
            title,
            release_date,
            release_year: finite(self.release_year)
                .map(|year| year as i32)
                .or_else(|| release_date.map(|date| date.year())),
            popularity: finite(self.popularity),
            vote_count: finite(self.vote_count)
                .filter(|count| *count > 0.0)
                .map(|count| count as u64)
                .unwrap_or(0),
            vote_average: finite(self.vote_average),
            budget,
            revenue,
            return_ratio,
        };
        Some((film, date_dropped))
    }
}

#[derive(Debug, Deserialize)]
struct RawCredit {
    #[serde(default, deserialize_with = "whole_number_id")]
    id: Option<i64>,
    #[serde(default)]
    cast_name: Option<String>,
    #[serde(default)]
    crew_name: Option<String>,
    #[serde(default)]
    crew_job: Option<String>,
}

fn normalize_films(raws: Vec<RawFilm>, derive_return: bool) -> Vec<Film> {
    let total = raws.len();
    let normalized: Vec<(Film, bool)> = raws
        .into_par_iter()
        .filter_map(|raw| raw.into_film(derive_return))
        .collect();

    if normalized.len() < total {
        warn!(
            "Skipped {} film rows without a valid id",
            total - normalized.len()
        );
    }
    let bad_dates = normalized.iter().filter(|(_, dropped)| *dropped).count();
    if bad_dates > 0 {
        warn!("{} release dates could not be parsed, left empty", bad_dates);
    }

    normalized.into_iter().map(|(film, _)| film).collect()
}

/// Reads an identifier written either as an integer or as a whole float
/// (`862.0`). Anything else becomes `None`.
fn whole_number_id<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<i64>, D::Error> {
    let value: Option<f64> = csv::invalid_option(de)?;
    Ok(value
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64))
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn require_columns<'a>(
    path: &Path,
    present: impl IntoIterator<Item = &'a str>,
    required: &[&str],
) -> Result<()> {
    let present: Vec<&str> = present.into_iter().collect();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !present.contains(name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DatasetLoadError::Data(format!(
            "{} is missing required columns: {}",
            path.display(),
            missing.join(", ")
        )))
    }
}

fn read_csv<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<(Vec<String>, Vec<T>)> {
    debug!("Reading CSV file: {}", path.display());
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    require_columns(path, headers.iter(), required)?;

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()?;
    Ok((headers.iter().map(String::from).collect(), rows))
}

fn read_parquet(path: &Path, required: &[&str]) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    debug!("Reading Parquet file: {}", path.display());
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    require_columns(
        path,
        schema.fields().iter().map(|field| field.name().as_str()),
        required,
    )?;

    let batches = builder
        .build()?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

fn column_names(schema: &SchemaRef) -> Vec<String> {
    schema.fields().iter().map(|f| f.name().clone()).collect()
}

fn films_from_batch(batch: &RecordBatch) -> Result<Vec<RawFilm>> {
    let ids = get_column_i64(batch, "id")?;
    let titles = get_column_str(batch, "title")?;
    let original_titles = get_column_str(batch, "original_title")?;
    let dates = get_column_str(batch, "release_date")?;
    let years = get_column_f64(batch, "release_year")?;
    let popularity = get_column_f64(batch, "popularity")?;
    let vote_counts = get_column_f64(batch, "vote_count")?;
    let vote_averages = get_column_f64(batch, "vote_average")?;
    let budgets = get_column_f64(batch, "budget")?;
    let revenues = get_column_f64(batch, "revenue")?;
    let returns = get_column_f64(batch, RETURN_COLUMN)?;

    Ok((0..batch.num_rows())
        .map(|i| RawFilm {
            id: int_at(&ids, i),
            title: str_at(&titles, i),
            original_title: str_at(&original_titles, i),
            release_date: str_at(&dates, i),
            release_year: float_at(&years, i),
            popularity: float_at(&popularity, i),
            vote_count: float_at(&vote_counts, i),
            vote_average: float_at(&vote_averages, i),
            budget: float_at(&budgets, i),
            revenue: float_at(&revenues, i),
            return_ratio: float_at(&returns, i),
        })
        .collect())
}

fn credits_from_batch(batch: &RecordBatch) -> Result<Vec<RawCredit>> {
    let ids = get_column_i64(batch, "id")?;
    let cast_names = get_column_str(batch, "cast_name")?;
    let crew_names = get_column_str(batch, "crew_name")?;
    let crew_jobs = get_column_str(batch, "crew_job")?;

    Ok((0..batch.num_rows())
        .map(|i| RawCredit {
            id: int_at(&ids, i),
            cast_name: str_at(&cast_names, i),
            crew_name: str_at(&crew_names, i),
            crew_job: str_at(&crew_jobs, i),
        })
        .collect())
}

/// Casts a column to `data_type` when present. Values that do not convert
/// become nulls instead of failing the batch.
fn column_as(batch: &RecordBatch, name: &str, data_type: &DataType) -> Result<Option<ArrayRef>> {
    match batch.column_by_name(name) {
        Some(column) => Ok(Some(cast(column, data_type)?)),
        None => Ok(None),
    }
}

fn get_column_f64(batch: &RecordBatch, name: &str) -> Result<Option<Float64Array>> {
    downcast_column(column_as(batch, name, &DataType::Float64)?, name, "Float64")
}

fn get_column_i64(batch: &RecordBatch, name: &str) -> Result<Option<Int64Array>> {
    downcast_column(column_as(batch, name, &DataType::Int64)?, name, "Int64")
}

fn get_column_str(batch: &RecordBatch, name: &str) -> Result<Option<StringArray>> {
    downcast_column(column_as(batch, name, &DataType::Utf8)?, name, "Utf8/String")
}

fn downcast_column<T: Array + Clone + 'static>(
    array: Option<ArrayRef>,
    name: &str,
    type_name: &str,
) -> Result<Option<T>> {
    array
        .map(|array| {
            array
                .as_any()
                .downcast_ref::<T>()
                .cloned()
                .ok_or_else(|| DatasetLoadError::Data(format!("Column {} is not {}", name, type_name)))
        })
        .transpose()
}

fn float_at(column: &Option<Float64Array>, i: usize) -> Option<f64> {
    column
        .as_ref()
        .filter(|c| c.is_valid(i))
        .map(|c| c.value(i))
        .filter(|v| !v.is_nan())
}

fn int_at(column: &Option<Int64Array>, i: usize) -> Option<i64> {
    column.as_ref().filter(|c| c.is_valid(i)).map(|c| c.value(i))
}

fn str_at(column: &Option<StringArray>, i: usize) -> Option<String> {
    column
        .as_ref()
        .filter(|c| c.is_valid(i))
        .map(|c| c.value(i).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::Date32Array;
    use arrow_schema::{Field, Schema};
    use chrono::Weekday;
    use parquet::arrow::ArrowWriter;
    use std::io::Write;
    use std::sync::Arc;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn release_dates_accept_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2010, 7, 16);
        assert_eq!(normalize_release_date("2010-07-16"), expected);
        assert_eq!(normalize_release_date(" 2010/07/16 "), expected);
        assert_eq!(normalize_release_date("07/16/2010"), expected);
        assert_eq!(normalize_release_date("2010-07-16T00:00:00"), expected);
        assert_eq!(normalize_release_date("2010-07-16 00:00:00"), expected);
        assert_eq!(expected.map(|d| d.weekday()), Some(Weekday::Fri));
    }

    #[test]
    fn ambiguous_slash_dates_are_month_first() {
        assert_eq!(
            normalize_release_date("01/02/2010"),
            NaiveDate::from_ymd_opt(2010, 1, 2)
        );
        assert_eq!(normalize_release_date("16/07/2010"), None);
    }

    #[test]
    fn unparseable_release_dates_become_none() {
        for raw in ["", "   ", "1", "2010-13-01", "not a date", "NaT"] {
            assert_eq!(normalize_release_date(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn csv_films_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "movies.csv",
            "id,title,release_date,popularity,vote_count,vote_average,budget,revenue\n\
             27205,Inception,2010-07-16,29.108149,14075.0,8.1,160000000,825532764\n\
             99,Broken,someday,abc,,,0,0\n\
             oops,No Id,2001-01-01,1,1,1,1,1\n",
        );

        let films = read_films(&path).unwrap();
        assert_eq!(films.len(), 2);

        let inception = &films[0];
        assert_eq!(inception.original_title, "Inception");
        assert_eq!(inception.release_year, Some(2010));
        assert_eq!(inception.vote_count, 14075);
        let ratio = inception.return_ratio.unwrap();
        assert!((ratio - 825_532_764.0 / 160_000_000.0).abs() < 1e-9);

        let broken = &films[1];
        assert_eq!(broken.release_date, None);
        assert_eq!(broken.release_year, None);
        assert_eq!(broken.popularity, None);
        assert_eq!(broken.vote_count, 0);
        assert_eq!(broken.return_ratio, Some(0.0));
    }

    #[test]
    fn return_column_is_used_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "movies.csv",
            "id,title,original_title,release_date,release_year,popularity,vote_count,vote_average,budget,revenue,return\n\
             1,Amélie,Le Fabuleux Destin d'Amélie Poulain,2001-04-25,2001,12.5,3403,7.8,10000000,173921954,17.39\n\
             2,Ghost,Ghost,1990-07-13,1990,8,1000,6.9,22000000,505000000,\n",
        );

        let films = read_films(&path).unwrap();
        assert_eq!(films[0].original_title, "Le Fabuleux Destin d'Amélie Poulain");
        assert_eq!(films[0].return_ratio, Some(17.39));
        assert_eq!(films[1].return_ratio, None);
    }

    #[test]
    fn missing_required_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "movies.csv", "id,title\n1,Heat\n");

        let err = read_films(&path).unwrap_err();
        assert!(matches!(err, DatasetLoadError::Data(ref msg) if msg.contains("release_date")));
    }

    #[test]
    fn unreadable_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_films(&dir.path().join("absent.parquet")).is_err());
        assert!(read_credits(&dir.path().join("absent.csv")).is_err());

        let garbage = write_file(dir.path(), "movies.parquet", "definitely not parquet");
        assert!(matches!(
            read_films(&garbage),
            Err(DatasetLoadError::Parquet(_))
        ));
    }

    #[test]
    fn csv_ids_written_as_floats_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let movies = write_file(
            dir.path(),
            "movies.csv",
            "id,title,release_date,popularity,vote_count,vote_average,budget,revenue\n\
             862.0,Toy Story,1995-10-30,21.9,5415.0,7.7,30000000,373554033\n\
             863.5,Half,1995-10-30,1,1,1,1,1\n",
        );
        let credits = write_file(
            dir.path(),
            "credits.csv",
            "id,cast_name,crew_name,crew_job\n862.0,Tom Hanks,,\n",
        );

        let films = read_films(&movies).unwrap();
        assert_eq!(films.iter().map(|f| f.id).collect::<Vec<_>>(), vec![862]);
        let credits = read_credits(&credits).unwrap();
        assert_eq!(credits[0].film_id, 862);

        let catalog = Catalog::new(films, credits);
        assert_eq!(catalog.joined().len(), 1);
    }

    #[test]
    fn csv_credits_skip_rows_without_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "credits.csv",
            "id,cast_name,crew_name,crew_job\n\
             1,Tom Hanks,,\n\
             ,Ghost Row,,\n\
             1,,John Lasseter,Director\n",
        );

        let credits = read_credits(&path).unwrap();
        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0].cast_name.as_deref(), Some("Tom Hanks"));
        assert_eq!(credits[0].crew_name, None);
        assert_eq!(credits[1].crew_job.as_deref(), Some("Director"));
    }

    #[test]
    fn parquet_films_coerce_column_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("release_date", DataType::Date32, true),
            Field::new("popularity", DataType::Utf8, true),
            Field::new("vote_count", DataType::Float64, true),
            Field::new("vote_average", DataType::Float64, true),
            Field::new("budget", DataType::Int64, true),
            Field::new("revenue", DataType::Float64, true),
            Field::new("return", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(arrow_array::Int32Array::from(vec![27205, 2])),
                Arc::new(StringArray::from(vec![Some("Inception"), Some("Untitled")])),
                Arc::new(Date32Array::from(vec![Some(14806), None])),
                Arc::new(StringArray::from(vec![Some("29.108149"), Some("n/a")])),
                Arc::new(Float64Array::from(vec![Some(14075.0), None])),
                Arc::new(Float64Array::from(vec![Some(8.1), None])),
                Arc::new(Int64Array::from(vec![Some(160_000_000), None])),
                Arc::new(Float64Array::from(vec![Some(825_532_764.0), None])),
                Arc::new(Float64Array::from(vec![Some(5.16), Some(f64::NAN)])),
            ],
        )
        .unwrap();

        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let films = read_films(&path).unwrap();
        assert_eq!(films.len(), 2);

        let inception = &films[0];
        assert_eq!(inception.id, 27205);
        assert_eq!(inception.release_date, NaiveDate::from_ymd_opt(2010, 7, 16));
        assert_eq!(inception.release_year, Some(2010));
        assert_eq!(inception.popularity, Some(29.108149));
        assert_eq!(inception.budget, 160_000_000.0);
        assert_eq!(inception.return_ratio, Some(5.16));

        let untitled = &films[1];
        assert_eq!(untitled.release_date, None);
        assert_eq!(untitled.popularity, None);
        assert_eq!(untitled.return_ratio, None);
    }
}
