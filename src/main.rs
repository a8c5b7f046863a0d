use clap::Parser;
use lib::{DatasetPaths, ServiceError, SimpleLogger, load, server};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Film table (Parquet, or CSV when the extension is .csv)
    #[arg(long, env = "MOVIES_DATASET", default_value = "dataset_movies.parquet")]
    movies: PathBuf,

    /// Credit table (Parquet, or CSV when the extension is .csv)
    #[arg(long, env = "CREDITS_DATASET", default_value = "dataset_credits.parquet")]
    credits: PathBuf,

    /// Address the HTTP API listens on
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    listen: String,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    log::set_logger(&LOGGER).map_err(|e| ServiceError::Logger(e.to_string()))?;

    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }
    debug!("{:?}", args);

    let paths = DatasetPaths {
        movies: args.movies,
        credits: args.credits,
    };

    // No request is served until both tables are in memory.
    let load_start = Instant::now();
    let catalog = Arc::new(load(&paths)?);
    println!("Datasets loaded in {:.2?}", load_start.elapsed());

    server::serve(&args.listen, catalog).await?;
    Ok(())
}
