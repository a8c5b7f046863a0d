use arrow_schema::ArrowError;

/// Failure to bring either dataset into memory. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum DatasetLoadError {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet Error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow Error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Data Error: {0}")]
    Data(String),
}

/// Per-request input errors. The message is what the client sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Mes no válido: {0}. El mes debe estar escrito en español. No se aceptan números")]
    InvalidMonthName(String),
    #[error(
        "El Día esta mal escrito o no es válido. Por favor ingrese un día en español, recuerde usar los acentos."
    )]
    InvalidDayName(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Dataset load failed: {0}")]
    Load(#[from] DatasetLoadError),
    #[error("Server Error: {0}")]
    Server(#[from] std::io::Error),
    #[error("Logger Error: {0}")]
    Logger(String),
}

pub type Result<T, E = DatasetLoadError> = std::result::Result<T, E>;
