use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
    #[error("CRS mismatch: expected {expected}, found {found}")]
    CrsMismatch { expected: String, found: String },
    #[error("Projection error: {0}")]
    Projection(String),
    #[error("Malformed street graph: {0}")]
    MalformedGraph(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
