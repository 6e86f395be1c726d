
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Sql error: {0}")]
    Sql(String),
    #[error("Mapping error: {0}")]
    Mapping(String),
    #[error("Execution error: {0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, TabulaError>;

// Helper conversions
impl From<rusqlite::Error> for TabulaError {
    fn from(e: rusqlite::Error) -> Self { Self::Sql(e.to_string()) }
}
