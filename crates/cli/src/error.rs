use connectors::sql::base::error::{ConnectorError, DbError};
use engine_core::error::UpsertError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the batch file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse the batch file: {0}")]
    BatchParse(#[from] serde_json::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Upsert failed: {0}")]
    Upsert(#[from] UpsertError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
