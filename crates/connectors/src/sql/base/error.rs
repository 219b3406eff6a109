use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any error reported by the server or the driver, passed through as is.
    #[error("SQL error: {0}")]
    Sql(#[from] tokio_postgres::Error),

    /// A returned column could not be turned into a `Value`.
    #[error("cannot decode column `{column}` of type {type_name}")]
    Decode { column: String, type_name: String },
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("invalid connection url: {0}")]
    InvalidUrl(String),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Postgres connection failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}
