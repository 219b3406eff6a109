use crate::sql::base::error::DbError;
use async_trait::async_trait;
use model::{core::value::Value, records::row::UpsertRow};

/// The boundary the upsert engine sends statements through: statement text
/// plus positional parameters in, returned rows out.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<UpsertRow>, DbError>;
}
