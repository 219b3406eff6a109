use crate::sql::{
    base::{
        error::{ConnectorError, DbError},
        executor::SqlExecutor,
    },
    postgres::{params::PgParamStore, row::decode_row, utils::connect_client},
};
use async_trait::async_trait;
use model::{core::value::Value, records::row::UpsertRow};
use std::sync::Arc;
use tokio_postgres::Client;
use tracing::debug;

#[derive(Clone)]
pub struct PgAdapter {
    client: Arc<Client>,
}

impl PgAdapter {
    /// Connects using a `postgres://` URL; `sslmode` in the URL selects TLS.
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let client = connect_client(url).await?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        PgAdapter {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Runs one or more statements without parameters or results.
    pub async fn exec(&self, query: &str) -> Result<(), DbError> {
        self.client.batch_execute(query).await?;
        Ok(())
    }
}

#[async_trait]
impl SqlExecutor for PgAdapter {
    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<UpsertRow>, DbError> {
        let bindings = PgParamStore::from_values(params);
        let rows = self.client.query(sql, &bindings.as_refs()).await?;
        debug!(rows = rows.len(), "Statement returned rows");
        rows.iter().map(decode_row).collect()
    }
}
