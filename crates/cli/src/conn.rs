use crate::error::CliError;
use connectors::sql::postgres::adapter::PgAdapter;
use tracing::{error, info};

pub struct PostgresConnectionPinger {
    pub url: String,
}

impl PostgresConnectionPinger {
    /// Connects and runs `SELECT 1`; returns Err if unreachable.
    pub async fn ping(&self) -> Result<(), CliError> {
        info!("Pinging Postgres");

        let adapter = PgAdapter::connect(&self.url).await.map_err(|e| {
            error!("Postgres connection failed: {}", e);
            CliError::Connector(e)
        })?;

        let row = adapter
            .client()
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Postgres ping query failed: {}", e);
                CliError::Database(e.into())
            })?;

        let val: i32 = row.get(0);
        if val != 1 {
            let msg = format!("Postgres ping returned unexpected result: {val}");
            error!("{}", msg);
            return Err(CliError::Unexpected(msg));
        }

        info!("Postgres ping succeeded");
        Ok(())
    }
}
