#![allow(dead_code)]

use connectors::sql::postgres::adapter::PgAdapter;
use std::env;
use tracing::warn;

pub mod integration;
pub mod utils;

/// Integration tests run only when this variable points at a database
/// they may create and drop tables in.
const TEST_PG_URL_VAR: &str = "UPSERT_TEST_PG_URL";

/// Connects to the test database, or returns `None` (after logging why)
/// when no database is configured.
async fn pg_adapter() -> Option<PgAdapter> {
    let Ok(url) = env::var(TEST_PG_URL_VAR) else {
        warn!("{TEST_PG_URL_VAR} is not set, skipping database test");
        return None;
    };
    Some(PgAdapter::connect(&url).await.expect("connect postgres"))
}

/// Drops and recreates `table` from `ddl`, which must create it under that
/// name. Each test uses its own table so tests can run in parallel.
async fn reset_table(adapter: &PgAdapter, table: &str, ddl: &str) {
    adapter
        .exec(&format!(r#"DROP TABLE IF EXISTS "{table}" CASCADE;"#))
        .await
        .expect("drop test table");
    adapter.exec(ddl).await.expect("create test table");
}
