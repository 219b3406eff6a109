use connectors::sql::{base::executor::SqlExecutor, postgres::adapter::PgAdapter};
use model::{
    core::value::Value,
    records::{result::UpsertResult, row::UpsertRow},
};

/// `k` is the natural key, `id` the server-generated identity.
pub fn items_ddl(table: &str) -> String {
    format!(
        r#"CREATE TABLE "{table}" (
            id BIGSERIAL PRIMARY KEY,
            k INTEGER NOT NULL UNIQUE,
            v TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );"#
    )
}

pub fn row(k: i64, v: &str) -> UpsertRow {
    UpsertRow::new().with("k", k).with("v", v)
}

/// Every stored row as `(k, v)`, ordered by `k`.
pub async fn stored_pairs(adapter: &PgAdapter, table: &str) -> Vec<(i64, String)> {
    let rows = adapter
        .query(&format!(r#"SELECT k, v FROM "{table}" ORDER BY k"#), vec![])
        .await
        .expect("select stored rows");
    rows.iter()
        .map(|row| {
            let k = row.get_value("k").as_i64().expect("k is an integer");
            let v = row.get_value("v").as_str().expect("v is text").to_string();
            (k, v)
        })
        .collect()
}

pub async fn row_count(adapter: &PgAdapter, table: &str) -> i64 {
    let rows = adapter
        .query(&format!(r#"SELECT COUNT(*) AS n FROM "{table}""#), vec![])
        .await
        .expect("count rows");
    rows[0].get_value("n").as_i64().expect("count is an integer")
}

/// The `id` of every applied entry, `None` for skipped ones.
pub fn ids(result: &UpsertResult) -> Vec<Option<Value>> {
    result
        .iter()
        .map(|outcome| outcome.row().map(|row| row.get_value("id")))
        .collect()
}
