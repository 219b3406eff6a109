use crate::{
    error::UpsertError,
    reconcile::ResultReconciler,
    validation::{key::KeyChecker, schema_validator::RowSchemaValidator},
};
use connectors::sql::base::executor::SqlExecutor;
use model::{
    core::value::Value,
    execution::{
        conflict::{ConflictAction, ConflictTarget},
        target::TargetTable,
    },
    records::{batch::UpsertBatch, result::UpsertResult, row::UpsertRow},
};
use planner::query::builder::upsert::{UpsertStatement, UpsertStatementBuilder};
use tracing::{debug, info};

/// Validates `batch` and builds its statement.
///
/// Every locally detectable error (column sets, missing target, duplicate
/// keys) is raised here, before anything reaches the server.
pub fn prepare(
    builder: &UpsertStatementBuilder,
    batch: &UpsertBatch,
) -> Result<UpsertStatement, UpsertError> {
    let layout = RowSchemaValidator::validate(&batch.rows)?;
    let statement = builder.build(batch, &layout)?;
    KeyChecker::check_rows(&batch.rows, &statement.key_sources)?;
    Ok(statement)
}

/// Runs upsert batches against one destination table.
///
/// Each batch becomes exactly one statement and one round trip. Nothing is
/// kept between calls, and a failed statement is returned to the caller
/// as is.
pub struct Upserter<E: SqlExecutor> {
    executor: E,
    builder: UpsertStatementBuilder,
}

impl<E: SqlExecutor> Upserter<E> {
    pub fn new(executor: E, target: TargetTable) -> Self {
        Self {
            executor,
            builder: UpsertStatementBuilder::new(target),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn target(&self) -> &TargetTable {
        self.builder.target()
    }

    /// Validates `batch` and builds its statement without running it.
    pub fn render(&self, batch: &UpsertBatch) -> Result<UpsertStatement, UpsertError> {
        prepare(&self.builder, batch)
    }

    /// Upserts every row of `batch`; the result has one entry per input row,
    /// in input order.
    pub async fn execute(&self, batch: UpsertBatch) -> Result<UpsertResult, UpsertError> {
        if batch.is_empty() {
            debug!(table = %self.target().table, "Empty batch, nothing to upsert");
            return Ok(UpsertResult::default());
        }

        let mut statement = self.render(&batch)?;
        debug!(
            sql = %statement.sql,
            params = statement.params.len(),
            "Executing upsert statement"
        );

        let params = std::mem::take(&mut statement.params);
        let returned = self.executor.query(&statement.sql, params).await?;
        let result = ResultReconciler::new(&statement).reconcile(batch.rows, returned)?;

        info!(
            table = %self.target().table,
            applied = result.applied_count(),
            skipped = result.skipped_count(),
            "Upsert batch completed"
        );
        Ok(result)
    }

    /// Upserts a single row and returns it as stored, or `None` when the
    /// conflict action left it untouched.
    pub async fn upsert(
        &self,
        row: UpsertRow,
        target: ConflictTarget,
        action: ConflictAction,
    ) -> Result<Option<UpsertRow>, UpsertError> {
        let batch = UpsertBatch::new(vec![row], target, action).returning_full_row(true);
        self.single(batch).await
    }

    /// Upserts a single row and returns only its primary-key values.
    pub async fn upsert_returning_key(
        &self,
        row: UpsertRow,
        target: ConflictTarget,
        action: ConflictAction,
    ) -> Result<Option<Vec<Value>>, UpsertError> {
        let batch = UpsertBatch::new(vec![row], target, action);
        let stored = self.single(batch).await?;
        Ok(stored.map(|row| {
            self.target()
                .primary_key
                .iter()
                .map(|column| row.get_value(column))
                .collect()
        }))
    }

    /// Inserts `rows`, skipping those that conflict. Without a target any
    /// unique constraint counts as a conflict.
    pub async fn insert_or_ignore(
        &self,
        rows: Vec<UpsertRow>,
        target: Option<ConflictTarget>,
    ) -> Result<UpsertResult, UpsertError> {
        let batch = match target {
            Some(target) => UpsertBatch::new(rows, target, ConflictAction::Nothing),
            None => UpsertBatch::ignoring_conflicts(rows),
        };
        self.execute(batch).await
    }

    async fn single(&self, batch: UpsertBatch) -> Result<Option<UpsertRow>, UpsertError> {
        let result = self.execute(batch).await?;
        Ok(result.into_outcomes().into_iter().next().and_then(|o| o.into_row()))
    }
}
