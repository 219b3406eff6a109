use crate::error::CliError;
use model::{
    core::value::Value,
    execution::{
        conflict::{ConflictAction, ConflictTarget},
        expr::ExpressionNode,
        target::TargetTable,
    },
    records::{batch::UpsertBatch, row::UpsertRow},
};
use serde::Deserialize;

/// On-disk description of one upsert batch.
#[derive(Debug, Deserialize)]
pub struct BatchFile {
    pub target: TargetTable,
    #[serde(default)]
    pub conflict_target: Option<ConflictTarget>,
    #[serde(default)]
    pub action: ConflictAction,
    #[serde(default)]
    pub index_predicate: Option<ExpressionNode>,
    #[serde(default)]
    pub return_full_row: bool,
    /// Plain JSON objects, one per row.
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl BatchFile {
    pub async fn load(path: &str) -> Result<Self, CliError> {
        let source = tokio::fs::read_to_string(path).await?;
        Self::parse(&source)
    }

    pub fn parse(source: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn into_parts(self) -> (TargetTable, UpsertBatch) {
        let rows = self
            .rows
            .into_iter()
            .map(|object| {
                object
                    .into_iter()
                    .map(|(column, json)| (column, Value::from_json(json)))
                    .collect::<UpsertRow>()
            })
            .collect();

        let batch = UpsertBatch {
            rows,
            conflict_target: self.conflict_target,
            action: self.action,
            index_predicate: self.index_predicate,
            return_full_row: self.return_full_row,
        };
        (self.target, batch)
    }
}
