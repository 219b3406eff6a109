use crate::{
    execution::{
        conflict::{ConflictAction, ConflictTarget},
        expr::ExpressionNode,
    },
    records::row::UpsertRow,
};
use serde::{Deserialize, Serialize};

/// Unit of execution: one statement, one round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertBatch {
    pub rows: Vec<UpsertRow>,
    /// `None` is only meaningful with [`ConflictAction::Nothing`] and means
    /// "conflict with any constraint".
    pub conflict_target: Option<ConflictTarget>,
    pub action: ConflictAction,
    /// Selects a partial unique index as arbiter (`ON CONFLICT (...) WHERE`).
    #[serde(default)]
    pub index_predicate: Option<ExpressionNode>,
    #[serde(default)]
    pub return_full_row: bool,
}

impl UpsertBatch {
    pub fn new(rows: Vec<UpsertRow>, target: ConflictTarget, action: ConflictAction) -> Self {
        Self {
            rows,
            conflict_target: Some(target),
            action,
            index_predicate: None,
            return_full_row: false,
        }
    }

    /// `ON CONFLICT DO NOTHING` against any constraint.
    pub fn ignoring_conflicts(rows: Vec<UpsertRow>) -> Self {
        Self {
            rows,
            conflict_target: None,
            action: ConflictAction::Nothing,
            index_predicate: None,
            return_full_row: false,
        }
    }

    pub fn with_index_predicate(mut self, predicate: ExpressionNode) -> Self {
        self.index_predicate = Some(predicate);
        self
    }

    pub fn returning_full_row(mut self, enabled: bool) -> Self {
        self.return_full_row = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The fixed column order of a validated batch. Every row's values are
/// emitted positionally in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    pub columns: Vec<String>,
}

impl ColumnLayout {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}
