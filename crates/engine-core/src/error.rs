use connectors::sql::base::error::DbError;
use planner::error::PlanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpsertError {
    /// A row's column set differs from the first row's.
    #[error("row {row_index} has a different column set: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        row_index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("an update on conflict requires a conflict target")]
    MissingConflictTarget,

    /// Two input rows share a conflict key, so returned rows could not be
    /// attributed to them.
    #[error("row {duplicate_index} repeats the conflict key of row {first_index}")]
    DuplicateConflictKey {
        first_index: usize,
        duplicate_index: usize,
    },

    /// The server returned rows whose keys match no input row, e.g. because
    /// a trigger or column type rewrote a key value.
    #[error("{count} returned rows could not be matched to an input row")]
    UnreconciledRows { count: usize },

    #[error("Plan error: {0}")]
    Plan(PlanError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<PlanError> for UpsertError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::MissingConflictTarget => UpsertError::MissingConflictTarget,
            other => UpsertError::Plan(other),
        }
    }
}
