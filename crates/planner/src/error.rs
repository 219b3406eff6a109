use thiserror::Error;

/// Errors raised while turning a batch into a statement. All of them are
/// detected before anything is sent to the server.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// `DO UPDATE` needs an arbiter; only `DO NOTHING` may omit it.
    #[error("an update on conflict requires a conflict target")]
    MissingConflictTarget,

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// An update column that is not part of the inserted column set.
    #[error("column `{0}` is not inserted by this batch")]
    UnknownColumn(String),

    #[error("a batch must insert at least one column")]
    EmptyColumnList,

    /// Returned rows could not be matched to input rows without knowing the
    /// constraint's key columns.
    #[error("named constraint `{0}` needs its key columns when the update does not overwrite every inserted column")]
    UnkeyedConstraint(String),
}
