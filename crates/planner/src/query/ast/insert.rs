//! Defines the AST for an INSERT statement.

use crate::query::ast::{common::TableRef, expr::Expr};

/// Represents a complete INSERT statement.
///
/// This structure supports both single-row and multi-row (batch) inserts
/// through the `values` field, which is a list of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    /// The rows of values to be inserted. Each inner vector represents a single row.
    pub values: Vec<Vec<Expr>>,
    /// Optional ON CONFLICT clause for handling conflicts.
    pub on_conflict: Option<OnConflict>,
    /// Expressions listed after RETURNING; empty means no RETURNING clause.
    pub returning: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    /// `None` renders a bare `ON CONFLICT`, which matches any constraint.
    pub arbiter: Option<Arbiter>,
    pub action: ConflictClause,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arbiter {
    /// `(col, (expr), ...) [WHERE predicate]`
    Targets {
        targets: Vec<Expr>,
        predicate: Option<Expr>,
    },
    /// `ON CONSTRAINT name`
    Constraint(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictClause {
    DoNothing,
    DoUpdate {
        assignments: Vec<ConflictAssignment>,
        condition: Option<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConflictAssignment {
    pub column: String,
    pub value: Expr,
}
