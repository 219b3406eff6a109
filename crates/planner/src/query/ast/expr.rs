//! Defines the AST for SQL expressions.

use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column identifier, optionally qualified, e.g. `"id"` or `"users"."id"`.
    Identifier(Ident),

    /// A column of the row proposed for insertion, e.g. `EXCLUDED."name"`.
    Excluded(String),

    /// A value bound as a positional parameter.
    Value(Value),

    /// Raw SQL emitted verbatim, e.g. `TRUE` or `*`.
    Literal(String),

    /// Key extraction from a semi-structured column, e.g. `("title"->'en')`.
    KeyAccess { column: Box<Expr>, key: String },

    /// A binary operation, e.g. `"v" = $1` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    Not(Box<Expr>),

    /// `expr IS NULL`, or `expr IS NOT NULL` when negated.
    IsNull { expr: Box<Expr>, negated: bool },

    /// An aliased expression, e.g. `("title"->'en') AS "__conflict_key_0"`.
    Alias { expr: Box<Expr>, alias: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,                // =
    NotEq,             // <>
    Lt,                // <
    LtEq,              // <=
    Gt,                // >
    GtEq,              // >=
    IsDistinctFrom,    // IS DISTINCT FROM
    IsNotDistinctFrom, // IS NOT DISTINCT FROM

    // Logical
    And,
    Or,
}
