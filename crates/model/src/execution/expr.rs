use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// Caller-built boolean/value expression used for update conditions,
/// update assignments and partial-index predicates.
///
/// The tree is plain data; lowering it to SQL happens in the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionNode {
    Literal(Value),
    /// Column of the row already stored in the destination table.
    ColumnRef(String),
    /// Column of the row proposed for insertion (`EXCLUDED`).
    ProposedColumnRef(String),
    Comparison {
        op: ComparisonOp,
        lhs: Box<ExpressionNode>,
        rhs: Box<ExpressionNode>,
    },
    And(Vec<ExpressionNode>),
    Or(Vec<ExpressionNode>),
    Not(Box<ExpressionNode>),
    IsNull(Box<ExpressionNode>),
    IsNotNull(Box<ExpressionNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    IsDistinctFrom,
    IsNotDistinctFrom,
}

impl ExpressionNode {
    pub fn literal(value: impl Into<Value>) -> Self {
        ExpressionNode::Literal(value.into())
    }

    pub fn column(name: &str) -> Self {
        ExpressionNode::ColumnRef(name.to_string())
    }

    pub fn proposed(name: &str) -> Self {
        ExpressionNode::ProposedColumnRef(name.to_string())
    }

    pub fn compare(op: ComparisonOp, lhs: ExpressionNode, rhs: ExpressionNode) -> Self {
        ExpressionNode::Comparison {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn equals(self, rhs: ExpressionNode) -> Self {
        Self::compare(ComparisonOp::Eq, self, rhs)
    }

    pub fn not_equals(self, rhs: ExpressionNode) -> Self {
        Self::compare(ComparisonOp::NotEq, self, rhs)
    }

    pub fn less_than(self, rhs: ExpressionNode) -> Self {
        Self::compare(ComparisonOp::Lt, self, rhs)
    }

    pub fn greater_than(self, rhs: ExpressionNode) -> Self {
        Self::compare(ComparisonOp::Gt, self, rhs)
    }

    pub fn is_distinct_from(self, rhs: ExpressionNode) -> Self {
        Self::compare(ComparisonOp::IsDistinctFrom, self, rhs)
    }

    /// Conjunction; nested `And` nodes are flattened into one list.
    pub fn and(self, rhs: ExpressionNode) -> Self {
        match self {
            ExpressionNode::And(mut items) => {
                items.push(rhs);
                ExpressionNode::And(items)
            }
            lhs => ExpressionNode::And(vec![lhs, rhs]),
        }
    }

    /// Disjunction; nested `Or` nodes are flattened into one list.
    pub fn or(self, rhs: ExpressionNode) -> Self {
        match self {
            ExpressionNode::Or(mut items) => {
                items.push(rhs);
                ExpressionNode::Or(items)
            }
            lhs => ExpressionNode::Or(vec![lhs, rhs]),
        }
    }

    pub fn negate(self) -> Self {
        ExpressionNode::Not(Box::new(self))
    }

    pub fn is_null(self) -> Self {
        ExpressionNode::IsNull(Box::new(self))
    }

    pub fn is_not_null(self) -> Self {
        ExpressionNode::IsNotNull(Box::new(self))
    }
}
