//! Lowers caller-built [`ExpressionNode`] trees into SQL expressions.

use model::{
    core::value::Value,
    execution::expr::{ComparisonOp, ExpressionNode},
};

use crate::{
    error::PlanError,
    query::{
        ast::expr::{BinaryOp, BinaryOperator, Expr},
        dialect::Dialect,
        excluded, ident, qualified,
        renderer::{Render, Renderer},
    },
};

/// Where the lowered expression will be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// `DO UPDATE` clauses: existing columns are qualified with the
    /// destination table name, proposed columns read from `EXCLUDED`.
    Table(String),
    /// Partial-index predicates: columns are bare and there is no
    /// proposed row.
    IndexPredicate,
}

#[derive(Debug, Clone)]
pub struct ExpressionTranslator {
    scope: Scope,
}

impl ExpressionTranslator {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }

    pub fn for_table(table: &str) -> Self {
        Self::new(Scope::Table(table.to_string()))
    }

    pub fn for_index_predicate() -> Self {
        Self::new(Scope::IndexPredicate)
    }

    pub fn lower(&self, node: &ExpressionNode) -> Result<Expr, PlanError> {
        match node {
            ExpressionNode::Literal(value) => Ok(Expr::Value(value.clone())),
            ExpressionNode::ColumnRef(name) => {
                check_name(name)?;
                Ok(match &self.scope {
                    Scope::Table(table) => qualified(table, name),
                    Scope::IndexPredicate => ident(name),
                })
            }
            ExpressionNode::ProposedColumnRef(name) => {
                check_name(name)?;
                match self.scope {
                    Scope::Table(_) => Ok(excluded(name)),
                    Scope::IndexPredicate => Err(PlanError::InvalidExpression(format!(
                        "proposed column `{name}` cannot appear in an index predicate"
                    ))),
                }
            }
            ExpressionNode::Comparison { op, lhs, rhs } => Ok(binary(
                self.lower(lhs)?,
                comparison_operator(*op),
                self.lower(rhs)?,
            )),
            ExpressionNode::And(items) => self.fold(items, BinaryOperator::And, "TRUE"),
            ExpressionNode::Or(items) => self.fold(items, BinaryOperator::Or, "FALSE"),
            ExpressionNode::Not(inner) => Ok(Expr::Not(Box::new(self.lower(inner)?))),
            ExpressionNode::IsNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.lower(inner)?),
                negated: false,
            }),
            ExpressionNode::IsNotNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.lower(inner)?),
                negated: true,
            }),
        }
    }

    /// Lowers and renders `node` on its own, numbering parameters from `$1`.
    pub fn translate_to_sql(
        &self,
        node: &ExpressionNode,
        dialect: &dyn Dialect,
    ) -> Result<(String, Vec<Value>), PlanError> {
        let expr = self.lower(node)?;
        let mut renderer = Renderer::new(dialect);
        expr.render(&mut renderer);
        Ok(renderer.finish())
    }

    fn fold(
        &self,
        items: &[ExpressionNode],
        op: BinaryOperator,
        identity: &str,
    ) -> Result<Expr, PlanError> {
        let mut lowered = items.iter().map(|item| self.lower(item));
        let Some(first) = lowered.next() else {
            return Ok(Expr::Literal(identity.to_string()));
        };
        lowered.try_fold(first?, |acc, next| Ok(binary(acc, op, next?)))
    }
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
}

fn comparison_operator(op: ComparisonOp) -> BinaryOperator {
    match op {
        ComparisonOp::Eq => BinaryOperator::Eq,
        ComparisonOp::NotEq => BinaryOperator::NotEq,
        ComparisonOp::Lt => BinaryOperator::Lt,
        ComparisonOp::LtEq => BinaryOperator::LtEq,
        ComparisonOp::Gt => BinaryOperator::Gt,
        ComparisonOp::GtEq => BinaryOperator::GtEq,
        ComparisonOp::IsDistinctFrom => BinaryOperator::IsDistinctFrom,
        ComparisonOp::IsNotDistinctFrom => BinaryOperator::IsNotDistinctFrom,
    }
}

fn check_name(name: &str) -> Result<(), PlanError> {
    if name.trim().is_empty() {
        return Err(PlanError::InvalidExpression(
            "column reference with an empty name".to_string(),
        ));
    }
    Ok(())
}
