//! Resolves a batch's conflict target and index predicate into the
//! statement's arbiter.

use model::{
    execution::{
        conflict::{ConflictAction, ConflictTarget},
        expr::ExpressionNode,
    },
    records::batch::UpsertBatch,
};

use crate::{
    error::PlanError,
    query::{
        ast::{expr::Expr, insert::Arbiter},
        ident,
        translate::ExpressionTranslator,
    },
};

pub struct ConflictTargetResolver;

impl ConflictTargetResolver {
    pub fn resolve_batch(batch: &UpsertBatch) -> Result<Option<Arbiter>, PlanError> {
        Self::resolve(
            batch.conflict_target.as_ref(),
            &batch.action,
            batch.index_predicate.as_ref(),
        )
    }

    /// Returns `None` for a bare `ON CONFLICT`, which only `DO NOTHING`
    /// accepts.
    pub fn resolve(
        target: Option<&ConflictTarget>,
        action: &ConflictAction,
        index_predicate: Option<&ExpressionNode>,
    ) -> Result<Option<Arbiter>, PlanError> {
        let target = match target {
            Some(target) if !target.is_empty() => target,
            _ if action.is_update() => return Err(PlanError::MissingConflictTarget),
            _ => {
                if index_predicate.is_some() {
                    return Err(PlanError::InvalidExpression(
                        "an index predicate requires a column conflict target".to_string(),
                    ));
                }
                return Ok(None);
            }
        };

        let arbiter = match target {
            ConflictTarget::ColumnList(columns) => Arbiter::Targets {
                targets: columns
                    .iter()
                    .map(|c| checked_ident(c))
                    .collect::<Result<_, _>>()?,
                predicate: lower_predicate(index_predicate)?,
            },
            ConflictTarget::KeyedColumnList(pairs) => Arbiter::Targets {
                targets: pairs
                    .iter()
                    .map(|p| key_access(&p.column, &p.key))
                    .collect::<Result<_, _>>()?,
                predicate: lower_predicate(index_predicate)?,
            },
            ConflictTarget::NamedConstraint { name, .. } => {
                if index_predicate.is_some() {
                    return Err(PlanError::InvalidExpression(format!(
                        "an index predicate cannot be combined with constraint `{name}`"
                    )));
                }
                Arbiter::Constraint(name.clone())
            }
        };

        Ok(Some(arbiter))
    }

    /// Plain columns that make up the arbiter, excluded from the default
    /// update list. Keyed targets contribute none: the column itself still
    /// carries other keys.
    pub fn target_columns(target: Option<&ConflictTarget>) -> Vec<String> {
        match target {
            Some(ConflictTarget::ColumnList(columns)) => columns.clone(),
            Some(ConflictTarget::NamedConstraint { columns, .. }) => columns.clone(),
            Some(ConflictTarget::KeyedColumnList(_)) | None => Vec::new(),
        }
    }
}

/// `("column"->'key')`
pub fn key_access(column: &str, key: &str) -> Result<Expr, PlanError> {
    Ok(Expr::KeyAccess {
        column: Box::new(checked_ident(column)?),
        key: key.to_string(),
    })
}

fn checked_ident(column: &str) -> Result<Expr, PlanError> {
    if column.trim().is_empty() {
        return Err(PlanError::InvalidExpression(
            "conflict target with an empty column name".to_string(),
        ));
    }
    Ok(ident(column))
}

fn lower_predicate(predicate: Option<&ExpressionNode>) -> Result<Option<Expr>, PlanError> {
    predicate
        .map(|p| ExpressionTranslator::for_index_predicate().lower(p))
        .transpose()
}
