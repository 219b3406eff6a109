use crate::{
    error::PlanError,
    query::{
        ast::{
            common::TableRef,
            expr::Expr,
            insert::{ConflictAssignment, ConflictClause, Insert, OnConflict},
        },
        conflict::ConflictTargetResolver,
        dialect::{Dialect, Postgres},
        excluded, ident, qualified,
        renderer::{Render, Renderer},
        translate::ExpressionTranslator,
        value,
    },
};
use model::{
    core::value::Value,
    execution::{
        conflict::{ConflictAction, ConflictTarget, UpdateSet},
        expr::ExpressionNode,
        target::TargetTable,
    },
    records::batch::{ColumnLayout, UpsertBatch},
};

const SYNTHETIC_KEY_PREFIX: &str = "__conflict_key_";

/// One component of the key that ties a returned row to its input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// A plain column, read from both the input and the returned row.
    Column(String),
    /// A key extracted from a semi-structured column. Input rows extract it
    /// locally; returned rows carry it under `alias`.
    Keyed {
        column: String,
        key: String,
        alias: String,
    },
}

impl KeySource {
    pub fn column(&self) -> &str {
        match self {
            KeySource::Column(column) => column,
            KeySource::Keyed { column, .. } => column,
        }
    }
}

/// A rendered statement plus what is needed to reconcile its output.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertStatement {
    pub sql: String,
    pub params: Vec<Value>,
    pub key_sources: Vec<KeySource>,
}

impl UpsertStatement {
    /// Columns present in `RETURNING` only for reconciliation; they are
    /// dropped from the rows handed back to the caller.
    pub fn synthetic_columns(&self) -> impl Iterator<Item = &str> {
        self.key_sources.iter().filter_map(|source| match source {
            KeySource::Keyed { alias, .. } => Some(alias.as_str()),
            KeySource::Column(_) => None,
        })
    }
}

pub struct UpsertStatementBuilder {
    target: TargetTable,
    dialect: Box<dyn Dialect>,
}

impl UpsertStatementBuilder {
    pub fn new(target: TargetTable) -> Self {
        Self {
            target,
            dialect: Box::new(Postgres),
        }
    }

    pub fn target(&self) -> &TargetTable {
        &self.target
    }

    /// Builds the single `INSERT ... ON CONFLICT ... RETURNING` statement
    /// for `batch`, emitting row values positionally in `layout` order.
    pub fn build(
        &self,
        batch: &UpsertBatch,
        layout: &ColumnLayout,
    ) -> Result<UpsertStatement, PlanError> {
        if layout.is_empty() {
            return Err(PlanError::EmptyColumnList);
        }

        let arbiter = ConflictTargetResolver::resolve_batch(batch)?;
        let key_sources = self.key_sources(batch.conflict_target.as_ref(), layout);
        // Key values are read from the inserted rows.
        if let Some(missing) = key_sources.iter().find(|s| !layout.contains(s.column())) {
            return Err(PlanError::UnknownColumn(missing.column().to_string()));
        }

        let action = match &batch.action {
            ConflictAction::Nothing => ConflictClause::DoNothing,
            ConflictAction::Update { set, condition } => {
                if let Some(ConflictTarget::NamedConstraint { name, columns }) =
                    &batch.conflict_target
                {
                    if columns.is_empty() && *set != UpdateSet::Inserted {
                        return Err(PlanError::UnkeyedConstraint(name.clone()));
                    }
                }

                let translator = ExpressionTranslator::for_table(&self.target.table);
                let assignments =
                    self.assignments(set, batch.conflict_target.as_ref(), layout, &key_sources)?;
                let condition = condition
                    .as_ref()
                    .map(|c| translator.lower(c))
                    .transpose()?;
                ConflictClause::DoUpdate {
                    assignments,
                    condition,
                }
            }
        };

        let insert = Insert {
            table: TableRef::from(&self.target),
            columns: layout.columns.clone(),
            values: batch
                .rows
                .iter()
                .map(|row| layout.iter().map(|c| value(row.get_value(c))).collect())
                .collect(),
            on_conflict: Some(OnConflict { arbiter, action }),
            returning: self.returning(batch.return_full_row, &key_sources),
        };

        let mut renderer = Renderer::new(self.dialect.as_ref());
        insert.render(&mut renderer);
        let (sql, params) = renderer.finish();

        Ok(UpsertStatement {
            sql,
            params,
            key_sources,
        })
    }

    fn key_sources(&self, target: Option<&ConflictTarget>, layout: &ColumnLayout) -> Vec<KeySource> {
        match target {
            Some(ConflictTarget::ColumnList(columns)) if !columns.is_empty() => {
                columns.iter().cloned().map(KeySource::Column).collect()
            }
            Some(ConflictTarget::NamedConstraint { columns, .. }) if !columns.is_empty() => {
                columns.iter().cloned().map(KeySource::Column).collect()
            }
            Some(ConflictTarget::KeyedColumnList(pairs)) if !pairs.is_empty() => pairs
                .iter()
                .enumerate()
                .map(|(i, pair)| KeySource::Keyed {
                    column: pair.column.clone(),
                    key: pair.key.clone(),
                    alias: format!("{SYNTHETIC_KEY_PREFIX}{i}"),
                })
                .collect(),
            // Without known key columns the whole inserted row is the key.
            _ => layout.iter().map(|c| KeySource::Column(c.to_string())).collect(),
        }
    }

    fn assignments(
        &self,
        set: &UpdateSet,
        target: Option<&ConflictTarget>,
        layout: &ColumnLayout,
        key_sources: &[KeySource],
    ) -> Result<Vec<ConflictAssignment>, PlanError> {
        let target_columns = ConflictTargetResolver::target_columns(target);

        let assignments = match set {
            UpdateSet::Inserted => layout
                .iter()
                .filter(|c| !target_columns.iter().any(|t| t == c))
                .map(proposed_assignment)
                .collect(),
            UpdateSet::Columns(columns) => {
                for column in columns {
                    if !layout.contains(column) {
                        return Err(PlanError::UnknownColumn(column.clone()));
                    }
                }
                columns.iter().map(|c| proposed_assignment(c)).collect()
            }
            UpdateSet::Assignments(list) => {
                let translator = ExpressionTranslator::for_table(&self.target.table);
                let mut assignments = Vec::with_capacity(list.len());
                for assignment in list {
                    let overwrites_key = key_sources
                        .iter()
                        .any(|source| source.column() == assignment.column);
                    let keeps_proposed = matches!(
                        &assignment.value,
                        ExpressionNode::ProposedColumnRef(name) if *name == assignment.column
                    );
                    if overwrites_key && !keeps_proposed {
                        return Err(PlanError::InvalidExpression(format!(
                            "conflict key column `{}` can only be set to its proposed value",
                            assignment.column
                        )));
                    }
                    assignments.push(ConflictAssignment {
                        column: assignment.column.clone(),
                        value: translator.lower(&assignment.value)?,
                    });
                }
                assignments
            }
        };

        if !assignments.is_empty() {
            return Ok(assignments);
        }
        Ok(self.value_preserving_assignments(&target_columns, layout))
    }

    /// `DO UPDATE SET` needs at least one assignment. Rewriting the
    /// conflict columns with their proposed values changes nothing, and a
    /// statement that updates still returns the row.
    fn value_preserving_assignments(
        &self,
        target_columns: &[String],
        layout: &ColumnLayout,
    ) -> Vec<ConflictAssignment> {
        let from_target: Vec<ConflictAssignment> = target_columns
            .iter()
            .filter(|c| layout.contains(c))
            .map(|c| proposed_assignment(c))
            .collect();
        if !from_target.is_empty() {
            return from_target;
        }

        layout
            .iter()
            .take(1)
            .map(|c| ConflictAssignment {
                column: c.to_string(),
                value: qualified(&self.target.table, c),
            })
            .collect()
    }

    fn returning(&self, full_row: bool, key_sources: &[KeySource]) -> Vec<Expr> {
        let mut returning = Vec::new();
        if full_row {
            returning.push(Expr::Literal("*".to_string()));
        } else {
            let mut columns: Vec<&str> = Vec::new();
            let key_columns = key_sources.iter().filter_map(|source| match source {
                KeySource::Column(column) => Some(column.as_str()),
                KeySource::Keyed { .. } => None,
            });
            for column in self
                .target
                .primary_key
                .iter()
                .map(String::as_str)
                .chain(key_columns)
            {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
            returning.extend(columns.into_iter().map(ident));
        }

        for source in key_sources {
            if let KeySource::Keyed { column, key, alias } = source {
                returning.push(Expr::Alias {
                    expr: Box::new(Expr::KeyAccess {
                        column: Box::new(ident(column)),
                        key: key.clone(),
                    }),
                    alias: alias.clone(),
                });
            }
        }
        returning
    }
}

fn proposed_assignment(column: &str) -> ConflictAssignment {
    ConflictAssignment {
        column: column.to_string(),
        value: excluded(column),
    }
}
