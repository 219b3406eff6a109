use crate::execution::expr::ExpressionNode;
use serde::{Deserialize, Serialize};

/// Which unique constraint or index arbitrates a conflict.
///
/// The target is never checked against the catalog; a target that matches
/// no real constraint is reported by the server when the statement runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictTarget {
    ColumnList(Vec<String>),
    /// Unique expression index over a key extracted from a semi-structured
    /// column, e.g. `(("title"->'en'))`.
    KeyedColumnList(Vec<KeyedColumn>),
    NamedConstraint {
        name: String,
        /// Key columns of the constraint, when known. They drive the default
        /// update list, `RETURNING` and reconciliation.
        #[serde(default)]
        columns: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedColumn {
    pub column: String,
    pub key: String,
}

impl ConflictTarget {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConflictTarget::ColumnList(columns.into_iter().map(Into::into).collect())
    }

    pub fn keyed<I, C, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, K)>,
        C: Into<String>,
        K: Into<String>,
    {
        ConflictTarget::KeyedColumnList(
            pairs
                .into_iter()
                .map(|(column, key)| KeyedColumn {
                    column: column.into(),
                    key: key.into(),
                })
                .collect(),
        )
    }

    pub fn constraint(name: &str) -> Self {
        ConflictTarget::NamedConstraint {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn constraint_on<I, S>(name: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConflictTarget::NamedConstraint {
            name: name.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// A target that names nothing cannot act as an arbiter.
    pub fn is_empty(&self) -> bool {
        match self {
            ConflictTarget::ColumnList(columns) => columns.is_empty(),
            ConflictTarget::KeyedColumnList(pairs) => pairs.is_empty(),
            ConflictTarget::NamedConstraint { name, .. } => name.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAction {
    #[default]
    Nothing,
    Update {
        #[serde(default)]
        set: UpdateSet,
        #[serde(default)]
        condition: Option<ExpressionNode>,
    },
}

impl ConflictAction {
    /// Unconditional update of every inserted non-target column.
    pub fn update() -> Self {
        ConflictAction::Update {
            set: UpdateSet::Inserted,
            condition: None,
        }
    }

    pub fn update_where(condition: ExpressionNode) -> Self {
        ConflictAction::Update {
            set: UpdateSet::Inserted,
            condition: Some(condition),
        }
    }

    pub fn update_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConflictAction::Update {
            set: UpdateSet::Columns(columns.into_iter().map(Into::into).collect()),
            condition: None,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, ConflictAction::Update { .. })
    }
}

/// What `DO UPDATE SET` assigns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSet {
    /// Every inserted column except the target columns, each set to its
    /// proposed value.
    #[default]
    Inserted,
    /// Explicit subset of inserted columns, each set to its proposed value.
    Columns(Vec<String>),
    Assignments(Vec<Assignment>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: String,
    pub value: ExpressionNode,
}

impl Assignment {
    pub fn new(column: &str, value: ExpressionNode) -> Self {
        Self {
            column: column.to_string(),
            value,
        }
    }
}
