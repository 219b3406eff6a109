//! Defines common, reusable AST nodes for building SQL statements.

use model::execution::target::TargetTable;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl From<&TargetTable> for TableRef {
    fn from(target: &TargetTable) -> Self {
        TableRef {
            schema: target.schema.clone(),
            name: target.table.clone(),
        }
    }
}
