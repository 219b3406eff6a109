use crate::error::UpsertError;
use model::records::{batch::ColumnLayout, row::UpsertRow};

/// Checks that every row of a batch carries the same column set, since a
/// multi-row `VALUES` list has one fixed column list.
pub struct RowSchemaValidator;

impl RowSchemaValidator {
    /// Returns the batch's column layout, taken from the first row's
    /// column order.
    pub fn validate(rows: &[UpsertRow]) -> Result<ColumnLayout, UpsertError> {
        let Some(first) = rows.first() else {
            return Ok(ColumnLayout::default());
        };
        let expected = first.column_set();

        for (row_index, row) in rows.iter().enumerate().skip(1) {
            let found = row.column_set();
            if found != expected {
                return Err(UpsertError::SchemaMismatch {
                    row_index,
                    expected: expected.iter().map(|c| c.to_string()).collect(),
                    found: found.iter().map(|c| c.to_string()).collect(),
                });
            }
        }

        Ok(ColumnLayout::new(
            first.columns().map(str::to_string).collect(),
        ))
    }
}
