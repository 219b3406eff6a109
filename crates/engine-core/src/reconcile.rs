use crate::{
    error::UpsertError,
    validation::key::{KeyShape, ReconciliationKey},
};
use model::records::{
    result::{UpsertOutcome, UpsertResult},
    row::UpsertRow,
};
use planner::query::builder::upsert::{KeySource, UpsertStatement};
use std::collections::HashMap;

/// Maps the rows a statement returned back onto the batch that produced it.
///
/// Rows skipped by `DO NOTHING`, or by a `DO UPDATE ... WHERE` whose
/// condition was false, are absent from `RETURNING`, and the rows that are
/// present come in no guaranteed order. Matching is therefore done by
/// conflict key rather than by position.
pub struct ResultReconciler<'a> {
    key_sources: &'a [KeySource],
    synthetic_columns: Vec<&'a str>,
}

impl<'a> ResultReconciler<'a> {
    pub fn new(statement: &'a UpsertStatement) -> Self {
        Self {
            key_sources: &statement.key_sources,
            synthetic_columns: statement.synthetic_columns().collect(),
        }
    }

    /// Input keys must be unique; see [`crate::validation::key::KeyChecker`].
    /// Input key values are read as the types the server returned, so text
    /// or float input bound into typed key columns still matches.
    pub fn reconcile(
        &self,
        inputs: Vec<UpsertRow>,
        returned: Vec<UpsertRow>,
    ) -> Result<UpsertResult, UpsertError> {
        let returned_count = returned.len();
        let shape = KeyShape::from_returned(&returned, self.key_sources);
        let mut by_key: HashMap<ReconciliationKey, UpsertRow> = returned
            .into_iter()
            .map(|row| (ReconciliationKey::for_returned(&row, self.key_sources), row))
            .collect();

        let mut matched = 0;
        let outcomes = inputs
            .into_iter()
            .map(|input| {
                let key = ReconciliationKey::for_input_shaped(&input, self.key_sources, &shape);
                match by_key.remove(&key) {
                    Some(mut stored) => {
                        for column in &self.synthetic_columns {
                            stored.remove(column);
                        }
                        let mut row = input;
                        row.overlay(stored);
                        matched += 1;
                        UpsertOutcome::Applied(row)
                    }
                    None => UpsertOutcome::Skipped,
                }
            })
            .collect();

        if matched != returned_count {
            return Err(UpsertError::UnreconciledRows {
                count: returned_count - matched,
            });
        }

        Ok(UpsertResult::new(outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;

    fn statement(key_sources: Vec<KeySource>) -> UpsertStatement {
        UpsertStatement {
            sql: String::new(),
            params: Vec::new(),
            key_sources,
        }
    }

    fn inputs() -> Vec<UpsertRow> {
        vec![
            UpsertRow::new().with("k", 1).with("v", "a"),
            UpsertRow::new().with("k", 2).with("v", "b"),
            UpsertRow::new().with("k", 3).with("v", "c"),
        ]
    }

    #[test]
    fn test_out_of_order_and_missing_rows() {
        let stmt = statement(vec![KeySource::Column("k".into())]);
        let returned = vec![
            UpsertRow::new().with("id", 30).with("k", 3),
            UpsertRow::new().with("id", 10).with("k", 1),
        ];

        let result = ResultReconciler::new(&stmt)
            .reconcile(inputs(), returned)
            .unwrap();

        assert_eq!(result.len(), 3);
        let first = result.get(0).and_then(|o| o.row()).unwrap();
        assert_eq!(first.get_value("id"), Value::Int(10));
        assert_eq!(first.get_value("v"), Value::String("a".into()));
        assert!(result.get(1).unwrap().is_skipped());
        assert_eq!(
            result.get(2).and_then(|o| o.row()).unwrap().get_value("id"),
            Value::Int(30)
        );
        assert_eq!((result.applied_count(), result.skipped_count()), (2, 1));
    }

    #[test]
    fn test_returned_values_override_input() {
        let stmt = statement(vec![KeySource::Column("k".into())]);
        let returned = vec![UpsertRow::new().with("k", 1).with("v", "trimmed")];
        let result = ResultReconciler::new(&stmt)
            .reconcile(vec![UpsertRow::new().with("k", 1).with("v", " a ")], returned)
            .unwrap();
        let row = result.get(0).and_then(|o| o.row()).unwrap();
        assert_eq!(row.get_value("v"), Value::String("trimmed".into()));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["k", "v"]);
    }

    #[test]
    fn test_synthetic_columns_are_stripped() {
        let stmt = statement(vec![KeySource::Keyed {
            column: "title".into(),
            key: "en".into(),
            alias: "__conflict_key_0".into(),
        }]);
        let input = UpsertRow::new().with("title", serde_json::json!({"en": "x"}));
        let returned = vec![
            UpsertRow::new()
                .with("id", 5)
                .with("__conflict_key_0", serde_json::json!("x")),
        ];

        let result = ResultReconciler::new(&stmt)
            .reconcile(vec![input], returned)
            .unwrap();
        let row = result.get(0).and_then(|o| o.row()).unwrap();
        assert_eq!(row.get_value("id"), Value::Int(5));
        assert!(!row.contains("__conflict_key_0"));
    }

    #[test]
    fn test_loosely_typed_input_matches_typed_returned_keys() {
        use bigdecimal::BigDecimal;
        use std::str::FromStr;

        let stmt = statement(vec![KeySource::Column("k".into())]);
        let returned = vec![UpsertRow::new().with("id", 1).with("k", 42)];
        let result = ResultReconciler::new(&stmt)
            .reconcile(vec![UpsertRow::new().with("k", "42").with("v", "a")], returned)
            .unwrap();
        let row = result.get(0).and_then(|o| o.row()).unwrap();
        assert_eq!(row.get_value("id"), Value::Int(1));
        assert_eq!(row.get_value("k"), Value::Int(42));

        let stmt = statement(vec![KeySource::Column("price".into())]);
        let returned = vec![
            UpsertRow::new()
                .with("id", 2)
                .with("price", Value::Decimal(BigDecimal::from_str("10.50").unwrap())),
        ];
        let result = ResultReconciler::new(&stmt)
            .reconcile(vec![UpsertRow::new().with("price", 10.5)], returned)
            .unwrap();
        assert_eq!(result.applied_count(), 1);
    }

    #[test]
    fn test_timestamp_text_matches_returned_timestamptz() {
        use chrono::{TimeZone, Utc};

        let stored = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap();
        let stmt = statement(vec![KeySource::Column("at".into())]);
        let returned = vec![UpsertRow::new().with("id", 3).with("at", Value::Timestamp(stored))];
        let result = ResultReconciler::new(&stmt)
            .reconcile(
                vec![UpsertRow::new().with("at", "2024-05-01T14:00:00+02:00")],
                returned,
            )
            .unwrap();
        assert_eq!(result.applied_count(), 1);
    }

    #[test]
    fn test_unmatched_returned_rows_are_an_error() {
        let stmt = statement(vec![KeySource::Column("k".into())]);
        let returned = vec![UpsertRow::new().with("k", 99)];
        let err = ResultReconciler::new(&stmt)
            .reconcile(inputs(), returned)
            .unwrap_err();
        assert!(matches!(err, UpsertError::UnreconciledRows { count: 1 }));
    }
}
