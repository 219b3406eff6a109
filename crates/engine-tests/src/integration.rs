#[cfg(test)]
mod tests {
    use crate::{
        pg_adapter, reset_table,
        utils::{ids, items_ddl, row, row_count, stored_pairs},
    };
    use connectors::sql::base::error::DbError;
    use engine_core::{error::UpsertError, upsert::Upserter};
    use model::{
        core::value::Value,
        execution::{
            conflict::{ConflictAction, ConflictTarget},
            expr::ExpressionNode as N,
            target::TargetTable,
        },
        records::{batch::UpsertBatch, row::UpsertRow},
    };
    use std::collections::HashSet;
    use tracing_test::traced_test;

    fn batch(rows: Vec<UpsertRow>, action: ConflictAction) -> UpsertBatch {
        UpsertBatch::new(rows, ConflictTarget::columns(["k"]), action)
    }

    // Scenario: DO NOTHING into an empty table.
    // Expected Outcome: every row is applied, in input order, with a fresh id.
    #[traced_test]
    #[tokio::test]
    async fn tc01_nothing_on_empty_table_applies_every_row() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc01", &items_ddl("upsert_tc01")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc01"));

        let rows = vec![row(1, "a"), row(2, "b"), row(3, "c")];
        let result = upserter
            .execute(batch(rows, ConflictAction::Nothing))
            .await
            .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.applied_count(), 3);
        let ids = ids(&result);
        assert!(ids.iter().all(|id| matches!(id, Some(Value::Int(_)))));
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 3);
        assert_eq!(
            result.get(1).and_then(|o| o.row()).unwrap().get_value("v"),
            Value::String("b".into())
        );
    }

    // Scenario: the same DO NOTHING batch runs twice.
    // Expected Outcome: the second run skips every row and changes nothing.
    #[traced_test]
    #[tokio::test]
    async fn tc02_nothing_twice_skips_second_run() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc02", &items_ddl("upsert_tc02")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc02"));

        let rows = vec![row(1, "a"), row(2, "b")];
        upserter
            .execute(batch(rows, ConflictAction::Nothing))
            .await
            .unwrap();
        let second = upserter
            .execute(batch(vec![row(1, "x"), row(2, "y")], ConflictAction::Nothing))
            .await
            .unwrap();

        assert_eq!(second.skipped_count(), 2);
        assert_eq!(
            stored_pairs(&adapter, "upsert_tc02").await,
            vec![(1, "a".to_string()), (2, "b".to_string())]
        );
    }

    // Scenario: the same unconditional DO UPDATE batch runs twice with new values.
    // Expected Outcome: both runs apply every row with the same ids; the table holds
    // the second run's values.
    #[traced_test]
    #[tokio::test]
    async fn tc03_unconditional_update_is_idempotent() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc03", &items_ddl("upsert_tc03")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc03"));

        let first = upserter
            .execute(batch(vec![row(1, "a"), row(2, "b")], ConflictAction::update()))
            .await
            .unwrap();
        let second = upserter
            .execute(batch(vec![row(1, "c"), row(2, "d")], ConflictAction::update()))
            .await
            .unwrap();

        assert_eq!(first.applied_count(), 2);
        assert_eq!(second.applied_count(), 2);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(
            stored_pairs(&adapter, "upsert_tc03").await,
            vec![(1, "c".to_string()), (2, "d".to_string())]
        );
    }

    // Scenario: the third row repeats the first row's conflict key.
    // Expected Outcome: DuplicateConflictKey before anything is written.
    #[traced_test]
    #[tokio::test]
    async fn tc04_duplicate_key_in_batch_is_rejected() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc04", &items_ddl("upsert_tc04")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc04"));

        let rows = vec![row(1, "a"), row(2, "b"), row(1, "c")];
        let err = upserter
            .execute(batch(rows, ConflictAction::Nothing))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UpsertError::DuplicateConflictKey {
                first_index: 0,
                duplicate_index: 2
            }
        ));
        assert_eq!(row_count(&adapter, "upsert_tc04").await, 0);
    }

    // Scenario: rows with different column sets.
    // Expected Outcome: SchemaMismatch naming row 1; nothing is written.
    #[traced_test]
    #[tokio::test]
    async fn tc05_heterogeneous_rows_are_rejected() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc05", &items_ddl("upsert_tc05")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc05"));

        let rows = vec![row(1, "a"), UpsertRow::new().with("k", 3)];
        let err = upserter
            .execute(batch(rows, ConflictAction::Nothing))
            .await
            .unwrap_err();

        assert!(matches!(err, UpsertError::SchemaMismatch { row_index: 1, .. }));
        assert_eq!(row_count(&adapter, "upsert_tc05").await, 0);
    }

    // Scenario: DO UPDATE whose condition is false for an existing row, true for a new one.
    // Expected Outcome: the conflicting row is skipped and left unchanged; the new row is applied.
    #[traced_test]
    #[tokio::test]
    async fn tc06_false_condition_skips_row() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc06", &items_ddl("upsert_tc06")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc06"));
        upserter
            .execute(batch(vec![row(1, "locked")], ConflictAction::Nothing))
            .await
            .unwrap();

        let action = ConflictAction::update_where(N::column("v").not_equals(N::literal("locked")));
        let result = upserter
            .execute(batch(vec![row(1, "new"), row(2, "fresh")], action))
            .await
            .unwrap();

        assert!(result.get(0).unwrap().is_skipped());
        assert!(result.get(1).unwrap().is_applied());
        assert_eq!(
            stored_pairs(&adapter, "upsert_tc06").await,
            vec![(1, "locked".to_string()), (2, "fresh".to_string())]
        );
    }

    // Scenario: the arbiter is a named constraint with its key columns.
    // Expected Outcome: the existing row is updated and reconciled by its key.
    #[traced_test]
    #[tokio::test]
    async fn tc07_named_constraint() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        let ddl = r#"CREATE TABLE "upsert_tc07" (
            id BIGSERIAL PRIMARY KEY,
            k INTEGER NOT NULL,
            v TEXT NOT NULL,
            CONSTRAINT upsert_tc07_k_key UNIQUE (k)
        );"#;
        reset_table(&adapter, "upsert_tc07", ddl).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc07"));
        let target = ConflictTarget::constraint_on("upsert_tc07_k_key", ["k"]);

        let first = upserter
            .execute(UpsertBatch::new(vec![row(5, "a")], target.clone(), ConflictAction::update()))
            .await
            .unwrap();
        let second = upserter
            .execute(UpsertBatch::new(
                vec![row(6, "b"), row(5, "c")],
                target,
                ConflictAction::update(),
            ))
            .await
            .unwrap();

        assert_eq!(second.applied_count(), 2);
        assert_eq!(ids(&first)[0], ids(&second)[1]);
        assert_eq!(
            stored_pairs(&adapter, "upsert_tc07").await,
            vec![(5, "c".to_string()), (6, "b".to_string())]
        );
    }

    // Scenario: the arbiter is a unique expression index on one key of a jsonb column.
    // Expected Outcome: rows match on that key only; the synthetic key column is not
    // exposed in the result.
    #[traced_test]
    #[tokio::test]
    async fn tc08_keyed_jsonb_target() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        let ddl = r#"CREATE TABLE "upsert_tc08" (
            id BIGSERIAL PRIMARY KEY,
            title JSONB NOT NULL,
            score INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX upsert_tc08_title_en ON "upsert_tc08" ((title->'en'));"#;
        reset_table(&adapter, "upsert_tc08", ddl).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc08"));
        let target = ConflictTarget::keyed([("title", "en")]);
        let titled = |en: &str, ro: &str, score: i64| {
            UpsertRow::new()
                .with("title", serde_json::json!({ "en": en, "ro": ro }))
                .with("score", score)
        };

        let first = upserter
            .execute(UpsertBatch::new(
                vec![titled("cat", "pisica", 1)],
                target.clone(),
                ConflictAction::update(),
            ))
            .await
            .unwrap();
        let second = upserter
            .execute(UpsertBatch::new(
                vec![titled("dog", "caine", 2), titled("cat", "motan", 3)],
                target,
                ConflictAction::update(),
            ))
            .await
            .unwrap();

        assert_eq!(second.applied_count(), 2);
        assert_eq!(ids(&first)[0], ids(&second)[1]);
        let updated = second.get(1).and_then(|o| o.row()).unwrap();
        assert_eq!(updated.get_value("score"), Value::Int(3));
        assert!(!updated.columns().any(|c| c.starts_with("__conflict_key_")));
    }

    // Scenario: the arbiter is a partial unique index selected by an index predicate.
    // Expected Outcome: soft-deleted rows do not conflict; live ones do.
    #[traced_test]
    #[tokio::test]
    async fn tc09_partial_index_predicate() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        let ddl = r#"CREATE TABLE "upsert_tc09" (
            id BIGSERIAL PRIMARY KEY,
            k INTEGER NOT NULL,
            v TEXT NOT NULL,
            deleted_at TIMESTAMPTZ
        );
        CREATE UNIQUE INDEX upsert_tc09_live_k ON "upsert_tc09" (k) WHERE deleted_at IS NULL;
        INSERT INTO "upsert_tc09" (k, v, deleted_at) VALUES (1, 'gone', now()), (2, 'live', NULL);"#;
        reset_table(&adapter, "upsert_tc09", ddl).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc09"));

        let batch = batch(vec![row(1, "a"), row(2, "b")], ConflictAction::Nothing)
            .with_index_predicate(N::column("deleted_at").is_null());
        let result = upserter.execute(batch).await.unwrap();

        assert!(result.get(0).unwrap().is_applied());
        assert!(result.get(1).unwrap().is_skipped());
        assert_eq!(row_count(&adapter, "upsert_tc09").await, 3);
    }

    // Scenario: DO NOTHING without a target; one row collides with the primary key.
    // Expected Outcome: the colliding row is skipped, the other applied.
    #[traced_test]
    #[tokio::test]
    async fn tc10_nothing_without_target_matches_any_constraint() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc10", &items_ddl("upsert_tc10")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc10"));
        let with_id = |id: i64, k: i64, v: &str| row(k, v).with("id", id);

        upserter
            .insert_or_ignore(vec![with_id(100, 1, "a")], None)
            .await
            .unwrap();
        let result = upserter
            .insert_or_ignore(vec![with_id(100, 9, "dup id"), with_id(200, 2, "b")], None)
            .await
            .unwrap();

        assert!(result.get(0).unwrap().is_skipped());
        assert!(result.get(1).unwrap().is_applied());
        assert_eq!(row_count(&adapter, "upsert_tc10").await, 2);
    }

    // Scenario: the conflict target matches no unique constraint.
    // Expected Outcome: the server's error is returned unchanged.
    #[traced_test]
    #[tokio::test]
    async fn tc11_unmatched_target_surfaces_database_error() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc11", &items_ddl("upsert_tc11")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc11"));

        let err = upserter
            .execute(UpsertBatch::new(
                vec![row(1, "a")],
                ConflictTarget::columns(["v"]),
                ConflictAction::update(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, UpsertError::Database(DbError::Sql(_))));
        assert_eq!(row_count(&adapter, "upsert_tc11").await, 0);
    }

    // Scenario: single-row helpers, with server defaults.
    // Expected Outcome: `upsert` returns the stored row including defaulted columns;
    // `upsert_returning_key` returns the same primary key.
    #[traced_test]
    #[tokio::test]
    async fn tc12_single_row_helpers() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc12", &items_ddl("upsert_tc12")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc12"));
        let target = ConflictTarget::columns(["k"]);

        let stored = upserter
            .upsert(row(1, "a"), target.clone(), ConflictAction::update())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(stored.get_value("created_at"), Value::Timestamp(_)));

        let key = upserter
            .upsert_returning_key(row(1, "b"), target.clone(), ConflictAction::update())
            .await
            .unwrap();
        assert_eq!(key, Some(vec![stored.get_value("id")]));

        let skipped = upserter
            .upsert(row(1, "c"), target, ConflictAction::Nothing)
            .await
            .unwrap();
        assert!(skipped.is_none());
        assert_eq!(
            stored_pairs(&adapter, "upsert_tc12").await,
            vec![(1, "b".to_string())]
        );
    }

    // Scenario: key values arrive as text and floats, the way JSON input
    // supplies them, for integer and numeric key columns.
    // Expected Outcome: rows reconcile against the typed values the server
    // returns, and a rerun updates in place.
    #[traced_test]
    #[tokio::test]
    async fn tc13_loosely_typed_keys_reconcile() {
        let Some(adapter) = pg_adapter().await else {
            return;
        };
        reset_table(&adapter, "upsert_tc13", &items_ddl("upsert_tc13")).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc13"));

        let rows = vec![
            UpsertRow::new().with("k", "7").with("v", "a"),
            UpsertRow::new().with("k", "8").with("v", "b"),
        ];
        let first = upserter
            .execute(batch(rows.clone(), ConflictAction::update()))
            .await
            .unwrap();
        assert_eq!(first.applied_count(), 2);
        let second = upserter
            .execute(batch(rows, ConflictAction::update()))
            .await
            .unwrap();
        assert_eq!(ids(&first), ids(&second));

        let ddl = r#"CREATE TABLE "upsert_tc13_prices" (
            id BIGSERIAL PRIMARY KEY,
            price NUMERIC(10, 2) NOT NULL UNIQUE,
            meta JSONB
        );"#;
        reset_table(&adapter, "upsert_tc13_prices", ddl).await;
        let upserter = Upserter::new(adapter.clone(), TargetTable::new("upsert_tc13_prices"));

        let rows = vec![
            UpsertRow::new().with("price", 10.5).with("meta", 3),
            UpsertRow::new()
                .with("price", 0.1)
                .with("meta", Value::StringArray(vec!["x".into(), "y".into()])),
        ];
        let result = upserter
            .execute(UpsertBatch::new(
                rows,
                ConflictTarget::columns(["price"]),
                ConflictAction::update(),
            ))
            .await
            .unwrap();
        assert_eq!(result.applied_count(), 2);
        assert_eq!(row_count(&adapter, "upsert_tc13_prices").await, 2);
    }
}
