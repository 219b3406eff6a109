use crate::error::CliError;
use model::records::{
    result::{UpsertOutcome, UpsertResult},
    row::UpsertRow,
};
use planner::query::builder::upsert::UpsertStatement;
use serde_json::{Map, Value as Json, json};

fn row_json(row: &UpsertRow) -> Json {
    Json::Object(
        row.fields()
            .iter()
            .map(|field| (field.name.clone(), field.value.to_json()))
            .collect::<Map<_, _>>(),
    )
}

pub fn result_json(result: &UpsertResult) -> Json {
    Json::Array(
        result
            .iter()
            .map(|outcome| match outcome {
                UpsertOutcome::Applied(row) => json!({ "status": "applied", "row": row_json(row) }),
                UpsertOutcome::Skipped => json!({ "status": "skipped" }),
            })
            .collect(),
    )
}

pub fn statement_json(statement: &UpsertStatement) -> Json {
    json!({
        "sql": statement.sql,
        "params": statement.params.iter().map(|p| p.to_json()).collect::<Vec<_>>(),
    })
}

pub async fn write_json(value: &Json, path: Option<String>) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(CliError::JsonSerialize)?;
    match path {
        Some(path) => tokio::fs::write(path, text).await?,
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_json_shape() {
        let result = UpsertResult::new(vec![
            UpsertOutcome::Applied(UpsertRow::new().with("id", 1).with("k", "a")),
            UpsertOutcome::Skipped,
        ]);
        assert_eq!(
            result_json(&result),
            json!([
                { "status": "applied", "row": { "id": 1, "k": "a" } },
                { "status": "skipped" }
            ])
        );
    }
}
