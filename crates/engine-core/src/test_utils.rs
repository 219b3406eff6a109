use async_trait::async_trait;
use connectors::sql::base::{error::DbError, executor::SqlExecutor};
use model::{core::value::Value, records::row::UpsertRow};
use std::sync::Mutex;

/// Plays back canned result sets and records every statement it receives.
#[derive(Default)]
pub(crate) struct ScriptedExecutor {
    responses: Mutex<Vec<Vec<UpsertRow>>>,
    pub(crate) calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl ScriptedExecutor {
    pub(crate) fn returning(rows: Vec<UpsertRow>) -> Self {
        Self {
            responses: Mutex::new(vec![rows]),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn last_sql(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(sql, _)| sql.clone())
    }
}

#[async_trait]
impl SqlExecutor for ScriptedExecutor {
    async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<UpsertRow>, DbError> {
        self.calls.lock().unwrap().push((sql.to_string(), params));
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(Vec::new());
        }
        Ok(responses.remove(0))
    }
}
