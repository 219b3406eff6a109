use serde::{Deserialize, Serialize};

/// Destination table of an upsert, handed to the statement builder at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTable {
    #[serde(default)]
    pub schema: Option<String>,
    pub table: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: Vec<String>,
}

fn default_primary_key() -> Vec<String> {
    vec!["id".to_string()]
}

impl TargetTable {
    pub fn new(table: &str) -> Self {
        Self {
            schema: None,
            table: table.to_string(),
            primary_key: default_primary_key(),
        }
    }

    pub fn in_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }
}
