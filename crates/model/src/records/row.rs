use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

/// One logical row: an ordered mapping of column name to value.
///
/// Column names are compared exactly, since they are emitted as quoted
/// identifiers. Setting a column that is already present replaces its value
/// in place, so a row never holds the same column twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertRow {
    fields: Vec<FieldValue>,
}

impl UpsertRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later duplicates of a column overwrite earlier ones.
    pub fn from_fields(fields: Vec<FieldValue>) -> Self {
        let mut row = Self::new();
        for field in fields {
            row.set(&field.name, field.value);
        }
        row
    }

    /// Builder-style variant of [`UpsertRow::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(FieldValue {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Like [`UpsertRow::get`], but a missing column reads as `Null`.
    pub fn get_value(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(idx).value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn column_set(&self) -> BTreeSet<&str> {
        self.columns().collect()
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overlays every field of `other` onto this row; values from `other` win.
    pub fn overlay(&mut self, other: UpsertRow) {
        for field in other.fields {
            self.set(&field.name, field.value);
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for UpsertRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = UpsertRow::new();
        for (name, value) in iter {
            row.set(&name.into(), value);
        }
        row
    }
}

impl IntoIterator for UpsertRow {
    type Item = FieldValue;
    type IntoIter = std::vec::IntoIter<FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
