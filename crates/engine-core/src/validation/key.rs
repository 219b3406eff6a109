use crate::error::UpsertError;
use model::{core::value::Value, records::row::UpsertRow};
use planner::query::builder::upsert::KeySource;
use std::collections::HashMap;

/// The values that tie a returned row to the input row it came from, in
/// canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReconciliationKey(Vec<Value>);

impl ReconciliationKey {
    /// Key of an input row, taken as supplied by the caller.
    pub fn for_input(row: &UpsertRow, sources: &[KeySource]) -> Self {
        Self::for_input_shaped(row, sources, &KeyShape::default())
    }

    /// Key of an input row with each component read as the type the
    /// server returned for that position.
    pub fn for_input_shaped(row: &UpsertRow, sources: &[KeySource], shape: &KeyShape) -> Self {
        ReconciliationKey(
            input_values(row, sources)
                .enumerate()
                .map(|(i, value)| match shape.at(i) {
                    Some(like) => value.coerce_like(like).canonical(),
                    None => value.canonical(),
                })
                .collect(),
        )
    }

    pub fn for_returned(row: &UpsertRow, sources: &[KeySource]) -> Self {
        ReconciliationKey(
            returned_values(row, sources)
                .map(|value| value.canonical())
                .collect(),
        )
    }
}

/// Per key position, a non-null value as the server returned it.
///
/// Every returned row of a statement carries the same column types, so one
/// sample per position is enough to know how input values must be read.
#[derive(Debug, Default)]
pub struct KeyShape(Vec<Option<Value>>);

impl KeyShape {
    pub fn from_returned(rows: &[UpsertRow], sources: &[KeySource]) -> Self {
        let mut samples: Vec<Option<Value>> = vec![None; sources.len()];
        for row in rows {
            if samples.iter().all(Option::is_some) {
                break;
            }
            for (slot, value) in samples.iter_mut().zip(returned_values(row, sources)) {
                if slot.is_none() && !value.is_null() {
                    *slot = Some(value);
                }
            }
        }
        KeyShape(samples)
    }

    fn at(&self, index: usize) -> Option<&Value> {
        self.0.get(index).and_then(Option::as_ref)
    }
}

fn input_values<'a>(
    row: &'a UpsertRow,
    sources: &'a [KeySource],
) -> impl Iterator<Item = Value> + 'a {
    sources.iter().map(move |source| match source {
        KeySource::Column(column) => row.get_value(column),
        KeySource::Keyed { column, key, .. } => row.get_value(column).extract_key(key),
    })
}

fn returned_values<'a>(
    row: &'a UpsertRow,
    sources: &'a [KeySource],
) -> impl Iterator<Item = Value> + 'a {
    sources.iter().map(move |source| match source {
        KeySource::Column(column) => row.get_value(column),
        KeySource::Keyed { alias, .. } => row.get_value(alias),
    })
}

/// Rejects batches in which two rows share a conflict key.
#[derive(Default)]
pub struct KeyChecker {
    // first row index each key was seen at
    seen: HashMap<ReconciliationKey, usize>,
}

impl KeyChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, index: usize, key: ReconciliationKey) -> Result<(), UpsertError> {
        match self.seen.get(&key) {
            Some(&first_index) => Err(UpsertError::DuplicateConflictKey {
                first_index,
                duplicate_index: index,
            }),
            None => {
                self.seen.insert(key, index);
                Ok(())
            }
        }
    }

    pub fn check_rows(rows: &[UpsertRow], sources: &[KeySource]) -> Result<(), UpsertError> {
        let mut checker = KeyChecker::new();
        for (index, row) in rows.iter().enumerate() {
            checker.check(index, ReconciliationKey::for_input(row, sources))?;
        }
        Ok(())
    }
}
