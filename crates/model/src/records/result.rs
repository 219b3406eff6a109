use crate::records::row::UpsertRow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "row", rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// Inserted or updated; carries the caller's row overlaid with the
    /// values the server returned.
    Applied(UpsertRow),
    /// A conflict existed and the action was a no-op for this row.
    Skipped,
}

impl UpsertOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpsertOutcome::Applied(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, UpsertOutcome::Skipped)
    }

    pub fn row(&self) -> Option<&UpsertRow> {
        match self {
            UpsertOutcome::Applied(row) => Some(row),
            UpsertOutcome::Skipped => None,
        }
    }

    pub fn into_row(self) -> Option<UpsertRow> {
        match self {
            UpsertOutcome::Applied(row) => Some(row),
            UpsertOutcome::Skipped => None,
        }
    }
}

/// Same length and order as the batch it was produced from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertResult {
    outcomes: Vec<UpsertOutcome>,
}

impl UpsertResult {
    pub fn new(outcomes: Vec<UpsertOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&UpsertOutcome> {
        self.outcomes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpsertOutcome> {
        self.outcomes.iter()
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn into_outcomes(self) -> Vec<UpsertOutcome> {
        self.outcomes
    }
}

impl IntoIterator for UpsertResult {
    type Item = UpsertOutcome;
    type IntoIter = std::vec::IntoIter<UpsertOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}
