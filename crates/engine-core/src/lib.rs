pub mod error;
pub mod reconcile;
pub mod upsert;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_utils;
