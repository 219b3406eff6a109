pub mod key;
pub mod schema_validator;
