pub mod conflict;
pub mod expr;
pub mod target;
