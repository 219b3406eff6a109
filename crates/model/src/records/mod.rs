pub mod batch;
pub mod result;
pub mod row;
