pub mod adapter;
pub mod hstore;
pub mod params;
pub mod row;
pub(crate) mod utils;
