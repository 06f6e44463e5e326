//! Catalog backend based on a document store (specifically MongoDB).

pub mod data_source;
pub mod db;
pub mod ops;

pub use data_source::*;
pub use ops::Error;
