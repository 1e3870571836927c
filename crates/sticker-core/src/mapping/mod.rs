//! Reference data and normalization of raw order text.

pub mod fuzzy;
mod normalizer;
mod tables;

pub use normalizer::Normalizer;
pub use tables::{read_rows, OrderedTable, PackColor, ReferenceTables};

#[cfg(test)]
pub(crate) use tables::sample_tables;
