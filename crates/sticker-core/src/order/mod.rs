//! Order extraction from document tables.

pub mod assembler;
mod parser;
pub mod rules;

pub use assembler::{assemble_table, AssemblyState, PartialOrder, RowCandidates};
pub use parser::{ExtractionResult, OrderParser, TableOrderParser};
