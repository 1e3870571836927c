//! Rule-based classifiers for order documents.

pub mod cells;
pub mod context;
pub mod header;
pub mod patterns;
pub mod text;

pub use cells::{is_header_row, is_printer_like, is_room_like, is_sku_like};
pub use context::{extract_context, find_date, find_locations, PageContext};
pub use header::{classify_header, classify_header_cell, ColumnMap, ColumnRole};
pub use text::{compact, fold_diacritics, fold_key, fold_lower};
