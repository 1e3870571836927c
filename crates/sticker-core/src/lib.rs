//! Core library for toner order sticker generation.
//!
//! This crate provides:
//! - Document access (PDF and pre-extracted text) with table derivation
//! - Order extraction from loosely tabular forms (location markers, header
//!   classification, multi-row record assembly)
//! - Product/location normalization against reference tables with fuzzy fallback
//! - Label records ready for a renderer (four lines, one per SKU and unit)

pub mod document;
pub mod error;
pub mod label;
pub mod mapping;
pub mod models;
pub mod order;
pub mod pipeline;

pub use document::{open_document, CellGrid, DocumentSource, TableStrategy, TextDocument};
pub use error::{DocumentError, MappingError, Result, StickerError};
pub use label::{room_phrase, LabelTransform};
pub use mapping::{Normalizer, PackColor, ReferenceTables};
pub use models::{LabelRecord, NormalizedOrderRecord, RawOrderRecord, StickerConfig};
pub use order::{ExtractionResult, OrderParser, TableOrderParser};
pub use pipeline::{LabelPipeline, PipelineOutput};
