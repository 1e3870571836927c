//! Data models.

pub mod config;
pub mod order;

pub use config::{ExtractionConfig, LabelConfig, MappingConfig, MatchThresholds, StickerConfig};
pub use order::{LabelRecord, NormalizedOrderRecord, RawOrderRecord};
