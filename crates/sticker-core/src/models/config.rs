//! Configuration structures for the sticker pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::document::TableStrategy;
use crate::error::StickerError;

/// Main configuration for the sticker pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerConfig {
    /// Reference table locations.
    pub mappings: MappingConfig,

    /// Fuzzy matching thresholds.
    pub matching: MatchThresholds,

    /// Table extraction configuration.
    pub extraction: ExtractionConfig,

    /// Label formatting configuration.
    pub labels: LabelConfig,
}

/// Reference table file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Directory containing the reference files.
    pub dir: PathBuf,

    /// Product alias table (`alias`, `canonical`).
    pub products: String,

    /// Location alias table (`raw`, `short_label`).
    pub locations: String,

    /// Pack composition table (`family`, `color`, `sku`).
    pub packs: String,

    /// Printer family table (`keyword`, `family`).
    pub printers: String,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/mappings"),
            products: "products.csv".to_string(),
            locations: "locations.csv".to_string(),
            packs: "packs.csv".to_string(),
            printers: "printers.csv".to_string(),
        }
    }
}

impl MappingConfig {
    /// Get full path to a reference file.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

/// Minimum similarity scores (0 - 100) for fuzzy matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    /// Product alias matching.
    pub product: f64,

    /// Location matching.
    pub location: f64,

    /// Printer keyword matching.
    pub printer: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            product: 90.0,
            location: 88.0,
            printer: 85.0,
        }
    }
}

/// Table extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Strategies to run on every page, in order.
    pub strategies: Vec<TableStrategy>,

    /// Minimum number of rows (header included) for a table to be considered.
    pub min_table_rows: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategies: vec![TableStrategy::Lines, TableStrategy::Text],
            min_table_rows: 2,
        }
    }
}

/// Label formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Date printed when the document has none (defaults to today).
    pub fallback_date: Option<String>,

    /// Word that opens every room line.
    pub room_prefix: String,

    /// Accent-folded, lower-case prefix marking the central office.
    pub central_prefix: String,

    /// Shorthand printed for central office rooms.
    pub central_shorthand: String,

    /// Accent-folded, lower-case room names meaning the reception desk.
    pub reception_keywords: Vec<String>,

    /// Shorthand printed for reception rooms.
    pub reception_shorthand: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            fallback_date: None,
            room_prefix: "SOBA".to_string(),
            central_prefix: "sredisnj".to_string(),
            central_shorthand: "SU".to_string(),
            reception_keywords: vec!["porta".to_string(), "recepcija".to_string()],
            reception_shorthand: "porta".to_string(),
        }
    }
}

impl StickerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| StickerError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StickerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
