//! End-to-end pipeline: document → order records → labels.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::document::{open_document, DocumentSource};
use crate::error::Result;
use crate::label::LabelTransform;
use crate::mapping::{Normalizer, ReferenceTables};
use crate::models::{LabelConfig, LabelRecord, RawOrderRecord, StickerConfig};
use crate::order::{ExtractionResult, OrderParser, TableOrderParser};

/// Records and labels of one document.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub extraction: ExtractionResult,
    pub labels: Vec<LabelRecord>,
}

/// Parser, normalizer and label transform wired from one configuration.
pub struct LabelPipeline {
    parser: TableOrderParser,
    normalizer: Normalizer,
    labels: LabelConfig,
}

impl LabelPipeline {
    /// Build a pipeline over already loaded reference tables.
    pub fn new(tables: ReferenceTables, config: &StickerConfig) -> Self {
        Self {
            parser: TableOrderParser::from_config(&config.extraction),
            normalizer: Normalizer::new(tables, config.matching),
            labels: config.labels.clone(),
        }
    }

    /// Load the reference tables named by the configuration.
    pub fn from_config(config: &StickerConfig) -> Result<Self> {
        let tables = ReferenceTables::load(&config.mappings)?;
        Ok(Self::new(tables, config))
    }

    /// Override the date used for documents without one.
    pub fn with_fallback_date(mut self, date: impl Into<String>) -> Self {
        self.labels.fallback_date = Some(date.into());
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn extract(&self, document: &dyn DocumentSource) -> ExtractionResult {
        self.parser.parse(document)
    }

    pub fn labels(&self, records: &[RawOrderRecord]) -> Vec<LabelRecord> {
        LabelTransform::new(&self.normalizer, &self.labels).transform_all(records)
    }

    pub fn run(&self, document: &dyn DocumentSource) -> PipelineOutput {
        let extraction = self.extract(document);
        let labels = self.labels(&extraction.records);

        info!(
            "{} records -> {} labels",
            extraction.records.len(),
            labels.len()
        );

        PipelineOutput { extraction, labels }
    }

    /// Open a `.pdf` or `.txt` document and run the pipeline on it.
    pub fn process_file(&self, path: &Path) -> Result<PipelineOutput> {
        let document = open_document(path)?;
        Ok(self.run(document.as_ref()))
    }
}
