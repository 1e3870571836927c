//! Document access: per-page text and candidate tables.
//!
//! The order parser never touches raw document bytes. It consumes the
//! [`DocumentSource`] capability surface, which adapters implement for
//! PDFs, pre-extracted text, or grids produced by other tools.

mod memory;
mod pdf;
pub mod text_tables;

pub use memory::{MemoryDocument, MemoryPage, TextDocument};
pub use pdf::PdfDocument;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DocumentError;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Table extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStrategy {
    /// Strict grid lines (ruled tables).
    Lines,
    /// Looser text alignment.
    Text,
}

impl fmt::Display for TableStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lines => write!(f, "lines"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// A candidate table as a grid of cell strings. The first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellGrid {
    pub rows: Vec<Vec<String>>,
}

impl CellGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a grid from anything string-like.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Header row, if any.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// All rows after the header.
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Capability surface of a loaded document. Pages are 1-indexed.
pub trait DocumentSource {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Plain text of a page.
    fn page_text(&self, page: u32) -> Result<String>;

    /// Candidate tables of a page under one extraction strategy.
    fn page_tables(&self, page: u32, strategy: TableStrategy) -> Result<Vec<CellGrid>>;
}

/// Handle to a single page of a [`DocumentSource`].
pub struct Page<'a, D: DocumentSource + ?Sized> {
    source: &'a D,
    number: u32,
}

impl<D: DocumentSource + ?Sized> Page<'_, D> {
    /// Page number (1-indexed).
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn text(&self) -> Result<String> {
        self.source.page_text(self.number)
    }

    pub fn tables(&self, strategy: TableStrategy) -> Result<Vec<CellGrid>> {
        self.source.page_tables(self.number, strategy)
    }
}

/// Iterate over the pages of a document in order.
pub fn pages<D: DocumentSource + ?Sized>(source: &D) -> impl Iterator<Item = Page<'_, D>> {
    (1..=source.page_count()).map(move |number| Page { source, number })
}

/// Open a document by path, choosing the adapter from the file extension.
pub fn open_document(path: &Path) -> crate::Result<Box<dyn DocumentSource>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    debug!("Opening {} as {:?}", path.display(), extension);

    match extension.as_str() {
        "pdf" => {
            let data = std::fs::read(path)?;
            Ok(Box::new(PdfDocument::from_bytes(&data)?))
        }
        "txt" | "text" => {
            let text = std::fs::read_to_string(path)?;
            Ok(Box::new(TextDocument::from_text(&text)))
        }
        other => Err(DocumentError::UnsupportedFormat(other.to_string()).into()),
    }
}
