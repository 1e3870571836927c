//! Error types for the sticker-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the sticker library.
#[derive(Error, Debug)]
pub enum StickerError {
    /// Document loading error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Reference data loading error.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the document adapters.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open/parse the document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The document is empty or has no pages.
    #[error("document has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// The input is not a format any adapter understands.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// Errors raised while loading reference tables.
#[derive(Error, Debug)]
pub enum MappingError {
    /// The reference file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reference file is not valid delimited text.
    #[error("malformed reference file {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type for the sticker library.
pub type Result<T> = std::result::Result<T, StickerError>;
