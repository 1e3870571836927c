//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::memory::TextDocument;
use super::{CellGrid, DocumentSource, Result, TableStrategy};
use crate::error::DocumentError;

/// A PDF loaded into per-page text.
///
/// Tables are derived from each page's text layout, so a PDF with no text
/// layer (a scan) yields pages without tables.
pub struct PdfDocument {
    pages: TextDocument,
    page_count: u32,
}

impl PdfDocument {
    /// Load a PDF from bytes and extract the text of every page.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut doc = Document::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| DocumentError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(DocumentError::NoPages);
        }

        let texts = pdf_extract::extract_text_from_mem_by_pages(&raw_data)
            .map_err(|e| DocumentError::TextExtraction(e.to_string()))?;

        let total_chars: usize = texts.iter().map(String::len).sum();
        debug!("Loaded PDF with {} pages, {} chars of text", page_count, total_chars);

        Ok(Self {
            pages: TextDocument::from_pages(texts),
            page_count,
        })
    }

    fn check_page(&self, page: u32) -> Result<()> {
        if page == 0 || page > self.page_count {
            return Err(DocumentError::InvalidPage(page));
        }
        Ok(())
    }
}

impl DocumentSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.check_page(page)?;
        // pdf-extract may report fewer pages than the page tree holds.
        Ok(self.pages.page_text(page).unwrap_or_default())
    }

    fn page_tables(&self, page: u32, strategy: TableStrategy) -> Result<Vec<CellGrid>> {
        self.check_page(page)?;
        Ok(self.pages.page_tables(page, strategy).unwrap_or_default())
    }
}
