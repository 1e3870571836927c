//! In-memory document adapters.

use std::collections::HashMap;

use super::text_tables::extract_tables;
use super::{CellGrid, DocumentSource, Result, TableStrategy};
use crate::error::DocumentError;

/// Pages separator used by layout-preserving text dumps.
const FORM_FEED: char = '\x0c';

/// A document given as already-extracted page text.
///
/// Tables are derived from the text itself with [`extract_tables`].
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    pages: Vec<String>,
}

impl TextDocument {
    /// Split text into pages on form feeds. Trailing empty pages are dropped.
    pub fn from_text(text: &str) -> Self {
        let mut pages: Vec<String> = text.split(FORM_FEED).map(str::to_string).collect();
        while pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        Self { pages }
    }

    pub fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }

    fn page(&self, page: u32) -> Result<&str> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .map(String::as_str)
            .ok_or(DocumentError::InvalidPage(page))
    }
}

impl DocumentSource for TextDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page(page).map(str::to_string)
    }

    fn page_tables(&self, page: u32, strategy: TableStrategy) -> Result<Vec<CellGrid>> {
        Ok(extract_tables(self.page(page)?, strategy))
    }
}

/// A page with explicitly supplied tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    pub text: String,
    pub tables: HashMap<TableStrategy, Vec<CellGrid>>,
}

impl MemoryPage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tables: HashMap::new(),
        }
    }

    /// Add a table found by `strategy`.
    pub fn with_table(mut self, strategy: TableStrategy, grid: CellGrid) -> Self {
        self.tables.entry(strategy).or_default().push(grid);
        self
    }
}

/// A document whose tables come from an external table finder.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self { pages }
    }

    fn page(&self, page: u32) -> Result<&MemoryPage> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .ok_or(DocumentError::InvalidPage(page))
    }
}

impl DocumentSource for MemoryDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        Ok(self.page(page)?.text.clone())
    }

    fn page_tables(&self, page: u32, strategy: TableStrategy) -> Result<Vec<CellGrid>> {
        Ok(self
            .page(page)?
            .tables
            .get(&strategy)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_document_pages() {
        let doc = TextDocument::from_text("page one\x0cpage two\x0c\n");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_text(2).unwrap(), "page two");
        assert!(matches!(doc.page_text(0), Err(DocumentError::InvalidPage(0))));
        assert!(matches!(doc.page_text(3), Err(DocumentError::InvalidPage(3))));
    }

    #[test]
    fn test_text_document_derives_tables() {
        let doc = TextDocument::from_text("| Pisač | Soba |\n| HP M404dn | 215 |\n");
        let tables = doc.page_tables(1, TableStrategy::Lines).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows[1], vec!["HP M404dn", "215"]);
    }

    #[test]
    fn test_memory_document_tables_per_strategy() {
        let grid = CellGrid::from_rows([["Soba"], ["215"]]);
        let doc = MemoryDocument::new(vec![
            MemoryPage::new("Lokacija: A").with_table(TableStrategy::Lines, grid.clone()),
        ]);

        assert_eq!(doc.page_tables(1, TableStrategy::Lines).unwrap(), vec![grid]);
        assert!(doc.page_tables(1, TableStrategy::Text).unwrap().is_empty());
        assert!(doc.page_tables(2, TableStrategy::Text).is_err());
    }
}
