//! Table-driven order parser: pages → tables → records.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::document::{pages, CellGrid, DocumentSource, TableStrategy};
use crate::models::{ExtractionConfig, RawOrderRecord};

use super::assembler::assemble_table;
use super::rules::patterns::ROOM_KEYWORD;
use super::rules::{classify_header, extract_context, fold_lower};

/// Result of order extraction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionResult {
    /// Order records in document order.
    pub records: Vec<RawOrderRecord>,
    /// Recovered anomalies (failed strategies, sticky locations, ...).
    pub warnings: Vec<String>,
    /// Pages visited.
    pub pages_processed: u32,
    /// Tables with at least one recognised column.
    pub tables_considered: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for order parsing.
pub trait OrderParser {
    /// Extract order records from a document. Never fails: anomalies are
    /// reported as warnings.
    fn parse(&self, document: &dyn DocumentSource) -> ExtractionResult;
}

/// Parser walking every table of every page under each strategy.
pub struct TableOrderParser {
    /// Strategies in the order they are tried.
    strategies: Vec<TableStrategy>,
    /// Minimum rows (header included) for a table to be considered.
    min_table_rows: usize,
}

impl TableOrderParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            strategies: config.strategies.clone(),
            min_table_rows: config.min_table_rows,
        }
    }

    /// Set extraction strategies.
    pub fn with_strategies(mut self, strategies: Vec<TableStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Set minimum table size.
    pub fn with_min_table_rows(mut self, rows: usize) -> Self {
        self.min_table_rows = rows;
        self
    }

    /// Records of one table, or `None` when the header exposes no order field.
    fn parse_table(&self, grid: &CellGrid) -> Option<Vec<RawOrderRecord>> {
        if grid.len() < self.min_table_rows {
            return None;
        }

        let columns = classify_header(grid.header()?);
        if !columns.is_relevant() {
            debug!("Discarding table without order columns: {:?}", grid.header());
            return None;
        }

        Some(assemble_table(grid.body(), &columns))
    }
}

impl Default for TableOrderParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Location bookkeeping across the tables of a document.
#[derive(Debug, Default)]
struct LocationCursor {
    /// Next unconsumed marker on the current page.
    index: usize,
    /// Last location handed to a producing table.
    sticky: Option<String>,
}

impl LocationCursor {
    fn start_page(&mut self) {
        self.index = 0;
    }

    /// Location for the next table. `None` when the page's markers are exhausted.
    fn peek<'a>(&self, locations: &'a [String]) -> Option<&'a String> {
        locations.get(self.index)
    }

    /// A table produced records under the location at the cursor.
    fn consume(&mut self, locations: &[String]) {
        if let Some(location) = locations.get(self.index) {
            self.sticky = Some(location.clone());
            self.index += 1;
        }
    }
}

impl OrderParser for TableOrderParser {
    fn parse(&self, document: &dyn DocumentSource) -> ExtractionResult {
        let start = Instant::now();
        let mut result = ExtractionResult::default();
        let mut cursor = LocationCursor::default();
        let mut document_date: Option<String> = None;

        info!("Parsing order document with {} pages", document.page_count());

        for page in pages(document) {
            let number = page.number();
            result.pages_processed += 1;
            cursor.start_page();

            let text = page.text().unwrap_or_else(|e| {
                warn!("Page {}: text extraction failed: {}", number, e);
                result
                    .warnings
                    .push(format!("Page {}: text extraction failed: {}", number, e));
                String::new()
            });

            let context = extract_context(&text);
            if document_date.is_none() {
                document_date = context.date.clone();
            }
            debug!(
                "Page {}: {} location markers, date {:?}",
                number,
                context.locations.len(),
                context.date
            );

            for strategy in &self.strategies {
                let tables = match page.tables(*strategy) {
                    Ok(tables) => tables,
                    Err(e) => {
                        warn!("Page {}: {} strategy failed: {}", number, strategy, e);
                        result
                            .warnings
                            .push(format!("Page {}: {} strategy failed: {}", number, strategy, e));
                        continue;
                    }
                };
                debug!("Page {}: {} tables under {} strategy", number, tables.len(), strategy);

                for grid in &tables {
                    let Some(mut records) = self.parse_table(grid) else {
                        continue;
                    };
                    result.tables_considered += 1;

                    let produced = records.iter().any(RawOrderRecord::has_product);
                    let location = match cursor.peek(&context.locations) {
                        Some(location) => location.clone(),
                        None => match &cursor.sticky {
                            Some(sticky) if produced => {
                                warn!("Page {}: no location marker left, reusing {:?}", number, sticky);
                                result.warnings.push(format!(
                                    "Page {}: table without its own location marker labelled {:?}",
                                    number, sticky
                                ));
                                sticky.clone()
                            }
                            Some(sticky) => sticky.clone(),
                            None => String::new(),
                        },
                    };

                    if produced {
                        cursor.consume(&context.locations);
                    }

                    let date = context.date.clone().unwrap_or_default();
                    for record in &mut records {
                        record.location = location.clone();
                        record.date = date.clone();
                    }
                    result.records.extend(records);
                }
            }
        }

        if let Some(date) = &document_date {
            for record in result.records.iter_mut().filter(|r| r.date.is_empty()) {
                record.date = date.clone();
            }
        }

        result.records.retain(|r| {
            r.has_product() && fold_lower(r.product.trim()) != ROOM_KEYWORD
        });

        if result.records.is_empty() {
            result.warnings.push("No order records found".to_string());
        }

        result.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} records from {} tables in {}ms",
            result.records.len(),
            result.tables_considered,
            result.processing_time_ms
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{self, MemoryDocument, MemoryPage, TextDocument};
    use crate::error::DocumentError;
    use pretty_assertions::assert_eq;

    const TWO_LOCATIONS: &str = "\
NARUDŽBA TONERA
Datum: 14.10.2025
Lokacija: Područni ured Trešnjevka
| Pisač                  | Boja - šifra | Soba |
|------------------------|--------------|------|
| HP LaserJet Pro M404dn | CF259A       | 215  |

Lokacija: Ispostava Dubrava
| Pisač                         | Boja - šifra  | Soba  |
| HP Color LaserJet Pro M479fdn | komplet-CF400 | Porta |
";

    fn grid(rows: &[&[&str]]) -> CellGrid {
        CellGrid::from_rows(rows.iter().map(|r| r.iter().copied()))
    }

    #[test]
    fn test_two_locations_in_document_order() {
        let doc = TextDocument::from_text(TWO_LOCATIONS);
        let result = TableOrderParser::new().parse(&doc);

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].location, "Područni ured Trešnjevka");
        assert_eq!(result.records[0].product, "CF259A");
        assert_eq!(result.records[0].room, "215");
        assert_eq!(result.records[0].date, "14.10.2025.");
        assert_eq!(result.records[1].location, "Ispostava Dubrava");
        assert_eq!(result.records[1].pack_family, "CF400");
        assert_eq!(result.records[1].room, "Porta");
        assert_eq!(result.pages_processed, 1);
        assert_eq!(result.tables_considered, 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_noise_table_does_not_consume_location() {
        let page = MemoryPage::new("Lokacija: A\nLokacija: B")
            .with_table(TableStrategy::Lines, grid(&[&["Soba", "Napomena"], &["", "hitno"]]))
            .with_table(
                TableStrategy::Lines,
                grid(&[&["Pisač", "Boja", "Soba"], &["HP M404dn", "CF259A", "1"]]),
            );
        let result = TableOrderParser::new().parse(&MemoryDocument::new(vec![page]));

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].location, "A");
    }

    #[test]
    fn test_sticky_location_across_tables() {
        let page = MemoryPage::new("Lokacija: A")
            .with_table(
                TableStrategy::Lines,
                grid(&[&["Boja", "Soba"], &["CF259A", "1"]]),
            )
            .with_table(
                TableStrategy::Lines,
                grid(&[&["Boja", "Soba"], &["CF226A", "2"]]),
            );
        let result = TableOrderParser::new().parse(&MemoryDocument::new(vec![page]));

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1].location, "A");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_no_location_at_all() {
        let page = MemoryPage::new("")
            .with_table(TableStrategy::Text, grid(&[&["Boja", "Soba"], &["CF259A", "1"]]));
        let result = TableOrderParser::new().parse(&MemoryDocument::new(vec![page]));

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].location, "");
        assert_eq!(result.records[0].date, "");
    }

    #[test]
    fn test_document_date_propagates_to_later_pages() {
        let doc = TextDocument::from_pages(vec![
            "Datum: 01.03.2025\nLokacija: A\n| Boja | Soba |\n| CF259A | 1 |".to_string(),
            "Lokacija: B\n| Boja | Soba |\n| CF226A | 2 |".to_string(),
        ]);
        let result = TableOrderParser::new().parse(&doc);

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1].location, "B");
        assert_eq!(result.records[1].date, "01.03.2025.");
        assert_eq!(result.pages_processed, 2);
    }

    #[test]
    fn test_final_filter_drops_room_keyword_and_empty_products() {
        let page = MemoryPage::new("Lokacija: A").with_table(
            TableStrategy::Lines,
            grid(&[
                &["Pisač", "Boja", "Soba"],
                &["HP LaserJet Pro M404dn", "", ""],
                &["Kyocera P2040dn", "Soba", "3"],
            ]),
        );
        let result = TableOrderParser::new().parse(&MemoryDocument::new(vec![page]));

        assert!(result.records.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("No order records")));
    }

    #[test]
    fn test_small_tables_ignored() {
        let page = MemoryPage::new("Lokacija: A")
            .with_table(TableStrategy::Lines, grid(&[&["Boja", "Soba"]]));
        let result = TableOrderParser::new().parse(&MemoryDocument::new(vec![page]));
        assert_eq!(result.tables_considered, 0);
    }

    /// Document whose `lines` strategy always fails.
    struct BrokenLines(TextDocument);

    impl DocumentSource for BrokenLines {
        fn page_count(&self) -> u32 {
            self.0.page_count()
        }

        fn page_text(&self, page: u32) -> document::Result<String> {
            self.0.page_text(page)
        }

        fn page_tables(&self, page: u32, strategy: TableStrategy) -> document::Result<Vec<CellGrid>> {
            match strategy {
                TableStrategy::Lines => Err(DocumentError::TextExtraction("no ruling".to_string())),
                TableStrategy::Text => self.0.page_tables(page, strategy),
            }
        }
    }

    #[test]
    fn test_failing_strategy_is_recovered() {
        let text = "\
Lokacija: Ispostava Sesvete
Pisač              Boja - šifra    Soba
HP M404dn          CF259A          12
";
        let doc = BrokenLines(TextDocument::from_text(text));
        let result = TableOrderParser::new().parse(&doc);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].location, "Ispostava Sesvete");
        assert_eq!(result.records[0].product, "CF259A");
        assert_eq!(result.records[0].room, "12");
        assert!(result.warnings.iter().any(|w| w.contains("lines strategy failed")));
    }

    #[test]
    fn test_builder() {
        let parser = TableOrderParser::new()
            .with_strategies(vec![TableStrategy::Text])
            .with_min_table_rows(3);
        let result = parser.parse(&TextDocument::from_text(TWO_LOCATIONS));
        assert!(result.records.is_empty());
    }
}
