//! Row assembly: folds a table body into order records.
//!
//! One logical order line may span up to three physical rows (a printer
//! announcement, then product and room), or sit entirely in one row. The
//! walk is an explicit two-state machine: [`AssemblyState::Idle`] waits for
//! an informative row, [`AssemblyState::Open`] accumulates fields until both
//! product and room are known.

use tracing::trace;

use crate::models::RawOrderRecord;

use super::rules::patterns::{PACK_FAMILY, QUANTITY};
use super::rules::{
    is_header_row, is_printer_like, is_room_like, is_sku_like, ColumnMap, ColumnRole,
};

/// Field values recovered from a single body row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCandidates {
    pub product: Option<String>,
    pub room: Option<String>,
    pub printer: Option<String>,
    pub qty: Option<u32>,
}

impl RowCandidates {
    /// Pull candidates out of a row.
    ///
    /// The header mapping is tried first for each role; when the mapped cell
    /// is empty or fails validation the remaining cells are scanned with the
    /// classifiers. Roles are filled product, printer, room, and a cell is
    /// consumed by at most one role. Quantity columns are never scanned.
    pub fn extract<S: AsRef<str>>(row: &[S], columns: &ColumnMap) -> Self {
        let cells: Vec<&str> = row.iter().map(|c| c.as_ref().trim()).collect();
        let mut used = vec![false; cells.len()];
        for (idx, flag) in used.iter_mut().enumerate() {
            if columns.role(idx) == Some(ColumnRole::Quantity) {
                *flag = true;
            }
        }

        let product = take_cell(
            &cells,
            &mut used,
            columns.column(ColumnRole::Product),
            |t| !is_printer_like(t),
            is_sku_like,
        );

        let printer = take_cell(
            &cells,
            &mut used,
            columns.column(ColumnRole::Printer),
            |t| !is_sku_like(t),
            is_printer_like,
        );

        let room = take_cell(
            &cells,
            &mut used,
            columns.column(ColumnRole::Room),
            |t| !is_sku_like(t),
            is_room_like,
        );

        let qty = columns
            .column(ColumnRole::Quantity)
            .and_then(|idx| cells.get(idx))
            .and_then(|cell| parse_quantity(cell));

        Self {
            product,
            room,
            printer,
            qty,
        }
    }

    /// Nothing order-related in the row.
    pub fn is_empty(&self) -> bool {
        self.product.is_none() && self.room.is_none() && self.printer.is_none()
    }

    /// A row naming only a printer.
    pub fn is_printer_announcement(&self) -> bool {
        self.printer.is_some() && self.product.is_none() && self.room.is_none()
    }
}

/// Take the mapped cell if it validates, else the first unused cell the
/// classifier accepts.
fn take_cell(
    cells: &[&str],
    used: &mut [bool],
    mapped: Option<usize>,
    validate: impl Fn(&str) -> bool,
    classify: impl Fn(&str) -> bool,
) -> Option<String> {
    if let Some(idx) = mapped {
        if let Some(cell) = cells.get(idx) {
            if !used[idx] && !cell.is_empty() && validate(*cell) {
                used[idx] = true;
                return Some(cell.to_string());
            }
        }
    }

    let idx = cells
        .iter()
        .enumerate()
        .find(|(idx, cell)| !used[*idx] && !cell.is_empty() && classify(**cell))
        .map(|(idx, _)| idx)?;

    used[idx] = true;
    Some(cells[idx].to_string())
}

/// First integer in a quantity cell, if positive.
pub fn parse_quantity(cell: &str) -> Option<u32> {
    QUANTITY
        .find(cell)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Pack family named in product text (`komplet-CF400` → `CF400`).
pub fn detect_pack_family(product: &str) -> Option<String> {
    PACK_FAMILY
        .captures(product)
        .map(|caps| caps[1].to_uppercase())
}

/// A record under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialOrder {
    pub product: Option<String>,
    pub room: Option<String>,
    pub printer: Option<String>,
    pub qty: Option<u32>,
}

impl PartialOrder {
    fn with_printer(printer: String) -> Self {
        Self {
            printer: Some(printer),
            ..Self::default()
        }
    }

    /// Fill unset fields. Earlier values always win.
    fn fill(&mut self, row: RowCandidates) {
        if self.product.is_none() {
            self.product = row.product;
        }
        if self.room.is_none() {
            self.room = row.room;
        }
        if self.printer.is_none() {
            self.printer = row.printer;
        }
        if self.qty.is_none() {
            self.qty = row.qty;
        }
    }

    fn is_complete(&self) -> bool {
        self.product.is_some() && self.room.is_some()
    }

    pub fn has_product(&self) -> bool {
        self.product.is_some()
    }

    /// Finish into a record. Location and date are assigned by the caller.
    pub fn into_record(self) -> RawOrderRecord {
        let product = self.product.unwrap_or_default();
        let pack_family = detect_pack_family(&product).unwrap_or_default();

        RawOrderRecord {
            date: String::new(),
            location: String::new(),
            qty: self.qty.unwrap_or(1),
            room: self.room.unwrap_or_default(),
            printer: self.printer.unwrap_or_default(),
            pack_family,
            product,
        }
    }
}

/// Accumulator state while walking a table body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssemblyState {
    #[default]
    Idle,
    Open(PartialOrder),
}

impl AssemblyState {
    /// Consume one row, possibly emitting a finished record.
    pub fn advance(self, row: RowCandidates) -> (AssemblyState, Option<RawOrderRecord>) {
        if row.is_empty() {
            return (self, None);
        }

        if row.is_printer_announcement() {
            let printer = row.printer.unwrap_or_default();
            return match self {
                Self::Open(cur) if cur.product.is_some() || cur.printer.is_some() => {
                    trace!("Printer row closes open record");
                    (
                        Self::Open(PartialOrder::with_printer(printer)),
                        Some(cur.into_record()),
                    )
                }
                Self::Open(mut cur) => {
                    cur.printer = Some(printer);
                    (Self::Open(cur), None)
                }
                Self::Idle => (Self::Open(PartialOrder::with_printer(printer)), None),
            };
        }

        let mut cur = match self {
            Self::Open(cur) => cur,
            Self::Idle => PartialOrder::default(),
        };
        cur.fill(row);

        if cur.is_complete() {
            (Self::Idle, Some(cur.into_record()))
        } else {
            (Self::Open(cur), None)
        }
    }

    /// End of table: an open record survives only if it has a product.
    pub fn finish(self) -> Option<RawOrderRecord> {
        match self {
            Self::Open(cur) if cur.has_product() => Some(cur.into_record()),
            _ => None,
        }
    }
}

/// Assemble every record of a table body.
pub fn assemble_table<S: AsRef<str>>(body: &[Vec<S>], columns: &ColumnMap) -> Vec<RawOrderRecord> {
    let mut state = AssemblyState::Idle;
    let mut records = Vec::new();

    for row in body {
        if row.iter().all(|c| c.as_ref().trim().is_empty()) || is_header_row(row) {
            continue;
        }

        let (next, emitted) = state.advance(RowCandidates::extract(row, columns));
        state = next;
        records.extend(emitted);
    }

    records.extend(state.finish());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::rules::classify_header;
    use pretty_assertions::assert_eq;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn standard_columns() -> ColumnMap {
        classify_header(&["Pisač", "Boja - šifra", "Soba"])
    }

    #[test]
    fn test_single_row_record() {
        let body = rows(&[&["HP LaserJet Pro M404dn", "CF259A", "215"]]);
        let records = assemble_table(&body, &standard_columns());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product, "CF259A");
        assert_eq!(records[0].room, "215");
        assert_eq!(records[0].printer, "HP LaserJet Pro M404dn");
        assert_eq!(records[0].qty, 1);
    }

    #[test]
    fn test_printer_row_then_product_and_room() {
        let body = rows(&[
            &["HP LaserJet Pro M404dn", "", ""],
            &["", "CF226A", "215"],
        ]);
        let records = assemble_table(&body, &standard_columns());

        assert_eq!(
            records,
            vec![RawOrderRecord {
                product: "CF226A".to_string(),
                room: "215".to_string(),
                printer: "HP LaserJet Pro M404dn".to_string(),
                qty: 1,
                ..RawOrderRecord::default()
            }]
        );
    }

    #[test]
    fn test_consecutive_printer_rows() {
        let body = rows(&[
            &["HP LaserJet Pro M404dn", "", ""],
            &["Kyocera ECOSYS P2040dn", "", ""],
            &["", "TK-1160", "12"],
        ]);
        let records = assemble_table(&body, &standard_columns());

        assert_eq!(records.len(), 2);
        assert!(!records[0].has_product());
        assert_eq!(records[0].printer, "HP LaserJet Pro M404dn");
        assert_eq!(records[1].printer, "Kyocera ECOSYS P2040dn");
        assert_eq!(records[1].product, "TK-1160");
        assert_eq!(records[1].room, "12");
    }

    #[test]
    fn test_printer_row_flushes_open_product() {
        let body = rows(&[
            &["HP LaserJet Pro M404dn", "CF226A", ""],
            &["HP Color LaserJet M479fdn", "", ""],
            &["", "komplet-CF400", "Porta"],
        ]);
        let records = assemble_table(&body, &standard_columns());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product, "CF226A");
        assert_eq!(records[0].room, "");
        assert_eq!(records[1].product, "komplet-CF400");
        assert_eq!(records[1].pack_family, "CF400");
        assert_eq!(records[1].room, "Porta");
    }

    #[test]
    fn test_first_write_wins() {
        let body = rows(&[&["HP M404dn", "CF259A", ""], &["", "CF226A", "3"]]);
        let records = assemble_table(&body, &standard_columns());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product, "CF259A");
        assert_eq!(records[0].room, "3");
    }

    #[test]
    fn test_trailing_record_without_room() {
        let body = rows(&[&["HP M404dn", "CF259A", ""]]);
        let records = assemble_table(&body, &standard_columns());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].room, "");
    }

    #[test]
    fn test_trailing_printer_is_dropped() {
        let body = rows(&[&["HP M404dn", "", ""]]);
        assert!(assemble_table(&body, &standard_columns()).is_empty());
    }

    #[test]
    fn test_repeated_header_and_blank_rows_skipped() {
        let body = rows(&[
            &["Pisač", "Boja - šifra", "Soba"],
            &["", "", ""],
            &["HP M404dn", "CF259A", "215"],
        ]);
        let records = assemble_table(&body, &standard_columns());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_product_column_with_printer_text_falls_back() {
        // Columns shifted by the extractor: printer text sits under the product header
        let body = rows(&[&["", "HP LaserJet M404dn", "CF259A", "215"]]);
        let columns = classify_header(&["Pisač", "Boja - šifra", "Soba", ""]);
        let candidates = RowCandidates::extract(&body[0], &columns);

        assert_eq!(candidates.product.as_deref(), Some("CF259A"));
        assert_eq!(candidates.printer.as_deref(), Some("HP LaserJet M404dn"));
        assert_eq!(candidates.room.as_deref(), Some("215"));
    }

    #[test]
    fn test_unmapped_row_uses_classifiers() {
        let candidates =
            RowCandidates::extract(&["4002dn", "crna - CF259A", "2-15"], &ColumnMap::default());

        assert_eq!(candidates.product.as_deref(), Some("crna - CF259A"));
        assert_eq!(candidates.printer.as_deref(), Some("4002dn"));
        assert_eq!(candidates.room.as_deref(), Some("2-15"));
    }

    #[test]
    fn test_lowercase_product_code_in_product_column() {
        let body = rows(&[&["HP LaserJet Pro M404dn", "cf259a", "215"]]);
        let records = assemble_table(&body, &standard_columns());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product, "cf259a");
        assert_eq!(records[0].room, "215");
    }

    #[test]
    fn test_room_with_letter_suffix_in_room_column() {
        let body = rows(&[
            &["HP LaserJet Pro M404dn", "CF259A", "215A"],
            &["HP LaserJet Pro M404dn", "CF226A", "216"],
        ]);
        let records = assemble_table(&body, &standard_columns());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product, "CF259A");
        assert_eq!(records[0].room, "215A");
        assert_eq!(records[1].product, "CF226A");
        assert_eq!(records[1].room, "216");
    }

    #[test]
    fn test_lowercase_room_suffix_stays_room() {
        let candidates =
            RowCandidates::extract(&["Kyocera P2040dn", "w1490a", "104b"], &standard_columns());

        assert_eq!(candidates.printer.as_deref(), Some("Kyocera P2040dn"));
        assert_eq!(candidates.product.as_deref(), Some("w1490a"));
        assert_eq!(candidates.room.as_deref(), Some("104b"));
    }

    #[test]
    fn test_quantity_column() {
        let columns = classify_header(&["Pisač", "Boja - šifra", "Soba", "Količina"]);
        let body = rows(&[&["HP M404dn", "CF259A", "", "3 kom"], &["", "", "1", ""]]);
        let records = assemble_table(&body, &columns);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].qty, 3);
        assert_eq!(records[0].room, "1");
    }

    #[test]
    fn test_quantity_never_taken_as_room() {
        let columns = classify_header(&["Boja - šifra", "Kol."]);
        let candidates = RowCandidates::extract(&["CF259A", "2"], &columns);

        assert_eq!(candidates.qty, Some(2));
        assert_eq!(candidates.room, None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("2"), Some(2));
        assert_eq!(parse_quantity("x 4"), Some(4));
        assert_eq!(parse_quantity("0"), None);
        assert_eq!(parse_quantity(""), None);
    }

    #[test]
    fn test_detect_pack_family() {
        assert_eq!(detect_pack_family("komplet-cf400"), Some("CF400".to_string()));
        assert_eq!(detect_pack_family("KOMPLET CF410"), Some("CF410".to_string()));
        assert_eq!(detect_pack_family("komplet"), None);
        assert_eq!(detect_pack_family("CF259A"), None);
    }

    #[test]
    fn test_state_transitions() {
        let printer = RowCandidates {
            printer: Some("HP M404dn".to_string()),
            ..RowCandidates::default()
        };
        let (state, emitted) = AssemblyState::Idle.advance(printer);
        assert!(emitted.is_none());
        assert!(matches!(state, AssemblyState::Open(_)));

        let (state, emitted) = state.advance(RowCandidates::default());
        assert!(emitted.is_none());
        assert!(matches!(state, AssemblyState::Open(_)));

        let product_room = RowCandidates {
            product: Some("CF259A".to_string()),
            room: Some("215".to_string()),
            ..RowCandidates::default()
        };
        let (state, emitted) = state.advance(product_room);
        assert_eq!(state, AssemblyState::Idle);
        assert_eq!(emitted.map(|r| r.printer), Some("HP M404dn".to_string()));
    }
}
