//! Cell grids derived from page text.
//!
//! Two layouts are recognised:
//! - **Ruled tables** (`lines`): cells separated by `|`, optionally framed by
//!   `+---+` / `|---|` rule lines.
//! - **Aligned tables** (`text`): cells separated by runs of two or more
//!   spaces. The first line with at least two cells fixes the column
//!   positions; every following non-blank line is split against them, so
//!   rows with a single filled cell keep their column.

use super::{CellGrid, TableStrategy};

/// Minimum run of spaces separating two aligned cells.
const MIN_GAP: usize = 2;

/// Extract candidate tables from page text.
pub fn extract_tables(text: &str, strategy: TableStrategy) -> Vec<CellGrid> {
    match strategy {
        TableStrategy::Lines => ruled_tables(text),
        TableStrategy::Text => aligned_tables(text),
    }
}

fn ruled_tables(text: &str) -> Vec<CellGrid> {
    let mut tables = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        let line = line.trim();

        if is_rule_line(line) {
            continue;
        }

        if line.contains('|') {
            rows.push(split_ruled(line));
        } else if !rows.is_empty() {
            tables.push(CellGrid::new(std::mem::take(&mut rows)));
        }
    }

    if !rows.is_empty() {
        tables.push(CellGrid::new(rows));
    }

    tables
}

fn is_rule_line(line: &str) -> bool {
    !line.is_empty()
        && line.contains(['-', '='])
        && line.chars().all(|c| matches!(c, '|' | '+' | '-' | '=' | ':' | ' '))
}

fn split_ruled(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// A run of text within a line, with its starting character column.
#[derive(Debug)]
struct Chunk {
    start: usize,
    text: String,
}

fn chunks(line: &str) -> Vec<Chunk> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut spaces = 0;

    for (col, ch) in line.chars().enumerate() {
        if ch == ' ' || ch == '\t' {
            spaces += if ch == '\t' { MIN_GAP } else { 1 };
            continue;
        }

        if !current.is_empty() && spaces >= MIN_GAP {
            out.push(Chunk {
                start,
                text: std::mem::take(&mut current),
            });
        }

        if current.is_empty() {
            start = col;
        } else if spaces > 0 {
            current.push(' ');
        }

        spaces = 0;
        current.push(ch);
    }

    if !current.is_empty() {
        out.push(Chunk { start, text: current });
    }

    out
}

#[derive(Default)]
struct AlignedTable {
    columns: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl AlignedTable {
    fn is_open(&self) -> bool {
        !self.columns.is_empty()
    }

    fn open(&mut self, header: Vec<Chunk>) {
        self.columns = header.iter().map(|c| c.start).collect();
        self.rows.push(header.into_iter().map(|c| c.text).collect());
    }

    /// Place each chunk in the column whose start is nearest.
    fn push(&mut self, chunks: Vec<Chunk>) {
        let mut row = vec![String::new(); self.columns.len()];

        for chunk in chunks {
            let idx = self
                .columns
                .iter()
                .enumerate()
                .min_by_key(|(_, start)| start.abs_diff(chunk.start))
                .map(|(idx, _)| idx)
                .unwrap_or(0);

            if !row[idx].is_empty() {
                row[idx].push(' ');
            }
            row[idx].push_str(&chunk.text);
        }

        self.rows.push(row);
    }

    fn close(&mut self, tables: &mut Vec<CellGrid>) {
        if !self.rows.is_empty() {
            tables.push(CellGrid::new(std::mem::take(&mut self.rows)));
        }
        self.columns.clear();
    }
}

fn aligned_tables(text: &str) -> Vec<CellGrid> {
    let mut tables = Vec::new();
    let mut table = AlignedTable::default();

    for line in text.lines() {
        // Ruled lines belong to the other strategy.
        if line.trim().is_empty() || line.contains('|') || is_rule_line(line.trim()) {
            table.close(&mut tables);
            continue;
        }

        let chunks = chunks(line);
        if table.is_open() {
            table.push(chunks);
        } else if chunks.len() >= 2 {
            table.open(chunks);
        }
    }

    table.close(&mut tables);
    tables
}
