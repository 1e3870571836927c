//! Cell content classification.
//!
//! Predicates compose in a fixed priority: a SKU-like cell is never
//! printer-like, and a cell with letters is never room-like unless it is a
//! named room. Model numbers such as `4002dn` therefore stay printers.

use std::collections::HashSet;

use super::patterns::{
    COLOR_WORD, HEADER_WORD, NAMED_ROOMS, PACK_KEYWORD, PRINTER_MODEL, PRINTER_VOCAB, ROOM_NUMBER,
    SKU_TOKEN,
};
use super::text::fold_lower;

/// Longest digit-bearing text accepted as a room without being purely numeric.
const MAX_ROOM_LEN: usize = 6;

/// Distinct header words needed to call a body row a repeated header.
const MIN_HEADER_WORDS: usize = 2;

/// Product code, pack reference or colour name.
pub fn is_sku_like(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    let folded = fold_lower(text);
    folded.contains(PACK_KEYWORD)
        || SKU_TOKEN.is_match(text)
        || (!PRINTER_VOCAB.is_match(&folded) && has_single_case_code(text))
        || COLOR_WORD.is_match(&folded)
}

/// A word written in one case throughout (`cf259a`, `W1490A`) that reads as a
/// product code once upper-cased. Mixed-case words (`M404dn`) are model
/// numbers.
fn has_single_case_code(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| {
            let letters = word.chars().filter(|c| c.is_alphabetic());
            letters.clone().all(char::is_lowercase) || letters.clone().all(char::is_uppercase)
        })
        .any(|word| {
            let upper = word.to_uppercase();
            SKU_TOKEN
                .find(&upper)
                .is_some_and(|m| m.start() == 0 && m.end() == upper.len())
        })
}

/// Printer brand, series or model number that is not also a product code.
pub fn is_printer_like(text: &str) -> bool {
    let folded = fold_lower(text.trim());
    if folded.is_empty() {
        return false;
    }

    (PRINTER_VOCAB.is_match(&folded) || PRINTER_MODEL.is_match(&folded)) && !is_sku_like(text)
}

/// Room number or named room.
pub fn is_room_like(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    if ROOM_NUMBER.is_match(text) {
        return true;
    }

    let folded = fold_lower(text);
    if NAMED_ROOMS.contains(&folded.as_str()) {
        return true;
    }

    if text.chars().any(char::is_alphabetic) {
        return false;
    }

    text.chars().count() <= MAX_ROOM_LEN && text.chars().any(|c| c.is_ascii_digit())
}

/// A header row repeated inside a table body.
pub fn is_header_row<S: AsRef<str>>(row: &[S]) -> bool {
    let joined = fold_lower(
        &row.iter()
            .map(|cell| cell.as_ref().trim())
            .collect::<Vec<_>>()
            .join(" "),
    );

    let words: HashSet<&str> = HEADER_WORD.find_iter(&joined).map(|m| m.as_str()).collect();
    words.len() >= MIN_HEADER_WORDS
}
