//! Page-level context: location headings and the document date.

use super::patterns::{DOCUMENT_DATE, LOCATION_MARKER};

/// Context found in the free text of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// Location headings, in document order.
    pub locations: Vec<String>,
    /// Document date, always ending with a period (`14.10.2025.`).
    pub date: Option<String>,
}

/// Extract locations and date from page text.
pub fn extract_context(text: &str) -> PageContext {
    PageContext {
        locations: find_locations(text),
        date: find_date(text),
    }
}

/// Every `Lokacija:` value on the page, in order.
///
/// The value is the rest of the marker's line, or the next line when the
/// marker ends its line (wrapped headings).
pub fn find_locations(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let mut out = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = LOCATION_MARKER.captures(line) else {
            continue;
        };

        let same_line = caps[1].trim();
        if !same_line.is_empty() {
            out.push(same_line.to_string());
            continue;
        }

        let next = lines.get(i + 1).map(|l| l.trim()).unwrap_or("");
        if !next.is_empty() {
            out.push(next.to_string());
        }
    }

    out
}

/// First `Datum: DD.MM.YYYY` on the page. No calendar validation.
pub fn find_date(text: &str) -> Option<String> {
    DOCUMENT_DATE
        .captures(text)
        .map(|caps| format!("{}.", &caps[1]))
}
