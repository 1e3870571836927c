//! Common regex patterns for order document extraction.
//!
//! Vocabulary patterns are written against diacritic-folded lower-case text
//! (see [`super::text::fold_lower`]); SKU patterns against upper case.

use lazy_static::lazy_static;
use regex::Regex;

/// Keyword introducing a multi-colour pack ("komplet-CF400").
pub const PACK_KEYWORD: &str = "komplet";

/// Keyword heading the room column, sometimes misparsed as a product.
pub const ROOM_KEYWORD: &str = "soba";

/// Room names accepted without digits (folded lower case).
pub const NAMED_ROOMS: &[&str] = &[
    "porta",
    "recepcija",
    "arhiva",
    "centrala",
    "kuhinja",
    "knjiznica",
    "sredisnji ured",
];

lazy_static! {
    // Stock codes: CF226A, W1490A, CN053AE
    pub static ref SKU_TOKEN: Regex = Regex::new(
        r"\b[A-Z]{1,3}\d{3,4}[A-Z]{0,3}\b"
    ).unwrap();

    // Same token without word boundaries, for scanning compound text
    pub static ref SKU_SCAN: Regex = Regex::new(
        r"[A-Z]{1,3}\d{3,4}[A-Z]{0,3}"
    ).unwrap();

    pub static ref PACK_FAMILY: Regex = Regex::new(
        r"(?i)komplet[\s\-]*([a-z]{1,3}\d{3,4})"
    ).unwrap();

    pub static ref COLOR_WORD: Regex = Regex::new(
        r"\b(?:crna|crni|crno|black|cijan|cyan|plava|plavi|magenta|crvena|crveni|zuta|zuti|yellow)\b"
    ).unwrap();

    // Printer vocabulary
    pub static ref PRINTER_VOCAB: Regex = Regex::new(
        r"\b(?:hp|canon|brother|kyocera|lexmark|xerox|samsung|epson|ricoh|konica|minolta|oki|sharp|laserjet|officejet|deskjet|pagewide|ecosys|taskalfa|i-sensys|mfp)\b"
    ).unwrap();

    // Digit-heavy model numbers: M404dn, 4002dn, P2055
    pub static ref PRINTER_MODEL: Regex = Regex::new(
        r"\b(?:[a-z]{1,3}\d{3,5}[a-z]{0,4}|\d{3,5}[a-z]{1,4})\b"
    ).unwrap();

    pub static ref ROOM_NUMBER: Regex = Regex::new(
        r"^\d{1,4}$"
    ).unwrap();

    // 23A, 104 b
    pub static ref ROOM_WITH_SUFFIX: Regex = Regex::new(
        r"^(\d+)\s*([A-Za-z])$"
    ).unwrap();

    // Header vocabulary, for repeated header rows inside a table body
    pub static ref HEADER_WORD: Regex = Regex::new(
        r"\b(boja|sifra|soba|sobe|prostorija|room|pisac|printer|model|kolicina|qty)\b"
    ).unwrap();

    // Page context
    pub static ref LOCATION_MARKER: Regex = Regex::new(
        r"(?i)\b(?:lokacija|location)\s*:(.*)$"
    ).unwrap();

    pub static ref DOCUMENT_DATE: Regex = Regex::new(
        r"(?i)\b(?:datum|date)\s*:\s*(\d{1,2}\.\d{1,2}\.\d{4})\.?"
    ).unwrap();

    pub static ref QUANTITY: Regex = Regex::new(
        r"\d{1,4}"
    ).unwrap();
}
