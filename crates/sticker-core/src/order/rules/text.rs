//! Diacritic folding and key normalization.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Strip diacritics: `š` → `s`, `Đ` → `D`.
///
/// Decomposes to NFD and drops combining marks. `đ` has no decomposition
/// and is mapped explicitly.
pub fn fold_diacritics(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'đ' => 'd',
            'Đ' => 'D',
            other => other,
        })
        .collect()
}

/// Diacritic-folded lower case, for vocabulary matching.
pub fn fold_lower(text: &str) -> String {
    fold_diacritics(text).to_lowercase()
}

/// Reference-table key form: trimmed, single-spaced, diacritic-folded upper case.
pub fn fold_key(text: &str) -> String {
    let folded = fold_diacritics(text).to_uppercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop spaces and hyphens, for punctuation-insensitive comparison.
pub fn compact(text: &str) -> String {
    text.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_croatian_letters() {
        assert_eq!(fold_diacritics("šđčćž ŠĐČĆŽ"), "sdccz SDCCZ");
        assert_eq!(fold_lower("Pisač"), "pisac");
        assert_eq!(fold_lower("Boja - Šifra"), "boja - sifra");
    }

    #[test]
    fn test_fold_key() {
        assert_eq!(fold_key("  Područni   ured Trešnjevka "), "PODRUCNI URED TRESNJEVKA");
        assert_eq!(fold_key(""), "");
    }

    #[test]
    fn test_compact() {
        assert_eq!(compact("CF 226-A"), "CF226A");
    }
}
