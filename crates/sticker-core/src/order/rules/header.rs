//! Header row classification: which column holds what.

use std::collections::BTreeMap;

use super::text::fold_lower;

/// Semantic role of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnRole {
    Product,
    Room,
    Printer,
    Quantity,
}

/// Synonyms per role, diacritic-folded, checked in this order.
const ROLE_SYNONYMS: &[(ColumnRole, &[&str])] = &[
    (
        ColumnRole::Product,
        &["boja", "sifra", "boja - sifra", "boja-sifra", "toner", "proizvod", "artikl"],
    ),
    (ColumnRole::Room, &["soba", "sobe", "prostorija", "room"]),
    (ColumnRole::Printer, &["pisac", "printer", "model"]),
    (ColumnRole::Quantity, &["kolicina", "kol.", "qty"]),
];

/// Shortest header text allowed to match as a fragment of a synonym.
const MIN_FRAGMENT_LEN: usize = 3;

/// Mapping from column index to role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    roles: BTreeMap<usize, ColumnRole>,
}

impl ColumnMap {
    /// Role of a column, if any.
    pub fn role(&self, column: usize) -> Option<ColumnRole> {
        self.roles.get(&column).copied()
    }

    /// First column mapped to `role`.
    pub fn column(&self, role: ColumnRole) -> Option<usize> {
        self.roles
            .iter()
            .find(|(_, r)| **r == role)
            .map(|(idx, _)| *idx)
    }

    /// Whether the table exposes any order field (quantity alone does not count).
    pub fn is_relevant(&self) -> bool {
        self.roles.values().any(|r| *r != ColumnRole::Quantity)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<(usize, ColumnRole)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (usize, ColumnRole)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

/// Role of a single header cell.
pub fn classify_header_cell(cell: &str) -> Option<ColumnRole> {
    let name = fold_lower(cell.trim());
    if name.is_empty() {
        return None;
    }

    ROLE_SYNONYMS
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|s| matches_synonym(&name, s)))
        .map(|(role, _)| *role)
}

/// Containment in either direction, tolerating truncated or padded headers.
fn matches_synonym(name: &str, synonym: &str) -> bool {
    name.contains(synonym) || (name.chars().count() >= MIN_FRAGMENT_LEN && synonym.contains(name))
}

/// Map every header cell to its role. Unrecognised columns are absent.
pub fn classify_header<S: AsRef<str>>(header: &[S]) -> ColumnMap {
    header
        .iter()
        .enumerate()
        .filter_map(|(idx, cell)| classify_header_cell(cell.as_ref()).map(|role| (idx, role)))
        .collect()
}
