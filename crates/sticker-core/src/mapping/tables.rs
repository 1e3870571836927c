//! Reference tables and their CSV loaders.
//!
//! Every key is folded to reference-key form ([`fold_key`]) when it enters a
//! table, so lookups compare folded keys directly. Tables are built once and
//! never mutated afterwards.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, trace};

use crate::error::MappingError;
use crate::models::MappingConfig;
use crate::order::rules::patterns::SKU_TOKEN;
use crate::order::rules::{compact, fold_key};

/// Byte-order mark some spreadsheet exports prepend.
const BOM: char = '\u{feff}';

/// Toner colour within a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackColor {
    Black,
    Cyan,
    Magenta,
    Yellow,
}

impl PackColor {
    /// Expansion order.
    pub const ALL: [PackColor; 4] = [Self::Black, Self::Cyan, Self::Magenta, Self::Yellow];
}

impl FromStr for PackColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_key(s).as_str() {
            "BLACK" | "K" => Ok(Self::Black),
            "CYAN" | "C" => Ok(Self::Cyan),
            "MAGENTA" | "M" => Ok(Self::Magenta),
            "YELLOW" | "Y" => Ok(Self::Yellow),
            other => Err(format!("unknown pack colour: {}", other)),
        }
    }
}

impl fmt::Display for PackColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "BLACK"),
            Self::Cyan => write!(f, "CYAN"),
            Self::Magenta => write!(f, "MAGENTA"),
            Self::Yellow => write!(f, "YELLOW"),
        }
    }
}

/// Key → value table that remembers first-insertion order.
///
/// A repeated key overwrites the value but keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct OrderedTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl OrderedTable {
    pub fn insert(&mut self, key: String, value: String) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable reference data for one run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    /// Product alias → canonical SKU.
    products: OrderedTable,
    /// Alias with spaces and hyphens removed → canonical SKU.
    compact_products: HashMap<String, String>,
    /// Every canonical SKU.
    canonicals: HashSet<String>,
    /// Raw location → short label.
    locations: OrderedTable,
    /// Pack family → colour → SKU.
    packs: BTreeMap<String, BTreeMap<PackColor, String>>,
    /// Printer model keyword → pack family.
    printers: OrderedTable,
}

impl ReferenceTables {
    /// Load all four tables from the configured directory.
    pub fn load(config: &MappingConfig) -> Result<Self, MappingError> {
        let mut tables = Self::default();

        for row in read_rows(&config.path_for(&config.products), &["alias", "canonical"])? {
            tables = tables.with_product(&row[0], &row[1]);
        }
        for row in read_rows(&config.path_for(&config.locations), &["raw", "short_label"])? {
            tables = tables.with_location(&row[0], &row[1]);
        }
        for row in read_rows(&config.path_for(&config.packs), &["family", "color", "sku"])? {
            match row[1].parse::<PackColor>() {
                Ok(color) => tables = tables.with_pack(&row[0], color, &row[2]),
                Err(e) => debug!("Skipping pack row for {}: {}", row[0], e),
            }
        }
        for row in read_rows(&config.path_for(&config.printers), &["keyword", "family"])? {
            tables = tables.with_printer(&row[0], &row[1]);
        }

        info!(
            "Loaded reference tables: {} products, {} locations, {} packs, {} printer keywords",
            tables.products.len(),
            tables.locations.len(),
            tables.packs.len(),
            tables.printers.len()
        );

        Ok(tables)
    }

    /// Register a product alias.
    pub fn with_product(mut self, alias: &str, canonical: &str) -> Self {
        let key = fold_key(alias);
        let canonical = canonical.trim().to_uppercase();
        if key.is_empty() || canonical.is_empty() {
            return self;
        }

        let previous = self.products.get(&key).map(str::to_string);
        self.compact_products.insert(compact(&key), canonical.clone());
        self.canonicals.insert(canonical.clone());
        self.products.insert(key, canonical);

        // A redefined alias may leave its old canonical unreferenced
        if let Some(previous) = previous {
            if !self.products.iter().any(|(_, sku)| sku == previous) {
                self.canonicals.remove(&previous);
            }
        }
        self
    }

    /// Register a location alias. The short label is kept as written.
    pub fn with_location(mut self, raw: &str, short_label: &str) -> Self {
        let key = fold_key(raw);
        let short_label = short_label.trim();
        if !key.is_empty() && !short_label.is_empty() {
            self.locations.insert(key, short_label.to_string());
        }
        self
    }

    /// Register one colour of a pack family.
    pub fn with_pack(mut self, family: &str, color: PackColor, sku: &str) -> Self {
        let family = fold_key(family);
        let sku = sku.trim().to_uppercase();
        if !family.is_empty() && !sku.is_empty() {
            self.packs.entry(family).or_default().insert(color, sku);
        }
        self
    }

    /// Register a printer model keyword.
    pub fn with_printer(mut self, keyword: &str, family: &str) -> Self {
        let key = fold_key(keyword);
        let family = fold_key(family);
        if !key.is_empty() && !family.is_empty() {
            self.printers.insert(key, family);
        }
        self
    }

    pub fn product(&self, key: &str) -> Option<&str> {
        self.products.get(key)
    }

    pub fn product_by_compact(&self, compact_key: &str) -> Option<&str> {
        self.compact_products.get(compact_key).map(String::as_str)
    }

    pub fn is_canonical(&self, sku: &str) -> bool {
        self.canonicals.contains(sku)
    }

    pub fn product_aliases(&self) -> impl Iterator<Item = &str> {
        self.products.keys()
    }

    pub fn location(&self, key: &str) -> Option<&str> {
        self.locations.get(key)
    }

    pub fn locations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.locations.iter()
    }

    pub fn pack_sku(&self, family: &str, color: PackColor) -> Option<&str> {
        self.packs
            .get(family)
            .and_then(|colors| colors.get(&color))
            .map(String::as_str)
    }

    pub fn has_pack(&self, family: &str) -> bool {
        self.packs.contains_key(family)
    }

    pub fn printers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.printers.iter()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn pack_count(&self) -> usize {
        self.packs.len()
    }

    pub fn printer_count(&self) -> usize {
        self.printers.len()
    }

    /// Reference data problems that loading tolerates but resolution suffers from.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut canonicals: Vec<&String> = self.canonicals.iter().collect();
        canonicals.sort();
        for sku in canonicals {
            let whole = SKU_TOKEN
                .find(sku)
                .is_some_and(|m| m.start() == 0 && m.end() == sku.len());
            if !whole {
                warnings.push(format!(
                    "Canonical SKU {} does not look like a product code and cannot be found in free text",
                    sku
                ));
            }
        }

        for (family, colors) in &self.packs {
            let missing: Vec<String> = PackColor::ALL
                .iter()
                .filter(|c| !colors.contains_key(*c))
                .map(ToString::to_string)
                .collect();
            if !missing.is_empty() {
                warnings.push(format!("Pack {} has no {}", family, missing.join(", ")));
            }
        }

        for (keyword, family) in self.printers.iter() {
            if !self.has_pack(family) {
                warnings.push(format!(
                    "Printer keyword {} points at unknown pack family {}",
                    keyword, family
                ));
            }
        }

        warnings
    }
}

/// Rows of a reference file holding every required column, in column order.
///
/// Comment lines (`#`) and blank rows are ignored; rows with a missing or
/// empty required column are skipped.
pub fn read_rows(path: &Path, columns: &[&str]) -> Result<Vec<Vec<String>>, MappingError> {
    let content = std::fs::read_to_string(path).map_err(|source| MappingError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let content: String = content
        .trim_start_matches(BOM)
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    let csv_error = |source: csv::Error| MappingError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_start_matches(BOM).trim().to_lowercase())
        .collect();

    let positions: Option<Vec<usize>> = columns
        .iter()
        .map(|name| headers.iter().position(|h| h == name))
        .collect();
    let Some(positions) = positions else {
        debug!("{}: missing one of the columns {:?}", path.display(), columns);
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let row: Vec<String> = positions
            .iter()
            .map(|&pos| record.get(pos).unwrap_or("").to_string())
            .collect();

        if row.iter().any(String::is_empty) {
            trace!("{}: skipping incomplete row {}", path.display(), line + 2);
            continue;
        }
        rows.push(row);
    }

    debug!("{}: {} rows", path.display(), rows.len());
    Ok(rows)
}

/// Build tables for tests and examples.
#[cfg(test)]
pub(crate) fn sample_tables() -> ReferenceTables {
    ReferenceTables::default()
        .with_product("CF226A", "CF226A")
        .with_product("CF259A", "CF259A")
        .with_product("HP 26A", "CF226A")
        .with_product("TK-1160", "TK1160")
        .with_product("W1490A", "W1490A")
        .with_location("Područni ured Trešnjevka", "TSR")
        .with_location("Ispostava Dubrava", "AVDUB 10")
        .with_location("Ispostava", "ISP")
        .with_pack("CF400", PackColor::Yellow, "CF402A")
        .with_pack("CF400", PackColor::Black, "CF400A")
        .with_pack("CF400", PackColor::Magenta, "CF403A")
        .with_pack("CF400", PackColor::Cyan, "CF401A")
        .with_pack("CF410", PackColor::Black, "CF410A")
        .with_pack("CF410", PackColor::Cyan, "CF411A")
        .with_pack("CF410", PackColor::Yellow, "CF412A")
        .with_printer("Color LaserJet Pro M479", "CF400")
        .with_printer("M477", "CF410")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_keys_are_folded() {
        let tables = sample_tables();
        assert_eq!(tables.product("HP 26A"), Some("CF226A"));
        assert_eq!(tables.location("PODRUCNI URED TRESNJEVKA"), Some("TSR"));
        assert_eq!(tables.product_by_compact("HP26A"), Some("CF226A"));
        assert!(tables.is_canonical("TK1160"));
        assert_eq!(tables.pack_sku("CF400", PackColor::Magenta), Some("CF403A"));
    }

    #[test]
    fn test_repeated_key_keeps_position() {
        let tables = ReferenceTables::default()
            .with_location("B", "1")
            .with_location("A", "2")
            .with_location("b", "3");
        let entries: Vec<_> = tables.locations().collect();
        assert_eq!(entries, vec![("B", "3"), ("A", "2")]);
    }

    #[test]
    fn test_redefined_alias_replaces_canonical() {
        let tables = ReferenceTables::default()
            .with_product("HP 26A", "CF226X")
            .with_product("HP 26A", "CF226A");

        assert_eq!(tables.product("HP 26A"), Some("CF226A"));
        assert_eq!(tables.product_by_compact("HP26A"), Some("CF226A"));
        assert!(tables.is_canonical("CF226A"));
        assert!(!tables.is_canonical("CF226X"));
    }

    #[test]
    fn test_redefined_alias_keeps_shared_canonical() {
        let tables = ReferenceTables::default()
            .with_product("CF226X", "CF226X")
            .with_product("HP 26X", "CF226X")
            .with_product("HP 26X", "CF226A");

        assert!(tables.is_canonical("CF226X"));
        assert_eq!(tables.product_by_compact("HP26X"), Some("CF226A"));
    }

    #[test]
    fn test_pack_color_parse() {
        assert_eq!("black".parse::<PackColor>(), Ok(PackColor::Black));
        assert_eq!(" Yellow ".parse::<PackColor>(), Ok(PackColor::Yellow));
        assert!("crna".parse::<PackColor>().is_err());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("products.csv"),
            "\u{feff}alias,canonical\n# comment line\nHP 26A,CF226A\n\ncrna-cf259a,cf259a\nbroken\n,CF000A\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("locations.csv"),
            "raw,short_label\n  # indented comment\nPodručni ured Trešnjevka,TSR\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("packs.csv"),
            "family,color,sku\nCF400,BLACK,CF400A\nCF400,CYAN,CF401A\nCF400,VIOLET,CF499A\n",
        )
        .unwrap();
        fs::write(dir.path().join("printers.csv"), "keyword,family\nM479,CF400\nM452,CF410\n").unwrap();

        let config = MappingConfig {
            dir: dir.path().to_path_buf(),
            ..MappingConfig::default()
        };
        let tables = ReferenceTables::load(&config).unwrap();

        assert_eq!(tables.product_count(), 2);
        assert_eq!(tables.product("CRNA-CF259A"), Some("CF259A"));
        assert_eq!(tables.location_count(), 1);
        assert_eq!(tables.pack_count(), 1);
        assert_eq!(tables.pack_sku("CF400", PackColor::Cyan), Some("CF401A"));
        assert_eq!(tables.printer_count(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = MappingConfig {
            dir: dir.path().to_path_buf(),
            ..MappingConfig::default()
        };
        assert!(matches!(
            ReferenceTables::load(&config),
            Err(MappingError::Read { .. })
        ));
    }

    #[test]
    fn test_file_without_required_columns_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        fs::write(&path, "name,code\nHP 26A,CF226A\n").unwrap();
        assert!(read_rows(&path, &["alias", "canonical"]).unwrap().is_empty());
    }

    #[test]
    fn test_validate() {
        let tables = sample_tables()
            .with_product("Toner crni", "CRNI TONER")
            .with_printer("P2040", "TK1160");
        let warnings = tables.validate();

        assert!(warnings.iter().any(|w| w.contains("CRNI TONER")));
        assert!(warnings.iter().any(|w| w == "Pack CF410 has no MAGENTA"));
        assert!(warnings.iter().any(|w| w.contains("P2040") && w.contains("TK1160")));
        assert!(!warnings.iter().any(|w| w.contains("CF400 has")));
        assert_eq!(warnings.len(), 3);
    }
}
