//! Resolution of raw order text against the reference tables.
//!
//! Each resolution is an ordered cascade of independent stages tried until
//! one succeeds. Stages receive the query already in reference-key form.

use tracing::trace;

use crate::models::MatchThresholds;
use crate::order::rules::patterns::SKU_SCAN;
use crate::order::rules::{compact, fold_key};

use super::fuzzy::{best_match, partial_ratio, token_sort_ratio};
use super::tables::{PackColor, ReferenceTables};

type Stage = fn(&Normalizer, &str) -> Option<String>;

/// Resolves products, locations and pack families.
#[derive(Debug, Clone)]
pub struct Normalizer {
    tables: ReferenceTables,
    thresholds: MatchThresholds,
}

impl Normalizer {
    const PRODUCT_STAGES: &'static [(&'static str, Stage)] = &[
        ("exact", Self::product_exact),
        ("compact", Self::product_compact),
        ("token", Self::product_token),
        ("fuzzy", Self::product_fuzzy),
    ];

    const LOCATION_STAGES: &'static [(&'static str, Stage)] = &[
        ("exact", Self::location_exact),
        ("prefix", Self::location_prefix),
        ("fuzzy", Self::location_fuzzy),
    ];

    const PRINTER_STAGES: &'static [(&'static str, Stage)] = &[
        ("keyword", Self::printer_keyword),
        ("fuzzy", Self::printer_fuzzy),
    ];

    pub fn new(tables: ReferenceTables, thresholds: MatchThresholds) -> Self {
        Self { tables, thresholds }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    fn run(&self, kind: &str, stages: &[(&str, Stage)], text: &str) -> Option<String> {
        let key = fold_key(text);
        if key.is_empty() {
            return None;
        }

        stages.iter().find_map(|(name, stage)| {
            let resolved = stage(self, &key)?;
            trace!("{} {:?} resolved by {} stage: {}", kind, text, name, resolved);
            Some(resolved)
        })
    }

    /// Canonical SKU for product text, or `None` when every stage misses.
    pub fn resolve_product(&self, text: &str) -> Option<String> {
        self.run("Product", Self::PRODUCT_STAGES, text)
    }

    /// Short label for a location. Never misses: unknown locations come back
    /// trimmed and upper-cased.
    pub fn resolve_location(&self, text: &str) -> String {
        self.run("Location", Self::LOCATION_STAGES, text)
            .unwrap_or_else(|| text.trim().to_uppercase())
    }

    /// SKUs of a pack family in black, cyan, magenta, yellow order. Colours
    /// without an entry are left out.
    pub fn expand_pack(&self, family: &str) -> Vec<String> {
        let family = fold_key(family);
        PackColor::ALL
            .iter()
            .filter_map(|color| self.tables.pack_sku(&family, *color))
            .map(str::to_string)
            .collect()
    }

    /// Pack family for a printer model.
    pub fn family_from_printer(&self, text: &str) -> Option<String> {
        self.run("Printer", Self::PRINTER_STAGES, text)
    }

    fn product_exact(&self, key: &str) -> Option<String> {
        self.tables.product(key).map(str::to_string)
    }

    fn product_compact(&self, key: &str) -> Option<String> {
        self.tables.product_by_compact(&compact(key)).map(str::to_string)
    }

    // "CRNA-CF226A" -> CF226A
    fn product_token(&self, key: &str) -> Option<String> {
        let scan = key.replace('-', " ");
        SKU_SCAN.find_iter(&scan).find_map(|m| {
            let token = m.as_str();
            match self.tables.product(token) {
                Some(canonical) => Some(canonical.to_string()),
                None if self.tables.is_canonical(token) => Some(token.to_string()),
                None => None,
            }
        })
    }

    fn product_fuzzy(&self, key: &str) -> Option<String> {
        let (alias, _) = best_match(
            key,
            self.tables.product_aliases(),
            token_sort_ratio,
            self.thresholds.product,
        )?;
        self.tables.product(alias).map(str::to_string)
    }

    fn location_exact(&self, key: &str) -> Option<String> {
        self.tables.location(key).map(str::to_string)
    }

    /// Longest reference key the text starts with.
    fn location_prefix(&self, key: &str) -> Option<String> {
        self.tables
            .locations()
            .filter(|(raw, _)| key.starts_with(raw))
            .max_by_key(|(raw, _)| raw.len())
            .map(|(_, short)| short.to_string())
    }

    fn location_fuzzy(&self, key: &str) -> Option<String> {
        let (raw, _) = best_match(
            key,
            self.tables.locations().map(|(raw, _)| raw),
            token_sort_ratio,
            self.thresholds.location,
        )?;
        self.tables.location(raw).map(str::to_string)
    }

    /// Longest keyword contained in the printer text.
    fn printer_keyword(&self, key: &str) -> Option<String> {
        self.tables
            .printers()
            .filter(|(keyword, _)| key.contains(keyword))
            .max_by_key(|(keyword, _)| keyword.len())
            .map(|(_, family)| family.to_string())
    }

    fn printer_fuzzy(&self, key: &str) -> Option<String> {
        let (keyword, _) = best_match(
            key,
            self.tables.printers().map(|(keyword, _)| keyword),
            partial_ratio,
            self.thresholds.printer,
        )?;
        self.tables
            .printers()
            .find(|(k, _)| *k == keyword)
            .map(|(_, family)| family.to_string())
    }
}
