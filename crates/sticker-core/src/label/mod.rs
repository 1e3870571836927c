//! Label transform: order records to flat four-line labels.

use tracing::{debug, trace};

use crate::mapping::Normalizer;
use crate::models::{LabelConfig, LabelRecord, NormalizedOrderRecord, RawOrderRecord};
use crate::order::assembler::detect_pack_family;
use crate::order::rules::patterns::{PACK_KEYWORD, ROOM_WITH_SUFFIX};
use crate::order::rules::fold_lower;

/// Today's date in label form (`16.10.2026.`).
pub fn today() -> String {
    chrono::Local::now().format("%d.%m.%Y.").to_string()
}

/// Third label line for a raw room value.
///
/// Rules, first match wins: empty room, central office prefix, reception
/// keyword, number with a one-letter suffix (lower-cased), verbatim.
pub fn room_phrase(room: &str, config: &LabelConfig) -> String {
    let room = room.trim();
    let prefix = &config.room_prefix;
    if room.is_empty() {
        return prefix.clone();
    }

    let folded = fold_lower(room);
    if !config.central_prefix.is_empty() && folded.starts_with(&config.central_prefix) {
        return format!("{} {}", prefix, config.central_shorthand);
    }

    if config.reception_keywords.iter().any(|k| *k == folded) {
        return format!("{} {}", prefix, config.reception_shorthand);
    }

    if let Some(caps) = ROOM_WITH_SUFFIX.captures(room) {
        return format!("{} {}{}", prefix, &caps[1], caps[2].to_lowercase());
    }

    format!("{} {}", prefix, room)
}

/// Turns raw order records into label records.
pub struct LabelTransform<'a> {
    normalizer: &'a Normalizer,
    config: &'a LabelConfig,
    fallback_date: String,
}

impl<'a> LabelTransform<'a> {
    /// The fallback date comes from the config, or today when unset.
    pub fn new(normalizer: &'a Normalizer, config: &'a LabelConfig) -> Self {
        Self {
            normalizer,
            config,
            fallback_date: config.fallback_date.clone().unwrap_or_else(today),
        }
    }

    /// Override the date used for records without one.
    pub fn with_fallback_date(mut self, date: impl Into<String>) -> Self {
        self.fallback_date = date.into();
        self
    }

    /// SKUs for a record and the pack family they came from.
    ///
    /// An explicit pack family wins; then a pack keyword in the product text
    /// (family read from the text, else guessed from the printer); then the
    /// product text as a single SKU.
    pub fn skus_for(&self, record: &RawOrderRecord) -> (Vec<String>, Option<String>) {
        let family = record.pack_family.trim();
        if !family.is_empty() {
            let skus = self.normalizer.expand_pack(family);
            if !skus.is_empty() {
                trace!("{:?}: explicit pack {}", record.product, family);
                return (skus, Some(family.to_uppercase()));
            }
        }

        if fold_lower(&record.product).contains(PACK_KEYWORD) {
            let family = detect_pack_family(&record.product)
                .or_else(|| self.normalizer.family_from_printer(&record.printer));
            if let Some(family) = family {
                let skus = self.normalizer.expand_pack(&family);
                if !skus.is_empty() {
                    trace!("{:?}: pack {} via printer {:?}", record.product, family, record.printer);
                    return (skus, Some(family));
                }
            }
        }

        match self.normalizer.resolve_product(&record.product) {
            Some(sku) => (vec![sku], None),
            None => {
                debug!("Unresolved product {:?}", record.product);
                (Vec::new(), None)
            }
        }
    }

    /// Resolve location and SKUs of a record.
    pub fn normalize(&self, record: &RawOrderRecord) -> NormalizedOrderRecord {
        let (skus, pack_family) = self.skus_for(record);
        let date = if record.date.trim().is_empty() {
            self.fallback_date.clone()
        } else {
            record.date.trim().to_string()
        };

        NormalizedOrderRecord {
            date,
            location: self.normalizer.resolve_location(&record.location),
            skus,
            qty: record.qty.max(1),
            room: record.room.trim().to_string(),
            printer: record.printer.trim().to_string(),
            pack_family,
        }
    }

    /// One label per SKU and unit. A record without SKUs still yields labels
    /// with an empty SKU line.
    pub fn labels(&self, record: &NormalizedOrderRecord) -> Vec<LabelRecord> {
        let line3 = room_phrase(&record.room, self.config);
        let blank = [String::new()];
        let skus: &[String] = if record.skus.is_empty() {
            &blank
        } else {
            &record.skus
        };

        let mut labels = Vec::with_capacity(skus.len() * record.qty.max(1) as usize);
        for sku in skus {
            for _ in 0..record.qty.max(1) {
                labels.push(LabelRecord {
                    line1: record.location.clone(),
                    line2: record.date.clone(),
                    line3: line3.clone(),
                    line4: sku.clone(),
                });
            }
        }

        labels
    }

    pub fn transform(&self, record: &RawOrderRecord) -> Vec<LabelRecord> {
        self.labels(&self.normalize(record))
    }

    pub fn transform_all(&self, records: &[RawOrderRecord]) -> Vec<LabelRecord> {
        records.iter().flat_map(|r| self.transform(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{sample_tables, ReferenceTables};
    use crate::models::MatchThresholds;
    use pretty_assertions::assert_eq;

    fn record(product: &str) -> RawOrderRecord {
        RawOrderRecord {
            date: "14.10.2025.".to_string(),
            location: "Područni ured Trešnjevka".to_string(),
            product: product.to_string(),
            qty: 1,
            room: "215".to_string(),
            printer: String::new(),
            pack_family: detect_pack_family(product).unwrap_or_default(),
        }
    }

    #[test]
    fn test_room_phrase() {
        let config = LabelConfig::default();
        assert_eq!(room_phrase("", &config), "SOBA");
        assert_eq!(room_phrase("   ", &config), "SOBA");
        assert_eq!(room_phrase("23A", &config), "SOBA 23a");
        assert_eq!(room_phrase("104 B", &config), "SOBA 104b");
        assert_eq!(room_phrase("Porta", &config), "SOBA porta");
        assert_eq!(room_phrase("RECEPCIJA", &config), "SOBA porta");
        assert_eq!(room_phrase("Središnji ured", &config), "SOBA SU");
        assert_eq!(room_phrase("215", &config), "SOBA 215");
        assert_eq!(room_phrase("2-15", &config), "SOBA 2-15");
    }

    #[test]
    fn test_quantity_expansion() {
        let normalizer = Normalizer::new(sample_tables(), MatchThresholds::default());
        let config = LabelConfig::default();
        let transform = LabelTransform::new(&normalizer, &config);

        let mut order = record("CF259A");
        order.qty = 3;
        let labels = transform.transform(&order);

        assert_eq!(labels.len(), 3);
        let expected = LabelRecord {
            line1: "TSR".to_string(),
            line2: "14.10.2025.".to_string(),
            line3: "SOBA 215".to_string(),
            line4: "CF259A".to_string(),
        };
        assert!(labels.iter().all(|l| *l == expected));
    }

    #[test]
    fn test_pack_expansion_with_quantity() {
        let normalizer = Normalizer::new(sample_tables(), MatchThresholds::default());
        let config = LabelConfig::default();
        let transform = LabelTransform::new(&normalizer, &config);

        let mut order = record("komplet-CF400");
        order.qty = 2;
        let labels = transform.transform(&order);
        let skus: Vec<&str> = labels.iter().map(|l| l.line4.as_str()).collect();

        assert_eq!(
            skus,
            vec!["CF400A", "CF400A", "CF401A", "CF401A", "CF403A", "CF403A", "CF402A", "CF402A"]
        );
    }

    #[test]
    fn test_pack_family_from_printer() {
        let normalizer = Normalizer::new(sample_tables(), MatchThresholds::default());
        let config = LabelConfig::default();
        let transform = LabelTransform::new(&normalizer, &config);

        let mut order = record("Komplet tonera");
        order.printer = "HP Color LaserJet Pro M479fdn".to_string();
        let normalized = transform.normalize(&order);

        assert_eq!(normalized.pack_family.as_deref(), Some("CF400"));
        assert_eq!(normalized.skus.len(), 4);
    }

    #[test]
    fn test_unresolved_product_keeps_label() {
        let normalizer = Normalizer::new(
            ReferenceTables::default().with_product("W1490A", "W1490A"),
            MatchThresholds::default(),
        );
        let config = LabelConfig::default();
        let transform = LabelTransform::new(&normalizer, &config);

        let labels = transform.transform(&record("toner za ured"));

        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].line4, "");
        assert_eq!(labels[0].line1, "PODRUČNI URED TREŠNJEVKA");
        assert_eq!(labels[0].line3, "SOBA 215");
    }

    #[test]
    fn test_date_fallback() {
        let normalizer = Normalizer::new(sample_tables(), MatchThresholds::default());
        let config = LabelConfig {
            fallback_date: Some("01.02.2026.".to_string()),
            ..LabelConfig::default()
        };
        let transform = LabelTransform::new(&normalizer, &config);

        let mut order = record("CF226A");
        order.date = String::new();
        assert_eq!(transform.normalize(&order).date, "01.02.2026.");

        let transform = transform.with_fallback_date("05.05.2026.");
        assert_eq!(transform.normalize(&order).date, "05.05.2026.");
        assert_eq!(transform.normalize(&record("CF226A")).date, "14.10.2025.");
    }

    #[test]
    fn test_today_format() {
        let re = regex::Regex::new(r"^\d{2}\.\d{2}\.\d{4}\.$").unwrap();
        assert!(re.is_match(&today()));
    }

    #[test]
    fn test_transform_all_preserves_order() {
        let normalizer = Normalizer::new(sample_tables(), MatchThresholds::default());
        let config = LabelConfig::default();
        let transform = LabelTransform::new(&normalizer, &config);

        let labels = transform.transform_all(&[record("CF226A"), record("W1490A")]);
        let skus: Vec<&str> = labels.iter().map(|l| l.line4.as_str()).collect();
        assert_eq!(skus, vec!["CF226A", "W1490A"]);
    }
}
