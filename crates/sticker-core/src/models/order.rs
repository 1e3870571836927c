//! Order and label records flowing through the pipeline.

use serde::{Deserialize, Serialize};

/// One logical order line recovered from a document table.
///
/// Built up by the row assembler, immutable once emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrderRecord {
    /// Document date (`DD.MM.YYYY.`), empty when the document has none.
    #[serde(default)]
    pub date: String,

    /// Location label as printed in the document.
    pub location: String,

    /// Raw product text (SKU, colour + SKU, or a pack reference).
    pub product: String,

    /// Number of labels per resolved SKU.
    pub qty: u32,

    /// Room identifier, empty when the table carried none.
    #[serde(default)]
    pub room: String,

    /// Printer model text.
    #[serde(default)]
    pub printer: String,

    /// Pack family named explicitly in the product text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pack_family: String,
}

impl RawOrderRecord {
    /// Whether the record carries any product text.
    pub fn has_product(&self) -> bool {
        !self.product.trim().is_empty()
    }
}

/// An order record after reference-table resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedOrderRecord {
    /// Date printed on the label (record date or the fallback date).
    pub date: String,

    /// Short location label.
    pub location: String,

    /// Canonical SKUs, in pack colour order for pack families.
    pub skus: Vec<String>,

    /// Number of labels per SKU.
    pub qty: u32,

    /// Raw room text.
    pub room: String,

    /// Raw printer text.
    pub printer: String,

    /// Pack family the SKUs were expanded from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_family: Option<String>,
}

/// A printable four-line label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    /// Location.
    pub line1: String,
    /// Date.
    pub line2: String,
    /// Room phrase.
    pub line3: String,
    /// SKU.
    pub line4: String,
}

impl LabelRecord {
    /// The four lines in print order.
    pub fn lines(&self) -> [&str; 4] {
        [&self.line1, &self.line2, &self.line3, &self.line4]
    }
}
