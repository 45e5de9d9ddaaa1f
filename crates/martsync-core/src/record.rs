use serde::{Deserialize, Serialize};

/// A normalized product row ready to be written to the `products`
/// collection, keyed by [`ProductRecord::product_id`].
///
/// Prices are runtime `f64` convenience values; they are stored as JSON
/// doubles, so rounding happens at derivation time (see [`round_price`]),
/// not at the storage boundary. The creation timestamp is deliberately
/// not a field here — the store assigns it on first write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Canonical identifier: the trimmed item code when the export carries
    /// one, otherwise derived from the product name.
    pub product_id: String,
    /// Raw item code from the sheet; empty when the column was absent.
    pub item_code: String,
    pub name: String,
    pub category: String,
    /// 0.0 means "unknown" — the export did not carry a buying price.
    pub buying_price: f64,
    pub selling_price: f64,
    /// Magnitude kept as the matched text (`"180"`, `"0.5"`); empty when
    /// the name carries no weight pattern.
    pub weight: String,
    pub weight_unit: String,
    pub quantity: String,
    pub quantity_unit: String,
    pub gst_rate: f64,
    pub hsn_code: String,
    pub image_url: String,
    pub location: String,
    pub is_active: bool,
}

impl ProductRecord {
    /// Returns `true` when the export carried a usable buying price.
    #[must_use]
    pub fn has_known_buying_price(&self) -> bool {
        self.buying_price > 0.0
    }

    /// Returns `true` when the stored selling price honors the markup
    /// invariant (`selling == round(buying × markup, 2)`), or trivially
    /// when the buying price is unknown.
    #[must_use]
    pub fn markup_consistent(&self, markup: f64) -> bool {
        if !self.has_known_buying_price() {
            return true;
        }
        (self.selling_price - round_price(self.buying_price * markup)).abs() < 0.005
    }
}

/// Round a price to 2 decimal places, the way every price in the store
/// is rounded.
#[must_use]
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
