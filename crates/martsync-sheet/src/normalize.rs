//! Normalization from raw sheet rows to [`martsync_core::ProductRecord`].
//!
//! Cell and weight parsing is delegated to [`crate::parse`]; this module
//! holds the per-row derivation rules: skip, identifier, category,
//! pricing.

use martsync_core::{round_price, CatalogRules, ProductRecord};
use regex::Regex;

use crate::locator::ColumnMap;
use crate::parse::{parse_float_cell, parse_weight, weight_pattern};
use crate::reader::Cell;

const EMPTY_CELL: Cell = Cell::Empty;

/// Converts raw data rows into normalized records under a fixed rule set.
///
/// Construct once per run; the weight regex is compiled at construction.
pub struct Normalizer {
    rules: CatalogRules,
    weight_re: Regex,
}

impl Normalizer {
    #[must_use]
    pub fn new(rules: CatalogRules) -> Self {
        Self {
            weight_re: weight_pattern(),
            rules,
        }
    }

    #[must_use]
    pub fn rules(&self) -> &CatalogRules {
        &self.rules
    }

    /// Normalize one data row. Returns `None` (a skip, not an error) when
    /// the product-name cell is blank or no usable identifier can be
    /// derived; parse failures inside other cells degrade to their
    /// per-field defaults and never abort the run.
    #[must_use]
    pub fn normalize_row(&self, row: &[Cell], columns: &ColumnMap) -> Option<ProductRecord> {
        let name_cell = row.get(columns.product_name).unwrap_or(&EMPTY_CELL);
        if name_cell.is_blank() {
            return None;
        }
        let name = name_cell.text().trim().to_string();

        let item_code = cell_at(row, columns.item_code).text().trim().to_string();
        let product_id = derive_identifier(&item_code, &name);
        if product_id.is_empty() {
            tracing::warn!(name = %name, "skipping row: name yields an empty identifier");
            return None;
        }

        let category = self.derive_category(&name);

        let (weight, weight_unit) = parse_weight(&self.weight_re, &name)
            .unwrap_or((String::new(), String::new()));

        let buying_price = parse_float_cell(cell_at(row, columns.buying_price));
        let selling_price = if buying_price > 0.0 {
            round_price(buying_price * self.rules.markup)
        } else {
            parse_float_cell(cell_at(row, columns.selling_price))
        };

        let gst_rate = parse_float_cell(cell_at(row, columns.gst_rate));
        let hsn_code = cell_at(row, columns.hsn_code).text().trim().to_string();

        Some(ProductRecord {
            product_id,
            item_code,
            name,
            category,
            buying_price,
            selling_price,
            weight,
            weight_unit,
            // Order quantity is customer-specific and never imported; the
            // catalog's own pack quantity is not in the export.
            quantity: String::new(),
            quantity_unit: String::new(),
            gst_rate,
            hsn_code,
            image_url: String::new(),
            location: String::new(),
            is_active: true,
        })
    }

    /// First category rule whose keywords all appear in the upper-cased
    /// name wins; the rule list is a priority list and its order is
    /// preserved from the catalog file.
    fn derive_category(&self, name: &str) -> String {
        let upper = name.to_uppercase();
        self.rules
            .categories
            .iter()
            .find(|rule| {
                rule.keywords
                    .iter()
                    .all(|k| upper.contains(&k.to_uppercase()))
            })
            .map_or_else(
                || self.rules.default_category.clone(),
                |rule| rule.label.clone(),
            )
    }
}

fn cell_at<'a>(row: &'a [Cell], idx: Option<usize>) -> &'a Cell {
    idx.and_then(|i| row.get(i)).unwrap_or(&EMPTY_CELL)
}

/// Canonical identifier: the trimmed item code when present, otherwise
/// derived from the product name (strip non-alphanumeric/non-space,
/// collapse whitespace runs to `_`, upper-case, truncate to 20 chars).
#[must_use]
pub fn derive_identifier(item_code: &str, name: &str) -> String {
    if !item_code.is_empty() {
        return item_code.to_string();
    }
    identifier_from_name(name)
}

fn identifier_from_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
        .chars()
        .take(20)
        .collect()
}

#[cfg(test)]
mod tests {
    use martsync_core::CategoryRule;

    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn columns() -> ColumnMap {
        ColumnMap {
            item_code: Some(0),
            product_name: 1,
            gst_rate: Some(2),
            hsn_code: Some(3),
            order_qty: Some(4),
            buying_price: Some(5),
            selling_price: Some(6),
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(CatalogRules::builtin())
    }

    fn row(
        code: &str,
        name: &str,
        gst: Cell,
        hsn: &str,
        buying: Cell,
        selling: Cell,
    ) -> Vec<Cell> {
        vec![
            text(code),
            text(name),
            gst,
            text(hsn),
            Cell::Empty,
            buying,
            selling,
        ]
    }

    // -----------------------------------------------------------------------
    // skip rule
    // -----------------------------------------------------------------------

    #[test]
    fn blank_name_is_skipped() {
        let n = normalizer();
        let r = row("123", "   ", Cell::Empty, "", Cell::Empty, Cell::Empty);
        assert!(n.normalize_row(&r, &columns()).is_none());
    }

    #[test]
    fn missing_name_cell_is_skipped() {
        let n = normalizer();
        let r = vec![text("123")];
        assert!(n.normalize_row(&r, &columns()).is_none());
    }

    #[test]
    fn name_of_only_punctuation_is_skipped() {
        let n = normalizer();
        let r = row("", "!!!", Cell::Empty, "", Cell::Empty, Cell::Empty);
        assert!(n.normalize_row(&r, &columns()).is_none());
    }

    // -----------------------------------------------------------------------
    // identifier derivation
    // -----------------------------------------------------------------------

    #[test]
    fn explicit_item_code_is_verbatim() {
        assert_eq!(derive_identifier("30000441", "whatever"), "30000441");
    }

    #[test]
    fn derived_identifier_from_name() {
        assert_eq!(derive_identifier("", "Jira Dhall!! 500g"), "JIRA_DHALL_500G");
    }

    #[test]
    fn derived_identifier_collapses_whitespace_runs() {
        assert_eq!(derive_identifier("", "RAGI   FLOUR  1KG"), "RAGI_FLOUR_1KG");
    }

    #[test]
    fn derived_identifier_truncates_to_twenty_chars() {
        let id = derive_identifier("", "ROASTED WHITE VERMICELLI EXTRA LONG 950G");
        assert_eq!(id.chars().count(), 20);
        assert_eq!(id, "ROASTED_WHITE_VERMIC");
    }

    #[test]
    fn numeric_item_code_cell_survives_as_text() {
        let n = normalizer();
        let mut r = row(
            "",
            "ANIL WHEAT FLOUR 1KG",
            Cell::Empty,
            "",
            Cell::Empty,
            Cell::Empty,
        );
        r[0] = Cell::Number(30_000_441.0);
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert_eq!(record.product_id, "30000441");
        assert_eq!(record.item_code, "30000441");
    }

    // -----------------------------------------------------------------------
    // category derivation
    // -----------------------------------------------------------------------

    #[test]
    fn category_first_rule_wins() {
        let n = normalizer();
        // Contains both VERMICELLI and NOODLES; Vermicelli is listed first.
        let r = row(
            "1",
            "VERMICELLI NOODLES 180G",
            Cell::Empty,
            "",
            Cell::Empty,
            Cell::Empty,
        );
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert_eq!(record.category, "Vermicelli");
    }

    #[test]
    fn category_rule_order_is_significant() {
        // Reversed priority flips the outcome for the same name.
        let mut rules = CatalogRules::builtin();
        rules.categories = vec![
            CategoryRule {
                keywords: vec!["NOODLES".to_string()],
                label: "Noodles".to_string(),
            },
            CategoryRule {
                keywords: vec!["VERMICELLI".to_string()],
                label: "Vermicelli".to_string(),
            },
        ];
        let n = Normalizer::new(rules);
        let r = row(
            "1",
            "VERMICELLI NOODLES 180G",
            Cell::Empty,
            "",
            Cell::Empty,
            Cell::Empty,
        );
        assert_eq!(n.normalize_row(&r, &columns()).unwrap().category, "Noodles");
    }

    #[test]
    fn category_dhal_single_l_matches_dhall_family() {
        let n = normalizer();
        let r = row("1", "TOOR DHAL 1KG", Cell::Empty, "", Cell::Empty, Cell::Empty);
        assert_eq!(n.normalize_row(&r, &columns()).unwrap().category, "Dhall");
    }

    #[test]
    fn category_falls_back_to_default() {
        let n = normalizer();
        let r = row(
            "1",
            "TURMERIC POWDER 100G",
            Cell::Empty,
            "",
            Cell::Empty,
            Cell::Empty,
        );
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert_eq!(record.category, "Food Products");
    }

    #[test]
    fn category_matches_lowercase_names() {
        let n = normalizer();
        let r = row("1", "anil poha 450g", Cell::Empty, "", Cell::Empty, Cell::Empty);
        assert_eq!(n.normalize_row(&r, &columns()).unwrap().category, "Poha");
    }

    // -----------------------------------------------------------------------
    // weight extraction
    // -----------------------------------------------------------------------

    #[test]
    fn weight_extracted_from_name() {
        let n = normalizer();
        let r = row(
            "1",
            "ROASTED VERMICELLI 180G",
            Cell::Empty,
            "",
            Cell::Empty,
            Cell::Empty,
        );
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert_eq!(record.weight, "180");
        assert_eq!(record.weight_unit, "g");
    }

    #[test]
    fn weight_absent_leaves_fields_empty() {
        let n = normalizer();
        let r = row(
            "1",
            "TURMERIC POWDER",
            Cell::Empty,
            "",
            Cell::Empty,
            Cell::Empty,
        );
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert_eq!(record.weight, "");
        assert_eq!(record.weight_unit, "");
    }

    // -----------------------------------------------------------------------
    // price derivation
    // -----------------------------------------------------------------------

    #[test]
    fn selling_price_derived_from_buying_price() {
        let n = normalizer();
        let r = row(
            "1",
            "RICE FLOUR 500G",
            Cell::Empty,
            "",
            Cell::Number(24.0),
            // A stale provided selling price must be ignored.
            Cell::Number(99.0),
        );
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert!((record.buying_price - 24.0).abs() < f64::EPSILON);
        assert!((record.selling_price - 26.4).abs() < f64::EPSILON);
    }

    #[test]
    fn selling_price_rounds_to_two_decimals() {
        let n = normalizer();
        let r = row(
            "1",
            "RICE FLOUR 500G",
            Cell::Empty,
            "",
            Cell::Number(33.33),
            Cell::Empty,
        );
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert!((record.selling_price - 36.66).abs() < f64::EPSILON);
    }

    #[test]
    fn selling_price_carried_over_when_buying_unknown() {
        let n = normalizer();
        let r = row(
            "1",
            "RICE FLOUR 500G",
            Cell::Empty,
            "",
            Cell::Empty,
            Cell::Number(18.5),
        );
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert!((record.buying_price - 0.0).abs() < f64::EPSILON);
        assert!((record.selling_price - 18.5).abs() < f64::EPSILON);
    }

    #[test]
    fn both_prices_default_to_zero() {
        let n = normalizer();
        let r = row(
            "1",
            "RICE FLOUR 500G",
            Cell::Empty,
            "",
            Cell::Text("n/a".to_string()),
            Cell::Empty,
        );
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert!((record.buying_price - 0.0).abs() < f64::EPSILON);
        assert!((record.selling_price - 0.0).abs() < f64::EPSILON);
    }

    // -----------------------------------------------------------------------
    // GST / HSN / flags
    // -----------------------------------------------------------------------

    #[test]
    fn gst_and_hsn_parsed_with_defaults() {
        let n = normalizer();
        let r = row(
            "1",
            "RICE FLOUR 500G",
            Cell::Number(5.0),
            " 1102 ",
            Cell::Empty,
            Cell::Empty,
        );
        let record = n.normalize_row(&r, &columns()).unwrap();
        assert!((record.gst_rate - 5.0).abs() < f64::EPSILON);
        assert_eq!(record.hsn_code, "1102");
    }

    #[test]
    fn missing_optional_columns_use_defaults() {
        let n = normalizer();
        let map = ColumnMap {
            item_code: None,
            product_name: 0,
            gst_rate: None,
            hsn_code: None,
            order_qty: None,
            selling_price: None,
            buying_price: None,
        };
        let r = vec![text("MAIDA 1KG")];
        let record = n.normalize_row(&r, &map).unwrap();
        assert_eq!(record.product_id, "MAIDA_1KG");
        assert_eq!(record.category, "Maida");
        assert!((record.buying_price - 0.0).abs() < f64::EPSILON);
        assert!((record.gst_rate - 0.0).abs() < f64::EPSILON);
        assert_eq!(record.hsn_code, "");
        assert!(record.is_active);
    }
}
