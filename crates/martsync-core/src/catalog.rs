use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Keyword sets used to resolve logical columns against header cell text.
///
/// A header cell matches a logical column when it contains every keyword
/// for that column, case-insensitively. Empty keyword lists mean the
/// column is never resolved (it then takes its per-field default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnKeywords {
    #[serde(default)]
    pub item_code: Vec<String>,
    pub product_name: Vec<String>,
    #[serde(default)]
    pub gst_rate: Vec<String>,
    #[serde(default)]
    pub hsn_code: Vec<String>,
    #[serde(default)]
    pub order_qty: Vec<String>,
    #[serde(default)]
    pub selling_price: Vec<String>,
    #[serde(default)]
    pub buying_price: Vec<String>,
}

/// One category-derivation rule: the rule matches when every keyword
/// appears as a substring of the upper-cased product name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keywords: Vec<String>,
    pub label: String,
}

/// The injected configuration of the import pipeline: header marker token,
/// column keyword sets, category rule priority list, and the markup rate.
///
/// The category list is a priority list, not a set — rules are evaluated
/// top to bottom and the first match wins. OR-style alternatives
/// (`DHALL` / `DHAL`) are consecutive rules with the same label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRules {
    pub header_marker: String,
    pub columns: ColumnKeywords,
    pub categories: Vec<CategoryRule>,
    pub default_category: String,
    pub markup: f64,
}

impl CatalogRules {
    /// The compiled-in rule set matching the order-format export this
    /// pipeline was built for. Used when no catalog file is supplied.
    #[must_use]
    pub fn builtin() -> Self {
        let rule = |keywords: &[&str], label: &str| CategoryRule {
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            label: label.to_string(),
        };

        Self {
            header_marker: "PRODUCTS".to_string(),
            columns: ColumnKeywords {
                item_code: vec!["item".to_string(), "code".to_string()],
                product_name: vec!["products".to_string()],
                gst_rate: vec!["gst".to_string()],
                hsn_code: vec!["hsn".to_string()],
                order_qty: vec!["order".to_string(), "qty".to_string()],
                selling_price: vec!["selling".to_string(), "price".to_string()],
                buying_price: vec!["buying".to_string(), "price".to_string()],
            },
            categories: vec![
                rule(&["VERMICELLI"], "Vermicelli"),
                rule(&["DHALL"], "Dhall"),
                rule(&["DHAL"], "Dhall"),
                rule(&["RAVA"], "Rava"),
                rule(&["SOOJI"], "Rava"),
                rule(&["WHEAT"], "Wheat Products"),
                rule(&["MAIDA"], "Maida"),
                rule(&["RICE"], "Rice Products"),
                rule(&["RAGI"], "Ragi Products"),
                rule(&["NOODLES"], "Noodles"),
                rule(&["PASTA"], "Pasta"),
                rule(&["POHA"], "Poha"),
                rule(&["BAJRA"], "Bajra Products"),
                rule(&["BAJRI"], "Bajra Products"),
                rule(&["SUJI"], "Suji"),
                rule(&["SEMOLINA"], "Suji"),
            ],
            default_category: "Food Products".to_string(),
            markup: 1.10,
        }
    }
}

/// Load and validate catalog rules from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogRules, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let rules: CatalogRules = serde_yaml::from_str(&content)?;

    validate_catalog(&rules)?;

    Ok(rules)
}

fn validate_catalog(rules: &CatalogRules) -> Result<(), ConfigError> {
    if rules.header_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "header_marker must be non-empty".to_string(),
        ));
    }

    if rules.columns.product_name.is_empty() {
        return Err(ConfigError::Validation(
            "columns.product_name must list at least one keyword".to_string(),
        ));
    }

    if rules.default_category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_category must be non-empty".to_string(),
        ));
    }

    if rules.markup <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "markup must be positive, got {}",
            rules.markup
        )));
    }

    for (idx, rule) in rules.categories.iter().enumerate() {
        if rule.label.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category rule #{idx} has an empty label"
            )));
        }
        if rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "category rule '{}' must list non-empty keywords",
                rule.label
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_validate() {
        assert!(validate_catalog(&CatalogRules::builtin()).is_ok());
    }

    #[test]
    fn builtin_marker_is_products() {
        assert_eq!(CatalogRules::builtin().header_marker, "PRODUCTS");
    }

    #[test]
    fn builtin_preserves_rule_order() {
        let rules = CatalogRules::builtin();
        let labels: Vec<&str> = rules.categories.iter().map(|r| r.label.as_str()).collect();
        // Vermicelli outranks Noodles; Dhall outranks everything below it.
        let vermicelli = labels.iter().position(|l| *l == "Vermicelli").unwrap();
        let noodles = labels.iter().position(|l| *l == "Noodles").unwrap();
        assert!(vermicelli < noodles);
    }

    #[test]
    fn validate_rejects_empty_marker() {
        let mut rules = CatalogRules::builtin();
        rules.header_marker = "   ".to_string();
        let err = validate_catalog(&rules).unwrap_err();
        assert!(err.to_string().contains("header_marker"));
    }

    #[test]
    fn validate_rejects_missing_product_name_keywords() {
        let mut rules = CatalogRules::builtin();
        rules.columns.product_name.clear();
        let err = validate_catalog(&rules).unwrap_err();
        assert!(err.to_string().contains("product_name"));
    }

    #[test]
    fn validate_rejects_non_positive_markup() {
        let mut rules = CatalogRules::builtin();
        rules.markup = 0.0;
        let err = validate_catalog(&rules).unwrap_err();
        assert!(err.to_string().contains("markup"));
    }

    #[test]
    fn validate_rejects_rule_with_empty_keyword() {
        let mut rules = CatalogRules::builtin();
        rules.categories.push(CategoryRule {
            keywords: vec![String::new()],
            label: "Broken".to_string(),
        });
        let err = validate_catalog(&rules).unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn validate_rejects_rule_with_empty_label() {
        let mut rules = CatalogRules::builtin();
        rules.categories.push(CategoryRule {
            keywords: vec!["X".to_string()],
            label: " ".to_string(),
        });
        let err = validate_catalog(&rules).unwrap_err();
        assert!(err.to_string().contains("empty label"));
    }

    #[test]
    fn load_catalog_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("catalog.yaml");
        assert!(
            path.exists(),
            "catalog.yaml missing at {path:?} — required for this test"
        );
        let result = load_catalog(&path);
        assert!(result.is_ok(), "failed to load catalog.yaml: {result:?}");
        let rules = result.unwrap();
        assert_eq!(rules.header_marker, "PRODUCTS");
        assert!(!rules.categories.is_empty());
        assert!((rules.markup - 1.10).abs() < f64::EPSILON);
    }

    #[test]
    fn yaml_file_matches_builtin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("catalog.yaml");
        let loaded = load_catalog(&path).unwrap();
        let builtin = CatalogRules::builtin();
        assert_eq!(loaded.default_category, builtin.default_category);
        assert_eq!(loaded.categories.len(), builtin.categories.len());
        for (a, b) in loaded.categories.iter().zip(builtin.categories.iter()) {
            assert_eq!(a.label, b.label);
            assert_eq!(a.keywords, b.keywords);
        }
    }
}
