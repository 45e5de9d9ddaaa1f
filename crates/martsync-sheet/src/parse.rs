//! Low-level cell and product-name parsing helpers.
//!
//! See [`crate::normalize`] for how these compose into full record
//! normalization.

use regex::Regex;

use crate::reader::Cell;

/// The weight pattern of the order-format export: a number (optional
/// decimal part), optional space, then a unit. The alternation order is
/// part of the contract — shorter units win at the same position, which
/// is how the export has always been read.
const WEIGHT_PATTERN: &str = r"(?i)(\d+(?:\.\d+)?)\s*(G|KG|ML|L|GM|KGS)";

/// Compiles the weight pattern. Compile once per run and reuse; the
/// pattern itself is static and always valid.
#[must_use]
pub fn weight_pattern() -> Regex {
    Regex::new(WEIGHT_PATTERN).expect("valid weight regex")
}

/// Extract the first weight occurrence from a product name.
///
/// Returns the magnitude exactly as matched (`"180"`, `"0.5"`) and the
/// normalized unit (`GM`→`G`, `KGS`→`KG`, then lower-cased), or `None`
/// when the name carries no weight pattern.
#[must_use]
pub fn parse_weight(re: &Regex, name: &str) -> Option<(String, String)> {
    let caps = re.captures(name)?;
    let magnitude = caps.get(1)?.as_str().to_string();
    let mut unit = caps.get(2)?.as_str().to_uppercase();
    if unit == "GM" {
        unit = "G".to_string();
    }
    if unit == "KGS" {
        unit = "KG".to_string();
    }
    Some((magnitude, unit.to_lowercase()))
}

/// Parse a cell as a float the way the import has always parsed prices:
/// numeric cells pass through, text cells parse their longest leading
/// numeric prefix, anything else is 0.0.
#[must_use]
pub fn parse_float_cell(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(v) => *v,
        Cell::Text(s) => parse_float_prefix(s).unwrap_or(0.0),
        Cell::Empty => 0.0,
    }
}

/// Parse the longest leading numeric prefix of a string: optional sign,
/// digits, at most one decimal point. Returns `None` when the string
/// does not start with a number after leading whitespace.
#[must_use]
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0usize;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let digits_start = i;
    let mut has_dot = false;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || (bytes[i] == b'.' && !has_dot)) {
        if bytes[i] == b'.' {
            has_dot = true;
        }
        i += 1;
    }

    if i == digits_start || !bytes[digits_start..i].iter().any(u8::is_ascii_digit) {
        return None;
    }

    s[..i].parse::<f64>().ok()
}
