//! Row normalization: canonical SKU keys and quantity coercion.

use std::fmt;

use serde::Serialize;

use crate::row::{CellValue, SourceRow};

/// Canonical SKU identifier: trimmed, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SkuKey(String);

impl SkuKey {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkuKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the SKU of `row` from the first non-blank candidate column.
pub fn normalize_sku<S: AsRef<str>>(row: &SourceRow, candidates: &[S]) -> Option<SkuKey> {
    row.lookup(candidates)
        .and_then(|cell| SkuKey::parse(&cell.as_text()))
}

/// True when `value` is literally one of the header `tokens` (case-insensitive).
///
/// Catches header rows re-embedded mid-sheet, where the SKU column holds "SKU".
pub fn is_header_token<S: AsRef<str>>(value: &str, tokens: &[S]) -> bool {
    let value = value.trim();
    tokens
        .iter()
        .any(|t| t.as_ref().trim().eq_ignore_ascii_case(value))
}

/// Unclamped integer reading of a quantity cell.
///
/// Numbers truncate toward zero. Text yields its leading signed integer
/// prefix, so "12", "12.7" and "12 pcs" all read as 12.
pub fn try_parse_quantity(raw: &CellValue) -> Option<i64> {
    match raw {
        CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
        CellValue::Number(_) | CellValue::Empty => None,
        CellValue::Text(s) => leading_integer(s),
    }
}

/// Coerce a quantity cell to a non-negative count.
///
/// Missing or unparseable values fall back to `default`. Negative values clamp to 0.
pub fn parse_quantity(raw: Option<&CellValue>, default: u64) -> u64 {
    match raw.and_then(try_parse_quantity) {
        Some(n) => u64::try_from(n).unwrap_or(0),
        None => default,
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
