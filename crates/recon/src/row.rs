//! Source rows as handed over by the file-parsing layer.
//!
//! A row is an untyped mapping of column header to cell. Nothing here knows
//! about SKUs or quantities; see `normalize` for that.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One raw cell. Spreadsheet parsers hand back numbers, CSV parsers strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// Empty, whitespace-only text, or a non-finite number.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(n) => !n.is_finite(),
        }
    }

    /// Trimmed text form. Integral numbers render without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) if !n.is_finite() => String::new(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// A single parsed record: column header -> cell.
///
/// Column names are stored trimmed, however the row was built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, CellValue>", into = "HashMap<String, CellValue>")]
pub struct SourceRow {
    fields: HashMap<String, CellValue>,
}

impl SourceRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(trim_column(column.into()), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column.trim())
    }

    /// First non-blank cell among `aliases`, in priority order.
    pub fn lookup<S: AsRef<str>>(&self, aliases: &[S]) -> Option<&CellValue> {
        aliases
            .iter()
            .filter_map(|alias| self.get(alias.as_ref()))
            .find(|cell| !cell.is_blank())
    }

    /// Trimmed text of the first non-blank alias, or empty.
    pub fn text<S: AsRef<str>>(&self, aliases: &[S]) -> String {
        self.lookup(aliases).map(CellValue::as_text).unwrap_or_default()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(CellValue::is_blank)
    }
}

fn trim_column(column: String) -> String {
    if column.trim().len() == column.len() {
        column
    } else {
        column.trim().to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for SourceRow
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl From<HashMap<String, CellValue>> for SourceRow {
    fn from(fields: HashMap<String, CellValue>) -> Self {
        fields.into_iter().collect()
    }
}

impl From<SourceRow> for HashMap<String, CellValue> {
    fn from(row: SourceRow) -> Self {
        row.fields
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One parsed file: header metadata plus its header-stripped rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>, rows: Vec<SourceRow>) -> Self {
        Self { headers, rows }
    }

    /// Infer headers as the sorted union of every row's columns.
    pub fn from_rows(rows: Vec<SourceRow>) -> Self {
        let headers: BTreeSet<&str> = rows.iter().flat_map(SourceRow::columns).collect();
        let headers = headers.into_iter().map(str::to_string).collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header match on trimmed names, the same comparison row lookups use.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h.trim() == name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_skips_blank_aliases() {
        let row = SourceRow::new()
            .with("SKU ID", "  ")
            .with("SKU", "abc-1")
            .with("Brand SKU Code", "zzz");
        let cell = row.lookup(&["SKU ID", "SKU", "Brand SKU Code"]).unwrap();
        assert_eq!(cell, &CellValue::Text("abc-1".into()));
    }

    #[test]
    fn lookup_missing_everywhere() {
        let row = SourceRow::new().with("Other", "x");
        assert!(row.lookup(&["SKU"]).is_none());
        assert_eq!(row.text(&["SKU"]), "");
    }

    #[test]
    fn number_text_form() {
        assert_eq!(CellValue::Number(10.0).as_text(), "10");
        assert_eq!(CellValue::Number(12.5).as_text(), "12.5");
        assert_eq!(CellValue::Number(f64::NAN).as_text(), "");
        assert!(CellValue::Number(f64::INFINITY).is_blank());
    }

    #[test]
    fn deserialize_untagged_cells() {
        let row: SourceRow =
            serde_json::from_str(r#"{"SKU": "X1", "Quantity": 10, "Bin": null}"#).unwrap();
        assert_eq!(row.get("SKU"), Some(&CellValue::Text("X1".into())));
        assert_eq!(row.get("Quantity"), Some(&CellValue::Number(10.0)));
        assert_eq!(row.get("Bin"), Some(&CellValue::Empty));
    }

    #[test]
    fn padded_column_names_are_trimmed() {
        let row = SourceRow::new().with(" SKU ", "A").with("Quantity\t", 2);
        assert_eq!(row.lookup(&["SKU"]), Some(&CellValue::Text("A".into())));
        assert_eq!(row.get(" Quantity"), Some(&CellValue::Number(2.0)));

        let row: SourceRow = serde_json::from_str(r#"{" SKU ID": "B"}"#).unwrap();
        assert_eq!(row.text(&["SKU ID"]), "B");

        let table = SourceTable::new(vec![" SKU".into()], vec![row]);
        assert!(table.has_header("SKU"));
        assert!(table.has_header(" SKU "));
    }

    #[test]
    fn table_infers_sorted_headers() {
        let table = SourceTable::from_rows(vec![
            SourceRow::new().with("SKU", "a").with("Quantity", 1),
            SourceRow::new().with("BIN", "A1").with("SKU", "b"),
        ]);
        assert_eq!(table.headers, vec!["BIN", "Quantity", "SKU"]);
        assert!(table.has_header("BIN"));
        assert!(!table.has_header("Bin"));
    }
}
