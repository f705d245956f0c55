//! Per-SKU aggregation of each source.
//!
//! Each aggregator is a pure reduction over its rows: resolve the SKU, drop
//! unusable rows, sum quantities. Results are keyed by `SkuKey` in a
//! `BTreeMap`, so iteration order is the sorted key order.

use std::collections::BTreeMap;

use crate::config::ColumnAliasTable;
use crate::model::IntakeStats;
use crate::normalize::{is_header_token, normalize_sku, parse_quantity, try_parse_quantity, SkuKey};
use crate::row::{CellValue, SourceRow};

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Passthrough fields from the first PO row seen for a SKU.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoDetails {
    pub brand_sku_code: String,
    pub alt_sku_code: String,
    pub size: String,
    pub color: String,
    pub unit_price: CellValue,
    pub amount: CellValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoAggregate {
    pub ordered_qty: u64,
    pub details: PoDetails,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PutAwayAggregate {
    pub received_qty: u64,
    pub bins: BinLocations,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QcFailAggregate {
    pub failed_qty: u64,
    pub record_count: usize,
}

/// Aggregated source plus its intake statistics.
#[derive(Debug, Clone)]
pub struct Aggregated<T> {
    pub by_sku: BTreeMap<SkuKey, T>,
    pub stats: IntakeStats,
}

impl<T> Aggregated<T> {
    pub fn is_empty(&self) -> bool {
        self.by_sku.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Bin locations
// ---------------------------------------------------------------------------

/// Run-length multiset of bin labels, in first-seen label order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinLocations {
    runs: Vec<(String, u64)>,
}

impl BinLocations {
    pub fn add(&mut self, label: &str, units: u64) {
        if units == 0 {
            return;
        }
        match self.runs.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count = count.saturating_add(units),
            None => self.runs.push((label.to_string(), units)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn count(&self, label: &str) -> u64 {
        self.runs
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn total_units(&self) -> u64 {
        self.runs.iter().fold(0, |acc, (_, c)| acc.saturating_add(*c))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.runs.iter().map(|(l, c)| (l.as_str(), *c))
    }

    /// "A1 (3), B2 (1)", or `None` without bin data.
    pub fn summary(&self) -> Option<String> {
        if self.runs.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .runs
            .iter()
            .map(|(label, count)| format!("{label} ({count})"))
            .collect();
        Some(parts.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

/// Resolve the SKU of every row, dropping blank and header rows.
/// Yields (sku, row, quantity) with quantity already defaulted.
fn intake<'a>(
    rows: &'a [SourceRow],
    aliases: &'a ColumnAliasTable,
    default_qty: u64,
    stats: &mut IntakeStats,
) -> Vec<(SkuKey, &'a SourceRow, u64)> {
    stats.rows = rows.len();
    let mut accepted = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(sku) = normalize_sku(row, &aliases.sku) else {
            stats.skipped_blank_sku += 1;
            continue;
        };
        if is_header_token(sku.as_str(), &aliases.sku) {
            stats.skipped_header_rows += 1;
            continue;
        }

        let raw_qty = row.lookup(&aliases.quantity);
        if raw_qty.and_then(try_parse_quantity).is_none() {
            stats.defaulted_quantities += 1;
        }
        let qty = parse_quantity(raw_qty, default_qty);

        stats.aggregated_rows += 1;
        accepted.push((sku, row, qty));
    }

    accepted
}

fn log_intake(source: &str, stats: &IntakeStats) {
    log::debug!(
        "{source}: {} rows, {} aggregated into {} SKUs ({} blank SKU, {} header rows, {} defaulted quantities)",
        stats.rows,
        stats.aggregated_rows,
        stats.distinct_skus,
        stats.skipped_blank_sku,
        stats.skipped_header_rows,
        stats.defaulted_quantities,
    );
    if stats.skipped_header_rows > 0 {
        log::warn!("{source}: dropped {} embedded header row(s)", stats.skipped_header_rows);
    }
}

// ---------------------------------------------------------------------------
// Aggregators
// ---------------------------------------------------------------------------

/// Sum ordered quantity per SKU. Missing quantity counts as 0.
pub fn aggregate_purchase_order(
    rows: &[SourceRow],
    aliases: &ColumnAliasTable,
) -> Aggregated<PoAggregate> {
    let mut stats = IntakeStats::default();
    let mut by_sku: BTreeMap<SkuKey, PoAggregate> = BTreeMap::new();

    for (sku, row, qty) in intake(rows, aliases, 0, &mut stats) {
        let entry = by_sku.entry(sku).or_insert_with(|| PoAggregate {
            ordered_qty: 0,
            details: PoDetails {
                brand_sku_code: row.text(&aliases.brand_sku),
                alt_sku_code: row.text(&aliases.alt_sku),
                size: row.text(&aliases.size),
                color: row.text(&aliases.color),
                unit_price: row.lookup(&aliases.unit_price).cloned().unwrap_or_default(),
                amount: row.lookup(&aliases.amount).cloned().unwrap_or_default(),
            },
            record_count: 0,
        });
        entry.ordered_qty = entry.ordered_qty.saturating_add(qty);
        entry.record_count += 1;
    }

    stats.distinct_skus = by_sku.len();
    log_intake("purchase_order", &stats);
    Aggregated { by_sku, stats }
}

/// Sum received units per SKU (1 per row without a quantity) and record bins.
pub fn aggregate_put_away(
    rows: &[SourceRow],
    aliases: &ColumnAliasTable,
) -> Aggregated<PutAwayAggregate> {
    let mut stats = IntakeStats::default();
    let mut by_sku: BTreeMap<SkuKey, PutAwayAggregate> = BTreeMap::new();

    for (sku, row, qty) in intake(rows, aliases, 1, &mut stats) {
        let entry = by_sku.entry(sku).or_default();
        entry.received_qty = entry.received_qty.saturating_add(qty);
        entry.record_count += 1;

        let bin = row.text(&aliases.bin);
        if !bin.is_empty() {
            entry.bins.add(&bin, qty);
        }
    }

    stats.distinct_skus = by_sku.len();
    log_intake("put_away", &stats);
    Aggregated { by_sku, stats }
}

/// Sum failed units per SKU (1 per row without a quantity).
pub fn aggregate_qc_fail(
    rows: &[SourceRow],
    aliases: &ColumnAliasTable,
) -> Aggregated<QcFailAggregate> {
    let mut stats = IntakeStats::default();
    let mut by_sku: BTreeMap<SkuKey, QcFailAggregate> = BTreeMap::new();

    for (sku, _row, qty) in intake(rows, aliases, 1, &mut stats) {
        let entry = by_sku.entry(sku).or_default();
        entry.failed_qty = entry.failed_qty.saturating_add(qty);
        entry.record_count += 1;
    }

    stats.distinct_skus = by_sku.len();
    log_intake("qc_fail", &stats);
    Aggregated { by_sku, stats }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> SkuKey {
        SkuKey::parse(s).unwrap()
    }

    #[test]
    fn po_sums_quantities_first_row_wins() {
        let rows = vec![
            SourceRow::new()
                .with("Brand SKU Code", "bx-1")
                .with("KNOT SKU Code", "K-100")
                .with("Size", "M")
                .with("Colors", "Navy")
                .with("Unit Price", 499.0)
                .with("Quantity", "6"),
            SourceRow::new()
                .with("Brand SKU Code", "BX-1 ")
                .with("Size", "L")
                .with("Quantity", 4),
        ];
        let po = aggregate_purchase_order(&rows, &ColumnAliasTable::purchase_order());
        assert_eq!(po.by_sku.len(), 1);

        let agg = &po.by_sku[&key("BX-1")];
        assert_eq!(agg.ordered_qty, 10);
        assert_eq!(agg.record_count, 2);
        assert_eq!(agg.details.brand_sku_code, "bx-1");
        assert_eq!(agg.details.alt_sku_code, "K-100");
        assert_eq!(agg.details.size, "M");
        assert_eq!(agg.details.color, "Navy");
        assert_eq!(agg.details.unit_price, CellValue::Number(499.0));
        assert_eq!(agg.details.amount, CellValue::Empty);
    }

    #[test]
    fn po_missing_quantity_is_zero() {
        let rows = vec![SourceRow::new().with("SKU", "A")];
        let po = aggregate_purchase_order(&rows, &ColumnAliasTable::purchase_order());
        assert_eq!(po.by_sku[&key("A")].ordered_qty, 0);
        assert_eq!(po.stats.defaulted_quantities, 1);
    }

    #[test]
    fn po_keyed_by_knot_code_when_brand_blank() {
        let rows = vec![SourceRow::new()
            .with("Brand SKU Code", "")
            .with("KNOT SKU Code", "knot-7")
            .with("Quantity", 2)];
        let po = aggregate_purchase_order(&rows, &ColumnAliasTable::purchase_order());
        assert!(po.by_sku.contains_key(&key("KNOT-7")));
    }

    #[test]
    fn header_and_blank_rows_are_dropped() {
        let rows = vec![
            SourceRow::new().with("SKU ID", "SKU ID").with("Quantity", "Quantity"),
            SourceRow::new().with("SKU", "brand sku code"),
            SourceRow::new().with("SKU ID", "   "),
            SourceRow::new().with("Notes", "total"),
            SourceRow::new().with("SKU ID", "X1"),
        ];
        let pa = aggregate_put_away(&rows, &ColumnAliasTable::put_away());
        assert_eq!(pa.by_sku.len(), 1);
        assert_eq!(pa.stats.rows, 5);
        assert_eq!(pa.stats.aggregated_rows, 1);
        assert_eq!(pa.stats.skipped_header_rows, 2);
        assert_eq!(pa.stats.skipped_blank_sku, 2);
        assert_eq!(pa.stats.distinct_skus, 1);
    }

    #[test]
    fn put_away_defaults_one_per_row() {
        let rows = vec![
            SourceRow::new().with("SKU", "y1"),
            SourceRow::new().with("SKU", "Y1"),
            SourceRow::new().with("SKU", " y1"),
        ];
        let pa = aggregate_put_away(&rows, &ColumnAliasTable::put_away());
        assert_eq!(pa.by_sku[&key("Y1")].received_qty, 3);
        assert_eq!(pa.by_sku[&key("Y1")].record_count, 3);
    }

    #[test]
    fn put_away_quantity_fallback_column() {
        let rows = vec![SourceRow::new().with("SKU", "Q").with("Put Away Quantity", "7")];
        let pa = aggregate_put_away(&rows, &ColumnAliasTable::put_away());
        assert_eq!(pa.by_sku[&key("Q")].received_qty, 7);
    }

    #[test]
    fn bins_weighted_by_quantity() {
        let rows = vec![
            SourceRow::new().with("SKU", "B").with("BIN", "A1").with("Quantity", 3),
            SourceRow::new().with("SKU", "B").with("Bin Location", "B2"),
            SourceRow::new().with("SKU", "B").with("Bin", "A1"),
            SourceRow::new().with("SKU", "B"),
        ];
        let pa = aggregate_put_away(&rows, &ColumnAliasTable::put_away());
        let agg = &pa.by_sku[&key("B")];
        assert_eq!(agg.received_qty, 6);
        assert_eq!(agg.bins.count("A1"), 4);
        assert_eq!(agg.bins.count("B2"), 1);
        assert_eq!(agg.bins.total_units(), 5);
        assert_eq!(agg.bins.summary().as_deref(), Some("A1 (4), B2 (1)"));
    }

    #[test]
    fn zero_quantity_row_adds_no_bin_units() {
        let rows = vec![SourceRow::new().with("SKU", "Z").with("BIN", "C3").with("Quantity", 0)];
        let pa = aggregate_put_away(&rows, &ColumnAliasTable::put_away());
        let agg = &pa.by_sku[&key("Z")];
        assert_eq!(agg.received_qty, 0);
        assert!(agg.bins.is_empty());
        assert_eq!(agg.bins.summary(), None);
    }

    #[test]
    fn qc_fail_quantity_columns() {
        let rows = vec![
            SourceRow::new().with("SKU ID", "F").with("Failed Quantity", "2"),
            SourceRow::new().with("SKU ID", "F"),
            SourceRow::new().with("SKU ID", "F").with("Quantity", "-3"),
        ];
        let qc = aggregate_qc_fail(&rows, &ColumnAliasTable::qc_fail());
        let agg = &qc.by_sku[&key("F")];
        assert_eq!(agg.failed_qty, 3);
        assert_eq!(agg.record_count, 3);
        assert_eq!(qc.stats.defaulted_quantities, 1);
    }

    #[test]
    fn oversized_quantities_saturate() {
        let rows: Vec<SourceRow> = (0..3)
            .map(|_| SourceRow::new().with("SKU", "A").with("Quantity", 1e19))
            .collect();
        let po = aggregate_purchase_order(&rows, &ColumnAliasTable::purchase_order());
        assert_eq!(po.by_sku[&key("A")].ordered_qty, u64::MAX);

        let rows: Vec<SourceRow> = (0..3)
            .map(|_| SourceRow::new().with("SKU", "A").with("BIN", "A1").with("Quantity", 1e19))
            .collect();
        let pa = aggregate_put_away(&rows, &ColumnAliasTable::put_away());
        let agg = &pa.by_sku[&key("A")];
        assert_eq!(agg.received_qty, u64::MAX);
        assert_eq!(agg.bins.count("A1"), u64::MAX);
        assert_eq!(agg.bins.total_units(), u64::MAX);

        let qc = aggregate_qc_fail(&rows, &ColumnAliasTable::qc_fail());
        assert_eq!(qc.by_sku[&key("A")].failed_qty, u64::MAX);
    }

    #[test]
    fn keys_iterate_sorted() {
        let rows = vec![
            SourceRow::new().with("SKU", "c"),
            SourceRow::new().with("SKU", "a"),
            SourceRow::new().with("SKU", "b"),
        ];
        let qc = aggregate_qc_fail(&rows, &ColumnAliasTable::qc_fail());
        let keys: Vec<&str> = qc.by_sku.keys().map(SkuKey::as_str).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }
}
