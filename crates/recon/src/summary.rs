use crate::model::{ReconciledLine, SummaryStats};

/// Compute summary statistics from reconciled lines.
pub fn summarize(lines: &[ReconciledLine]) -> SummaryStats {
    let mut stats = SummaryStats {
        total_lines: lines.len(),
        ..SummaryStats::default()
    };

    for line in lines {
        stats.total_ordered_units = stats.total_ordered_units.saturating_add(line.ordered_qty);
        stats.total_received_units = stats.total_received_units.saturating_add(line.received_qty);
        stats.total_shortage_units = stats.total_shortage_units.saturating_add(line.shortage_qty);
        stats.total_excess_units = stats.total_excess_units.saturating_add(line.excess_qty);
        stats.total_not_ordered_units = stats.total_not_ordered_units.saturating_add(line.not_ordered_qty);
        stats.total_qc_passed_units = stats.total_qc_passed_units.saturating_add(line.passed_qc_qty);
        stats.total_qc_failed_units = stats.total_qc_failed_units.saturating_add(line.failed_qc_qty);

        *stats.status_counts.entry(line.status).or_insert(0) += 1;
        *stats.qc_status_counts.entry(line.qc_status).or_insert(0) += 1;
    }

    stats.receipt_accuracy = percent(stats.total_received_units, stats.total_ordered_units);
    stats.qc_pass_rate = percent(stats.total_qc_passed_units, stats.total_received_units);
    stats
}

/// `round(100 * part / whole)`, half-up, 0 when `whole` is 0.
fn percent(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u128::from(part), u128::from(whole));
    let rounded = (200 * part + whole) / (2 * whole);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}
