//! Line classification: quantity merge, status, QC status, remarks.

use crate::config::QcFailMode;
use crate::model::{LineQuantities, LineStatus, QcStatus};

/// Merge one SKU's ordered / put-away / failed counts into line quantities.
pub fn merge_quantities(ordered: u64, put_away: u64, failed: u64, mode: QcFailMode) -> LineQuantities {
    let received = match mode {
        QcFailMode::Additive => put_away.saturating_add(failed),
        // Failures are a subset of put-away; more failures than put-away
        // means put-away under-reported, so trust the larger count.
        QcFailMode::Subset => put_away.max(failed),
    };
    let passed_qc = received.saturating_sub(failed);

    LineQuantities {
        ordered,
        received,
        passed_qc,
        failed_qc: failed,
        shortage: ordered.saturating_sub(received),
        excess: received.saturating_sub(ordered),
        not_ordered: if ordered == 0 { received } else { 0 },
    }
}

/// Later checks override earlier ones.
pub fn classify_status(q: &LineQuantities) -> LineStatus {
    let mut status = LineStatus::Received;
    if q.shortage > 0 {
        status = LineStatus::Shortage;
    }
    if q.excess > 0 {
        status = LineStatus::Excess;
    }
    if q.received == 0 {
        status = LineStatus::NotReceived;
    }
    if q.ordered == 0 && q.received > 0 {
        status = LineStatus::ExcessReceipt;
    }
    status
}

pub fn classify_qc(q: &LineQuantities) -> QcStatus {
    if q.failed_qc > 0 {
        if q.failed_qc == q.received {
            QcStatus::Failed
        } else if q.passed_qc > 0 {
            QcStatus::Partial
        } else {
            QcStatus::NotPerformed
        }
    } else if q.received > 0 {
        QcStatus::Passed
    } else {
        QcStatus::NotPerformed
    }
}

/// Space-separated clauses, fixed order: shortage, excess, QC failed,
/// not ordered, not received.
pub fn build_remarks(q: &LineQuantities) -> String {
    let mut clauses: Vec<String> = Vec::new();
    if q.shortage > 0 {
        clauses.push(clause("Shortage", q.shortage));
    }
    if q.excess > 0 {
        clauses.push(clause("Excess", q.excess));
    }
    if q.failed_qc > 0 {
        clauses.push(clause("QC Failed", q.failed_qc));
    }
    if q.not_ordered > 0 {
        clauses.push(clause("Not Ordered", q.not_ordered));
    }
    if q.received == 0 {
        clauses.push(clause("Not Received", q.ordered));
    }
    clauses.join(" ")
}

/// Always "units", a count of 1 included.
fn clause(label: &str, units: u64) -> String {
    format!("{label}: {units} units.")
}
