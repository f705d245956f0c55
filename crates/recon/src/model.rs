use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{QcFailMode, SkuCodeType};
use crate::row::{CellValue, SourceTable};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The three input files a GRN is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PurchaseOrder,
    PutAway,
    QcFail,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [Self::PurchaseOrder, Self::PutAway, Self::QcFail];
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PurchaseOrder => write!(f, "purchase_order"),
            Self::PutAway => write!(f, "put_away"),
            Self::QcFail => write!(f, "qc_fail"),
        }
    }
}

/// Pre-parsed tables. QC fail may be empty; the other two may not.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrnInput {
    pub purchase_order: SourceTable,
    pub put_away: SourceTable,
    #[serde(default)]
    pub qc_fail: SourceTable,
}

impl GrnInput {
    pub fn table(&self, source: SourceKind) -> &SourceTable {
        match source {
            SourceKind::PurchaseOrder => &self.purchase_order,
            SourceKind::PutAway => &self.put_away,
            SourceKind::QcFail => &self.qc_fail,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineStatus {
    Received,
    Shortage,
    Excess,
    #[serde(rename = "Not Received")]
    NotReceived,
    #[serde(rename = "Excess Receipt")]
    ExcessReceipt,
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "Received"),
            Self::Shortage => write!(f, "Shortage"),
            Self::Excess => write!(f, "Excess"),
            Self::NotReceived => write!(f, "Not Received"),
            Self::ExcessReceipt => write!(f, "Excess Receipt"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QcStatus {
    #[serde(rename = "Not Performed")]
    NotPerformed,
    Passed,
    Partial,
    Failed,
}

impl std::fmt::Display for QcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPerformed => write!(f, "Not Performed"),
            Self::Passed => write!(f, "Passed"),
            Self::Partial => write!(f, "Partial"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Per-SKU quantities after the three sources are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineQuantities {
    pub ordered: u64,
    pub received: u64,
    pub passed_qc: u64,
    pub failed_qc: u64,
    pub shortage: u64,
    pub excess: u64,
    pub not_ordered: u64,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One reconciled GRN line. Field names are consumed verbatim by export code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledLine {
    pub sku: String,
    pub brand_sku_code: String,
    pub alt_sku_code: String,
    pub size: String,
    pub color: String,
    pub unit_price: CellValue,
    pub amount: CellValue,
    pub ordered_qty: u64,
    pub received_qty: u64,
    pub passed_qc_qty: u64,
    pub failed_qc_qty: u64,
    pub shortage_qty: u64,
    pub excess_qty: u64,
    pub not_ordered_qty: u64,
    #[serde(rename = "Status")]
    pub status: LineStatus,
    #[serde(rename = "QC Status")]
    pub qc_status: QcStatus,
    #[serde(rename = "Remarks")]
    pub remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_summary: Option<String>,
}

impl ReconciledLine {
    /// The code presentation shows as "the" SKU. Falls back to the key.
    pub fn primary_sku(&self, code_type: SkuCodeType) -> &str {
        let code = match code_type {
            SkuCodeType::Brand => &self.brand_sku_code,
            SkuCodeType::Knot => &self.alt_sku_code,
        };
        if code.trim().is_empty() {
            &self.sku
        } else {
            code
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_lines: usize,
    pub total_ordered_units: u64,
    pub total_received_units: u64,
    pub total_shortage_units: u64,
    pub total_excess_units: u64,
    pub total_not_ordered_units: u64,
    pub total_qc_passed_units: u64,
    pub total_qc_failed_units: u64,
    /// Percent, rounded half-up. May exceed 100 when over-received.
    pub receipt_accuracy: u64,
    pub qc_pass_rate: u64,
    pub status_counts: BTreeMap<LineStatus, usize>,
    pub qc_status_counts: BTreeMap<QcStatus, usize>,
}

/// What happened to one source's rows on the way into aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IntakeStats {
    pub rows: usize,
    pub aggregated_rows: usize,
    pub skipped_blank_sku: usize,
    pub skipped_header_rows: usize,
    pub defaulted_quantities: usize,
    pub distinct_skus: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IntakeSummary {
    pub purchase_order: IntakeStats,
    pub put_away: IntakeStats,
    pub qc_fail: IntakeStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrnMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
    pub engine_version: String,
    pub run_at: String,
    pub sku_code_type: SkuCodeType,
    pub qc_fail_mode: QcFailMode,
    pub intake: IntakeSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrnReport {
    pub meta: GrnMeta,
    pub summary: SummaryStats,
    pub lines: Vec<ReconciledLine>,
}

impl GrnReport {
    pub fn to_json_pretty(&self) -> Result<String, crate::GrnError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
