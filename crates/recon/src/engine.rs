use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::{
    aggregate_purchase_order, aggregate_put_away, aggregate_qc_fail, PoAggregate,
    PutAwayAggregate, QcFailAggregate,
};
use crate::classify::{build_remarks, classify_qc, classify_status, merge_quantities};
use crate::config::{GrnConfig, QcFailMode};
use crate::error::GrnError;
use crate::model::{GrnInput, GrnMeta, GrnReport, IntakeSummary, ReconciledLine, SourceKind};
use crate::normalize::SkuKey;
use crate::row::CellValue;
use crate::summary::summarize;

/// Run a full GRN reconciliation per config. Returns lines + summary.
pub fn run(config: &GrnConfig, input: &GrnInput) -> Result<GrnReport, GrnError> {
    for source in SourceKind::ALL {
        check_table(config, input, source)?;
    }

    let po = aggregate_purchase_order(
        &input.purchase_order.rows,
        &config.aliases(SourceKind::PurchaseOrder),
    );
    let put_away = aggregate_put_away(&input.put_away.rows, &config.aliases(SourceKind::PutAway));
    let qc_fail = aggregate_qc_fail(&input.qc_fail.rows, &config.aliases(SourceKind::QcFail));

    let lines = reconcile(&po.by_sku, &put_away.by_sku, &qc_fail.by_sku, config.qc_fail_mode)?;
    let summary = summarize(&lines);

    log::debug!(
        "reconciled {} lines: {} ordered, {} received, {} failed QC",
        summary.total_lines,
        summary.total_ordered_units,
        summary.total_received_units,
        summary.total_qc_failed_units,
    );

    Ok(GrnReport {
        meta: GrnMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            sku_code_type: config.sku_code_type,
            qc_fail_mode: config.qc_fail_mode,
            intake: IntakeSummary {
                purchase_order: po.stats,
                put_away: put_away.stats,
                qc_fail: qc_fail.stats,
            },
        },
        summary,
        lines,
    })
}

/// Reject a source that cannot possibly contribute SKUs.
///
/// QC fail is optional: an empty table passes, and a table without a SKU
/// column is logged and reconciled as if it had no rows.
fn check_table(config: &GrnConfig, input: &GrnInput, source: SourceKind) -> Result<(), GrnError> {
    let table = input.table(source);

    if table.is_empty() {
        if source == SourceKind::QcFail {
            return Ok(());
        }
        log::warn!("{source}: no rows, refusing to reconcile");
        return Err(GrnError::EmptyInput { input: source });
    }

    let candidates = config.aliases(source).sku;
    if !table.headers.is_empty() && !candidates.iter().any(|c| table.has_header(c)) {
        log::warn!("{source}: none of {candidates:?} in headers {:?}", table.headers);
        if source == SourceKind::QcFail {
            return Ok(());
        }
        return Err(GrnError::MissingColumn { input: source, candidates });
    }

    Ok(())
}

/// Merge the three per-SKU aggregates into one line per SKU.
///
/// Lines come out in ascending SKU order. Purchase order and put-away must
/// each contribute at least one SKU; QC fail may be empty.
pub fn reconcile(
    po: &BTreeMap<SkuKey, PoAggregate>,
    put_away: &BTreeMap<SkuKey, PutAwayAggregate>,
    qc_fail: &BTreeMap<SkuKey, QcFailAggregate>,
    mode: QcFailMode,
) -> Result<Vec<ReconciledLine>, GrnError> {
    if po.is_empty() {
        return Err(GrnError::EmptyInput { input: SourceKind::PurchaseOrder });
    }
    if put_away.is_empty() {
        return Err(GrnError::EmptyInput { input: SourceKind::PutAway });
    }

    let all_skus: BTreeSet<&SkuKey> = po
        .keys()
        .chain(put_away.keys())
        .chain(qc_fail.keys())
        .collect();

    let lines = all_skus
        .into_iter()
        .map(|sku| build_line(sku, po.get(sku), put_away.get(sku), qc_fail.get(sku), mode))
        .collect();

    Ok(lines)
}

fn build_line(
    sku: &SkuKey,
    po: Option<&PoAggregate>,
    put_away: Option<&PutAwayAggregate>,
    qc_fail: Option<&QcFailAggregate>,
    mode: QcFailMode,
) -> ReconciledLine {
    let ordered = po.map_or(0, |a| a.ordered_qty);
    let put = put_away.map_or(0, |a| a.received_qty);
    let failed = qc_fail.map_or(0, |a| a.failed_qty);

    if mode == QcFailMode::Subset && failed > put {
        log::warn!("{sku}: {failed} QC-failed units exceed {put} put-away units");
    }

    let q = merge_quantities(ordered, put, failed, mode);
    let bin_summary = put_away.and_then(|a| a.bins.summary());

    let (brand_sku_code, alt_sku_code, size, color, unit_price, amount) = match po {
        Some(agg) => {
            let d = &agg.details;
            (
                d.brand_sku_code.clone(),
                d.alt_sku_code.clone(),
                d.size.clone(),
                d.color.clone(),
                d.unit_price.clone(),
                d.amount.clone(),
            )
        }
        None => (
            sku.to_string(),
            String::new(),
            String::new(),
            String::new(),
            CellValue::Empty,
            CellValue::Empty,
        ),
    };

    ReconciledLine {
        sku: sku.to_string(),
        brand_sku_code,
        alt_sku_code,
        size,
        color,
        unit_price,
        amount,
        ordered_qty: q.ordered,
        received_qty: q.received,
        passed_qc_qty: q.passed_qc,
        failed_qc_qty: q.failed_qc,
        shortage_qty: q.shortage,
        excess_qty: q.excess,
        not_ordered_qty: q.not_ordered,
        status: classify_status(&q),
        qc_status: classify_qc(&q),
        remarks: build_remarks(&q),
        bin_summary,
    }
}
