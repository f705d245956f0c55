//! `grn-recon`: goods-received reconciliation engine.
//!
//! Pure engine crate: receives pre-parsed purchase order, put-away and QC-fail
//! rows, returns one reconciled line per SKU plus summary statistics.
//! No file parsing, no formatting, no persistence.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod row;
pub mod summary;

pub use config::{ColumnAliasTable, GrnConfig, QcFailMode, SkuCodeType};
pub use engine::{reconcile, run};
pub use error::GrnError;
pub use model::{GrnInput, GrnReport, LineStatus, QcStatus, ReconciledLine, SourceKind, SummaryStats};
pub use normalize::{normalize_sku, parse_quantity, SkuKey};
pub use row::{CellValue, SourceRow, SourceTable};
pub use summary::summarize;
