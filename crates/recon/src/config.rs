use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GrnError;
use crate::model::SourceKind;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrnConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku_code_type: SkuCodeType,
    #[serde(default)]
    pub qc_fail_mode: QcFailMode,
    #[serde(default)]
    pub columns: ColumnConfig,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which SKU code family presentation treats as primary.
/// Does not affect reconciliation math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkuCodeType {
    #[default]
    Brand,
    Knot,
}

impl std::fmt::Display for SkuCodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brand => write!(f, "BRAND"),
            Self::Knot => write!(f, "KNOT"),
        }
    }
}

/// How QC-fail quantities relate to put-away quantities.
///
/// `Additive`: rejected units are counted on top of put-away.
/// `Subset`: rejected units were already counted in put-away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QcFailMode {
    #[default]
    Additive,
    Subset,
}

impl std::fmt::Display for QcFailMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Additive => write!(f, "additive"),
            Self::Subset => write!(f, "subset"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

/// Ordered header aliases per logical field. Earlier aliases win.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnAliasTable {
    pub sku: Vec<String>,
    pub quantity: Vec<String>,
    pub bin: Vec<String>,
    pub brand_sku: Vec<String>,
    pub alt_sku: Vec<String>,
    pub size: Vec<String>,
    pub color: Vec<String>,
    pub unit_price: Vec<String>,
    pub amount: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl ColumnAliasTable {
    pub fn purchase_order() -> Self {
        Self {
            sku: names(&["Brand SKU Code", "KNOT SKU Code", "SKU", "SKU ID"]),
            quantity: names(&["Quantity"]),
            brand_sku: names(&["Brand SKU Code"]),
            alt_sku: names(&["KNOT SKU Code"]),
            size: names(&["Size"]),
            color: names(&["Colors", "Color"]),
            unit_price: names(&["Unit Price", "Price"]),
            amount: names(&["Amount"]),
            ..Self::default()
        }
    }

    pub fn put_away() -> Self {
        Self {
            sku: names(&["SKU ID", "SKU", "Brand SKU Code", "KNOT SKU Code"]),
            quantity: names(&["Quantity", "Put Away Quantity"]),
            bin: names(&["BIN", "Bin", "Bin Location", "BIN LOCATION"]),
            ..Self::default()
        }
    }

    pub fn qc_fail() -> Self {
        Self {
            sku: names(&["SKU ID", "SKU", "Brand SKU Code", "KNOT SKU Code"]),
            quantity: names(&["Quantity", "Failed Quantity"]),
            ..Self::default()
        }
    }

    pub fn defaults_for(source: SourceKind) -> Self {
        match source {
            SourceKind::PurchaseOrder => Self::purchase_order(),
            SourceKind::PutAway => Self::put_away(),
            SourceKind::QcFail => Self::qc_fail(),
        }
    }

    fn apply(&mut self, overrides: &ColumnOverrides) {
        let fields: [(&mut Vec<String>, &Option<Vec<String>>); 9] = [
            (&mut self.sku, &overrides.sku),
            (&mut self.quantity, &overrides.quantity),
            (&mut self.bin, &overrides.bin),
            (&mut self.brand_sku, &overrides.brand_sku),
            (&mut self.alt_sku, &overrides.alt_sku),
            (&mut self.size, &overrides.size),
            (&mut self.color, &overrides.color),
            (&mut self.unit_price, &overrides.unit_price),
            (&mut self.amount, &overrides.amount),
        ];
        for (slot, value) in fields {
            if let Some(list) = value {
                *slot = list.clone();
            }
        }
    }
}

/// Partial override of one source's alias table. Unset fields keep defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnOverrides {
    pub sku: Option<Vec<String>>,
    pub quantity: Option<Vec<String>>,
    pub bin: Option<Vec<String>>,
    pub brand_sku: Option<Vec<String>>,
    pub alt_sku: Option<Vec<String>>,
    pub size: Option<Vec<String>>,
    pub color: Option<Vec<String>>,
    pub unit_price: Option<Vec<String>>,
    pub amount: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    #[serde(default)]
    pub purchase_order: ColumnOverrides,
    #[serde(default)]
    pub put_away: ColumnOverrides,
    #[serde(default)]
    pub qc_fail: ColumnOverrides,
}

impl ColumnConfig {
    fn overrides(&self, source: SourceKind) -> &ColumnOverrides {
        match source {
            SourceKind::PurchaseOrder => &self.purchase_order,
            SourceKind::PutAway => &self.put_away,
            SourceKind::QcFail => &self.qc_fail,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl GrnConfig {
    pub fn from_toml(input: &str) -> Result<Self, GrnError> {
        let config: GrnConfig =
            toml::from_str(input).map_err(|e| GrnError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrnError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| GrnError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    /// Effective alias table for `source`: defaults merged with overrides.
    pub fn aliases(&self, source: SourceKind) -> ColumnAliasTable {
        let mut table = ColumnAliasTable::defaults_for(source);
        table.apply(self.columns.overrides(source));
        table
    }

    pub fn validate(&self) -> Result<(), GrnError> {
        for source in SourceKind::ALL {
            let table = self.aliases(source);

            if table.sku.is_empty() {
                return Err(GrnError::ConfigValidation(format!(
                    "columns.{source}.sku must list at least one alias"
                )));
            }
            if table.quantity.is_empty() {
                return Err(GrnError::ConfigValidation(format!(
                    "columns.{source}.quantity must list at least one alias"
                )));
            }

            let all = [
                &table.sku,
                &table.quantity,
                &table.bin,
                &table.brand_sku,
                &table.alt_sku,
                &table.size,
                &table.color,
                &table.unit_price,
                &table.amount,
            ];
            if all.iter().flat_map(|list| list.iter()).any(|a| a.trim().is_empty()) {
                return Err(GrnError::ConfigValidation(format!(
                    "columns.{source}: aliases must not be blank"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
