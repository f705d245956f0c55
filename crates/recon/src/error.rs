use crate::model::SourceKind;

#[derive(Debug, thiserror::Error)]
pub enum GrnError {
    /// Purchase order or put-away input carries no usable rows.
    #[error("{input} input is empty: no rows with a resolvable SKU")]
    EmptyInput { input: SourceKind },

    /// None of the SKU aliases appears in the source's headers.
    #[error("{input}: no SKU column found (expected one of: {})", candidates.join(", "))]
    MissingColumn {
        input: SourceKind,
        candidates: Vec<String>,
    },

    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (empty alias list, blank alias, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<std::io::Error> for GrnError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GrnError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
