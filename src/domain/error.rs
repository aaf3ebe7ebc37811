//! Domain error types.

/// Top-level error type for quantlab.
#[derive(Debug, thiserror::Error)]
pub enum QuantError {
    #[error("insufficient data: have {bars} bars, need at least {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("invalid price data: {reason}")]
    InvalidPriceData { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl QuantError {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        QuantError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<&QuantError> for std::process::ExitCode {
    fn from(err: &QuantError) -> Self {
        let code: u8 = match err {
            QuantError::Io(_) | QuantError::Json(_) => 1,
            QuantError::ConfigParse { .. }
            | QuantError::ConfigMissing { .. }
            | QuantError::ConfigInvalid { .. } => 2,
            QuantError::DataSource { .. } => 3,
            QuantError::InvalidConfiguration { .. } => 4,
            QuantError::InsufficientData { .. } | QuantError::InvalidPriceData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
