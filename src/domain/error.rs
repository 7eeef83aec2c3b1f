//! Domain error types.
//!
//! Configuration problems are errors. Data-availability problems are not: the
//! simulator reports them as warnings (see [`crate::domain::simulator`]).

/// Top-level error type for fxdca.
#[derive(Debug, thiserror::Error)]
pub enum FxdcaError {
    #[error("invalid configuration: {option} = {value:?}: {reason}")]
    InvalidConfiguration {
        option: String,
        value: String,
        reason: String,
    },

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

    #[error("snapshot error in {file}: {reason}")]
    Snapshot { file: String, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FxdcaError {
    pub fn invalid_configuration(
        option: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FxdcaError::InvalidConfiguration {
            option: option.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl From<&FxdcaError> for std::process::ExitCode {
    fn from(err: &FxdcaError) -> Self {
        let code: u8 = match err {
            FxdcaError::Io(_) | FxdcaError::Report { .. } => 1,
            FxdcaError::InvalidConfiguration { .. }
            | FxdcaError::ConfigParse { .. }
            | FxdcaError::ConfigMissing { .. }
            | FxdcaError::ConfigInvalid { .. } => 2,
            FxdcaError::DataSource { .. } => 3,
            FxdcaError::Snapshot { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
