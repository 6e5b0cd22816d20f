use thiserror::Error;

/// Validation errors raised while building requests for `ashare-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid frequency '{value}', expected one of 1m, 5m, 15m, 30m, 60m, 1d, 1w, 1M")]
    InvalidFrequency { value: String },

    #[error("end date must be YYYY-MM-DD: '{value}'")]
    InvalidEndDate { value: String },

    #[error("count must be greater than zero")]
    ZeroCount,

    #[error("unknown field '{value}', expected one of open, close, high, low, volume")]
    UnknownField { value: String },

    #[error("unsupported bar timestamp format: '{value}'")]
    InvalidTimestamp { value: String },
}
