//! Domain errors

use thiserror::Error;

/// Domain errors for the signature tracking engine.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid range expression: {input}")]
    RangeParse { input: String },

    #[error("invalid signature configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid exclusion entry: {reason}")]
    InvalidExclusion { reason: String },

    #[error("invalid audit record: {reason}")]
    InvalidRecord { reason: String },

    #[error("invalid reference data entry: {reason}")]
    InvalidReference { reason: String },
}
